//! Safe multisig transactions: multisend packing and the `SafeTx` hash.
//!
//! Several operations are packed into one `multiSend(bytes)` delegate
//! call; a single operation is sent as a plain call. The owner signs the
//! EIP-712 `SafeTx` digest as a personal message and the `v` byte is
//! shifted by 4 to select Safe's `eth_sign` signature type.

use alloy::hex;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};

use super::error::{RedeemError, RedeemResult};
use super::signature::{
    hash_personal_message, keccak256, pack32, sign_canonical, to_checksum_address,
    PersonalMessage,
};
use super::wallet::WalletType;

sol! {
    /// Safe MultiSend library.
    interface IMultiSend {
        function multiSend(bytes transactions) external payable;
    }
}

const DOMAIN_TYPE: &[u8] = b"EIP712Domain(uint256 chainId,address verifyingContract)";
const SAFE_TX_TYPE: &[u8] = b"SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";

/// Offset added to `v` for Safe's `eth_sign` signature type.
pub const ETH_SIGN_V_OFFSET: u8 = 4;

/// Safe operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SafeOperationType {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl SafeOperationType {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// One call executed by the Safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeOperation {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub operation: SafeOperationType,
}

impl SafeOperation {
    /// Zero-value plain call.
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            to,
            data,
            value: U256::ZERO,
            operation: SafeOperationType::Call,
        }
    }
}

/// Collapse operations into the single operation the Safe executes.
///
/// One operation passes through unchanged; several are packed as
/// `operation ‖ to ‖ value ‖ len(data) ‖ data` and wrapped in a
/// `multiSend` delegate call.
pub fn aggregate(ops: &[SafeOperation], multisend: Address) -> RedeemResult<SafeOperation> {
    match ops {
        [] => Err(RedeemError::Validation(
            "no Safe operations to execute".to_string(),
        )),
        [single] => Ok(single.clone()),
        many => {
            let mut packed = Vec::new();
            for op in many {
                packed.push(op.operation.code());
                packed.extend_from_slice(op.to.as_slice());
                packed.extend_from_slice(&pack32(op.value));
                packed.extend_from_slice(&pack32(U256::from(op.data.len())));
                packed.extend_from_slice(&op.data);
            }
            let data = IMultiSend::multiSendCall {
                transactions: packed.into(),
            }
            .abi_encode();
            Ok(SafeOperation {
                to: multisend,
                data: data.into(),
                value: U256::ZERO,
                operation: SafeOperationType::DelegateCall,
            })
        }
    }
}

fn word(address: Address) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(address.as_slice());
    out
}

/// EIP-712 digest of a gasless `SafeTx` for `safe` on `chain_id`.
pub fn safe_tx_hash(chain_id: u64, safe: Address, op: &SafeOperation, nonce: U256) -> B256 {
    let mut domain = Vec::with_capacity(96);
    domain.extend_from_slice(keccak256(DOMAIN_TYPE).as_slice());
    domain.extend_from_slice(&pack32(U256::from(chain_id)));
    domain.extend_from_slice(&word(safe));
    let domain_separator = keccak256(domain);

    let mut body = Vec::with_capacity(11 * 32);
    body.extend_from_slice(keccak256(SAFE_TX_TYPE).as_slice());
    body.extend_from_slice(&word(op.to));
    body.extend_from_slice(&pack32(op.value));
    body.extend_from_slice(keccak256(&op.data).as_slice());
    body.extend_from_slice(&pack32(U256::from(op.operation.code())));
    // safeTxGas, baseGas, gasPrice, gasToken, refundReceiver
    body.extend_from_slice(&[0u8; 5 * 32]);
    body.extend_from_slice(&pack32(nonce));
    let struct_hash = keccak256(body);

    let mut input = Vec::with_capacity(66);
    input.extend_from_slice(&[0x19, 0x01]);
    input.extend_from_slice(domain_separator.as_slice());
    input.extend_from_slice(struct_hash.as_slice());
    keccak256(input)
}

/// Gas parameters echoed to the relay service for Safe submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeSignatureParams {
    pub gas_price: String,
    pub operation: String,
    pub safe_txn_gas: String,
    pub base_gas: String,
    pub gas_token: String,
    pub refund_receiver: String,
}

/// Signed Safe payload submitted to `POST /submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTransactionRequest {
    pub from: String,
    pub to: String,
    pub proxy_wallet: String,
    pub data: String,
    pub nonce: String,
    pub signature: String,
    pub signature_params: SafeSignatureParams,
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    pub metadata: String,
}

/// Sign `op` for `safe` and package the relay request.
pub fn sign_safe_transaction(
    signer: &PrivateKeySigner,
    chain_id: u64,
    safe: Address,
    op: &SafeOperation,
    nonce: U256,
    metadata: &str,
) -> RedeemResult<SafeTransactionRequest> {
    let digest = safe_tx_hash(chain_id, safe, op, nonce);
    let signature = sign_canonical(
        &hash_personal_message(&PersonalMessage::Raw(digest.to_vec())),
        signer,
    )?;
    let mut bytes = signature.to_bytes();
    bytes[64] += ETH_SIGN_V_OFFSET;

    let zero = to_checksum_address(&Address::ZERO);
    Ok(SafeTransactionRequest {
        from: to_checksum_address(&signer.address()),
        to: to_checksum_address(&op.to),
        proxy_wallet: to_checksum_address(&safe),
        data: hex::encode_prefixed(&op.data),
        nonce: nonce.to_string(),
        signature: hex::encode_prefixed(bytes),
        signature_params: SafeSignatureParams {
            gas_price: "0".to_string(),
            operation: op.operation.code().to_string(),
            safe_txn_gas: "0".to_string(),
            base_gas: "0".to_string(),
            gas_token: zero.clone(),
            refund_receiver: zero,
        },
        wallet_type: WalletType::Safe,
        metadata: metadata.to_string(),
    })
}
