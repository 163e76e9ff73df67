//! Relay meta-transaction types and the GSN struct hash.
//!
//! A proxy-wallet call is authorized by signing
//! `keccak256("rlx:" ‖ from ‖ to ‖ data ‖ fee ‖ gasPrice ‖ gasLimit ‖ nonce ‖ relayHub ‖ relay)`
//! as a personal message. Field order and the `rlx:` prefix are part of
//! the relay hub's wire contract.

use alloy::hex;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use serde::{Deserialize, Serialize};

use super::error::{RedeemError, RedeemResult};
use super::signature::{
    hash_personal_message, keccak256, pack32, sign_canonical, to_checksum_address,
    PersonalMessage,
};
use super::wallet::WalletType;

/// Domain prefix of the relay struct hash.
pub const RELAY_HASH_PREFIX: &[u8] = b"rlx:";

/// Proxy call type code for a plain `CALL`.
pub const CALL_TYPE_CODE: u8 = 1;

/// One contract invocation awaiting relay or multisig wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCall {
    /// Target contract.
    pub to: Address,
    /// ABI-encoded calldata.
    pub data: Bytes,
    /// Native value (always zero for CTF calls).
    pub value: U256,
    /// Proxy call type code.
    pub type_code: u8,
}

impl RelayCall {
    /// Zero-value `CALL` through the proxy wallet.
    pub fn proxied(to: Address, data: Bytes) -> Self {
        Self {
            to,
            data,
            value: U256::ZERO,
            type_code: CALL_TYPE_CODE,
        }
    }
}

/// Inputs of the relay struct hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayHashInput {
    /// Signer (owner) address.
    pub from: Address,
    /// Proxy factory that executes the call.
    pub to: Address,
    /// Encoded `proxy(calls)` calldata.
    pub data: Bytes,
    /// Relayer fee.
    pub relayer_fee: U256,
    /// Gas price.
    pub gas_price: U256,
    /// Gas limit from estimation.
    pub gas_limit: U256,
    /// Relay nonce.
    pub nonce: U256,
    /// Relay hub address.
    pub relay_hub: Address,
    /// Relayer address assigned by the relay service.
    pub relay: Address,
}

impl RelayHashInput {
    /// Raw preimage of the struct hash.
    pub fn preimage(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + 20 + 20 + self.data.len() + 4 * 32 + 40);
        out.extend_from_slice(RELAY_HASH_PREFIX);
        out.extend_from_slice(self.from.as_slice());
        out.extend_from_slice(self.to.as_slice());
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&pack32(self.relayer_fee));
        out.extend_from_slice(&pack32(self.gas_price));
        out.extend_from_slice(&pack32(self.gas_limit));
        out.extend_from_slice(&pack32(self.nonce));
        out.extend_from_slice(self.relay_hub.as_slice());
        out.extend_from_slice(self.relay.as_slice());
        out
    }

    /// `keccak256` of [`Self::preimage`].
    pub fn struct_hash(&self) -> B256 {
        keccak256(self.preimage())
    }

    /// Sign the struct hash as a personal message and package the request.
    pub fn sign(
        &self,
        signer: &PrivateKeySigner,
        proxy_wallet: String,
        metadata: &str,
    ) -> RedeemResult<RelayTransactionRequest> {
        let digest =
            hash_personal_message(&PersonalMessage::Raw(self.struct_hash().to_vec()));
        let signature = sign_canonical(&digest, signer)?;

        Ok(RelayTransactionRequest {
            from: to_checksum_address(&self.from),
            to: to_checksum_address(&self.to),
            proxy_wallet,
            data: hex::encode_prefixed(&self.data),
            nonce: self.nonce.to_string(),
            signature: signature.to_hex(),
            signature_params: SignatureParams {
                gas_price: self.gas_price.to_string(),
                gas_limit: self.gas_limit.to_string(),
                relayer_fee: self.relayer_fee.to_string(),
                relay_hub: to_checksum_address(&self.relay_hub),
                relay: to_checksum_address(&self.relay),
            },
            wallet_type: WalletType::Proxy,
            metadata: metadata.to_string(),
        })
    }
}

/// Gas and fee parameters echoed to the relay service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureParams {
    /// Gas price (decimal string).
    pub gas_price: String,
    /// Gas limit (decimal string).
    pub gas_limit: String,
    /// Relayer fee (decimal string).
    pub relayer_fee: String,
    /// Relay hub address.
    pub relay_hub: String,
    /// Relayer address.
    pub relay: String,
}

/// Signed payload submitted to `POST /submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayTransactionRequest {
    /// Signer address.
    pub from: String,
    /// Proxy factory address.
    pub to: String,
    /// Derived proxy wallet (display/audit only).
    pub proxy_wallet: String,
    /// `0x`-hex calldata.
    pub data: String,
    /// Relay nonce (decimal string).
    pub nonce: String,
    /// 65-byte `0x`-hex signature.
    pub signature: String,
    /// Gas and fee parameters that were signed.
    pub signature_params: SignatureParams,
    /// Wallet type tag.
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    /// Action label ("redeem", "split", "merge").
    pub metadata: String,
}

/// A nonce the relay reports as either a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NonceValue {
    /// Decimal string.
    Text(String),
    /// JSON number.
    Number(u64),
}

impl NonceValue {
    /// Blank string nonce.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    /// Parse into a `U256`.
    pub fn to_u256(&self) -> RedeemResult<U256> {
        match self {
            Self::Text(s) => s
                .trim()
                .parse::<U256>()
                .map_err(|e| RedeemError::Validation(format!("invalid relay nonce {s:?}: {e}"))),
            Self::Number(n) => Ok(U256::from(*n)),
        }
    }
}

impl From<&str> for NonceValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<u64> for NonceValue {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

/// Relay-assigned relayer address and nonce from `GET /relay-payload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RelayPayload {
    /// Relayer address.
    pub address: Option<String>,
    /// Nonce, string or number.
    pub nonce: Option<NonceValue>,
}

/// Relay transaction lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayState {
    /// Accepted, not yet broadcast.
    #[serde(rename = "STATE_NEW")]
    New,
    /// Broadcast.
    #[serde(rename = "STATE_EXECUTED")]
    Executed,
    /// Included in a block.
    #[serde(rename = "STATE_MINED")]
    Mined,
    /// Rejected by the relay.
    #[serde(rename = "STATE_INVALID")]
    Invalid,
    /// Final.
    #[serde(rename = "STATE_CONFIRMED")]
    Confirmed,
    /// Reverted or dropped.
    #[serde(rename = "STATE_FAILED")]
    Failed,
}

impl RelayState {
    /// States that count as a successful landing.
    pub const SUCCESS: [Self; 2] = [Self::Mined, Self::Confirmed];

    /// Terminal failure state.
    pub const FAILURE: Self = Self::Failed;
}

/// Response of `POST /submit`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    /// Relay transaction id used for polling.
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    /// Initial state, when reported.
    #[serde(default)]
    pub state: Option<RelayState>,
}

/// A relay transaction as reported by the relay service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayTransaction {
    /// Relay transaction id.
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    /// Current state.
    pub state: RelayState,
    /// On-chain hash once broadcast.
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn sample_input() -> RelayHashInput {
        RelayHashInput {
            from: Address::repeat_byte(0x11),
            to: Address::repeat_byte(0x22),
            data: Bytes::from(vec![0xde, 0xad]),
            relayer_fee: U256::ZERO,
            gas_price: U256::ZERO,
            gas_limit: U256::from(150_000u64),
            nonce: U256::from(7u64),
            relay_hub: Address::repeat_byte(0x33),
            relay: Address::repeat_byte(0x44),
        }
    }

    #[test]
    fn test_preimage_layout() {
        let pre = sample_input().preimage();
        assert_eq!(&pre[..4], b"rlx:");
        assert_eq!(&pre[4..24], Address::repeat_byte(0x11).as_slice());
        assert_eq!(&pre[24..44], Address::repeat_byte(0x22).as_slice());
        assert_eq!(&pre[44..46], &[0xde, 0xad]);
        // fee, gas price, gas limit, nonce: four 32-byte words
        assert_eq!(pre[46 + 3 * 32 + 31], 7);
        assert_eq!(&pre[46 + 4 * 32..46 + 4 * 32 + 20], Address::repeat_byte(0x33).as_slice());
        assert_eq!(pre.len(), 46 + 4 * 32 + 40);
    }

    #[test]
    fn test_struct_hash_depends_on_nonce() {
        let a = sample_input();
        let mut b = sample_input();
        b.nonce = U256::from(8u64);
        assert_ne!(a.struct_hash(), b.struct_hash());
    }

    #[test]
    fn test_signed_request_shape() {
        let signer: PrivateKeySigner = TEST_KEY.parse().unwrap();
        let req = sample_input().sign(&signer, "0xproxy".into(), "redeem").unwrap();

        assert_eq!(req.nonce, "7");
        assert_eq!(req.signature_params.gas_limit, "150000");
        assert_eq!(req.signature.len(), 2 + 130);
        assert!(req.signature.ends_with("1b") || req.signature.ends_with("1c"));

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "PROXY");
        assert_eq!(json["proxyWallet"], "0xproxy");
        assert_eq!(json["signatureParams"]["relayerFee"], "0");
    }

    #[test]
    fn test_relay_payload_nonce_string_or_number() {
        let text: RelayPayload =
            serde_json::from_str(r#"{"address":"0x44","nonce":"31"}"#).unwrap();
        let num: RelayPayload = serde_json::from_str(r#"{"address":"0x44","nonce":31}"#).unwrap();
        assert_eq!(text.nonce.unwrap().to_u256().unwrap(), U256::from(31u64));
        assert_eq!(num.nonce.unwrap().to_u256().unwrap(), U256::from(31u64));

        let blank: RelayPayload = serde_json::from_str(r#"{"nonce":" "}"#).unwrap();
        assert!(blank.nonce.unwrap().is_empty());
    }

    #[test]
    fn test_relay_state_wire_names() {
        let state: RelayState = serde_json::from_str("\"STATE_CONFIRMED\"").unwrap();
        assert_eq!(state, RelayState::Confirmed);
        assert!(RelayState::SUCCESS.contains(&RelayState::Mined));
    }
}
