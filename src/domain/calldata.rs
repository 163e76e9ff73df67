//! ABI bindings and calldata encoders for the CTF contracts.
//!
//! Only the functions this crate calls are declared. Encoders return
//! raw calldata; the wallet strategy decides how it is delivered.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use super::network::ZERO_COLLECTION_ID;
use super::relay::RelayCall;

sol! {
    /// Gnosis Conditional Token Framework.
    interface IConditionalTokens {
        function redeemPositions(address collateralToken, bytes32 parentCollectionId, bytes32 conditionId, uint256[] indexSets) external;
        function splitPosition(address collateralToken, bytes32 parentCollectionId, bytes32 conditionId, uint256[] partition, uint256 amount) external;
        function mergePositions(address collateralToken, bytes32 parentCollectionId, bytes32 conditionId, uint256[] partition, uint256 amount) external;
        function payoutDenominator(bytes32 conditionId) external view returns (uint256);
        function payoutNumerators(bytes32 conditionId, uint256 index) external view returns (uint256);
        function getOutcomeSlotCount(bytes32 conditionId) external view returns (uint256);
        function getCollectionId(bytes32 parentCollectionId, bytes32 conditionId, uint256 indexSet) external view returns (bytes32);
        function getPositionId(address collateralToken, bytes32 collectionId) external pure returns (uint256);
        function balanceOf(address owner, uint256 id) external view returns (uint256);
    }

    /// Negative-risk adapter: redeems and splits combined markets.
    interface INegRiskAdapter {
        function redeemPositions(bytes32 conditionId, uint256[] amounts) external;
        function splitPosition(bytes32 conditionId, uint256 amount) external;
        function mergePositions(bytes32 conditionId, uint256 amount) external;
    }

    /// One call executed by the proxy wallet factory.
    struct ProxyCall {
        uint8 typeCode;
        address to;
        uint256 value;
        bytes data;
    }

    /// Proxy wallet factory: runs calls through the sender's proxy wallet.
    interface IProxyWalletFactory {
        function proxy(ProxyCall[] calls) external payable returns (bytes[] returnValues);
    }
}

/// Index sets of both outcomes of a binary condition.
pub fn binary_partition() -> Vec<U256> {
    vec![U256::from(1u8), U256::from(2u8)]
}

/// `CTF.redeemPositions(collateral, 0x0, conditionId, [1, 2])`.
pub fn ctf_redeem(collateral: Address, condition_id: B256) -> Bytes {
    IConditionalTokens::redeemPositionsCall {
        collateralToken: collateral,
        parentCollectionId: ZERO_COLLECTION_ID,
        conditionId: condition_id,
        indexSets: binary_partition(),
    }
    .abi_encode()
    .into()
}

/// `NegRiskAdapter.redeemPositions(conditionId, amounts)`.
pub fn neg_risk_redeem(condition_id: B256, amounts: [U256; 2]) -> Bytes {
    INegRiskAdapter::redeemPositionsCall {
        conditionId: condition_id,
        amounts: amounts.to_vec(),
    }
    .abi_encode()
    .into()
}

/// `CTF.splitPosition(collateral, 0x0, conditionId, [1, 2], amount)`.
pub fn ctf_split(collateral: Address, condition_id: B256, amount: U256) -> Bytes {
    IConditionalTokens::splitPositionCall {
        collateralToken: collateral,
        parentCollectionId: ZERO_COLLECTION_ID,
        conditionId: condition_id,
        partition: binary_partition(),
        amount,
    }
    .abi_encode()
    .into()
}

/// `CTF.mergePositions(collateral, 0x0, conditionId, [1, 2], amount)`.
pub fn ctf_merge(collateral: Address, condition_id: B256, amount: U256) -> Bytes {
    IConditionalTokens::mergePositionsCall {
        collateralToken: collateral,
        parentCollectionId: ZERO_COLLECTION_ID,
        conditionId: condition_id,
        partition: binary_partition(),
        amount,
    }
    .abi_encode()
    .into()
}

/// `NegRiskAdapter.splitPosition(conditionId, amount)`.
pub fn neg_risk_split(condition_id: B256, amount: U256) -> Bytes {
    INegRiskAdapter::splitPositionCall {
        conditionId: condition_id,
        amount,
    }
    .abi_encode()
    .into()
}

/// `NegRiskAdapter.mergePositions(conditionId, amount)`.
pub fn neg_risk_merge(condition_id: B256, amount: U256) -> Bytes {
    INegRiskAdapter::mergePositionsCall {
        conditionId: condition_id,
        amount,
    }
    .abi_encode()
    .into()
}

/// `ProxyWalletFactory.proxy(calls)` wrapping every relay call.
pub fn proxy_factory_batch(calls: &[RelayCall]) -> Bytes {
    let calls = calls
        .iter()
        .map(|c| ProxyCall {
            typeCode: c.type_code,
            to: c.to,
            value: c.value,
            data: c.data.clone(),
        })
        .collect();
    IProxyWalletFactory::proxyCall { calls }.abi_encode().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::keccak256;

    fn selector(signature: &str) -> [u8; 4] {
        let hash = keccak256(signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    #[test]
    fn test_ctf_redeem_selector_and_index_sets() {
        let data = ctf_redeem(Address::ZERO, B256::repeat_byte(0xab));
        assert_eq!(
            &data[..4],
            &selector("redeemPositions(address,bytes32,bytes32,uint256[])")
        );
        let decoded = IConditionalTokens::redeemPositionsCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.indexSets, binary_partition());
        assert_eq!(decoded.conditionId, B256::repeat_byte(0xab));
    }

    #[test]
    fn test_neg_risk_redeem_selector() {
        let data = neg_risk_redeem(B256::ZERO, [U256::from(5u64), U256::from(3u64)]);
        assert_eq!(&data[..4], &selector("redeemPositions(bytes32,uint256[])"));
    }

    #[test]
    fn test_proxy_batch_selector() {
        let calls = vec![RelayCall::proxied(Address::ZERO, Bytes::from(vec![1, 2, 3]))];
        let data = proxy_factory_batch(&calls);
        assert_eq!(
            &data[..4],
            &selector("proxy((uint8,address,uint256,bytes)[])")
        );
        let decoded = IProxyWalletFactory::proxyCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.calls.len(), 1);
        assert_eq!(decoded.calls[0].typeCode, 1);
    }

    #[test]
    fn test_split_and_merge_selectors() {
        let amount = U256::from(10_000_000u64);
        let split = ctf_split(Address::ZERO, B256::ZERO, amount);
        let merge = ctf_merge(Address::ZERO, B256::ZERO, amount);
        assert_eq!(
            &split[..4],
            &selector("splitPosition(address,bytes32,bytes32,uint256[],uint256)")
        );
        assert_eq!(
            &merge[..4],
            &selector("mergePositions(address,bytes32,bytes32,uint256[],uint256)")
        );
        assert_eq!(&neg_risk_split(B256::ZERO, amount)[..4], &selector("splitPosition(bytes32,uint256)"));
        assert_eq!(&neg_risk_merge(B256::ZERO, amount)[..4], &selector("mergePositions(bytes32,uint256)"));
    }
}
