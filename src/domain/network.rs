//! Per-network contract addresses.
//!
//! Keyed by chain id. Polygon mainnet carries the full set; Amoy has no
//! proxy factory or relay hub, so proxy-relayed calls are unavailable
//! there.

use alloy::primitives::{address, b256, Address, B256};

use super::error::{RedeemError, RedeemResult};

/// Polygon PoS mainnet.
pub const POLYGON_CHAIN_ID: u64 = 137;

/// Polygon Amoy testnet.
pub const AMOY_CHAIN_ID: u64 = 80002;

/// Init code hash of the proxy wallet deployed by the proxy factory.
pub const PROXY_INIT_CODE_HASH: B256 =
    b256!("d21df8dc65880a8606f09fe0ce3df9b8869287ab0b058be05aa9e8af6330a00b");

/// Init code hash of the Safe proxy deployed by the Safe factory.
pub const SAFE_INIT_CODE_HASH: B256 =
    b256!("2bce2127ff07fb632d16c8347c4ebf501f4841168bed00d9e6ef715ddb6fcecf");

/// Parent collection id for top-level positions.
pub const ZERO_COLLECTION_ID: B256 = B256::ZERO;

/// Proxy factory and relay hub used for relayed proxy calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyContracts {
    /// Factory that executes `proxy(calls)` for the owner's wallet.
    pub proxy_factory: Address,
    /// GSN relay hub.
    pub relay_hub: Address,
}

/// Safe factory and multisend contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeContracts {
    /// Safe proxy factory.
    pub safe_factory: Address,
    /// MultiSend contract used for batched Safe execution.
    pub safe_multisend: Address,
}

/// Contract set for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// EVM chain id.
    pub chain_id: u64,
    /// Human-readable name for logs.
    pub name: &'static str,
    /// Conditional Token Framework contract.
    pub ctf: Address,
    /// Negative-risk adapter.
    pub neg_risk_adapter: Address,
    /// Collateral token (USDC.e, 6 decimals).
    pub collateral: Address,
    /// Proxy-wallet contracts, when the network supports them.
    pub proxy: Option<ProxyContracts>,
    /// Safe contracts.
    pub safe: SafeContracts,
}

impl NetworkConfig {
    /// Resolve the contract set for `chain_id`.
    pub fn for_chain(chain_id: u64) -> RedeemResult<Self> {
        match chain_id {
            POLYGON_CHAIN_ID => Ok(Self {
                chain_id,
                name: "polygon",
                ctf: address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045"),
                neg_risk_adapter: address!("d91E80cF2E7be2e162c6513ceD06f1dD0dA35296"),
                collateral: address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
                proxy: Some(ProxyContracts {
                    proxy_factory: address!("aB45c5A4B0c941a2F231C04C3f49182e1A254052"),
                    relay_hub: address!("D216153c06E857cD7f72665E0aF1d7D82172F494"),
                }),
                safe: SafeContracts {
                    safe_factory: address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b"),
                    safe_multisend: address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761"),
                },
            }),
            AMOY_CHAIN_ID => Ok(Self {
                chain_id,
                name: "amoy",
                ctf: address!("69308FB512518e39F9b16112fA8d994F4e2Bf8bB"),
                neg_risk_adapter: address!("d91E80cF2E7be2e162c6513ceD06f1dD0dA35296"),
                collateral: address!("9c4e1703476e875070ee25b56a58b008cfb8fa78"),
                proxy: None,
                safe: SafeContracts {
                    safe_factory: address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b"),
                    safe_multisend: address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761"),
                },
            }),
            other => Err(RedeemError::Configuration(format!(
                "unsupported chain id {other} (expected {POLYGON_CHAIN_ID} or {AMOY_CHAIN_ID})"
            ))),
        }
    }

    /// Proxy contracts, or a configuration error on networks without them.
    pub fn proxy_contracts(&self) -> RedeemResult<ProxyContracts> {
        self.proxy.ok_or_else(|| {
            RedeemError::Configuration(format!(
                "proxy factory is not deployed on {} ({})",
                self.name, self.chain_id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_chains_resolve() {
        assert!(NetworkConfig::for_chain(137).unwrap().proxy.is_some());
        assert!(NetworkConfig::for_chain(80002).unwrap().proxy.is_none());
    }

    #[test]
    fn test_unknown_chain_is_configuration_error() {
        let err = NetworkConfig::for_chain(1).unwrap_err();
        assert!(matches!(err, RedeemError::Configuration(_)));
    }

    #[test]
    fn test_amoy_has_no_proxy_factory() {
        let amoy = NetworkConfig::for_chain(AMOY_CHAIN_ID).unwrap();
        assert!(matches!(
            amoy.proxy_contracts(),
            Err(RedeemError::Configuration(_))
        ));
    }
}
