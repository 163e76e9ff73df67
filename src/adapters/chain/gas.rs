//! Gas Estimation - Raw `eth_estimateGas` over JSON-RPC
//!
//! Relayed proxy calls need the gas limit the signer commits to in the
//! relay struct hash. The estimate is a plain JSON-RPC POST; a response
//! without `result` is an error.

use std::time::Duration;

use alloy::hex;
use alloy::primitives::{Address, Bytes};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::signature::to_checksum_address;

/// Call object of `eth_estimateGas`.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateCall {
    pub from: String,
    pub to: String,
    pub data: String,
}

/// JSON-RPC request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<P> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: P,
    pub id: u64,
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Gas units from the hex `result`.
    pub fn gas(&self) -> Result<u64> {
        let Some(result) = &self.result else {
            anyhow::bail!(
                "Estimate gas error: {}",
                self.error
                    .as_ref()
                    .map_or_else(|| "missing result".to_string(), ToString::to_string)
            );
        };
        parse_hex_quantity(result)
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_hex_quantity(value: &str) -> Result<u64> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(digits, 16).with_context(|| format!("invalid hex quantity {value:?}"))
}

/// `eth_estimateGas` client.
pub struct GasEstimator {
    http: Client,
    rpc_url: String,
}

impl GasEstimator {
    /// Create an estimator against `rpc_url`.
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            rpc_url: rpc_url.into(),
        })
    }

    /// Estimate gas for `from` calling `to` with `data`.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub async fn estimate(&self, from: Address, to: Address, data: &Bytes) -> Result<u64> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "eth_estimateGas",
            params: [EstimateCall {
                from: to_checksum_address(&from),
                to: to_checksum_address(&to),
                data: hex::encode_prefixed(data),
            }],
            id: 1,
        };

        let response: RpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .context("eth_estimateGas request failed")?
            .json()
            .await
            .context("Failed to parse eth_estimateGas response")?;

        let gas = response.gas()?;
        debug!(gas, "Gas estimated");
        Ok(gas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(parse_hex_quantity("0x5208").unwrap(), 21_000);
        assert_eq!(parse_hex_quantity("1e").unwrap(), 30);
        assert!(parse_hex_quantity("0xzz").is_err());
    }

    #[test]
    fn test_missing_result_is_error() {
        let resp: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#,
        )
        .unwrap();
        let err = resp.gas().unwrap_err().to_string();
        assert!(err.contains("execution reverted"));
    }

    #[test]
    fn test_result_parsed() {
        let resp: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x249f0"}"#).unwrap();
        assert_eq!(resp.gas().unwrap(), 150_000);
    }

    #[test]
    fn test_request_shape() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "eth_estimateGas",
            params: [EstimateCall {
                from: "0xa".into(),
                to: "0xb".into(),
                data: "0x".into(),
            }],
            id: 1,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["params"][0]["to"], "0xb");
        assert_eq!(json["method"], "eth_estimateGas");
    }
}
