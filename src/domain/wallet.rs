//! Wallet types and the signature-type codes that select them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RedeemError;

/// Execution strategy family of the account.
///
/// Derived once from the trading client's signature-type code and fixed
/// for the lifetime of a service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WalletType {
    /// Externally-owned account signing its own transactions.
    Eoa,
    /// Proxy wallet driven through the relay hub.
    Proxy,
    /// Safe multisig wallet.
    Safe,
}

impl WalletType {
    /// Relay-service tag for this wallet type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eoa => "EOA",
            Self::Proxy => "PROXY",
            Self::Safe => "SAFE",
        }
    }

    /// Whether execution goes through the relay service.
    pub const fn requires_relayer(self) -> bool {
        match self {
            Self::Eoa => false,
            Self::Proxy | Self::Safe => true,
        }
    }
}

impl TryFrom<u8> for WalletType {
    type Error = RedeemError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Eoa),
            1 => Ok(Self::Proxy),
            2 => Ok(Self::Safe),
            other => Err(RedeemError::Configuration(format!(
                "unknown signature type code {other}"
            ))),
        }
    }
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
