//! Hash and signature primitives.
//!
//! Fixed-width byte packing, keccak-256, EIP-55 checksum encoding,
//! personal-message hashing, and low-s ECDSA signing over secp256k1.
//! The relay builder and the proxy derivation sit on top of these.

use alloy::hex;
use alloy::primitives::{uint, Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use super::error::{RedeemError, RedeemResult};

/// Order of the secp256k1 group.
pub const SECP256K1_N: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// Half the group order; canonical signatures keep `s` at or below it.
pub const SECP256K1_HALF_N: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// A value accepted by [`pack_fixed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackValue {
    /// Unsigned integer, packed big-endian.
    Uint(U256),
    /// `0x`-prefixed (or bare) hex string, decoded to bytes.
    Hex(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UTF-8 text. A string made only of decimal digits packs as an integer.
    Text(String),
}

impl From<U256> for PackValue {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<u64> for PackValue {
    fn from(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }
}

impl PackValue {
    /// Natural (unpadded) byte representation.
    pub fn natural_bytes(&self) -> RedeemResult<Vec<u8>> {
        match self {
            Self::Uint(n) => Ok(minimal_be_bytes(*n)),
            Self::Hex(s) => hex::decode(s.trim_start_matches("0x"))
                .map_err(|e| RedeemError::Encoding(format!("invalid hex {s:?}: {e}"))),
            Self::Bytes(b) => Ok(b.clone()),
            Self::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                let n = U256::from_str_radix(s, 10)
                    .map_err(|e| RedeemError::Encoding(format!("integer {s} overflows uint256: {e}")))?;
                Ok(minimal_be_bytes(n))
            }
            Self::Text(s) => Ok(s.as_bytes().to_vec()),
        }
    }
}

/// Big-endian bytes without leading zeros; zero encodes as a single byte.
fn minimal_be_bytes(n: U256) -> Vec<u8> {
    let full = n.to_be_bytes::<32>();
    let len = n.bit_len().div_ceil(8).max(1);
    full[32 - len..].to_vec()
}

/// Encode `value` into exactly `size` bytes, left-padded with zeros.
///
/// Fails with [`RedeemError::Encoding`] if the natural representation is
/// longer than `size`.
pub fn pack_fixed(value: &PackValue, size: usize) -> RedeemResult<Vec<u8>> {
    let raw = value.natural_bytes()?;
    if raw.len() > size {
        return Err(RedeemError::Encoding(format!(
            "size overflow: given {}, max {size}",
            raw.len()
        )));
    }
    let mut out = vec![0u8; size - raw.len()];
    out.extend_from_slice(&raw);
    Ok(out)
}

/// Pack a uint256 into a 32-byte word.
pub fn pack32(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

/// Keccak-256 digest.
pub fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    alloy::primitives::keccak256(data)
}

/// EIP-55 mixed-case encoding of a 20-byte address.
pub fn to_checksum_address(address: &Address) -> String {
    let lower = hex::encode(address.as_slice());
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash.0[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Parse a hex address, ignoring checksum case.
pub fn parse_address(value: &str) -> RedeemResult<Address> {
    value
        .parse::<Address>()
        .map_err(|e| RedeemError::Validation(format!("invalid address {value:?}: {e}")))
}

/// Message accepted by [`hash_personal_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonalMessage {
    /// UTF-8 text, hashed as its bytes.
    Text(String),
    /// Explicit byte array.
    Raw(Vec<u8>),
}

impl PersonalMessage {
    /// Raw message given as a `0x`-hex string.
    pub fn raw_hex(value: &str) -> RedeemResult<Self> {
        let bytes = hex::decode(value.trim_start_matches("0x"))
            .map_err(|e| RedeemError::Encoding(format!("invalid raw message hex: {e}")))?;
        Ok(Self::Raw(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Raw(b) => b,
        }
    }
}

/// `keccak256("\x19Ethereum Signed Message:\n" + len + message)`.
pub fn hash_personal_message(message: &PersonalMessage) -> B256 {
    let body = message.as_bytes();
    let mut prefixed = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 4 + body.len());
    prefixed.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    prefixed.extend_from_slice(body.len().to_string().as_bytes());
    prefixed.extend_from_slice(body);
    keccak256(prefixed)
}

/// A low-s secp256k1 signature with its recovery parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalSignature {
    /// `r` scalar.
    pub r: U256,
    /// `s` scalar, always `<= N/2`.
    pub s: U256,
    /// Recovery parity, 0 or 1.
    pub y_parity: u8,
}

impl CanonicalSignature {
    /// Legacy `v` value (27 or 28).
    pub const fn v(&self) -> u8 {
        27 + self.y_parity
    }

    /// 65-byte `r ‖ s ‖ v` encoding.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&pack32(self.r));
        out[32..64].copy_from_slice(&pack32(self.s));
        out[64] = if self.y_parity == 0 { 0x1b } else { 0x1c };
        out
    }

    /// `0x`-prefixed hex of [`Self::to_bytes`].
    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(self.to_bytes())
    }
}

/// Force `s` into the lower half of the curve order.
///
/// When `s > N/2` it is replaced by `N - s` and the parity flips, which
/// yields the other valid signature for the same key and message.
pub fn canonicalize(r: U256, s: U256, y_parity: u8) -> CanonicalSignature {
    if s > SECP256K1_HALF_N {
        CanonicalSignature {
            r,
            s: SECP256K1_N - s,
            y_parity: (y_parity & 1) ^ 1,
        }
    } else {
        CanonicalSignature {
            r,
            s,
            y_parity: y_parity & 1,
        }
    }
}

/// Sign a 32-byte hash and return the canonical (low-s) signature.
pub fn sign_canonical(hash: &B256, signer: &PrivateKeySigner) -> RedeemResult<CanonicalSignature> {
    let sig = signer
        .sign_hash_sync(hash)
        .map_err(|e| RedeemError::Validation(format!("signing failed: {e}")))?;
    Ok(canonicalize(sig.r(), sig.s(), u8::from(sig.v())))
}

/// Serialize `r ‖ s ‖ v` into 65 bytes.
///
/// An explicit `y_parity` of 0 or 1 wins. Otherwise `v` must be 27, 28,
/// or an EIP-155 value (>= 35); even `v` means parity 1.
pub fn serialize_signature(
    r: U256,
    s: U256,
    v: Option<u64>,
    y_parity: Option<u8>,
) -> RedeemResult<[u8; 65]> {
    let parity = match (y_parity, v) {
        (Some(p @ (0 | 1)), _) => p,
        (_, Some(v)) if v == 27 || v == 28 || v >= 35 => u8::from(v % 2 == 0),
        _ => {
            return Err(RedeemError::Validation(
                "invalid `v` or `yParity` value".to_string(),
            ))
        }
    };

    let mut out = [0u8; 65];
    out[..32].copy_from_slice(&pack32(r));
    out[32..64].copy_from_slice(&pack32(s));
    out[64] = if parity == 0 { 0x1b } else { 0x1c };
    Ok(out)
}
