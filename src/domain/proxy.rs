//! CREATE2 wallet address derivation.
//!
//! Proxy wallets are deployed by the proxy factory with
//! `salt = keccak256(owner)`; Safe wallets by the Safe factory with
//! `salt = keccak256(abi.encode(owner))`. Both are pure functions of
//! (owner, factory, init code hash), so switching networks changes every
//! derived address.

use alloy::primitives::{Address, B256};

use super::signature::{keccak256, to_checksum_address};

/// `keccak256(0xff ‖ deployer ‖ salt ‖ init_code_hash)[12..]`.
pub fn create2_address(deployer: &Address, salt: &B256, init_code_hash: &B256) -> Address {
    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(0xff);
    preimage.extend_from_slice(deployer.as_slice());
    preimage.extend_from_slice(salt.as_slice());
    preimage.extend_from_slice(init_code_hash.as_slice());
    Address::from_slice(&keccak256(&preimage)[12..])
}

/// Checksummed proxy wallet address for `owner`.
pub fn derive_proxy_address(owner: &Address, factory: &Address, init_code_hash: &B256) -> String {
    let salt = keccak256(owner.as_slice());
    to_checksum_address(&create2_address(factory, &salt, init_code_hash))
}

/// Safe wallet address for `owner`.
pub fn safe_address(owner: &Address, factory: &Address, init_code_hash: &B256) -> Address {
    let mut padded = [0u8; 32];
    padded[12..].copy_from_slice(owner.as_slice());
    let salt = keccak256(padded);
    create2_address(factory, &salt, init_code_hash)
}

/// Checksummed Safe wallet address for `owner`.
pub fn derive_safe_address(owner: &Address, factory: &Address, init_code_hash: &B256) -> String {
    to_checksum_address(&safe_address(owner, factory, init_code_hash))
}
