//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify that the signing, derivation and batching
//! primitives hold their invariants across random inputs.

use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use proptest::prelude::*;
use rust_decimal::Decimal;

use polymarket_redeemer::domain::network::PROXY_INIT_CODE_HASH;
use polymarket_redeemer::domain::position::{chunk, decimal_to_base_units, to_base_units};
use polymarket_redeemer::domain::proxy::{create2_address, derive_proxy_address};
use polymarket_redeemer::domain::signature::{
    canonicalize, keccak256, parse_address, sign_canonical, to_checksum_address, SECP256K1_HALF_N, SECP256K1_N,
};

// ── Address Checksums ───────────────────────────────────────

proptest! {
    /// A checksummed address parses back to the same bytes.
    #[test]
    fn checksum_round_trips(bytes in any::<[u8; 20]>()) {
        let address = Address::from(bytes);
        let checksummed = to_checksum_address(&address);
        prop_assert_eq!(checksummed.len(), 42);
        prop_assert!(checksummed.starts_with("0x"));
        prop_assert_eq!(parse_address(&checksummed).unwrap(), address);
        prop_assert_eq!(checksummed.to_lowercase(), format!("{address:#x}"));
    }
}

// ── Canonical Signatures ────────────────────────────────────

proptest! {
    /// Canonical `s` never exceeds n/2 and canonicalizing twice is a no-op.
    #[test]
    fn canonical_s_is_low(r in any::<[u8; 32]>(), s in any::<[u8; 32]>(), parity in 0u8..2) {
        let s = U256::from_be_bytes(s) % SECP256K1_N;
        prop_assume!(!s.is_zero());
        let r = U256::from_be_bytes(r);

        let sig = canonicalize(r, s, parity);
        prop_assert!(sig.s <= SECP256K1_HALF_N);
        prop_assert_eq!(sig.r, r);

        let again = canonicalize(sig.r, sig.s, sig.y_parity);
        prop_assert_eq!(again, sig);
    }

    /// Real signatures come out low-s and serialize to 65 bytes.
    #[test]
    fn signed_hashes_are_canonical(hash in any::<[u8; 32]>()) {
        let signer: PrivateKeySigner =
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".parse().unwrap();
        let sig = sign_canonical(&B256::from(hash), &signer).unwrap();
        prop_assert!(sig.s <= SECP256K1_HALF_N);

        let bytes = sig.to_bytes();
        prop_assert_eq!(bytes.len(), 65);
        prop_assert!(bytes[64] == 0x1b || bytes[64] == 0x1c);
    }

    /// Flipping `s` also flips the recovery parity.
    #[test]
    fn high_s_flips_parity(s in any::<[u8; 32]>(), parity in 0u8..2) {
        let s = U256::from_be_bytes(s) % SECP256K1_N;
        prop_assume!(s > SECP256K1_HALF_N);

        let sig = canonicalize(U256::from(1u8), s, parity);
        prop_assert_eq!(sig.s, SECP256K1_N - s);
        prop_assert_eq!(sig.y_parity, 1 - parity);
    }
}

// ── Batching ────────────────────────────────────────────────

proptest! {
    /// Batches partition the input in order; only the last may be short.
    #[test]
    fn chunk_partitions_in_order(
        items in prop::collection::vec(any::<u32>(), 0..60),
        size in 1usize..15,
    ) {
        let batches = chunk(&items, size).unwrap();

        prop_assert_eq!(batches.len(), items.len().div_ceil(size));
        prop_assert_eq!(batches.concat(), items);
        if let Some((last, full)) = batches.split_last() {
            prop_assert!(full.iter().all(|b| b.len() == size));
            prop_assert!(!last.is_empty() && last.len() <= size);
        }
    }
}

// ── CREATE2 Derivation ──────────────────────────────────────

proptest! {
    /// Proxy derivation is deterministic and matches raw CREATE2.
    #[test]
    fn proxy_derivation_is_deterministic(
        owner in any::<[u8; 20]>(),
        factory in any::<[u8; 20]>(),
    ) {
        let owner = Address::from(owner);
        let factory = Address::from(factory);

        let first = derive_proxy_address(&owner, &factory, &PROXY_INIT_CODE_HASH);
        let second = derive_proxy_address(&owner, &factory, &PROXY_INIT_CODE_HASH);
        prop_assert_eq!(&first, &second);

        let salt: B256 = keccak256(owner.as_slice());
        let raw = create2_address(&factory, &salt, &PROXY_INIT_CODE_HASH);
        prop_assert_eq!(first, to_checksum_address(&raw));
    }

    /// Different owners get different proxies under one factory.
    #[test]
    fn distinct_owners_distinct_proxies(a in any::<[u8; 20]>(), b in any::<[u8; 20]>()) {
        prop_assume!(a != b);
        let factory = Address::repeat_byte(0x11);
        prop_assert_ne!(
            derive_proxy_address(&Address::from(a), &factory, &PROXY_INIT_CODE_HASH),
            derive_proxy_address(&Address::from(b), &factory, &PROXY_INIT_CODE_HASH)
        );
    }
}

// ── Amount Scaling ──────────────────────────────────────────

proptest! {
    /// Whole-token sizes scale exactly to 6-decimal base units.
    #[test]
    fn whole_sizes_scale_exactly(tokens in 0u64..1_000_000_000) {
        #[allow(clippy::cast_precision_loss)]
        let size = tokens as f64;
        prop_assert_eq!(to_base_units(size), U256::from(tokens) * U256::from(1_000_000u64));
    }

    /// A decimal with 6 fractional digits maps to its mantissa.
    #[test]
    fn decimal_amounts_scale_to_mantissa(units in 1i64..1_000_000_000_000) {
        let amount = Decimal::new(units, 6);
        prop_assert_eq!(decimal_to_base_units(amount).unwrap(), U256::from(units as u64));
    }
}
