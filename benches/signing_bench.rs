//! Signing Benchmarks — Relay and Safe Hot Paths
//!
//! Benchmarks the per-transaction work done before every relay
//! submission: calldata packing, struct hashing, canonical signing and
//! CREATE2 derivation.
//!
//! Run with: cargo bench --bench signing_bench

use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use polymarket_redeemer::domain::calldata::{ctf_redeem, neg_risk_redeem, proxy_factory_batch};
use polymarket_redeemer::domain::network::{NetworkConfig, PROXY_INIT_CODE_HASH};
use polymarket_redeemer::domain::proxy::derive_proxy_address;
use polymarket_redeemer::domain::relay::{RelayCall, RelayHashInput};
use polymarket_redeemer::domain::safe::{aggregate, safe_tx_hash, SafeOperation};

const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn signer() -> PrivateKeySigner {
    TEST_KEY.parse().expect("valid test key")
}

fn batch_calls(net: &NetworkConfig, n: u8) -> Vec<RelayCall> {
    (0..n)
        .map(|i| {
            let condition = B256::repeat_byte(i);
            if i % 2 == 0 {
                RelayCall::proxied(net.ctf, ctf_redeem(net.collateral, condition))
            } else {
                RelayCall::proxied(
                    net.neg_risk_adapter,
                    neg_risk_redeem(condition, [U256::from(5_000_000u64), U256::from(3_000_000u64)]),
                )
            }
        })
        .collect()
}

/// Benchmark `proxy(calls)` encoding for a full batch of ten.
fn bench_proxy_batch(c: &mut Criterion) {
    let net = NetworkConfig::for_chain(137).expect("polygon");
    let calls = batch_calls(&net, 10);

    c.bench_function("proxy_factory_batch_10", |b| {
        b.iter(|| proxy_factory_batch(black_box(&calls)));
    });
}

/// Benchmark relay struct hash + canonical signature.
fn bench_relay_sign(c: &mut Criterion) {
    let net = NetworkConfig::for_chain(137).expect("polygon");
    let contracts = net.proxy_contracts().expect("proxy contracts");
    let signer = signer();
    let input = RelayHashInput {
        from: signer.address(),
        to: contracts.proxy_factory,
        data: proxy_factory_batch(&batch_calls(&net, 10)),
        relayer_fee: U256::ZERO,
        gas_price: U256::ZERO,
        gas_limit: U256::from(1_200_000u64),
        nonce: U256::from(42u64),
        relay_hub: contracts.relay_hub,
        relay: Address::repeat_byte(0x44),
    };

    c.bench_function("relay_struct_hash", |b| {
        b.iter(|| black_box(&input).struct_hash());
    });

    c.bench_function("relay_sign_request", |b| {
        b.iter(|| {
            black_box(&input)
                .sign(&signer, String::new(), "redeem")
                .expect("sign")
        });
    });
}

/// Benchmark multisend packing + SafeTx hash.
fn bench_safe_hash(c: &mut Criterion) {
    let net = NetworkConfig::for_chain(137).expect("polygon");
    let ops: Vec<SafeOperation> = batch_calls(&net, 10)
        .into_iter()
        .map(|call| SafeOperation::call(call.to, call.data))
        .collect();
    let safe = Address::repeat_byte(0x5A);

    c.bench_function("safe_multisend_hash_10", |b| {
        b.iter(|| {
            let op = aggregate(black_box(&ops), net.safe.safe_multisend).expect("aggregate");
            safe_tx_hash(137, safe, &op, U256::from(3u64))
        });
    });
}

/// Benchmark CREATE2 proxy derivation.
fn bench_proxy_derivation(c: &mut Criterion) {
    let owner = signer().address();
    let factory = Address::repeat_byte(0xAA);

    c.bench_function("derive_proxy_address", |b| {
        b.iter(|| derive_proxy_address(black_box(&owner), &factory, &PROXY_INIT_CODE_HASH));
    });
}

criterion_group!(
    benches,
    bench_proxy_batch,
    bench_relay_sign,
    bench_safe_hash,
    bench_proxy_derivation
);
criterion_main!(benches);
