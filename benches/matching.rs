//! Benchmarks for the matching engine.
//!
//! Every placement goes through a full settlement transaction against the
//! in-memory ledger, so the numbers include reservation, leg settlement and
//! journaling, not just the book walk.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark
//! cargo bench -- single_match
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use orderbook_engine::config::EngineConfig;
use orderbook_engine::engine::{MatchingEngine, PlaceOrder};
use orderbook_engine::events::NoopSink;
use orderbook_engine::settlement::{Asset, InMemoryLedger};
use orderbook_engine::types::{AccountId, Side};

type Engine = MatchingEngine<InMemoryLedger, NoopSink>;

const MAKER: AccountId = 1;
const TAKER: AccountId = 2;

/// Large enough that no benchmark ever runs out of funds
const BALANCE: u128 = u64::MAX as u128;

// ============================================================================
// HELPER FUNCTIONS - Deterministic book construction
// ============================================================================

fn new_engine(capacity: usize) -> Engine {
    let mut ledger = InMemoryLedger::new("TKA", "TKB");
    for account in [MAKER, TAKER] {
        ledger.deposit(account, Asset::Base, BALANCE).unwrap();
        ledger.deposit(account, Asset::Quote, BALANCE).unwrap();
    }
    let config = EngineConfig {
        order_capacity: capacity,
        ..EngineConfig::default()
    };
    MatchingEngine::new(config, ledger, NoopSink)
}

/// Rest `count` asks from `base_price` upward, one per price step.
fn populate_asks(engine: &mut Engine, count: usize, base_price: u64, price_step: u64, amount: u64) {
    for i in 0..count {
        let price = base_price + i as u64 * price_step;
        engine.place_sell_order(MAKER, price, amount).unwrap();
    }
}

/// Rest `count` bids from `base_price` downward, one per price step.
fn populate_bids(engine: &mut Engine, count: usize, base_price: u64, price_step: u64, amount: u64) {
    for i in 0..count {
        let price = base_price - i as u64 * price_step;
        engine.place_buy_order(MAKER, price, amount).unwrap();
    }
}

/// Deterministic mix of buys and sells around a common price.
fn generate_request_batch(count: usize, seed: u64) -> Vec<PlaceOrder> {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let price = rng.gen_range(9_500..=10_500);
            let amount = rng.gen_range(1..=100);
            let account = if rng.gen_bool(0.5) { MAKER } else { TAKER };
            PlaceOrder::new(side, account, price, amount)
        })
        .collect()
}

// ============================================================================
// BENCHMARK: Single Match Latency
// ============================================================================

fn bench_single_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_match");
    group.measurement_time(Duration::from_secs(10));

    // Take one unit from the best of 1,000 asks. Each ask holds plenty of
    // units so the book shape stays the same across iterations.
    group.bench_function("against_1k_orders", |b| {
        let mut engine = new_engine(2_000);
        populate_asks(&mut engine, 1_000, 10_000, 1, 1_000_000_000);

        b.iter(|| black_box(engine.place_buy_order(TAKER, 10_000, 1)));
    });

    // Sweep ten levels
    group.bench_function("multi_level_sweep", |b| {
        b.iter_batched(
            || {
                let mut engine = new_engine(200);
                populate_asks(&mut engine, 100, 10_000, 1, 10);
                engine
            },
            |mut engine| black_box(engine.place_buy_order(TAKER, 10_009, 100)),
            BatchSize::SmallInput,
        );
    });

    // Buy below the best ask rests on the book
    group.bench_function("no_match_rest_on_book", |b| {
        b.iter_batched(
            || {
                let mut engine = new_engine(2_000);
                populate_asks(&mut engine, 1_000, 10_000, 1, 10);
                engine
            },
            |mut engine| black_box(engine.place_buy_order(TAKER, 9_000, 10)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Order Operations
// ============================================================================

fn bench_order_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_operations");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("add_to_empty", |b| {
        b.iter_batched(
            || new_engine(16),
            |mut engine| black_box(engine.place_buy_order(MAKER, 10_000, 10)),
            BatchSize::SmallInput,
        );
    });

    // Worst case insert: the new bid lands at the tail of 500 bids
    group.bench_function("add_to_1k_book", |b| {
        b.iter_batched(
            || {
                let mut engine = new_engine(2_000);
                populate_asks(&mut engine, 500, 10_000, 1, 10);
                populate_bids(&mut engine, 500, 9_999, 1, 10);
                engine
            },
            |mut engine| black_box(engine.place_buy_order(MAKER, 9_000, 10)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("cancel_order", |b| {
        b.iter_batched(
            || {
                let mut engine = new_engine(2_000);
                populate_bids(&mut engine, 1_000, 10_000, 1, 10);
                engine
            },
            // Middle of the book (ids start at 2)
            |mut engine| black_box(engine.cancel_order(MAKER, 502)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Throughput
// ============================================================================

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(15));
    group.sample_size(20);

    for batch_size in [1_000, 10_000] {
        group.throughput(Throughput::Elements(batch_size as u64));

        group.bench_with_input(BenchmarkId::new("orders", batch_size), &batch_size, |b, &size| {
            let requests = generate_request_batch(size, 42);

            b.iter_batched(
                || (new_engine(size * 2), requests.clone()),
                |(mut engine, requests)| {
                    for request in requests {
                        let _ = black_box(engine.place(request));
                    }
                    engine.store().order_count()
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: State Root
// ============================================================================

fn bench_state_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_root");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("2k_resting_orders", |b| {
        let mut engine = new_engine(2_000);
        populate_asks(&mut engine, 1_000, 10_000, 1, 10);
        populate_bids(&mut engine, 1_000, 9_999, 1, 10);

        b.iter(|| black_box(engine.state_root()));
    });

    group.finish();
}

// ============================================================================
// CRITERION ENTRY POINT
// ============================================================================

criterion_group!(
    benches,
    bench_single_match,
    bench_order_operations,
    bench_throughput,
    bench_state_root
);

criterion_main!(benches);
