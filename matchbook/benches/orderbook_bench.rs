use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use matchbook::{Order, OrderBook, OrderId, OrderKind, Side};
use rust_decimal::Decimal;

fn create_order(side: Side, price: i64, qty: i64, seq: u64) -> Order {
    Order::new(
        OrderId::new(),
        "bench",
        "SYM1",
        side,
        OrderKind::Limit,
        Some(Decimal::from(price)),
        Decimal::from(qty),
        seq,
    )
}

fn bench_order_submission(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_submission");

    for &num_orders in [100, 1000, 10000].iter() {
        group.bench_with_input(
            BenchmarkId::new("non_crossing_orders", num_orders),
            &num_orders,
            |b, &num_orders| {
                b.iter(|| {
                    let mut book = OrderBook::new("SYM1");
                    for i in 0..num_orders {
                        let mut order = create_order(
                            if i % 2 == 0 { Side::Buy } else { Side::Sell },
                            if i % 2 == 0 { 10000 - i as i64 } else { 10100 + i as i64 },
                            100,
                            i as u64,
                        );
                        black_box(book.process_order(&mut order));
                    }
                })
            },
        );
    }

    group.finish();
}

fn bench_order_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_matching");

    for &depth in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("crossing_orders", depth),
            &depth,
            |b, &depth| {
                b.iter_batched(
                    || {
                        let mut book = OrderBook::new("SYM1");
                        // Pre-populate both sides around a 10000 midpoint.
                        for i in 0..depth {
                            let mut ask =
                                create_order(Side::Sell, 10000 + i as i64, 100, i as u64);
                            book.process_order(&mut ask);

                            let mut bid = create_order(
                                Side::Buy,
                                9999 - i as i64,
                                100,
                                (i + depth) as u64,
                            );
                            book.process_order(&mut bid);
                        }
                        book
                    },
                    |mut book| {
                        // One large bid that walks every ask level.
                        let mut crossing = create_order(
                            Side::Buy,
                            10000 + depth as i64,
                            depth as i64 * 50,
                            (depth * 2) as u64,
                        );
                        black_box(book.process_order(&mut crossing))
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_market_data_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("market_data");

    let mut book = OrderBook::new("SYM1");
    for i in 0..1000u64 {
        let mut ask = create_order(Side::Sell, 10000 + i as i64, 100, i);
        book.process_order(&mut ask);
        let mut bid = create_order(Side::Buy, 9999 - i as i64, 100, i + 1000);
        book.process_order(&mut bid);
    }

    group.bench_function("best_bid", |b| b.iter(|| black_box(book.best_bid())));

    group.bench_function("best_ask", |b| b.iter(|| black_box(book.best_ask())));

    group.bench_function("snapshot_depth_10", |b| {
        b.iter(|| black_box(book.snapshot(10)))
    });

    group.bench_function("recent_trades_200", |b| {
        b.iter(|| black_box(book.recent_trades(200)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_order_submission,
    bench_order_matching,
    bench_market_data_access
);

criterion_main!(benches);
