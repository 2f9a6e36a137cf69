//! Criterion benchmarks for bucketing and report assembly

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dealerdash::services::{Aggregator, BucketPlan, ReportAssembler, ReportInputs};
use dealerdash::types::{Dealer, DebtRecord, Granularity, Order, OrderStatus, Role};
use std::hint::black_box;
use std::path::PathBuf;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

/// Deterministic orders spread over the last ~2 years
fn synthetic_orders(n: usize) -> Vec<Order> {
    let statuses = [
        OrderStatus::Completed,
        OrderStatus::Pending,
        OrderStatus::Partial,
        OrderStatus::Cancelled,
    ];
    (0..n)
        .map(|i| Order {
            id: i as i64,
            customer_id: if i % 10 == 0 { None } else { Some(i as i64 % 500) },
            dealer_id: Some(i as i64 % 20),
            staff_id: Some(i as i64 % 60),
            total_price: 10_000.0 + (i % 97) as f64 * 150.0,
            status: statuses[i % statuses.len()].clone(),
            created_at: as_of() - Duration::minutes((i as i64 * 37) % (730 * 24 * 60)),
        })
        .collect()
}

fn synthetic_inputs(n: usize) -> ReportInputs {
    let dealers = (0..20)
        .map(|id| Dealer {
            id,
            name: format!("Dealer {}", id),
            address: None,
            phone: None,
        })
        .collect();
    let debts = (0..n / 10)
        .map(|i| DebtRecord {
            id: i as i64,
            customer_id: Some(i as i64),
            dealer_id: None,
            due_amount: 5_000.0,
            paid_amount: (i % 5) as f64 * 1_000.0,
            remaining_amount: None,
            due_date: Some(as_of() - Duration::days(i as i64 % 90)),
            status: None,
        })
        .collect();

    ReportInputs {
        orders: Some(synthetic_orders(n)),
        debts: Some(debts),
        dealers: Some(dealers),
        staff: None,
        requests: None,
    }
}

fn bench_bucket_revenue(c: &mut Criterion) {
    let plan = BucketPlan::default();
    let mut group = c.benchmark_group("aggregator");

    for n in [1_000usize, 100_000] {
        let orders = synthetic_orders(n);
        group.throughput(Throughput::Elements(n as u64));

        for granularity in [Granularity::Week, Granularity::Month] {
            let buckets = plan.buckets(granularity, granularity.default_count(), as_of());
            group.bench_with_input(
                BenchmarkId::new(format!("revenue_by_bucket/{}", granularity), n),
                &orders,
                |b, orders| {
                    b.iter(|| Aggregator::revenue_by_bucket(black_box(orders), &buckets));
                },
            );
        }
    }

    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let assembler = ReportAssembler::default();
    let inputs = synthetic_inputs(50_000);

    let mut group = c.benchmark_group("report");
    group.throughput(Throughput::Elements(50_000));

    for role in [Role::Admin, Role::DealerManager] {
        group.bench_function(format!("assemble/{}", role), |b| {
            b.iter(|| assembler.assemble(role, Granularity::Month, black_box(&inputs), as_of()));
        });
    }

    group.finish();
}

fn bench_fixture_envelope(c: &mut Criterion) {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("orders.json");
    let Ok(raw) = std::fs::read(&fixture) else {
        eprintln!("Skipping envelope benchmark: {} not found", fixture.display());
        return;
    };

    let mut group = c.benchmark_group("loader");
    group.throughput(Throughput::Bytes(raw.len() as u64));

    group.bench_function("unwrap_orders_envelope", |b| {
        b.iter(|| {
            let mut bytes = raw.clone();
            let _: Result<Vec<Order>, _> =
                dealerdash::services::data_loader::unwrap_envelope(black_box(&mut bytes));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_bucket_revenue,
    bench_assemble,
    bench_fixture_envelope
);
criterion_main!(benches);
