use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use labledger_lending::{IncomingRecord, Inventory, Ledger, OutgoingRecord, reconcile};

fn build_logs(rows: usize) -> (Vec<OutgoingRecord>, Vec<IncomingRecord>) {
    let products = ["Microscope", "Beaker", "Test Tube", "Pipette", "Slide"];
    let now = Utc::now();
    let mut outgoing = Vec::with_capacity(rows);
    let mut incoming = Vec::with_capacity(rows / 2);

    for i in 0..rows {
        let roll = format!("22BCS{:03}", i % 200);
        let product = products[i % products.len()];
        outgoing.push(OutgoingRecord::new(&roll, "Student", product, 2, now).unwrap());
        if i % 2 == 0 {
            incoming.push(IncomingRecord::new(&roll, product, 1, now).unwrap());
        }
    }

    (outgoing, incoming)
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for rows in [100usize, 1_000, 10_000] {
        let (outgoing, incoming) = build_logs(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| reconcile(black_box(&outgoing), black_box(&incoming)))
        });
    }
    group.finish();
}

/// Issue/return churn against a single ledger, as the forms would drive it.
fn bench_issue_return(c: &mut Criterion) {
    c.bench_function("ledger_issue_return_cycle", |b| {
        b.iter(|| {
            let mut ledger = Ledger::new(Inventory::default_lab_stock(), Vec::new());
            let now = Utc::now();
            for i in 0..100 {
                let roll = format!("22BCS{i:03}");
                ledger.issue(&roll, "Student", "Slide", now).unwrap();
            }
            for i in 0..100 {
                let roll = format!("22BCS{i:03}");
                ledger.return_item(&roll, "Slide", now).unwrap();
            }
            black_box(ledger.pending_all().len())
        })
    });
}

criterion_group!(benches, bench_reconcile, bench_issue_return);
criterion_main!(benches);
