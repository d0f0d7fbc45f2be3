//! Benchmarks for partition ingest and bitmap-query throughput.
//!
//! Run with: `cargo bench -p vast-index`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use uuid::Uuid;

use vast_expr::{Expr, Operand, RelOp};
use vast_index::Partition;
use vast_types::{Data, Event, Offset, RecordType, Type};

fn conn_type() -> Type {
    Type::record(RecordType::new(vec![
        ("bytes".to_string(), Type::count()),
        ("service".to_string(), Type::string()),
    ]))
    .named("conn")
}

fn conn_event(id: u64, bytes: u64, service: &str) -> Event {
    Event::new(
        id,
        conn_type(),
        0,
        Data::Record(vec![
            ("bytes".to_string(), Data::Count(bytes)),
            ("service".to_string(), Data::String(service.to_string())),
        ]),
    )
}

fn filled_partition(n: u64) -> Partition {
    let mut partition = Partition::new(Uuid::new_v4(), 0);
    let services = ["http", "dns", "ssh", "ftp"];
    for id in 0..n {
        let service = services[(id as usize) % services.len()];
        partition.ingest(&conn_event(id, id * 13 % 1500, service));
    }
    partition
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition_ingest");
    for size in [1_000u64, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_function(format!("{size}_events"), |b| {
            b.iter(|| black_box(filled_partition(size)));
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition_evaluate");
    for size in [1_000u64, 10_000, 100_000] {
        let partition = filled_partition(size);
        let expr = Expr::predicate(
            Operand::resolved(conn_type(), Offset::new(vec![1])),
            RelOp::Eq,
            Operand::data(Data::String("http".to_string())),
        );
        group.throughput(Throughput::Elements(size));
        group.bench_function(format!("{size}_events_eq_match"), |b| {
            b.iter(|| black_box(partition.evaluate(black_box(&expr))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ingest, bench_evaluate);
criterion_main!(benches);
