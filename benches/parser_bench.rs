use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dump_extract::extract::parse_reader;
use dump_extract::parser::{coerce, split_tuple_fields, split_tuples, DumpScanner};
use std::hint::black_box;

fn generate_dump(statements: usize, rows_per_statement: usize) -> Vec<u8> {
    let mut data = Vec::new();

    for s in 0..statements {
        data.extend_from_slice(
            b"INSERT INTO `tour_packages` (`id`, `name`, `description`, `price`) VALUES\n",
        );
        for r in 0..rows_per_statement {
            let id = s * rows_per_statement + r;
            let sep = if r + 1 == rows_per_statement { ';' } else { ',' };
            data.extend_from_slice(
                format!(
                    "({}, 'Package {}', '<p>It\\'s a day trip, lunch included;</p>', {}.50){}\n",
                    id, id, id, sep
                )
                .as_bytes(),
            );
        }
        data.extend_from_slice(b"INSERT INTO `sessions` (`id`, `data`) VALUES\n(1, 'skip me');\n");
    }

    data
}

fn bench_parse_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_throughput");

    for statements in [10, 100, 500] {
        let data = generate_dump(statements, 100);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse_reader", format!("{}_stmts", statements)),
            &data,
            |b, data| {
                b.iter(|| {
                    let extract = parse_reader(&data[..], ["tour_packages"]).unwrap();
                    black_box(extract.stats.total_rows())
                })
            },
        );
    }

    group.finish();
}

fn bench_scanner_only(c: &mut Criterion) {
    let data = generate_dump(100, 100);

    let mut group = c.benchmark_group("scanner");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("next_statement", |b| {
        b.iter(|| {
            let mut scanner = DumpScanner::new(&data[..], ["tour_packages"]);
            let mut count = 0;
            while let Ok(Some(_stmt)) = scanner.next_statement() {
                count += 1;
            }
            black_box(count)
        })
    });
    group.finish();
}

fn bench_tokenizers(c: &mut Criterion) {
    let payload: String = (0..1000)
        .map(|i| format!("({}, 'Name, {}', 'O\\'Brien', NULL, {}.99)", i, i, i))
        .collect::<Vec<_>>()
        .join(",\n");

    let mut group = c.benchmark_group("tokenizers");

    group.bench_function("split_tuples", |b| {
        b.iter(|| black_box(split_tuples(black_box(&payload)).tuples.len()))
    });

    let tuple = "(42, 'Gorilla Trek, 2 days', 'It\\'s \\\"great\\\"', NULL, 1500.00)";
    group.bench_function("split_and_coerce_tuple", |b| {
        b.iter(|| {
            let row: Vec<_> = split_tuple_fields(black_box(tuple))
                .into_iter()
                .map(coerce)
                .collect();
            black_box(row)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_throughput,
    bench_scanner_only,
    bench_tokenizers
);
criterion_main!(benches);
