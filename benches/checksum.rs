use bank_rails::account::{self, Alphabet};
use bank_rails::{Amount, Bucket, routing};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Known-valid routing numbers, cycled through by the validation bench.
const ROUTING_NUMBERS: [&str; 4] = ["021000021", "011000015", "026009593", "111000025"];

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for length in [9usize, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, &length| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| black_box(account::generate_with(&mut rng, length, Alphabet::Numeric)));
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let accounts: Vec<String> = (0..1_000)
        .map(|_| {
            account::generate_with(&mut rng, 16, Alphabet::Numeric)
                .unwrap()
                .to_string()
        })
        .collect();

    c.bench_function("luhn_1k", |b| {
        b.iter(|| {
            accounts
                .iter()
                .filter(|a| account::is_valid(black_box(a)))
                .count()
        });
    });

    c.bench_function("aba_1k", |b| {
        b.iter(|| {
            ROUTING_NUMBERS
                .iter()
                .cycle()
                .take(1_000)
                .filter(|r| routing::validate(black_box(r)))
                .count()
        });
    });
}

fn bench_apportion(c: &mut Criterion) {
    let total = Amount::from_float(123_456.789);

    c.bench_function("apportion_buckets", |b| {
        b.iter(|| {
            Bucket::ALL
                .iter()
                .map(|bucket| black_box(total).apportion(bucket.share_bps()))
                .sum::<Amount>()
        });
    });
}

criterion_group!(benches, bench_generate, bench_validate, bench_apportion);
criterion_main!(benches);
