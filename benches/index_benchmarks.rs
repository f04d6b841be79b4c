use std::collections::BTreeMap;

use catalog_index::{AvlMap, PrefixIndex, RangeSumArray, RatingIndex};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

const N: usize = 10_000;

// ─── Helper functions to generate input sequences ───────────────────────────

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn random_words(n: usize) -> Vec<String> {
    random_keys(n)
        .into_iter()
        .map(|k| {
            let mut k = k as u64;
            let mut word = String::new();
            for _ in 0..(3 + k % 6) {
                word.push(char::from(b'a' + (k % 26) as u8));
                k /= 26;
            }
            word
        })
        .collect()
}

// ─── Ordered map ────────────────────────────────────────────────────────────

fn bench_map_insert_ordered(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert_ordered");

    group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
        b.iter(|| {
            let mut map = AvlMap::new();
            for i in 0..N as i64 {
                map.insert(i, i);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for i in 0..N as i64 {
                map.insert(i, i);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_insert_random");

    group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
        b.iter(|| {
            let mut map = AvlMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let avl_map: AvlMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let mut group = c.benchmark_group("map_remove_random");

    group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
        b.iter_batched(
            || avl_map.clone(),
            |mut map| {
                for k in &keys {
                    map.remove(k);
                }
                map
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

// ─── Rating index ───────────────────────────────────────────────────────────

fn bench_rating_updates(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("rating_updates");

    group.bench_function(BenchmarkId::new("RatingIndex", N), |b| {
        b.iter(|| {
            let mut index = RatingIndex::new();
            for &k in &keys {
                let name = format!("movie-{}", k % 500);
                index.add_rating(&name, (k % 11) as f64).unwrap();
            }
            index
        });
    });

    group.finish();
}

// ─── Range sums ─────────────────────────────────────────────────────────────

fn bench_range_query(c: &mut Criterion) {
    let values = random_keys(N);
    let array = RangeSumArray::new(&values).expect("`bench_range_query()` - keys overflow!");
    let mut group = c.benchmark_group("range_query");

    group.bench_function(BenchmarkId::new("RangeSumArray", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for i in 0..N / 2 {
                sum = sum.wrapping_add(array.query(i, N - 1 - i).unwrap_or_default());
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("slice_sum", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for i in 0..N / 2 {
                sum = sum.wrapping_add(values[i..N - i].iter().sum::<i64>());
            }
            sum
        });
    });

    group.finish();
}

fn bench_range_update(c: &mut Criterion) {
    let values = random_keys(N);
    let mut group = c.benchmark_group("range_update");

    group.bench_function(BenchmarkId::new("RangeSumArray", N), |b| {
        let mut array = RangeSumArray::new(&values).expect("`bench_range_update()` - keys overflow!");
        b.iter(|| {
            for (i, &v) in values.iter().enumerate() {
                array.update(i, v / 2).unwrap();
            }
        });
    });

    group.finish();
}

// ─── Prefix index ───────────────────────────────────────────────────────────

fn bench_prefix_suggestions(c: &mut Criterion) {
    let words = random_words(N);
    let mut index = PrefixIndex::new();
    index.bulk_insert(&words).unwrap();
    let mut group = c.benchmark_group("prefix_suggestions");

    group.bench_function(BenchmarkId::new("PrefixIndex", N), |b| {
        b.iter(|| ["a", "ke", "zz", "mo"].iter().map(|p| index.suggestions(p).len()).sum::<usize>());
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(map_benches, bench_map_insert_ordered, bench_map_insert_random, bench_map_remove_random,);

criterion_group!(rating_benches, bench_rating_updates,);

criterion_group!(range_benches, bench_range_query, bench_range_update,);

criterion_group!(prefix_benches, bench_prefix_suggestions,);

criterion_main!(map_benches, rating_benches, range_benches, prefix_benches,);
