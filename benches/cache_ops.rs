//! Benchmark for core cache operations against the in-memory stores

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use tiered_file_cache::cache::{
    CacheConfig, CacheTier, MemoryBlobStore, MemoryIndexStore, StoreOptions, TieredFileCache,
};

fn memory_cache(config: CacheConfig) -> TieredFileCache {
    TieredFileCache::new(
        config,
        Arc::new(MemoryBlobStore::new()),
        Arc::new(MemoryIndexStore::new()),
    )
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiered_cache");
    group.throughput(Throughput::Bytes(4096));

    let rt = tokio::runtime::Runtime::new().unwrap();
    let cache = memory_cache(CacheConfig::default());
    let payload = vec![7u8; 4096];

    group.bench_function("store_4k", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            let path = format!("docs/file-{}", counter % 1000);
            rt.block_on(cache.store_file(black_box(&path), payload.clone(), StoreOptions::new()))
        });
    });

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiered_cache");
    group.throughput(Throughput::Elements(1));

    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut config = CacheConfig::default();
    // Keep entries in place so every read is a plain hit
    config.promotion_threshold = u64::MAX;
    let cache = memory_cache(config);

    rt.block_on(async {
        for i in 0..1000 {
            let path = format!("docs/file-{:04}", i);
            cache
                .store_file(&path, vec![1u8; 1024], StoreOptions::new())
                .await;
        }
    });

    group.bench_function("get_hit", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            let path = format!("docs/file-{:04}", counter % 1000);
            rt.block_on(cache.get_file(black_box(&path)))
        });
    });

    group.bench_function("get_miss", |b| {
        b.iter(|| rt.block_on(cache.get_file(black_box("docs/absent"))));
    });

    group.finish();
}

fn bench_eviction_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiered_cache");
    group.throughput(Throughput::Elements(1));

    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut config = CacheConfig::default();
    config.hot.max_size = 64 * 1024;
    config.warm.max_size = 128 * 1024;
    config.cold.max_size = 256 * 1024;
    config.cold.max_age = std::time::Duration::ZERO;
    let cache = memory_cache(config);

    // Every store past the first 16 forces a demotion cascade
    group.bench_function("store_with_cascade", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            let path = format!("churn/{}", counter);
            rt.block_on(cache.store_file(
                black_box(&path),
                vec![0u8; 4096],
                StoreOptions::new().with_tier(CacheTier::Hot),
            ))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_store, bench_get, bench_eviction_churn);
criterion_main!(benches);
