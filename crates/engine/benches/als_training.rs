//! Benchmarks for ALS training and recommendation
//!
//! Run with: cargo bench --package engine
//!
//! Uses a synthetic block-structured rating matrix so no dataset is needed.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{ActorIdx, IndexedRating, ItemIdx};
use engine::{Als, AlsConfig, Recommender};

const ACTORS: u32 = 2_000;
const ITEMS: u32 = 300;

/// Each actor rates every seventh item; taste depends on actor and item parity
fn synthetic_ratings() -> Vec<IndexedRating> {
    let mut ratings = Vec::new();
    for actor in 0..ACTORS {
        for item in (actor % 7..ITEMS).step_by(7) {
            let likes = actor % 2 == item % 2;
            ratings.push(IndexedRating {
                actor: ActorIdx(actor),
                item: ItemIdx(item),
                rating: if likes { 5.0 } else { 1.0 },
            });
        }
    }
    ratings
}

fn bench_als_fit(c: &mut Criterion) {
    let ratings = synthetic_ratings();
    let als = Als::new(AlsConfig::default().with_iterations(5).with_seed(42));

    c.bench_function("als_fit_rank10_5iter", |b| {
        b.iter(|| {
            let model = als
                .fit(black_box(&ratings), ACTORS as usize, ITEMS as usize)
                .unwrap();
            black_box(model)
        })
    });
}

fn bench_recommend_all_items(c: &mut Criterion) {
    let ratings = synthetic_ratings();
    let model = Als::new(AlsConfig::default().with_iterations(5).with_seed(42))
        .fit(&ratings, ACTORS as usize, ITEMS as usize)
        .expect("Failed to train benchmark model");
    let recommender = Recommender::new(&model);

    c.bench_function("recommend_all_items_top10", |b| {
        b.iter(|| {
            let lists = recommender.recommend_all_items(black_box(10));
            black_box(lists)
        })
    });
}

criterion_group!(benches, bench_als_fit, bench_recommend_all_items);
criterion_main!(benches);
