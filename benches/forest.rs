//! Benchmarks for forest training, grid search and SHAP.

use adspend::interpret::ShapExplainer;
use adspend::model_selection::{ForestGridSearch, ForestParamGrid, KFold};
use adspend::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn advertising(n: usize) -> (Matrix<f32>, Vector<f32>) {
    let mut data = Vec::with_capacity(n * 3);
    let mut target = Vec::with_capacity(n);
    for i in 0..n {
        let tv = ((i * 37) % 293) as f32;
        let radio = ((i * 13) % 50) as f32;
        let paper = ((i * 7) % 114) as f32;
        data.extend([tv, radio, paper]);
        target.push(0.045 * tv + 0.19 * radio + 2.9);
    }
    (Matrix::from_vec(n, 3, data).unwrap(), Vector::from_vec(target))
}

fn bench_forest_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_forest_fit");

    for size in [50, 200, 800].iter() {
        let (x, y) = advertising(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut forest = RandomForestRegressor::new(50, 42);
                forest.fit(black_box(&x), black_box(&y)).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_grid_search(c: &mut Criterion) {
    let (x, y) = advertising(200);
    let search = ForestGridSearch::new(ForestParamGrid::quick(), KFold::new(3), 42);

    let mut group = c.benchmark_group("grid_search");
    group.sample_size(10);
    group.bench_function("quick_grid_200_rows", |b| {
        b.iter(|| search.fit(black_box(&x), black_box(&y)).unwrap());
    });
    group.finish();
}

fn bench_shap(c: &mut Criterion) {
    let (x, y) = advertising(200);
    let mut forest = RandomForestRegressor::new(25, 42);
    forest.fit(&x, &y).unwrap();
    let explainer = ShapExplainer::new(&forest, &x, 50).unwrap();

    c.bench_function("shap_explain_row", |b| {
        b.iter(|| explainer.explain_row(black_box(x.row_slice(0))).unwrap());
    });
}

criterion_group!(benches, bench_forest_fit, bench_grid_search, bench_shap);
criterion_main!(benches);
