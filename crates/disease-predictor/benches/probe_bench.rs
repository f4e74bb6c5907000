use criterion::{black_box, criterion_group, criterion_main, Criterion};
use disease_predictor::{Predictor, FEVER_ONLY, MODEL_FILE_NAME};
use std::path::PathBuf;

fn model_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../data")).join(MODEL_FILE_NAME)
}

fn bench_load(c: &mut Criterion) {
    let path = model_path();
    c.bench_function("load_model", |b| {
        b.iter(|| Predictor::load(black_box(&path)).unwrap())
    });
}

fn bench_predict(c: &mut Criterion) {
    let predictor = Predictor::load(&model_path()).expect("failed to load fixture model");
    let batch = vec![FEVER_ONLY.to_vec()];

    c.bench_function("predict_fever_only", |b| {
        b.iter(|| predictor.predict(black_box(&batch)).unwrap())
    });
}

criterion_group!(benches, bench_load, bench_predict);
criterion_main!(benches);
