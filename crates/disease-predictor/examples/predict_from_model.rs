//! Load a model file and predict one dense row given on the command line.
//!
//! Run:
//!   cargo run -p disease-predictor --example predict_from_model -- data/disease_predictor.model 0 1 0 0

use disease_predictor::{Predictor, FEVER_ONLY};
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let model_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("data/disease_predictor.model");
    let row: Vec<f64> = if args.len() > 2 {
        args[2..]
            .iter()
            .map(|s| s.parse().expect("features must be numbers"))
            .collect()
    } else {
        FEVER_ONLY.to_vec()
    };

    let predictor = Predictor::load(Path::new(model_path)).expect("failed to load model");
    let labels = predictor.predict(&[row.clone()]).expect("prediction failed");

    println!("{:?} -> {}", row, labels[0]);
}
