//! Smoke test for the disease predictor artifact.
//!
//! Looks for `disease_predictor.model` next to this executable, loads it and
//! prints the prediction for a fever-only symptom row. Any failure is printed
//! as `Error: ...`; the exit status is 0 either way.

use disease_predictor::{Label, Predictor, ProbeConfig, ProbeError};

fn probe(config: &ProbeConfig) -> Result<Label, ProbeError> {
    let model_path = config.model_path()?;

    println!("Looking for model at: {}", model_path.display());
    println!(
        "File exists: {}",
        if model_path.exists() { "True" } else { "False" }
    );

    let predictor = Predictor::load(&model_path)?;
    println!("Model loaded successfully!");

    let labels = predictor.predict(&[config.test_input.clone()])?;
    let first = labels
        .into_iter()
        .next()
        .ok_or_else(|| ProbeError::Predict("model returned no labels".into()))?;
    println!("Test prediction result: {}", first);
    Ok(first)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let config = ProbeConfig::default();
    match probe(&config) {
        Ok(label) => log::debug!("probe finished with label {:?}", label),
        Err(e) => println!("Error: {}", e),
    }
}
