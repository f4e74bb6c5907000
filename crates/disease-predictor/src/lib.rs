//! # disease-predictor
//!
//! Loads the trained disease classifier artifact and answers predictions on
//! one-hot symptom rows.
//!
//! The artifact is a LIBSVM text model, optionally carrying a `label_names`
//! header so predictions print as disease names. [`Predictor`] wraps loading
//! and evaluation behind a single error type, [`ProbeError`], that tells a
//! missing artifact, an unreadable one, and a failed prediction apart.
//!
//! ```no_run
//! use disease_predictor::{Predictor, ProbeConfig};
//!
//! let config = ProbeConfig::default();
//! let predictor = Predictor::load(&config.model_path()?)?;
//! let labels = predictor.predict(&[config.test_input.clone()])?;
//! println!("{}", labels[0]);
//! # Ok::<(), disease_predictor::ProbeError>(())
//! ```

pub mod error;
pub mod io;
pub mod kernel;
pub mod predict;
pub mod probe;
pub mod types;

pub use error::{ModelError, ProbeError};
pub use probe::{Label, Predictor, ProbeConfig, FEVER_ONLY, MODEL_FILE_NAME};
pub use types::*;
