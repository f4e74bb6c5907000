//! The load-then-predict probe run against the artifact shipped next to the
//! executable.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::io::{format_g, load_model};
use crate::predict::predict;
use crate::types::{dense_to_nodes, KernelType, SvmModel};

/// File name of the artifact, looked up beside the running executable.
pub const MODEL_FILE_NAME: &str = "disease_predictor.model";

/// One-hot symptom row with only the first flag (fever) set.
pub const FEVER_ONLY: [f64; 4] = [1.0, 0.0, 0.0, 0.0];

/// What the probe loads and what it asks the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Artifact file name, resolved against the executable's directory.
    pub model_file_name: String,
    /// The single row sent to the predictor.
    pub test_input: Vec<f64>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            model_file_name: MODEL_FILE_NAME.to_string(),
            test_input: FEVER_ONLY.to_vec(),
        }
    }
}

impl ProbeConfig {
    /// Absolute path of the artifact for the running executable.
    pub fn model_path(&self) -> Result<PathBuf, ProbeError> {
        resolve_model_path(&self.model_file_name)
    }
}

/// Join `file_name` onto the directory holding the running executable.
pub fn resolve_model_path(file_name: &str) -> Result<PathBuf, ProbeError> {
    let exe = std::env::current_exe().map_err(|source| ProbeError::NotFound {
        path: PathBuf::from(file_name),
        source,
    })?;
    Ok(model_path_beside(&exe, file_name))
}

/// `file_name` in the same directory as `exe`.
pub fn model_path_beside(exe: &Path, file_name: &str) -> PathBuf {
    exe.parent()
        .unwrap_or_else(|| Path::new("."))
        .join(file_name)
}

/// A predicted class value, with its display name when the model has one.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub value: f64,
    pub name: Option<String>,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => f.write_str(&format_g(self.value)),
        }
    }
}

/// A deserialized model ready to answer predictions.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: SvmModel,
}

impl Predictor {
    /// Deserialize the artifact at `path`.
    pub fn load(path: &Path) -> Result<Self, ProbeError> {
        log::debug!("loading model from {}", path.display());
        let model =
            load_model(path).map_err(|e| ProbeError::from_load(path.to_path_buf(), e))?;
        Ok(Self::from_model(model))
    }

    /// Wrap an already loaded model.
    pub fn from_model(model: SvmModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &SvmModel {
        &self.model
    }

    /// Every label the model can return, in its internal order.
    pub fn known_labels(&self) -> Vec<Label> {
        self.model
            .label
            .iter()
            .map(|&l| self.to_label(l as f64))
            .collect()
    }

    /// Predict one label per row of `batch`.
    ///
    /// Rows are dense; position `i` is feature `i + 1`. A row shorter than
    /// the highest feature index the model uses is rejected, as is any
    /// non-finite value.
    pub fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<Label>, ProbeError> {
        self.check_model().map_err(predict_failure)?;
        if batch.is_empty() {
            return Err(predict_failure("empty batch".into()));
        }

        let width = self.feature_width();
        batch
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                if row.len() < width {
                    return Err(predict_failure(format!(
                        "row {} has {} features, but the model uses feature {}",
                        row_idx,
                        row.len(),
                        width
                    )));
                }
                if let Some(col) = row.iter().position(|v| !v.is_finite()) {
                    return Err(predict_failure(format!(
                        "row {} feature {} is not finite",
                        row_idx,
                        col + 1
                    )));
                }
                let value = predict(&self.model, &dense_to_nodes(row));
                log::debug!("row {} predicted {}", row_idx, format_g(value));
                Ok(self.to_label(value))
            })
            .collect()
    }

    fn check_model(&self) -> Result<(), String> {
        if self.model.param.kernel_type == KernelType::Precomputed {
            return Err("precomputed kernels need kernel rows, not feature vectors".into());
        }
        self.model.validate().map_err(|e| e.to_string())
    }

    /// Highest feature index referenced by any support vector.
    fn feature_width(&self) -> usize {
        self.model
            .sv
            .iter()
            .flatten()
            .map(|node| node.index.max(0) as usize)
            .max()
            .unwrap_or(0)
    }

    fn to_label(&self, value: f64) -> Label {
        Label {
            value,
            name: self.model.label_name(value).map(str::to_owned),
        }
    }
}

fn predict_failure(message: String) -> ProbeError {
    log::warn!("prediction failed: {}", message);
    ProbeError::Predict(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SvmNode, SvmParameter};

    fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("data")
    }

    fn fixture() -> Predictor {
        Predictor::load(&data_dir().join(MODEL_FILE_NAME)).unwrap()
    }

    #[test]
    fn path_is_sibling_of_executable() {
        let exe = Path::new("/opt/tools/model-probe");
        assert_eq!(
            model_path_beside(exe, MODEL_FILE_NAME),
            PathBuf::from("/opt/tools/disease_predictor.model")
        );
    }

    #[test]
    fn resolved_path_is_absolute() {
        let path = ProbeConfig::default().model_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with(MODEL_FILE_NAME));
    }

    #[test]
    fn default_config_probes_fever_only() {
        let config = ProbeConfig::default();
        assert_eq!(config.model_file_name, "disease_predictor.model");
        assert_eq!(config.test_input, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn fever_only_predicts_flu() {
        let labels = fixture().predict(&[FEVER_ONLY.to_vec()]).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].value, 1.0);
        assert_eq!(labels[0].to_string(), "Flu");
    }

    #[test]
    fn batch_returns_one_label_per_row() {
        let batch = vec![
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
        ];
        let names: Vec<String> = fixture()
            .predict(&batch)
            .unwrap()
            .iter()
            .map(Label::to_string)
            .collect();
        assert_eq!(names, vec!["Common_Cold", "Bronchitis"]);
    }

    #[test]
    fn unnamed_labels_print_numerically() {
        let label = Label {
            value: -1.0,
            name: None,
        };
        assert_eq!(label.to_string(), "-1");
        let label = Label {
            value: 2.5,
            name: None,
        };
        assert_eq!(label.to_string(), "2.5");
    }

    #[test]
    fn round_numeric_labels_keep_their_zeros() {
        for (value, text) in [(100000.0, "100000"), (120000.0, "120000"), (-10.0, "-10")] {
            let label = Label { value, name: None };
            assert_eq!(label.to_string(), text);
        }
    }

    #[test]
    fn known_labels_cover_every_class() {
        let names: Vec<String> = fixture()
            .known_labels()
            .iter()
            .map(Label::to_string)
            .collect();
        assert_eq!(names, vec!["Flu", "Common_Cold", "Migraine", "Bronchitis"]);
    }

    #[test]
    fn short_row_is_a_shape_error() {
        let err = fixture().predict(&[vec![1.0, 0.0, 0.0]]).unwrap_err();
        assert!(matches!(err, ProbeError::Predict(_)));
        assert!(err.to_string().contains("has 3 features"), "{}", err);
    }

    #[test]
    fn non_finite_feature_rejected() {
        let err = fixture()
            .predict(&[vec![1.0, f64::NAN, 0.0, 0.0]])
            .unwrap_err();
        assert!(err.to_string().contains("feature 2 is not finite"), "{}", err);
    }

    #[test]
    fn empty_batch_rejected() {
        let err = fixture().predict(&[]).unwrap_err();
        assert!(matches!(err, ProbeError::Predict(_)));
    }

    #[test]
    fn inconsistent_model_fails_at_prediction() {
        let mut model = fixture().model().clone();
        model.rho.truncate(2);
        let err = Predictor::from_model(model)
            .predict(&[FEVER_ONLY.to_vec()])
            .unwrap_err();
        assert!(err.to_string().starts_with("prediction failed: inconsistent model"));
    }

    #[test]
    fn precomputed_kernel_rejected() {
        let model = SvmModel {
            param: SvmParameter {
                kernel_type: KernelType::Precomputed,
                ..Default::default()
            },
            nr_class: 2,
            sv: vec![vec![SvmNode { index: 0, value: 1.0 }]],
            sv_coef: vec![vec![1.0]],
            rho: vec![0.0],
            label: vec![1, -1],
            label_names: Vec::new(),
            n_sv: vec![1, 0],
        };
        let err = Predictor::from_model(model)
            .predict(&[vec![1.0]])
            .unwrap_err();
        assert!(err.to_string().contains("precomputed"));
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let err = Predictor::load(&data_dir().join("absent.model")).unwrap_err();
        assert!(matches!(err, ProbeError::NotFound { .. }));
        assert!(err.to_string().contains("No such file or directory"));
    }

    #[test]
    fn corrupt_artifact_is_deserialize_error() {
        let err = Predictor::load(&data_dir().join("corrupt.model")).unwrap_err();
        assert!(matches!(err, ProbeError::Deserialize { .. }));
        assert!(err.to_string().contains("failed to deserialize"));
    }
}
