use crate::error::ModelError;

/// Type of SVM formulation stored in the model file.
///
/// Discriminants follow the LIBSVM integer constants:
/// `C_SVC=0, NU_SVC=1, ONE_CLASS=2, EPSILON_SVR=3, NU_SVR=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SvmType {
    /// C-Support Vector Classification.
    CSvc = 0,
    /// ν-Support Vector Classification.
    NuSvc = 1,
    /// One-class SVM (novelty detection).
    OneClass = 2,
    /// ε-Support Vector Regression.
    EpsilonSvr = 3,
    /// ν-Support Vector Regression.
    NuSvr = 4,
}

impl SvmType {
    /// Whether the model votes between classes (C-SVC, ν-SVC).
    pub fn is_classifier(self) -> bool {
        matches!(self, SvmType::CSvc | SvmType::NuSvc)
    }
}

/// Type of kernel function.
///
/// Discriminants follow the LIBSVM integer constants:
/// `LINEAR=0, POLY=1, RBF=2, SIGMOID=3, PRECOMPUTED=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum KernelType {
    /// `K(x,y) = x·y`
    Linear = 0,
    /// `K(x,y) = (γ·x·y + coef0)^degree`
    Polynomial = 1,
    /// `K(x,y) = exp(-γ·‖x-y‖²)`
    Rbf = 2,
    /// `K(x,y) = tanh(γ·x·y + coef0)`
    Sigmoid = 3,
    /// Kernel values supplied as a precomputed matrix.
    Precomputed = 4,
}

/// A single sparse feature: `index:value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvmNode {
    /// 1-based feature index.
    pub index: i32,
    /// Feature value.
    pub value: f64,
}

/// Convert a dense feature row into sorted sparse nodes.
///
/// Position `i` becomes index `i + 1`; zero entries are dropped, matching
/// how LIBSVM files encode the same row.
pub fn dense_to_nodes(row: &[f64]) -> Vec<SvmNode> {
    row.iter()
        .enumerate()
        .filter(|(_, &v)| v != 0.0)
        .map(|(i, &value)| SvmNode {
            index: i as i32 + 1,
            value,
        })
        .collect()
}

/// Kernel parameters recorded in the model header.
#[derive(Debug, Clone, PartialEq)]
pub struct SvmParameter {
    pub svm_type: SvmType,
    pub kernel_type: KernelType,
    /// Degree for polynomial kernel.
    pub degree: i32,
    /// γ for RBF, polynomial, and sigmoid kernels.
    pub gamma: f64,
    /// Independent term in polynomial and sigmoid kernels.
    pub coef0: f64,
}

impl Default for SvmParameter {
    fn default() -> Self {
        Self {
            svm_type: SvmType::CSvc,
            kernel_type: KernelType::Rbf,
            degree: 3,
            gamma: 0.0,
            coef0: 0.0,
        }
    }
}

/// A trained SVM model as read from a model file.
#[derive(Debug, Clone, PartialEq)]
pub struct SvmModel {
    /// Kernel and formulation parameters.
    pub param: SvmParameter,
    /// Number of classes (2 for regression and one-class).
    pub nr_class: usize,
    /// Support vectors (sparse feature vectors).
    pub sv: Vec<Vec<SvmNode>>,
    /// Support vector coefficients, a `(k-1) × num_sv` matrix.
    pub sv_coef: Vec<Vec<f64>>,
    /// Bias terms, one per class pair: `k*(k-1)/2` values.
    pub rho: Vec<f64>,
    /// Class labels in internal one-vs-one order.
    pub label: Vec<i32>,
    /// Display names for `label`, same order. Empty when the file has none.
    pub label_names: Vec<String>,
    /// Number of support vectors per class.
    pub n_sv: Vec<usize>,
}

impl SvmModel {
    /// Return the SVM type used by the model.
    pub fn svm_type(&self) -> SvmType {
        self.param.svm_type
    }

    /// Return number of classes.
    pub fn class_count(&self) -> usize {
        self.nr_class
    }

    /// Return class labels in internal one-vs-one order.
    pub fn labels(&self) -> &[i32] {
        &self.label
    }

    /// Return total number of support vectors.
    pub fn support_vector_count(&self) -> usize {
        self.sv.len()
    }

    /// Number of decision values produced per prediction.
    pub fn decision_value_count(&self) -> usize {
        if self.param.svm_type.is_classifier() {
            self.nr_class * self.nr_class.saturating_sub(1) / 2
        } else {
            1
        }
    }

    /// Name registered for a numeric label, if the file carried `label_names`.
    pub fn label_name(&self, value: f64) -> Option<&str> {
        self.label
            .iter()
            .position(|&l| l as f64 == value)
            .and_then(|pos| self.label_names.get(pos))
            .map(String::as_str)
    }

    /// Check that the arrays read from the file agree with each other.
    ///
    /// The parser accepts any header order and count, so a file can load
    /// cleanly and still describe a model that cannot be evaluated.
    pub fn validate(&self) -> Result<(), ModelError> {
        let inconsistent = |msg: String| Err(ModelError::Inconsistent(msg));
        let num_sv = self.sv.len();

        if num_sv == 0 {
            return inconsistent("model has no support vectors".into());
        }

        let coef_rows = if self.param.svm_type.is_classifier() {
            self.nr_class.saturating_sub(1).max(1)
        } else {
            1
        };
        if self.sv_coef.len() != coef_rows {
            return inconsistent(format!(
                "expected {} sv_coef rows, found {}",
                coef_rows,
                self.sv_coef.len()
            ));
        }
        if let Some(row) = self.sv_coef.iter().find(|row| row.len() != num_sv) {
            return inconsistent(format!(
                "sv_coef row has {} entries for {} support vectors",
                row.len(),
                num_sv
            ));
        }

        let pairs = self.decision_value_count();
        if self.rho.len() != pairs {
            return inconsistent(format!(
                "expected {} rho values, found {}",
                pairs,
                self.rho.len()
            ));
        }

        if self.param.svm_type.is_classifier() {
            if self.nr_class < 2 {
                return inconsistent(format!("nr_class {} < 2", self.nr_class));
            }
            if self.label.len() != self.nr_class {
                return inconsistent(format!(
                    "expected {} labels, found {}",
                    self.nr_class,
                    self.label.len()
                ));
            }
            if self.n_sv.len() != self.nr_class {
                return inconsistent(format!(
                    "expected {} nr_sv entries, found {}",
                    self.nr_class,
                    self.n_sv.len()
                ));
            }
            let total: usize = self.n_sv.iter().sum();
            if total != num_sv {
                return inconsistent(format!(
                    "nr_sv sums to {} but model has {} support vectors",
                    total, num_sv
                ));
            }
        }

        if !self.label_names.is_empty() && self.label_names.len() != self.label.len() {
            return inconsistent(format!(
                "{} label names for {} labels",
                self.label_names.len(),
                self.label.len()
            ));
        }

        Ok(())
    }
}
