//! Decision functions for a loaded model.
//!
//! - Classification (C-SVC, ν-SVC): one-vs-one voting
//! - One-class SVM: sign of the decision value
//! - Regression (ε-SVR, ν-SVR): the decision value itself
//!
//! These functions assume a model that passed [`SvmModel::validate`].

use crate::kernel::k_function;
use crate::types::{SvmModel, SvmNode, SvmType};

/// Compute decision values and return the predicted label/value.
///
/// `dec_values` must hold [`SvmModel::decision_value_count`] entries. For
/// classification they are filled in pair order `(0,1), (0,2), .., (k-2,k-1)`.
pub fn predict_values(model: &SvmModel, x: &[SvmNode], dec_values: &mut [f64]) -> f64 {
    let kvalue: Vec<f64> = model
        .sv
        .iter()
        .map(|sv| k_function(x, sv, &model.param))
        .collect();

    match model.param.svm_type {
        SvmType::OneClass | SvmType::EpsilonSvr | SvmType::NuSvr => {
            let sum: f64 = model.sv_coef[0]
                .iter()
                .zip(&kvalue)
                .map(|(c, k)| c * k)
                .sum::<f64>()
                - model.rho[0];
            dec_values[0] = sum;

            match model.param.svm_type {
                SvmType::OneClass if sum > 0.0 => 1.0,
                SvmType::OneClass => -1.0,
                _ => sum,
            }
        }
        SvmType::CSvc | SvmType::NuSvc => {
            let nr_class = model.nr_class;

            let mut start = vec![0usize; nr_class];
            for i in 1..nr_class {
                start[i] = start[i - 1] + model.n_sv[i - 1];
            }

            let mut vote = vec![0usize; nr_class];
            let mut p = 0;
            for i in 0..nr_class {
                for j in (i + 1)..nr_class {
                    let (si, sj) = (start[i], start[j]);
                    let (ci, cj) = (model.n_sv[i], model.n_sv[j]);
                    let coef1 = &model.sv_coef[j - 1];
                    let coef2 = &model.sv_coef[i];

                    let mut sum = 0.0;
                    for k in si..si + ci {
                        sum += coef1[k] * kvalue[k];
                    }
                    for k in sj..sj + cj {
                        sum += coef2[k] * kvalue[k];
                    }
                    sum -= model.rho[p];
                    dec_values[p] = sum;

                    if sum > 0.0 {
                        vote[i] += 1;
                    } else {
                        vote[j] += 1;
                    }
                    p += 1;
                }
            }

            // Ties go to the class listed first in `label`.
            let mut winner = 0;
            for (i, &v) in vote.iter().enumerate().skip(1) {
                if v > vote[winner] {
                    winner = i;
                }
            }
            model.label[winner] as f64
        }
    }
}

/// Predict the label/value for a single instance.
pub fn predict(model: &SvmModel, x: &[SvmNode]) -> f64 {
    let mut dec_values = vec![0.0; model.decision_value_count()];
    predict_values(model, x, &mut dec_values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_model;
    use crate::types::{dense_to_nodes, KernelType, SvmParameter};
    use std::path::PathBuf;

    fn fixture() -> SvmModel {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("data")
            .join("disease_predictor.model");
        load_model(&path).unwrap()
    }

    #[test]
    fn each_single_symptom_maps_to_its_class() {
        let model = fixture();
        let expected = [1.0, 2.0, 3.0, 4.0];
        for (i, &label) in expected.iter().enumerate() {
            let mut row = [0.0; 4];
            row[i] = 1.0;
            assert_eq!(predict(&model, &dense_to_nodes(&row)), label, "row {:?}", row);
        }
    }

    #[test]
    fn decision_values_follow_pair_order() {
        let model = fixture();
        let mut dec = vec![0.0; 6];
        let label = predict_values(&model, &dense_to_nodes(&[1.0, 0.0, 0.0, 0.0]), &mut dec);
        assert_eq!(label, 1.0);
        // Class 0 wins all three of its pairs; the rest see zero margins.
        assert_eq!(dec, vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn ties_go_to_first_label() {
        // A cyclic vote gives every class exactly one vote.
        let model = SvmModel {
            param: SvmParameter {
                kernel_type: KernelType::Linear,
                ..Default::default()
            },
            nr_class: 3,
            sv: vec![
                vec![SvmNode { index: 1, value: 1.0 }],
                vec![SvmNode { index: 1, value: 1.0 }],
                vec![SvmNode { index: 1, value: 1.0 }],
            ],
            // pair (0,1): +1 → 0 wins; pair (0,2): -1 → 2 wins; pair (1,2): +1 → 1 wins
            sv_coef: vec![vec![1.0, 0.0, 0.0], vec![-1.0, 1.0, 0.0]],
            rho: vec![0.0, 0.0, 0.0],
            label: vec![7, 8, 9],
            label_names: Vec::new(),
            n_sv: vec![1, 1, 1],
        };
        model.validate().unwrap();
        let x = [SvmNode { index: 1, value: 1.0 }];
        let mut dec = vec![0.0; 3];
        assert_eq!(predict_values(&model, &x, &mut dec), 7.0);
        assert_eq!(dec, vec![1.0, -1.0, 1.0]);
    }

    #[test]
    fn regression_returns_decision_value() {
        let model = SvmModel {
            param: SvmParameter {
                svm_type: SvmType::EpsilonSvr,
                kernel_type: KernelType::Linear,
                ..Default::default()
            },
            nr_class: 2,
            sv: vec![vec![SvmNode { index: 1, value: 2.0 }]],
            sv_coef: vec![vec![1.5]],
            rho: vec![0.5],
            label: Vec::new(),
            label_names: Vec::new(),
            n_sv: Vec::new(),
        };
        let x = [SvmNode { index: 1, value: 1.0 }];
        assert!((predict(&model, &x) - 2.5).abs() < 1e-15);
    }

    #[test]
    fn one_class_returns_sign() {
        let mut model = SvmModel {
            param: SvmParameter {
                svm_type: SvmType::OneClass,
                kernel_type: KernelType::Linear,
                ..Default::default()
            },
            nr_class: 2,
            sv: vec![vec![SvmNode { index: 1, value: 1.0 }]],
            sv_coef: vec![vec![1.0]],
            rho: vec![0.5],
            label: Vec::new(),
            label_names: Vec::new(),
            n_sv: Vec::new(),
        };
        let x = [SvmNode { index: 1, value: 1.0 }];
        assert_eq!(predict(&model, &x), 1.0);
        model.rho[0] = 2.0;
        assert_eq!(predict(&model, &x), -1.0);
    }
}
