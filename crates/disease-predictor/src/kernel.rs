//! Kernel evaluation between a query row and a support vector.

use crate::types::{KernelType, SvmNode, SvmParameter};

/// Integer power by squaring. Negative `times` yields 1.0, as in LIBSVM.
#[inline]
pub fn powi(base: f64, times: i32) -> f64 {
    let mut tmp = base;
    let mut ret = 1.0;
    let mut t = times;
    while t > 0 {
        if t % 2 == 1 {
            ret *= tmp;
        }
        tmp *= tmp;
        t /= 2;
    }
    ret
}

/// Walk two index-sorted node slices in lockstep.
///
/// `both` is called for indices present in both slices, `only` for indices
/// present in exactly one of them.
#[inline]
fn merge_fold(
    x: &[SvmNode],
    y: &[SvmNode],
    mut both: impl FnMut(f64, f64) -> f64,
    mut only: impl FnMut(f64) -> f64,
) -> f64 {
    let (mut ix, mut iy) = (0, 0);
    let mut sum = 0.0;
    while ix < x.len() && iy < y.len() {
        match x[ix].index.cmp(&y[iy].index) {
            std::cmp::Ordering::Equal => {
                sum += both(x[ix].value, y[iy].value);
                ix += 1;
                iy += 1;
            }
            std::cmp::Ordering::Greater => {
                sum += only(y[iy].value);
                iy += 1;
            }
            std::cmp::Ordering::Less => {
                sum += only(x[ix].value);
                ix += 1;
            }
        }
    }
    sum + x[ix..].iter().chain(&y[iy..]).map(|n| only(n.value)).sum::<f64>()
}

/// Sparse dot product of two index-sorted node slices.
#[inline]
pub fn dot(x: &[SvmNode], y: &[SvmNode]) -> f64 {
    merge_fold(x, y, |a, b| a * b, |_| 0.0)
}

/// ‖x - y‖² without materialising the difference.
#[inline]
fn sparse_sq_dist(x: &[SvmNode], y: &[SvmNode]) -> f64 {
    merge_fold(x, y, |a, b| (a - b) * (a - b), |v| v * v)
}

/// Evaluate K(x, y) for the model's kernel parameters.
pub fn k_function(x: &[SvmNode], y: &[SvmNode], param: &SvmParameter) -> f64 {
    match param.kernel_type {
        KernelType::Linear => dot(x, y),
        KernelType::Polynomial => powi(param.gamma * dot(x, y) + param.coef0, param.degree),
        KernelType::Rbf => (-param.gamma * sparse_sq_dist(x, y)).exp(),
        KernelType::Sigmoid => (param.gamma * dot(x, y) + param.coef0).tanh(),
        KernelType::Precomputed => {
            // y[0].value is the 1-based column of the kernel row in x.
            let col = y.first().map_or(0, |n| n.value as usize);
            x.get(col).map_or(0.0, |n| n.value)
        }
    }
}
