//! Reading and writing the model artifact.
//!
//! The artifact is a LIBSVM text model. One extra header keyword is
//! understood, `label_names`, which attaches a display name to each entry of
//! `label`. Files without it are plain LIBSVM models.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::SplitWhitespace;

use crate::error::ModelError;
use crate::types::{KernelType, SvmModel, SvmNode, SvmParameter, SvmType};

// ─── C-style %g formatting ──────────────────────────────────────────
//
// LIBSVM writes numbers with printf `%.Pg`. The exponent X is taken after
// rounding to P significant digits: scientific notation when X < -4 or
// X >= P, fixed with P-1-X decimals otherwise. Trailing zeros of the
// fraction are stripped and exponents padded to two digits.

struct Gfmt {
    value: f64,
    precision: usize,
}

/// Drop trailing fraction zeros and a dangling point; integers pass through.
fn strip_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl fmt::Display for Gfmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (v, p) = (self.value, self.precision.max(1));

        if !v.is_finite() {
            return write!(f, "{}", v);
        }
        if v == 0.0 {
            return f.write_str(if v.is_sign_negative() { "-0" } else { "0" });
        }

        let sci = format!("{:.prec$e}", v, prec = p - 1);
        let Some((mantissa, exponent)) = sci.split_once('e') else {
            return f.write_str(&sci);
        };
        let x: i32 = exponent.parse().unwrap_or(0);

        if x < -4 || x >= p as i32 {
            let sign = if x < 0 { '-' } else { '+' };
            write!(f, "{}e{}{:02}", strip_fraction_zeros(mantissa), sign, x.abs())
        } else {
            let decimals = (p as i32 - 1 - x) as usize;
            let fixed = format!("{:.prec$}", v, prec = decimals);
            f.write_str(strip_fraction_zeros(&fixed))
        }
    }
}

fn gfmt(value: f64, precision: usize) -> Gfmt {
    Gfmt { value, precision }
}

/// Format a float like C's `%g` (6 significant digits).
pub fn format_g(v: f64) -> String {
    gfmt(v, 6).to_string()
}

/// Format a float like C's `%.17g`, the precision model files use for
/// coefficients.
pub fn format_17g(v: f64) -> String {
    gfmt(v, 17).to_string()
}

// ─── Keyword tables ─────────────────────────────────────────────────

fn svm_type_keyword(t: SvmType) -> &'static str {
    match t {
        SvmType::CSvc => "c_svc",
        SvmType::NuSvc => "nu_svc",
        SvmType::OneClass => "one_class",
        SvmType::EpsilonSvr => "epsilon_svr",
        SvmType::NuSvr => "nu_svr",
    }
}

fn kernel_type_keyword(t: KernelType) -> &'static str {
    match t {
        KernelType::Linear => "linear",
        KernelType::Polynomial => "polynomial",
        KernelType::Rbf => "rbf",
        KernelType::Sigmoid => "sigmoid",
        KernelType::Precomputed => "precomputed",
    }
}

fn parse_svm_type(s: &str) -> Option<SvmType> {
    Some(match s {
        "c_svc" => SvmType::CSvc,
        "nu_svc" => SvmType::NuSvc,
        "one_class" => SvmType::OneClass,
        "epsilon_svr" => SvmType::EpsilonSvr,
        "nu_svr" => SvmType::NuSvr,
        _ => return None,
    })
}

fn parse_kernel_type(s: &str) -> Option<KernelType> {
    Some(match s {
        "linear" => KernelType::Linear,
        "polynomial" => KernelType::Polynomial,
        "rbf" => KernelType::Rbf,
        "sigmoid" => KernelType::Sigmoid,
        "precomputed" => KernelType::Precomputed,
        _ => return None,
    })
}

/// Largest `nr_class` accepted from a model header.
pub const MAX_CLASSES: usize = 65_536;

const PREALLOC_LIMIT: usize = 4096;

// ─── Writing ────────────────────────────────────────────────────────

/// Save a model to `path`.
pub fn save_model(path: &Path, model: &SvmModel) -> Result<(), ModelError> {
    let mut writer = BufWriter::new(File::create(path)?);
    save_model_to_writer(&mut writer, model)?;
    writer.flush()?;
    Ok(())
}

/// Save a model to any writer.
///
/// The model is validated first, and every label name must be a single
/// non-empty token so the file reloads with the same names.
pub fn save_model_to_writer(mut w: impl Write, model: &SvmModel) -> Result<(), ModelError> {
    model.validate()?;
    if let Some(name) = model
        .label_names
        .iter()
        .find(|name| name.is_empty() || name.contains(char::is_whitespace))
    {
        return Err(ModelError::ModelFormatError(format!(
            "label name {:?} must be a non-empty token without whitespace",
            name
        )));
    }

    let param = &model.param;

    writeln!(w, "svm_type {}", svm_type_keyword(param.svm_type))?;
    writeln!(w, "kernel_type {}", kernel_type_keyword(param.kernel_type))?;
    if param.kernel_type == KernelType::Polynomial {
        writeln!(w, "degree {}", param.degree)?;
    }
    if matches!(
        param.kernel_type,
        KernelType::Polynomial | KernelType::Rbf | KernelType::Sigmoid
    ) {
        writeln!(w, "gamma {}", gfmt(param.gamma, 17))?;
    }
    if matches!(param.kernel_type, KernelType::Polynomial | KernelType::Sigmoid) {
        writeln!(w, "coef0 {}", gfmt(param.coef0, 17))?;
    }

    writeln!(w, "nr_class {}", model.nr_class)?;
    writeln!(w, "total_sv {}", model.sv.len())?;

    write!(w, "rho")?;
    for r in &model.rho {
        write!(w, " {}", gfmt(*r, 17))?;
    }
    writeln!(w)?;

    if !model.label.is_empty() {
        write!(w, "label")?;
        for l in &model.label {
            write!(w, " {}", l)?;
        }
        writeln!(w)?;
    }
    if !model.label_names.is_empty() {
        writeln!(w, "label_names {}", model.label_names.join(" "))?;
    }
    if !model.n_sv.is_empty() {
        write!(w, "nr_sv")?;
        for n in &model.n_sv {
            write!(w, " {}", n)?;
        }
        writeln!(w)?;
    }

    writeln!(w, "SV")?;
    for (i, sv) in model.sv.iter().enumerate() {
        for row in &model.sv_coef {
            write!(w, "{} ", gfmt(row[i], 17))?;
        }
        if param.kernel_type == KernelType::Precomputed {
            if let Some(node) = sv.first() {
                write!(w, "0:{} ", node.value as i32)?;
            }
        } else {
            for node in sv {
                write!(w, "{}:{} ", node.index, gfmt(node.value, 8))?;
            }
        }
        writeln!(w)?;
    }

    Ok(())
}

// ─── Reading ────────────────────────────────────────────────────────

/// Load a model from `path`.
///
/// A missing file surfaces as [`ModelError::Io`] with
/// [`std::io::ErrorKind::NotFound`]; callers use that to tell "absent" apart
/// from "unreadable".
pub fn load_model(path: &Path) -> Result<SvmModel, ModelError> {
    let file = File::open(path)?;
    load_model_from_reader(BufReader::new(file))
}

/// Load a model from any buffered reader.
pub fn load_model_from_reader(reader: impl BufRead) -> Result<SvmModel, ModelError> {
    let mut lines = reader.lines();

    let mut param = SvmParameter::default();
    let mut nr_class: usize = 0;
    let mut total_sv: usize = 0;
    let mut rho = Vec::new();
    let mut label = Vec::new();
    let mut label_names = Vec::new();
    let mut n_sv = Vec::new();

    let mut line_num: usize = 0;
    loop {
        let line = lines.next().ok_or_else(|| {
            ModelError::ModelFormatError("unexpected end of file in header".into())
        })??;
        line_num += 1;

        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            continue;
        };

        match cmd {
            "svm_type" => {
                let val = parse_single::<String>(&mut parts, line_num, cmd)?;
                param.svm_type = parse_svm_type(&val).ok_or_else(|| ModelError::ParseError {
                    line: line_num,
                    message: format!("unknown svm_type: {}", val),
                })?;
            }
            "kernel_type" => {
                let val = parse_single::<String>(&mut parts, line_num, cmd)?;
                param.kernel_type =
                    parse_kernel_type(&val).ok_or_else(|| ModelError::ParseError {
                        line: line_num,
                        message: format!("unknown kernel_type: {}", val),
                    })?;
            }
            "degree" => param.degree = parse_single(&mut parts, line_num, cmd)?,
            "gamma" => param.gamma = parse_single(&mut parts, line_num, cmd)?,
            "coef0" => param.coef0 = parse_single(&mut parts, line_num, cmd)?,
            "nr_class" => nr_class = parse_single(&mut parts, line_num, cmd)?,
            "total_sv" => total_sv = parse_single(&mut parts, line_num, cmd)?,
            "rho" => rho = parse_list(parts, line_num, cmd)?,
            "label" => label = parse_list(parts, line_num, cmd)?,
            "label_names" => label_names = parts.map(str::to_owned).collect(),
            "nr_sv" => n_sv = parse_list(parts, line_num, cmd)?,
            "probA" | "probB" | "prob_density_marks" => {
                log::debug!("line {}: skipping {} (probability output unused)", line_num, cmd);
            }
            "SV" => break,
            _ => {
                return Err(ModelError::ModelFormatError(format!(
                    "line {}: unknown keyword: {}",
                    line_num, cmd
                )));
            }
        }
    }

    if nr_class > MAX_CLASSES {
        return Err(ModelError::ModelFormatError(format!(
            "nr_class {} exceeds limit ({})",
            nr_class, MAX_CLASSES
        )));
    }

    // Header counts are untrusted until the SV section backs them up.
    let coef_rows = if nr_class > 1 { nr_class - 1 } else { 1 };
    let mut sv_coef: Vec<Vec<f64>> = vec![Vec::new(); coef_rows];
    let mut sv: Vec<Vec<SvmNode>> = Vec::with_capacity(total_sv.min(PREALLOC_LIMIT));

    while sv.len() < total_sv {
        let line = lines.next().ok_or_else(|| {
            ModelError::ModelFormatError(format!(
                "unexpected end of file in SV section ({} of {} support vectors read)",
                sv.len(),
                total_sv
            ))
        })??;
        line_num += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        for row in sv_coef.iter_mut() {
            row.push(parse_single(&mut parts, line_num, "sv_coef")?);
        }

        let nodes = parts
            .map(|token| parse_node(token, line_num))
            .collect::<Result<Vec<_>, _>>()?;
        // The kernel merge walk relies on strictly ascending indices.
        if let Some(pair) = nodes.windows(2).find(|pair| pair[1].index <= pair[0].index) {
            return Err(ModelError::ParseError {
                line: line_num,
                message: format!(
                    "feature indices must be ascending: {} follows {}",
                    pair[1].index, pair[0].index
                ),
            });
        }
        sv.push(nodes);
    }

    log::debug!(
        "parsed {:?}/{:?} model: {} classes, {} support vectors",
        param.svm_type,
        param.kernel_type,
        nr_class,
        sv.len()
    );

    Ok(SvmModel {
        param,
        nr_class,
        sv,
        sv_coef,
        rho,
        label,
        label_names,
        n_sv,
    })
}

// ─── Helper parsers ─────────────────────────────────────────────────

fn parse_single<T: std::str::FromStr>(
    parts: &mut SplitWhitespace<'_>,
    line_num: usize,
    field: &str,
) -> Result<T, ModelError> {
    let token = parts.next().ok_or_else(|| ModelError::ParseError {
        line: line_num,
        message: format!("missing {} value", field),
    })?;
    token.parse().map_err(|_| ModelError::ParseError {
        line: line_num,
        message: format!("invalid {} value: {}", field, token),
    })
}

fn parse_list<T: std::str::FromStr>(
    parts: SplitWhitespace<'_>,
    line_num: usize,
    field: &str,
) -> Result<Vec<T>, ModelError> {
    parts
        .map(|token| {
            token.parse().map_err(|_| ModelError::ParseError {
                line: line_num,
                message: format!("invalid {} value: {}", field, token),
            })
        })
        .collect()
}

fn parse_node(token: &str, line_num: usize) -> Result<SvmNode, ModelError> {
    let bad = |message: String| ModelError::ParseError {
        line: line_num,
        message,
    };
    let (idx, val) = token
        .split_once(':')
        .ok_or_else(|| bad(format!("expected index:value, got: {}", token)))?;
    Ok(SvmNode {
        index: idx
            .parse()
            .map_err(|_| bad(format!("invalid index: {}", idx)))?,
        value: val
            .parse()
            .map_err(|_| bad(format!("invalid value: {}", val)))?,
    })
}
