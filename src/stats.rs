// src/stats.rs
//
// Exploratory statistics over a ResultTable: per-column summary, Pearson
// correlation and a paired t-test. Missing and non-numeric cells are skipped
// (pairwise for the two-column statistics).

use crate::error::{Result, ScorecardError};
use crate::table::{Cell, ResultTable};

#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n-1); NaN for a single value.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Summaries for every numeric column: at least one value present and no
/// non-numeric, non-missing cell.
pub fn describe(table: &ResultTable) -> Vec<Summary> {
    table
        .columns()
        .iter()
        .filter_map(|name| {
            let cells = table.column(name)?;
            if cells.iter().any(|c| !c.is_missing() && c.as_f64().is_none()) {
                return None;
            }
            let values: Vec<f64> = cells.iter().filter_map(|c| c.as_f64()).collect();
            summarize(name, values)
        })
        .collect()
}

/// Summary of one named column; `None` if it has no numeric values.
pub fn describe_column(table: &ResultTable, name: &str) -> Option<Summary> {
    let values: Vec<f64> = table.numeric_column(name)?.into_iter().flatten().collect();
    summarize(name, values)
}

fn summarize(name: &str, mut values: Vec<f64>) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    let mean = mean(&values);
    Some(Summary {
        column: s!(name),
        count: n,
        mean,
        std: sample_variance(&values, mean).sqrt(),
        min: values[0],
        q25: quantile_sorted(&values, 0.25),
        median: quantile_sorted(&values, 0.5),
        q75: quantile_sorted(&values, 0.75),
        max: values[n - 1],
    })
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

fn sample_variance(v: &[f64], mean: f64) -> f64 {
    if v.len() < 2 {
        return f64::NAN;
    }
    v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (v.len() - 1) as f64
}

/// Linear interpolation between closest ranks.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Rows where both columns are numeric.
pub fn paired_values(table: &ResultTable, a: &str, b: &str) -> Result<Vec<(f64, f64)>> {
    let ca = table.column(a).ok_or_else(|| no_column(a))?;
    let cb = table.column(b).ok_or_else(|| no_column(b))?;
    Ok(ca
        .into_iter()
        .zip(cb)
        .filter_map(|(x, y)| Some((Cell::as_f64(x)?, Cell::as_f64(y)?)))
        .collect())
}

fn no_column(name: &str) -> ScorecardError {
    ScorecardError::InvalidTable(format!("no column `{name}`"))
}

/// Pearson r over complete pairs. `None` for fewer than two pairs or a
/// constant column.
pub fn correlation(table: &ResultTable, x: &str, y: &str) -> Result<Option<f64>> {
    Ok(pearson(&paired_values(table, x, y)?))
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

/// Square matrix of pairwise correlations, in the order of `columns`.
pub fn correlation_matrix(table: &ResultTable, columns: &[&str]) -> Result<Vec<Vec<Option<f64>>>> {
    columns
        .iter()
        .map(|a| columns.iter().map(|b| correlation(table, a, b)).collect())
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct TTest {
    pub n: usize,
    /// Mean of `a - b`
    pub mean_diff: f64,
    pub t: f64,
    pub df: f64,
    /// Two-sided
    pub p_value: f64,
}

/// Paired (dependent samples) t-test of `a` against `b`.
pub fn paired_t_test(table: &ResultTable, a: &str, b: &str) -> Result<TTest> {
    let diffs: Vec<f64> = paired_values(table, a, b)?.into_iter().map(|(x, y)| x - y).collect();
    let n = diffs.len();
    if n < 2 {
        return Err(ScorecardError::InvalidTable(format!(
            "paired t-test needs at least 2 complete pairs, got {n}"
        )));
    }
    let m = mean(&diffs);
    let sd = sample_variance(&diffs, m).sqrt();
    if sd == 0.0 {
        return Err(ScorecardError::InvalidTable(s!("differences have zero variance")));
    }
    let df = (n - 1) as f64;
    let t = m / (sd / (n as f64).sqrt());
    Ok(TTest { n, mean_diff: m, t, df, p_value: student_t_two_sided(t, df) })
}

/// P(|T| >= |t|) for Student's t with `df` degrees of freedom.
fn student_t_two_sided(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    reg_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// Regularized incomplete beta I_x(a, b), continued fraction (modified Lentz).
fn reg_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    // The fraction converges fast for x < (a+1)/(a+b+2); use symmetry otherwise.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_cf(a, b, x) / a
    } else {
        1.0 - front * beta_cf(b, a, 1.0 - x) / b
    }
}

fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-14;
    const TINY: f64 = 1e-300;

    let (qab, qap, qam) = (a + b, a + 1.0, a - 1.0);
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY { d = TINY; }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY { d = TINY; }
        c = 1.0 + aa / c;
        if c.abs() < TINY { c = TINY; }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY { d = TINY; }
        c = 1.0 + aa / c;
        if c.abs() < TINY { c = TINY; }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Lanczos approximation (g = 7, n = 9).
fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEF: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        // Reflection
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = COEF[0];
    for (i, c) in COEF.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}
