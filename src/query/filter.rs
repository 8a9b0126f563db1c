// src/query/filter.rs
//
// A single `key=value` / `key__op=value` constraint. The server takes one per
// request; further constraints are applied to the returned table with
// `matches` (see `ResultTable::filter`).

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScorecardError};
use crate::table::Cell;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterOp {
    /// `key=value`; value may be a comma list (any of)
    Eq,
    /// `key__range=lo..hi`, bounds optional and inclusive
    Range,
    /// `key__not=value`
    Not,
    /// Any other `__op`; sent as-is, not evaluable locally
    Other(String),
}

impl FilterOp {
    fn suffix(&self) -> &str {
        match self {
            FilterOp::Eq => "",
            FilterOp::Range => "__range",
            FilterOp::Not => "__not",
            FilterOp::Other(op) => op.as_str(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub key: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn eq(key: &str, value: &str) -> Self {
        Self { key: s!(key), op: FilterOp::Eq, value: s!(value) }
    }

    pub fn not(key: &str, value: &str) -> Self {
        Self { key: s!(key), op: FilterOp::Not, value: s!(value) }
    }

    /// `lo..hi`; either side may be open.
    pub fn range(key: &str, lo: Option<f64>, hi: Option<f64>) -> Self {
        let fmt_bound = |b: Option<f64>| b.map(|v| v.to_string()).unwrap_or_default();
        let value = join!(&fmt_bound(lo), "..", &fmt_bound(hi));
        Self { key: s!(key), op: FilterOp::Range, value }
    }

    /// Query parameter name, operator suffix included.
    pub fn param(&self) -> String {
        join!(&self.key, self.op.suffix())
    }

    /// `param=value` with the value percent-encoded. Unreserved characters
    /// (so `25000..`) pass through unchanged.
    pub fn to_query(&self) -> String {
        join!(&self.param(), "=", &urlencoding::encode(&self.value))
    }

    /// Whether `matches` can evaluate this operator client-side.
    pub fn is_local(&self) -> bool {
        !matches!(self.op, FilterOp::Other(_))
    }

    /// Evaluate against one cell. `Missing` never matches.
    pub fn matches(&self, cell: &Cell) -> Result<bool> {
        if cell.is_missing() {
            return Ok(false);
        }
        match &self.op {
            FilterOp::Eq => Ok(self.any_equal(cell)),
            FilterOp::Not => Ok(!self.any_equal(cell)),
            FilterOp::Range => {
                let (lo, hi) = self.bounds()?;
                let Some(v) = cell.as_f64() else { return Ok(false) };
                Ok(lo.is_none_or(|lo| v >= lo) && hi.is_none_or(|hi| v <= hi))
            }
            FilterOp::Other(op) => Err(ScorecardError::InvalidRequest(format!(
                "operator `{op}` can only be evaluated by the server"
            ))),
        }
    }

    fn any_equal(&self, cell: &Cell) -> bool {
        self.value.split(',').map(str::trim).any(|want| cell_equals(cell, want))
    }

    fn bounds(&self) -> Result<(Option<f64>, Option<f64>)> {
        let (lo, hi) = self.value.split_once("..").ok_or_else(|| {
            ScorecardError::InvalidRequest(format!("range `{}` is not lo..hi", self.value))
        })?;
        Ok((parse_bound(lo)?, parse_bound(hi)?))
    }
}

fn parse_bound(s: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|_| ScorecardError::InvalidRequest(format!("range bound `{s}` is not a number")))
}

fn cell_equals(cell: &Cell, want: &str) -> bool {
    match cell {
        Cell::Missing => false,
        Cell::Bool(b) => want.eq_ignore_ascii_case(if *b { "true" } else { "false" }),
        Cell::Int(_) | Cell::Float(_) => match (cell.as_f64(), want.parse::<f64>()) {
            (Some(a), Ok(b)) => a == b,
            _ => false,
        },
        Cell::Text(t) => t == want,
    }
}

impl FromStr for Filter {
    type Err = ScorecardError;

    fn from_str(s: &str) -> Result<Self> {
        let (lhs, value) = s
            .split_once('=')
            .ok_or_else(|| ScorecardError::InvalidRequest(format!("filter `{s}` has no `=`")))?;
        let lhs = lhs.trim();

        let (key, op) = match lhs.rfind("__") {
            Some(i) => {
                let op = match &lhs[i..] {
                    "__range" => FilterOp::Range,
                    "__not" => FilterOp::Not,
                    other => FilterOp::Other(s!(other)),
                };
                (&lhs[..i], op)
            }
            None => (lhs, FilterOp::Eq),
        };
        if key.is_empty() {
            return Err(ScorecardError::InvalidRequest(format!("filter `{s}` has an empty key")));
        }
        Ok(Self { key: s!(key), op, value: s!(value.trim()) })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.param(), self.value)
    }
}
