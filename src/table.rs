// src/table.rs
//
// Result table: one row per record, indexed by the record `id`, one column
// per field that came back in the payload. Absent values are `Cell::Missing`,
// never zero or an empty string.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::error::{Result, ScorecardError};
use crate::query::{FieldSpec, Filter};

/// Record identifier. The API uses integers; text is accepted for imported files.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Scalar JSON value → id. `null`, bools, arrays and objects are not ids.
    pub fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(RecordId::Int(i)),
                None => Some(RecordId::Text(n.to_string())),
            },
            Value::String(s) if !s.is_empty() => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    /// Text form from an imported file.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        Some(match s.parse::<i64>() {
            Ok(i) => RecordId::Int(i),
            Err(_) => RecordId::Text(s!(s)),
        })
    }

    pub fn to_json(&self) -> Value {
        match self {
            RecordId::Int(i) => Value::from(*i),
            RecordId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl From<i64> for RecordId {
    fn from(i: i64) -> Self {
        RecordId::Int(i)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{i}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// `null` → Missing. Arrays/objects keep their JSON text.
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => Cell::Missing,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Missing),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Type inference for imported delimited text.
    pub fn infer(s: &str) -> Self {
        if s.is_empty() {
            return Cell::Missing;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return Cell::Float(f);
            }
        }
        match s {
            "true" => Cell::Bool(true),
            "false" => Cell::Bool(false),
            _ => Cell::Text(s!(s)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Missing => Value::Null,
            Cell::Bool(b) => Value::from(*b),
            Cell::Int(i) => Value::from(*i),
            Cell::Float(f) => Value::from(*f),
            Cell::Text(s) => Value::from(s.as_str()),
        }
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Text used in delimited exports. Missing is empty; floats always keep a
/// decimal point so they re-import as floats.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(x) => {
                let s = x.to_string();
                if x.is_finite() && !s.contains('.') {
                    write!(f, "{s}.0")
                } else {
                    f.write_str(&s)
                }
            }
            Cell::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    index: Vec<RecordId>,
    rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, index: Vec::new(), rows: Vec::new() }
    }

    /// Append one record. Short rows are padded with Missing.
    /// Fails on a duplicate id or a row wider than the header.
    pub fn push_row(&mut self, id: RecordId, mut cells: Vec<Cell>) -> Result<()> {
        if cells.len() > self.columns.len() {
            return Err(ScorecardError::InvalidTable(format!(
                "record {id} has {} cells for {} columns",
                cells.len(),
                self.columns.len()
            )));
        }
        if self.index.contains(&id) {
            return Err(ScorecardError::InvalidTable(format!("duplicate record id {id}")));
        }
        cells.resize(self.columns.len(), Cell::Missing);
        self.index.push(id);
        self.rows.push(cells);
        Ok(())
    }

    pub fn columns(&self) -> &[String] { &self.columns }
    pub fn index(&self) -> &[RecordId] { &self.index }
    pub fn len(&self) -> usize { self.index.len() }
    pub fn is_empty(&self) -> bool { self.index.is_empty() }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one record, aligned with `columns()`.
    pub fn row(&self, id: &RecordId) -> Option<&[Cell]> {
        let i = self.index.iter().position(|x| x == id)?;
        Some(self.rows[i].as_slice())
    }

    pub fn get(&self, id: &RecordId, column: &str) -> Option<&Cell> {
        let c = self.column_index(column)?;
        self.row(id).map(|r| &r[c])
    }

    /// `(id, cells)` in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &[Cell])> {
        self.index.iter().zip(self.rows.iter().map(|r| r.as_slice()))
    }

    /// One column top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let c = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[c]).collect())
    }

    /// Numeric view of a column; non-numeric and missing cells are `None`.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name).map(|cells| cells.into_iter().map(Cell::as_f64).collect())
    }

    /// Requested fields that produced no column (and are not the index).
    /// The server drops unknown names without complaint, so this is the only
    /// way to notice a typo.
    pub fn unresolved(&self, fields: &[FieldSpec]) -> Vec<String> {
        fields
            .iter()
            .map(|f| f.to_string())
            .filter(|name| name != "id" && !self.has_column(name))
            .collect()
    }

    /// Client-side narrowing for constraints the server could not take.
    pub fn filter(&self, filter: &Filter) -> Result<ResultTable> {
        if !filter.is_local() {
            return Err(ScorecardError::InvalidRequest(format!(
                "`{filter}` cannot be applied client-side"
            )));
        }
        let c = self.column_index(&filter.key).ok_or_else(|| {
            ScorecardError::InvalidRequest(format!("no column `{}` to filter on", filter.key))
        })?;

        let mut out = ResultTable::new(self.columns.clone());
        for (id, row) in self.index.iter().zip(&self.rows) {
            if filter.matches(&row[c])? {
                out.index.push(id.clone());
                out.rows.push(row.clone());
            }
        }
        Ok(out)
    }

    /// Keep only the named columns, in the order given. Unknown names are skipped.
    pub fn select(&self, names: &[&str]) -> ResultTable {
        let picks: Vec<usize> = names.iter().filter_map(|n| self.column_index(n)).collect();
        ResultTable {
            columns: picks.iter().map(|&c| self.columns[c].clone()).collect(),
            index: self.index.clone(),
            rows: self.rows.iter().map(|r| picks.iter().map(|&c| r[c].clone()).collect()).collect(),
        }
    }

    /// Stack another page underneath. Columns are unioned (new ones appended,
    /// earlier rows get Missing); ids must stay unique.
    pub fn append(&mut self, other: ResultTable) -> Result<()> {
        let mut map: HashMap<usize, usize> = HashMap::with_capacity(other.columns.len());
        for (oc, name) in other.columns.iter().enumerate() {
            let c = match self.column_index(name) {
                Some(c) => c,
                None => {
                    self.columns.push(name.clone());
                    for r in &mut self.rows {
                        r.push(Cell::Missing);
                    }
                    self.columns.len() - 1
                }
            };
            map.insert(oc, c);
        }

        for (id, row) in other.index.into_iter().zip(other.rows) {
            let mut cells = vec![Cell::Missing; self.columns.len()];
            for (oc, cell) in row.into_iter().enumerate() {
                cells[map[&oc]] = cell;
            }
            self.push_row(id, cells)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultTable {
        let mut t = ResultTable::new(vec![s!("a"), s!("b")]);
        t.push_row(RecordId::Int(1), vec![Cell::Int(10), Cell::Text(s!("x"))]).unwrap();
        t.push_row(RecordId::Int(2), vec![Cell::Missing]).unwrap();
        t
    }

    #[test]
    fn short_rows_padded_with_missing() {
        let t = sample();
        assert_eq!(t.get(&RecordId::Int(2), "b"), Some(&Cell::Missing));
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut t = sample();
        assert!(t.push_row(RecordId::Int(1), vec![]).is_err());
    }

    #[test]
    fn append_unions_columns() {
        let mut t = sample();
        let mut other = ResultTable::new(vec![s!("c"), s!("a")]);
        other.push_row(RecordId::Int(3), vec![Cell::Bool(true), Cell::Int(30)]).unwrap();
        t.append(other).unwrap();

        assert_eq!(t.columns(), ["a", "b", "c"]);
        assert_eq!(t.get(&RecordId::Int(1), "c"), Some(&Cell::Missing));
        assert_eq!(t.get(&RecordId::Int(3), "a"), Some(&Cell::Int(30)));
        assert_eq!(t.get(&RecordId::Int(3), "b"), Some(&Cell::Missing));
    }

    #[test]
    fn float_display_keeps_point() {
        assert_eq!(Cell::Float(1.0).to_string(), "1.0");
        assert_eq!(Cell::Float(0.25).to_string(), "0.25");
        assert_eq!(Cell::Missing.to_string(), "");
    }

    #[test]
    fn infer_types() {
        assert_eq!(Cell::infer(""), Cell::Missing);
        assert_eq!(Cell::infer("42"), Cell::Int(42));
        assert_eq!(Cell::infer("4.5"), Cell::Float(4.5));
        assert_eq!(Cell::infer("true"), Cell::Bool(true));
        assert_eq!(Cell::infer("NaN"), Cell::Text(s!("NaN")));
        assert_eq!(Cell::infer("Harvard"), Cell::Text(s!("Harvard")));
    }

    #[test]
    fn unresolved_ignores_index_field() {
        let t = sample();
        let fields = [FieldSpec::root("id"), FieldSpec::root("a"), FieldSpec::school("nmae")];
        assert_eq!(t.unresolved(&fields), ["school.nmae"]);
        assert!(t.unresolved(&[FieldSpec::root("id")]).is_empty());
    }

    #[test]
    fn select_reorders() {
        let t = sample().select(&["b", "zzz", "a"]);
        assert_eq!(t.columns(), ["b", "a"]);
        assert_eq!(t.get(&RecordId::Int(1), "a"), Some(&Cell::Int(10)));
    }
}
