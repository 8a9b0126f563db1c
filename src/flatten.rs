// src/flatten.rs
//
// Payload → ResultTable.
//
// Input shape: `{"metadata": {...}, "results": [{"id": 1, ...}, ...]}`.
// Columns are the union of keys over all records, in first-seen order; `id`
// becomes the index. Nested objects flatten to dotted names
// (`{"school": {"name": ..}}` → `school.name`), which is what the API returns
// when `keys_nested` is on.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, ScorecardError};
use crate::table::{Cell, RecordId, ResultTable};

/// Paging block of a response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
}

impl PageMeta {
    /// Number of pages the server holds for this query.
    pub fn page_count(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as u64).min(u32::MAX as u64) as u32
    }
}

/// Flatten a parsed payload into a table.
pub fn flatten(payload: &Value) -> Result<ResultTable> {
    let records = results_of(payload)?;

    let mut columns: Vec<String> = Vec::new();
    let mut col_ix: HashMap<String, usize> = HashMap::new();
    let mut staged: Vec<(RecordId, Vec<(usize, Cell)>)> = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| {
            ScorecardError::MalformedResponse(format!("record {i} is not an object"))
        })?;
        let id = record_id(obj, i)?;

        let mut leaves = Vec::new();
        collect_leaves(obj, "", &mut leaves);

        let mut cells = Vec::with_capacity(leaves.len());
        for (name, value) in leaves {
            if name == "id" {
                continue;
            }
            let c = *col_ix.entry(name.clone()).or_insert_with(|| {
                columns.push(name);
                columns.len() - 1
            });
            cells.push((c, Cell::from_json(value)));
        }
        staged.push((id, cells));
    }

    let mut table = ResultTable::new(columns);
    let width = table.columns().len();
    for (id, cells) in staged {
        let mut row = vec![Cell::Missing; width];
        for (c, cell) in cells {
            row[c] = cell;
        }
        table.push_row(id.clone(), row).map_err(|_| {
            ScorecardError::MalformedResponse(format!("record id {id} appears more than once"))
        })?;
    }
    Ok(table)
}

/// Table plus the optional `metadata` block.
pub fn flatten_page(payload: &Value) -> Result<(Option<PageMeta>, ResultTable)> {
    let meta = payload
        .get("metadata")
        .and_then(|m| PageMeta::deserialize(m).ok());
    Ok((meta, flatten(payload)?))
}

/// Parse body text then flatten.
pub fn flatten_str(body: &str) -> Result<(Option<PageMeta>, ResultTable)> {
    let payload: Value = serde_json::from_str(body)?;
    flatten_page(&payload)
}

fn results_of(payload: &Value) -> Result<&Vec<Value>> {
    match payload.get("results") {
        Some(Value::Array(a)) => Ok(a),
        Some(_) => Err(ScorecardError::MalformedResponse(s!("`results` is not an array"))),
        None => Err(ScorecardError::MalformedResponse(s!("payload has no `results`"))),
    }
}

fn record_id(obj: &Map<String, Value>, i: usize) -> Result<RecordId> {
    let raw = obj
        .get("id")
        .ok_or_else(|| ScorecardError::MalformedResponse(format!("record {i} has no `id`")))?;
    RecordId::from_json(raw).ok_or_else(|| {
        ScorecardError::MalformedResponse(format!("record {i} has unusable `id` {raw}"))
    })
}

/// Depth-first walk; objects recurse, everything else is a leaf.
/// An empty object is a leaf too so the key still shows up as a column.
fn collect_leaves<'a>(obj: &'a Map<String, Value>, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
    for (k, v) in obj {
        let name = if prefix.is_empty() { k.clone() } else { join!(prefix, ".", k) };
        match v {
            Value::Object(inner) if !inner.is_empty() => collect_leaves(inner, &name, out),
            _ => out.push((name, v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_become_dotted_columns() {
        let payload = json!({"results": [
            {"id": 7, "school": {"name": "A", "city": "B"}, "latest": {"student": {"size": 100}}}
        ]});
        let t = flatten(&payload).unwrap();
        assert_eq!(t.columns(), ["school.name", "school.city", "latest.student.size"]);
        assert_eq!(t.get(&RecordId::Int(7), "latest.student.size"), Some(&Cell::Int(100)));
    }

    #[test]
    fn null_is_missing_and_arrays_keep_json() {
        let payload = json!({"results": [{"id": 1, "a": null, "b": [1, 2]}]});
        let t = flatten(&payload).unwrap();
        assert_eq!(t.get(&RecordId::Int(1), "a"), Some(&Cell::Missing));
        assert_eq!(t.get(&RecordId::Int(1), "b"), Some(&Cell::Text(s!("[1,2]"))));
    }

    #[test]
    fn bad_ids_are_malformed() {
        for payload in [
            json!({"results": [{"name": "x"}]}),
            json!({"results": [{"id": null}]}),
            json!({"results": [{"id": {"x": 1}}]}),
            json!({"results": [{"id": 1}, {"id": 1}]}),
            json!({"results": [5]}),
            json!({"results": {"id": 1}}),
        ] {
            assert!(matches!(flatten(&payload), Err(ScorecardError::MalformedResponse(_))));
        }
    }

    #[test]
    fn page_count_rounds_up() {
        let m = PageMeta { total: 201, page: 0, per_page: 100 };
        assert_eq!(m.page_count(), 3);
        assert_eq!(PageMeta::default().page_count(), 0);
    }

    #[test]
    fn metadata_optional() {
        let (meta, t) = flatten_str(r#"{"results": []}"#).unwrap();
        assert!(meta.is_none());
        assert!(t.is_empty());
        let (meta, _) =
            flatten_str(r#"{"metadata": {"total": 5, "page": 1, "per_page": 2}, "results": []}"#)
                .unwrap();
        assert_eq!(meta, Some(PageMeta { total: 5, page: 1, per_page: 2 }));
    }
}
