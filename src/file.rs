// src/file.rs

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};

use crate::config::options::{ExportFormat, ExportOptions};
use crate::csv::{parse_rows, write_table, INDEX_HEADER};
use crate::error::{Result, ScorecardError};
use crate::flatten::flatten;
use crate::table::{Cell, RecordId, ResultTable};

/// Write the table according to ExportOptions. Returns the final path.
pub fn export_table(table: &ResultTable, export: &ExportOptions) -> Result<PathBuf> {
    let path = resolve_out_path(&export.out, &export.default_filename())?;
    write_table_to_path(table, &path, export.format)?;
    tracing::info!(rows = table.len(), columns = table.columns().len(), path = %path.display(), "exported");
    Ok(path)
}

/// Create/truncate `path` (parents created) and write the table.
pub fn write_table_to_path(table: &ResultTable, path: &Path, format: ExportFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    let mut out = BufWriter::new(File::create(path)?);
    write_table_as(&mut out, table, format)?;
    out.flush()?;
    Ok(())
}

pub fn write_table_as<W: Write>(mut w: W, table: &ResultTable, format: ExportFormat) -> Result<()> {
    match format.delim() {
        Some(sep) => write_table(&mut w, table, sep)?,
        None => {
            serde_json::to_writer_pretty(&mut w, &table_to_json(table))?;
            writeln!(w)?;
        }
    }
    Ok(())
}

/// `[{"id": .., "<col>": value|null, ..}, ..]`
pub fn table_to_json(table: &ResultTable) -> Value {
    let records = table
        .iter()
        .map(|(id, cells)| {
            let mut obj = Map::with_capacity(cells.len() + 1);
            obj.insert(s!(INDEX_HEADER), id.to_json());
            for (name, cell) in table.columns().iter().zip(cells) {
                obj.insert(name.clone(), cell.to_json());
            }
            Value::Object(obj)
        })
        .collect();
    Value::Array(records)
}

/// Read a previously exported file. Format comes from the extension unless given.
pub fn import_table(path: &Path, format: Option<ExportFormat>) -> Result<ResultTable> {
    let format = format
        .or_else(|| ExportFormat::from_extension(path))
        .ok_or_else(|| {
            ScorecardError::InvalidTable(format!("cannot tell the format of {}", path.display()))
        })?;
    let text = fs::read_to_string(path)?;
    read_table_str(&text, format)
}

pub fn read_table_str(text: &str, format: ExportFormat) -> Result<ResultTable> {
    match format.delim() {
        Some(sep) => read_delimited(text, sep),
        None => read_json(text),
    }
}

fn read_delimited(text: &str, sep: char) -> Result<ResultTable> {
    let mut rows = parse_rows(text, sep).into_iter();
    let header = rows
        .next()
        .ok_or_else(|| ScorecardError::InvalidTable(s!("file is empty")))?;
    if header.first().map(|h| h.trim()) != Some(INDEX_HEADER) {
        return Err(ScorecardError::InvalidTable(format!(
            "first column must be `{INDEX_HEADER}`"
        )));
    }

    let mut table = ResultTable::new(header[1..].to_vec());
    for (line, row) in rows.enumerate() {
        let mut cells = row.into_iter();
        let id = cells
            .next()
            .and_then(|raw| RecordId::parse(&raw))
            .ok_or_else(|| ScorecardError::InvalidTable(format!("row {} has no id", line + 1)))?;
        table.push_row(id, cells.map(|c| Cell::infer(&c)).collect())?;
    }
    Ok(table)
}

/// JSON exports are plain record arrays; the flattener reads them as-is.
fn read_json(text: &str) -> Result<ResultTable> {
    let records: Value = serde_json::from_str(text)?;
    if !records.is_array() {
        return Err(ScorecardError::InvalidTable(s!("expected a JSON array of records")));
    }
    let mut payload = Map::new();
    payload.insert(s!("results"), records);
    flatten(&Value::Object(payload)).map_err(|e| match e {
        ScorecardError::MalformedResponse(msg) => ScorecardError::InvalidTable(msg),
        other => other,
    })
}

/* ---------------- Paths ---------------- */

/// Empty → `out/<default>`; directory or trailing separator → `<dir>/<default>`;
/// anything else is taken as the file path.
pub fn resolve_out_path(user_o: &str, default_filename: &str) -> Result<PathBuf> {
    if user_o.trim().is_empty() {
        return Ok(PathBuf::from(crate::config::consts::DEFAULT_OUT_DIR).join(default_filename));
    }
    let p = PathBuf::from(normalize_separators(user_o.trim()));
    if looks_like_dir_hint(&p) || p.is_dir() {
        ensure_directory(&p)?;
        Ok(p.join(default_filename))
    } else {
        Ok(p)
    }
}

pub fn normalize_separators(p: &str) -> String {
    let sep = std::path::MAIN_SEPARATOR;
    p.chars().map(|c| if c == '/' || c == '\\' { sep } else { c }).collect()
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(ScorecardError::Io(std::io::Error::other(format!(
            "Path exists but is not a directory: {}",
            dir.display()
        ))));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

pub fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_out_goes_to_default_dir() {
        let p = resolve_out_path("", "schools.csv").unwrap();
        assert_eq!(p, Path::new("out").join("schools.csv"));
        let p = resolve_out_path("   ", "schools.json").unwrap();
        assert_eq!(p, Path::new("out").join("schools.json"));
    }

    #[test]
    fn plain_file_path_is_kept() {
        assert_eq!(resolve_out_path("data/a.tsv", "schools.tsv").unwrap(), PathBuf::from("data/a.tsv"));
        assert!(looks_like_dir_hint(Path::new("dir/")));
        assert!(!looks_like_dir_hint(Path::new("dir/a.csv")));
    }
}
