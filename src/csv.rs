// src/csv.rs
use std::io::{self, Write};
use std::mem::take;

use crate::table::ResultTable;

pub const INDEX_HEADER: &str = "id";

/* ---------------- Parsing ---------------- */

/// Delimited-text reader (quotes + CRLF tolerant).
/// Blank lines are skipped; a quoted empty field still counts as a field.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = s!();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // doubled quote
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) { chars.next(); }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without newline, even if quotes were unterminated.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one row to any writer.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Header `id,<columns…>` then one line per record. Missing cells are empty.
pub fn write_table<W: Write>(mut w: W, table: &ResultTable, sep: char) -> io::Result<()> {
    let mut header = Vec::with_capacity(table.columns().len() + 1);
    header.push(INDEX_HEADER);
    header.extend(table.columns().iter().map(String::as_str));
    write_row(&mut w, &header, sep)?;

    let mut line = Vec::with_capacity(header.len());
    for (id, cells) in table.iter() {
        line.clear();
        line.push(id.to_string());
        line.extend(cells.iter().map(|c| c.to_string()));
        write_row(&mut w, &line, sep)?;
    }
    Ok(())
}

/// Whole table as one string (clipboard / stdout).
pub fn table_to_string(table: &ResultTable, sep: char) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let _ = write_table(&mut buf, table, sep);

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}
