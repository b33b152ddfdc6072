// src/storage/csv.rs

//! Minimal CSV/TSV codec for the record store.

use std::mem::take;

/// UTF-8 byte-order marker written at the start of every new file.
pub const BOM: &str = "\u{feff}";

/* ---------------- Parsing ---------------- */

/// Parse delimited text into rows, one row per physical line.
///
/// A leading BOM is ignored. Blank lines and CRLF endings are tolerated. Quote
/// state never carries past a line break, so a row torn inside a quoted field
/// yields its partial fields and the following lines still parse cleanly.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_line(line, sep))
        .collect()
}

/// Split one line into fields (quotes and doubled quotes tolerant).
fn parse_line(line: &str, sep: char) -> Vec<String> {
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            _ => field.push(ch),
        }
    }
    row.push(field);
    row
}

/* ---------------- Writing ---------------- */

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Format one row with every field quoted.
///
/// Line breaks inside a field are written as spaces, so a row is always
/// exactly one line.
pub fn format_row_quoted<S: AsRef<str>>(row: &[S], sep: char) -> String {
    let mut line = row
        .iter()
        .map(|cell| quote(&cell.as_ref().replace(['\r', '\n'], " ")))
        .collect::<Vec<_>>()
        .join(&sep.to_string());
    line.push('\n');
    line
}

/// Format one row, quoting only fields that need it.
pub fn format_row_minimal<S: AsRef<str>>(row: &[S], sep: char) -> String {
    let mut line = row
        .iter()
        .map(|cell| {
            let cell = cell.as_ref();
            if needs_quotes(cell, sep) {
                quote(cell)
            } else {
                cell.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&sep.to_string());
    line.push('\n');
    line
}
