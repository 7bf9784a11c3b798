//! CSV parsing into an [`IndexedTable`].
//!
//! The first two columns form the composite key, the rest are data columns.
//! Whitespace after a delimiter is skipped before quoting is interpreted,
//! empty fields and the usual NA tokens become missing values and blank
//! lines are ignored.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::config::ReshapeOptions;
use crate::error::{ParseError, ParseResult};
use crate::models::{Cell, IndexedTable};

/// Data values read as missing, in addition to the empty field.
pub const NA_VALUES: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> ParseResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| ParseError::Encoding(format!("invalid UTF-8: {}", e))),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.into_owned())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()),
        other => {
            // chardet names some charsets encoding_rs has no label for
            let enc = encoding_rs::Encoding::for_label(other.as_bytes()).unwrap_or(encoding_rs::WINDOWS_1252);
            let (text, _, had_errors) = enc.decode(bytes);
            if had_errors {
                return Err(ParseError::Encoding(format!("content is not valid {}", enc.name())));
            }
            Ok(text.into_owned())
        }
    }
}

/// Read and parse an indexed CSV file.
pub fn parse_indexed_file<P: AsRef<Path>>(path: P, options: &ReshapeOptions) -> ParseResult<IndexedTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_indexed_bytes(&bytes, options)
}

/// Parse raw bytes. Input that is not UTF-8 is decoded with the detected encoding.
pub fn parse_indexed_bytes(bytes: &[u8], options: &ReshapeOptions) -> ParseResult<IndexedTable> {
    match std::str::from_utf8(bytes) {
        Ok(content) => parse_indexed_table(content, options),
        Err(_) => {
            let content = decode_content(bytes, &detect_encoding(bytes))?;
            parse_indexed_table(&content, options)
        }
    }
}

/// Parse CSV text into an [`IndexedTable`].
///
/// # Example
/// ```ignore
/// let table = parse_indexed_table("key,sub,value\nA,x,1\nA, y, 2", &ReshapeOptions::default())?;
/// assert_eq!(table.rows[1].sub_key, "y");
/// ```
pub fn parse_indexed_table(content: &str, options: &ReshapeOptions) -> ParseResult<IndexedTable> {
    let delimiter = options.delimiter_byte()?;
    let content = skip_initial_space(content, delimiter as char);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let first = match records.next() {
        Some(record) => record.map_err(csv_error)?,
        None => return Err(ParseError::EmptyFile),
    };

    let width = first.len();
    if width < 2 {
        return Err(ParseError::MissingIndexColumns { found: width });
    }

    let (headers, pending) = if options.has_headers {
        (owned_fields(&first), None)
    } else {
        ((0..width).map(|i| i.to_string()).collect(), Some(first))
    };

    let mut table = IndexedTable::new(headers[0].clone(), headers[1].clone(), headers[2..].to_vec());

    for record in pending.into_iter().map(Ok).chain(records) {
        let record = record.map_err(csv_error)?;
        push_record(&mut table, &record, width)?;
    }

    Ok(table)
}

fn push_record(table: &mut IndexedTable, record: &StringRecord, width: usize) -> ParseResult<()> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    if record.len() > width {
        return Err(ParseError::malformed(
            line,
            format!("expected {} fields, saw {}", width, record.len()),
        ));
    }

    let fields = owned_fields(record);
    let row_key = key_field(&fields, 0, line, "row key")?;
    let sub_key = key_field(&fields, 1, line, "sub key")?;
    let values: Vec<Cell> = fields
        .into_iter()
        .skip(2)
        .map(|v| if is_missing(&v) { None } else { Some(v) })
        .collect();

    table.push(row_key, sub_key, values);
    Ok(())
}

fn key_field(fields: &[String], i: usize, line: u64, what: &str) -> ParseResult<String> {
    match fields.get(i) {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(ParseError::malformed(line, format!("missing {}", what))),
    }
}

fn owned_fields(record: &StringRecord) -> Vec<String> {
    record.iter().map(String::from).collect()
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || NA_VALUES.contains(&value)
}

/// Drop spaces (and tabs, unless tab is the delimiter) at the start of
/// every field, so the CSV reader sees `a, "b, c"` as two fields.
///
/// Whitespace inside a quoted field is kept. A quote only opens a quoted
/// field when it is the field's first character; a doubled quote inside a
/// quoted field toggles the state twice.
pub fn skip_initial_space(content: &str, delimiter: char) -> String {
    let is_break = |ch: char| ch == delimiter || ch == '\n' || ch == '\r';
    let is_blank = |ch: char| ch != delimiter && (ch == ' ' || ch == '\t');

    let mut out = String::with_capacity(content.len());
    let mut at_field_start = true;
    let mut quoted_field = false;
    let mut in_quotes = false;

    for ch in content.chars() {
        if at_field_start {
            if is_blank(ch) {
                continue;
            }
            if !is_break(ch) {
                at_field_start = false;
                quoted_field = ch == '"';
                in_quotes = quoted_field;
            }
        } else if quoted_field && ch == '"' {
            in_quotes = !in_quotes;
        } else if !in_quotes && is_break(ch) {
            at_field_start = true;
        }

        out.push(ch);
    }

    out
}

fn csv_error(e: csv::Error) -> ParseError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    ParseError::malformed(line, e.to_string())
}
