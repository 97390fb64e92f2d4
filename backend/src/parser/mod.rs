//! Tabular parser with encoding auto-detection.
//!
//! Turns raw delimited text into an ordered sequence of header-keyed rows.
//! No membership-specific logic here.
//!
//! Parsing is line-oriented: a quote character toggles "in-quote" state so
//! embedded delimiters are treated as data, and a doubled quote inside quotes
//! is an escaped literal quote. A quoted cell does NOT span physical lines;
//! only the current line is parsed. Legacy exports have never used embedded
//! newlines, so the limitation is kept rather than guessing at full RFC 4180
//! behavior.

use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Default cell delimiter for legacy exports.
pub const DEFAULT_DELIMITER: char = ',';

/// One data row: source line number plus (header, cell) pairs in file order.
///
/// Transient; discarded after normalization. Missing trailing cells are
/// filled with empty strings, extra cells beyond the header are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based physical line number in the source file.
    pub line: usize,
    pub fields: Vec<(String, String)>,
}

impl RawRow {
    /// Look up a cell by its exact header name.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }
}

/// Result of parsing one file, with detection metadata.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub rows: Vec<RawRow>,
    /// Trimmed header names, in file order.
    pub headers: Vec<String>,
    /// Detected or assumed encoding.
    pub encoding: String,
    /// Delimiter the file was split on.
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to text using the given encoding, falling back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Split a single physical line into cells.
///
/// A quote toggles in-quote state; inside quotes the delimiter is data and
/// `""` is a literal quote. The quotes themselves are not part of the cell.
fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                // Escaped literal quote
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == delimiter && !in_quotes {
            cells.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    cells.push(current);

    cells
}

/// Parse decoded text into header-keyed rows.
///
/// The first non-blank line is the header; each later non-blank line becomes
/// one [`RawRow`]. Blank lines are skipped. Fails with [`CsvError::NoData`]
/// if the file has fewer than two non-blank lines.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<(Vec<String>, Vec<RawRow>)> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header_line) = lines.next().ok_or(CsvError::NoData)?;

    let headers: Vec<String> = split_line(header_line, delimiter)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let cells = split_line(line, delimiter);
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = cells.get(i).cloned().unwrap_or_default();
                (header.clone(), value)
            })
            .collect();
        rows.push(RawRow {
            line: idx + 1,
            fields,
        });
    }

    if rows.is_empty() {
        return Err(CsvError::NoData);
    }

    Ok((headers, rows))
}

/// Parse raw file bytes: detect encoding, decode, then parse.
pub fn parse_bytes(bytes: &[u8], delimiter: char) -> CsvResult<ParsedFile> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let (headers, rows) = parse_str(&content, delimiter)?;

    Ok(ParsedFile {
        rows,
        headers,
        encoding,
        delimiter,
    })
}

/// Parse a file from disk.
pub fn parse_file<P: AsRef<Path>>(path: P, delimiter: char) -> CsvResult<ParsedFile> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_simple_rows() {
        let (headers, rows) = parse_str("name,age\nAlice,30\nBob,25", ',').unwrap();

        assert_eq!(headers, vec!["name", "age"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some("Alice"));
        assert_eq!(rows[0].get("age"), Some("30"));
        assert_eq!(rows[1].get("name"), Some("Bob"));
    }

    #[test]
    fn test_quoted_embedded_delimiter_is_one_cell() {
        let (_, rows) = parse_str("name,suffix\n\"Doe, Jr.\",III", ',').unwrap();

        assert_eq!(rows[0].get("name"), Some("Doe, Jr."));
        assert_eq!(rows[0].get("suffix"), Some("III"));
    }

    #[test]
    fn test_doubled_quote_is_literal() {
        let (_, rows) = parse_str("a,b\n\"say \"\"hi\"\"\",2", ',').unwrap();

        assert_eq!(rows[0].get("a"), Some("say \"hi\""));
        assert_eq!(rows[0].get("b"), Some("2"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let (_, rows) = parse_str("a,b\n\n1,2\n\n3,4\n", ',').unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_missing_trailing_cells_default_empty() {
        let (_, rows) = parse_str("a,b,c\n1,2", ',').unwrap();

        assert_eq!(rows[0].get("a"), Some("1"));
        assert_eq!(rows[0].get("b"), Some("2"));
        assert_eq!(rows[0].get("c"), Some(""));
    }

    #[test]
    fn test_extra_cells_ignored() {
        let (headers, rows) = parse_str("a,b\n1,2,3,4", ',').unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(rows[0].fields.len(), 2);
    }

    #[test]
    fn test_header_only_is_no_data() {
        let err = parse_str("a,b\n\n", ',').unwrap_err();
        assert!(matches!(err, CsvError::NoData));
    }

    #[test]
    fn test_empty_input_is_no_data() {
        let err = parse_str("", ',').unwrap_err();
        assert!(matches!(err, CsvError::NoData));
    }

    #[test]
    fn test_header_names_trimmed() {
        let (headers, _) = parse_str(" Email , First Name \nx,y", ',').unwrap();
        assert_eq!(headers, vec!["Email", "First Name"]);
    }

    #[test]
    fn test_line_numbers_survive_blank_lines() {
        let (_, rows) = parse_str("a,b\n\n1,2", ',').unwrap();
        assert_eq!(rows[0].line, 3);
    }

    #[test]
    fn test_detect_and_decode_latin1() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let encoding = detect_encoding(bytes);
        let decoded = decode_content(bytes, &encoding);
        assert!(decoded.starts_with("Soci"));
    }

    #[test]
    fn test_parse_file_roundtrip() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "Email,First Name\na@x.com,Alice\n").unwrap();

        let parsed = parse_file(tmp.path(), ',').unwrap();
        assert_eq!(parsed.encoding, "utf-8");
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].get("Email"), Some("a@x.com"));
    }
}
