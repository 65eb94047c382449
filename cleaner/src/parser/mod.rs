//! CSV reader for DBpedia exports with encoding and delimiter auto-detection.
//!
//! The export layout is one header line naming the columns, a fixed block of
//! preamble rows (type URIs, datatypes, ...), then one data row per resource.
//! Rows come out as [`RawRecord`]s keyed by header. No cleaning happens here.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{CsvError, CsvResult};
use crate::models::RawRecord;

/// Preamble rows that follow the header line in DBpedia infobox exports.
pub const DEFAULT_PREAMBLE_ROWS: usize = 3;

/// How to read an export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Delimiter; auto-detected from the header line when `None`.
    pub delimiter: Option<char>,
    /// Rows after the header to discard before data starts.
    pub skip_rows: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            skip_rows: DEFAULT_PREAMBLE_ROWS,
        }
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Data rows, in file order
    pub records: Vec<RawRecord>,
    /// Detected encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse an export file with encoding auto-detection.
pub fn parse_file(path: &Path, options: &ReaderOptions) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "read export file");

    parse_bytes(&bytes, options)
}

/// Parse export bytes with encoding auto-detection.
pub fn parse_bytes(bytes: &[u8], options: &ReaderOptions) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    parse_str(&content, options, encoding)
}

/// Parse already decoded export content.
pub fn parse_str(content: &str, options: &ReaderOptions, encoding: String) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delimiter = options
        .delimiter
        .unwrap_or_else(|| detect_delimiter(content));
    if !delimiter.is_ascii() {
        return Err(CsvError::InvalidDelimiter(delimiter));
    }
    let delimiter_byte = delimiter as u8;
    debug!(%encoding, delimiter = %delimiter.escape_default(), "parsing CSV");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = reader.records();

    for found in 0..options.skip_rows {
        match rows.next() {
            Some(row) => {
                row?;
            }
            None => {
                return Err(CsvError::TruncatedPreamble {
                    expected: options.skip_rows,
                    found,
                })
            }
        }
    }

    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        // Short rows leave trailing columns absent
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect();
        records.push(record);
    }

    debug!(rows = records.len(), columns = headers.len(), "parsed CSV");

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_preamble() -> ReaderOptions {
        ReaderOptions {
            delimiter: None,
            skip_rows: 0,
        }
    }

    #[test]
    fn test_simple_csv() {
        let csv = "name,age\nAlice,30\nBob,25";
        let result = parse_str(csv, &no_preamble(), "utf-8".into()).unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0]["name"], "Alice");
        assert_eq!(result.records[1]["age"], "25");
        assert_eq!(result.headers, vec!["name", "age"]);
    }

    #[test]
    fn test_preamble_rows_skipped() {
        let csv = "URI,name\n\
                   http://www.w3.org/2002/07/owl#Thing,XMLSchema#string\n\
                   uri,string\n\
                   NULL,NULL\n\
                   http://dbpedia.org/resource/Argiope_(spider),Argiope";
        let result = parse_str(csv, &ReaderOptions::default(), "utf-8".into()).unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0]["name"], "Argiope");
    }

    #[test]
    fn test_truncated_preamble() {
        let csv = "URI,name\nuri,string";
        let err = parse_str(csv, &ReaderOptions::default(), "utf-8".into()).unwrap_err();
        assert!(matches!(err, CsvError::TruncatedPreamble { expected: 3, found: 1 }));
    }

    #[test]
    fn test_quoted_values_keep_delimiter() {
        let csv = "label,comment\n\"Argiope (spider)\",\"Large, spectacular spiders\"";
        let result = parse_str(csv, &no_preamble(), "utf-8".into()).unwrap();

        assert_eq!(result.records[0]["label"], "Argiope (spider)");
        assert_eq!(result.records[0]["comment"], "Large, spectacular spiders");
    }

    #[test]
    fn test_values_not_trimmed() {
        let csv = "a,b\n  padded  ,NULL";
        let result = parse_str(csv, &no_preamble(), "utf-8".into()).unwrap();

        assert_eq!(result.records[0]["a"], "  padded  ");
        assert_eq!(result.records[0]["b"], "NULL");
    }

    #[test]
    fn test_short_row_leaves_columns_absent() {
        let csv = "a,b,c\n1,2";
        let result = parse_str(csv, &no_preamble(), "utf-8".into()).unwrap();

        assert_eq!(result.records[0]["b"], "2");
        assert!(!result.records[0].contains_key("c"));
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "a,b\n1,2,3,4";
        let result = parse_str(csv, &no_preamble(), "utf-8".into()).unwrap();

        assert_eq!(result.records[0].len(), 2);
    }

    #[test]
    fn test_empty_csv_error() {
        let err = parse_str("", &no_preamble(), "utf-8".into()).unwrap_err();
        assert!(matches!(err, CsvError::EmptyFile));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let options = ReaderOptions {
            delimiter: Some('§'),
            skip_rows: 0,
        };
        let err = parse_str("a§b\n1§2", &options, "utf-8".into()).unwrap_err();
        assert!(matches!(err, CsvError::InvalidDelimiter('§')));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse_bytes() {
        let csv = "\u{feff}name;age\nAlice;30";
        let result = parse_bytes(csv.as_bytes(), &no_preamble()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.headers, vec!["name", "age"]);
        assert_eq!(result.records[0]["name"], "Alice");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }
}
