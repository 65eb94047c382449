//! High-level pipeline API: read an export, clean every row, write documents.
//!
//! # Example
//!
//! ```rust,ignore
//! use arachnid::{clean_file, CleanOptions};
//! use std::path::Path;
//!
//! let result = clean_file(Path::new("arachnid.csv"), &CleanOptions::default())?;
//! println!("Cleaned {} records", result.records.len());
//! ```

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use super::executor::{execute, execute_parallel, RowPolicy, SkippedRow};
use super::mapping::FieldMapping;
use crate::error::{PipelineError, PipelineResult};
use crate::models::CleanedRecord;
use crate::parser::{parse_bytes, parse_file, ParseResult, ReaderOptions};

/// Environment variable naming a mapping JSON file.
pub const MAPPING_ENV: &str = "ARACHNID_MAPPING";

/// Environment variable overriding the preamble row count.
pub const SKIP_ROWS_ENV: &str = "ARACHNID_SKIP_ROWS";

/// Options for the cleaning pipeline
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Mapping file; the built-in Arachnid mapping when `None`
    pub mapping_path: Option<PathBuf>,

    /// CSV reading options
    pub reader: ReaderOptions,

    /// What to do with rows that fail to transform
    pub policy: RowPolicy,

    /// Transform rows on the rayon thread pool
    pub parallel: bool,
}

impl CleanOptions {
    /// Defaults overridden by `ARACHNID_MAPPING` / `ARACHNID_SKIP_ROWS`.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> PipelineResult<Self> {
        let _ = dotenvy::dotenv();

        let mut options = Self::default();
        if let Ok(path) = env::var(MAPPING_ENV) {
            options.mapping_path = Some(PathBuf::from(path));
        }
        if let Ok(raw) = env::var(SKIP_ROWS_ENV) {
            options.reader.skip_rows = raw.trim().parse().map_err(|_| {
                PipelineError::Config(format!("{SKIP_ROWS_ENV} must be a row count, got '{raw}'"))
            })?;
        }

        Ok(options)
    }

    /// Load the configured mapping.
    pub fn load_mapping(&self) -> PipelineResult<FieldMapping> {
        match &self.mapping_path {
            Some(path) => {
                let mapping = FieldMapping::from_file(path)?;
                info!(
                    path = %path.display(),
                    description = mapping.description(),
                    columns = mapping.columns().len(),
                    "loaded field mapping"
                );
                Ok(mapping)
            }
            None => Ok(FieldMapping::arachnid()),
        }
    }
}

/// Result of a complete cleaning run
#[derive(Debug, Clone)]
pub struct CleanResult {
    /// Cleaned records, in input order
    pub records: Vec<CleanedRecord>,

    /// Rows skipped under [`RowPolicy::Skip`]
    pub skipped: Vec<SkippedRow>,

    /// CSV parsing metadata
    pub csv_info: CsvInfo,
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Clean an export file.
pub fn clean_file(path: &Path, options: &CleanOptions) -> PipelineResult<CleanResult> {
    let mapping = options.load_mapping()?;
    let parse_result = parse_file(path, &options.reader)?;
    clean_parsed(parse_result, &mapping, options)
}

/// Clean export bytes.
pub fn clean_bytes(bytes: &[u8], options: &CleanOptions) -> PipelineResult<CleanResult> {
    let mapping = options.load_mapping()?;
    let parse_result = parse_bytes(bytes, &options.reader)?;
    clean_parsed(parse_result, &mapping, options)
}

/// Clean already parsed rows with an explicit mapping.
pub fn clean_records(
    parse_result: ParseResult,
    mapping: &FieldMapping,
    options: &CleanOptions,
) -> PipelineResult<CleanResult> {
    clean_parsed(parse_result, mapping, options)
}

fn clean_parsed(
    parse_result: ParseResult,
    mapping: &FieldMapping,
    options: &CleanOptions,
) -> PipelineResult<CleanResult> {
    let csv_info = CsvInfo {
        encoding: parse_result.encoding.clone(),
        delimiter: parse_result.delimiter,
        headers: parse_result.headers.clone(),
        row_count: parse_result.records.len(),
    };
    info!(
        encoding = %csv_info.encoding,
        columns = csv_info.headers.len(),
        rows = csv_info.row_count,
        "parsed export"
    );

    if let Err(missing) = mapping.validate_headers(&parse_result.headers) {
        warn!(missing = ?missing, "mapped columns absent from header");
    }

    let rows = &parse_result.records;
    let batch = if options.parallel {
        execute_parallel(rows, mapping, options.policy)
    } else {
        execute(rows, mapping, options.policy)
    }
    .map_err(|(row, source)| PipelineError::Row { row, source })?;

    info!(
        records = batch.records.len(),
        skipped = batch.skipped.len(),
        "cleaned export"
    );

    Ok(CleanResult {
        records: batch.records,
        skipped: batch.skipped,
        csv_info,
    })
}

/// Serialization format for cleaned records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    #[default]
    Json,
    /// One JSON document per line
    Jsonl,
}

/// Write records in the given format.
pub fn write_records<W: Write>(
    records: &[CleanedRecord],
    format: OutputFormat,
    mut writer: W,
) -> PipelineResult<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, records)?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            for record in records {
                serde_json::to_writer(&mut writer, record)?;
                writeln!(writer)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const HEADER: &str = "rdf-schema#label,URI,rdf-schema#comment,synonym,name,family_label,\
                          class_label,phylum_label,order_label,kingdom_label,genus_label,thumbnail";
    const PREAMBLE: &str = "http://www.w3.org/2000/01/rdf-schema#label,URI,\
                            http://www.w3.org/2000/01/rdf-schema#comment,synonym,name,family_label,\
                            class_label,phylum_label,order_label,kingdom_label,genus_label,thumbnail\n\
                            XMLSchema#string,XMLSchema#anyURI,XMLSchema#string,XMLSchema#string,\
                            XMLSchema#string,XMLSchema#string,XMLSchema#string,XMLSchema#string,\
                            XMLSchema#string,XMLSchema#string,XMLSchema#string,XMLSchema#anyURI\n\
                            NULL,NULL,NULL,NULL,NULL,NULL,NULL,NULL,NULL,NULL,NULL,NULL";
    const ARGIOPE: &str = "Argiope (spider),http://dbpedia.org/resource/Argiope_(spider),\
                           \" The genus Argiope includes rather large and spectacular spiders. \",\
                           NULL,Argiope,Orb-weaver spider,Arachnid,Arthropod,Spider,Animal,NULL,\
                           200px-Argiope_sp.jpg";
    const ARANEUS: &str = "Araneus,http://dbpedia.org/resource/Araneus,NULL,\
                           {Epeira | Aranea},Araneus angulatus,Orb-weaver spider,Arachnid,\
                           Arthropod,Spider,Animal,Araneus,NULL";
    const SHORT: &str = "Broken";

    fn export(rows: &[&str]) -> String {
        let mut csv = format!("{HEADER}\n{PREAMBLE}\n");
        for row in rows {
            csv.push_str(row);
            csv.push('\n');
        }
        csv
    }

    #[test]
    fn test_default_options() {
        let opts = CleanOptions::default();
        assert_eq!(opts.reader.skip_rows, 3);
        assert_eq!(opts.policy, RowPolicy::Abort);
        assert!(opts.mapping_path.is_none());
        assert!(!opts.parallel);
    }

    #[test]
    fn test_clean_bytes_end_to_end() {
        let csv = export(&[ARGIOPE, ARANEUS]);
        let result = clean_bytes(csv.as_bytes(), &CleanOptions::default()).unwrap();

        assert_eq!(result.csv_info.row_count, 2);
        assert_eq!(result.csv_info.delimiter, ',');
        assert_eq!(result.records.len(), 2);

        let argiope = &result.records[0];
        assert_eq!(argiope.label.as_deref(), Some("Argiope"));
        assert_eq!(argiope.name.as_deref(), Some("Argiope"));
        assert_eq!(argiope.synonym, None);
        assert_eq!(
            argiope.description.as_deref(),
            Some("The genus Argiope includes rather large and spectacular spiders.")
        );
        assert_eq!(argiope.classification.genus, None);

        let araneus = &result.records[1];
        assert_eq!(araneus.description, None);
        assert_eq!(araneus.name.as_deref(), Some("Araneus"));
        assert_eq!(
            araneus.synonym,
            Some(vec!["Epeira".to_string(), "Aranea".to_string()])
        );
        assert_eq!(araneus.classification.genus.as_deref(), Some("Araneus"));
    }

    #[test]
    fn test_short_row_aborts_by_default() {
        let csv = export(&[ARGIOPE, SHORT]);
        let err = clean_bytes(csv.as_bytes(), &CleanOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Row { row: 1, .. }));
    }

    #[test]
    fn test_short_row_skipped_with_skip_policy() {
        let csv = export(&[ARGIOPE, SHORT, ARANEUS]);
        let options = CleanOptions {
            policy: RowPolicy::Skip,
            parallel: true,
            ..Default::default()
        };
        let result = clean_bytes(csv.as_bytes(), &options).unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].row, 1);
        assert_eq!(result.skipped[0].missing_fields, vec!["URI".to_string()]);
    }

    #[test]
    fn test_clean_file_with_custom_mapping() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("arachnid.csv");
        std::fs::write(&csv_path, export(&[ARGIOPE])).unwrap();

        let mapping_path = dir.path().join("mapping.json");
        let mut mapping_file = std::fs::File::create(&mapping_path).unwrap();
        mapping_file
            .write_all(
                br#"{
                    "description": "label and order only",
                    "columns": [
                        { "source": "rdf-schema#label", "target": "label" },
                        { "source": "order_label", "target": "order", "kind": "classification" }
                    ]
                }"#,
            )
            .unwrap();

        let options = CleanOptions {
            mapping_path: Some(mapping_path),
            ..Default::default()
        };
        let result = clean_file(&csv_path, &options).unwrap();

        let record = &result.records[0];
        assert_eq!(record.label.as_deref(), Some("Argiope"));
        assert_eq!(record.uri, None);
        assert_eq!(record.classification.order.as_deref(), Some("Spider"));
        assert_eq!(record.classification.family, None);
    }

    #[test]
    fn test_clean_records_with_explicit_mapping() {
        use crate::models::{Rank, TopField};
        use crate::parser::parse_str;
        use crate::transform::mapping::ColumnMapping;

        let content = "Title;Link;Name;Genus\n\
                       Theridion (spider);http://dbpedia.org/resource/Theridion;NULL;Theridion\n\
                       Latrodectus;http://dbpedia.org/resource/Latrodectus;Black widow;NULL\n";
        let reader = ReaderOptions {
            delimiter: None,
            skip_rows: 0,
        };
        let parsed = parse_str(content, &reader, "utf-8".to_string()).unwrap();

        let mapping = FieldMapping::new(vec![
            ColumnMapping::field("Title", TopField::Label),
            ColumnMapping::field("Link", TopField::Uri),
            ColumnMapping::field("Name", TopField::Name),
            ColumnMapping::classification("Genus", Rank::Genus),
        ])
        .unwrap();

        let result = clean_records(parsed, &mapping, &CleanOptions::default()).unwrap();
        assert_eq!(result.csv_info.delimiter, ';');
        assert_eq!(result.csv_info.row_count, 2);
        assert_eq!(result.records.len(), 2);

        let theridion = &result.records[0];
        assert_eq!(theridion.label.as_deref(), Some("Theridion"));
        assert_eq!(theridion.name.as_deref(), Some("Theridion"));
        assert_eq!(theridion.description, None);
        assert_eq!(theridion.classification.genus.as_deref(), Some("Theridion"));

        let latrodectus = &result.records[1];
        assert_eq!(latrodectus.name.as_deref(), Some("Latrodectus"));
        assert_eq!(latrodectus.classification.genus, None);
    }

    #[test]
    fn test_missing_file() {
        let err = clean_file(Path::new("/nonexistent/arachnid.csv"), &CleanOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Csv(_)));
    }

    #[test]
    fn test_write_records_formats() {
        let csv = export(&[ARGIOPE, ARANEUS]);
        let result = clean_bytes(csv.as_bytes(), &CleanOptions::default()).unwrap();

        let mut jsonl = Vec::new();
        write_records(&result.records, OutputFormat::Jsonl, &mut jsonl).unwrap();
        let text = String::from_utf8(jsonl).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: CleanedRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, result.records[0]);

        let mut json = Vec::new();
        write_records(&result.records, OutputFormat::Json, &mut json).unwrap();
        let parsed: Vec<CleanedRecord> = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed, result.records);
    }
}
