//! # Arachnid - DBpedia infobox export cleaner
//!
//! Cleans DBpedia CSV exports for the Arachnid class into nested documents
//! ready for a document store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform   │────▶│  JSON docs  │
//! │  (DBpedia)  │     │ (+preamble) │     │  (mapping)   │     │ (json/jsonl)│
//! └─────────────┘     └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use arachnid::{transform, FieldMapping, RawRecord};
//!
//! let mapping = FieldMapping::arachnid();
//! let raw: RawRecord = read_row_somehow();
//! let record = transform(&raw, &mapping)?;
//! println!("{:?}", record.classification);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Raw and cleaned record types
//! - [`parser`] - CSV reading with encoding/delimiter detection
//! - [`transform`] - Mapping, cleaning rules, transformer, pipeline
//! - [`logging`] - Subscriber setup for the binary

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Logging
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, MappingError, PipelineError, TransformError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Classification, CleanedRecord, Rank, RawRecord, TopField, NULL_SENTINEL};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes, parse_file, parse_str,
    ParseResult, ReaderOptions, DEFAULT_PREAMBLE_ROWS,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    execute, execute_parallel, rules_description, transform, BatchResult, ColumnMapping,
    FieldKind, FieldMapping, RowPolicy, SkippedRow, Target,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    clean_bytes, clean_file, clean_records, write_records, CleanOptions, CleanResult, CsvInfo,
    OutputFormat,
};
