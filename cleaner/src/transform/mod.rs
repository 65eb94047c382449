//! Transformation module.
//!
//! - Mapping: source column to canonical field configuration
//! - Operations: per-value cleaning rules
//! - Executor: the record transformer and batch execution
//! - Pipeline: file-level driver

pub mod executor;
pub mod mapping;
pub mod operations;
pub mod pipeline;

pub use executor::{execute, execute_parallel, transform, BatchResult, RowPolicy, SkippedRow};
pub use mapping::{ColumnMapping, FieldKind, FieldMapping, Target};
pub use operations::rules_description;
pub use pipeline::*;
