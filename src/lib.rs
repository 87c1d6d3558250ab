// Report Engine
// Author: Gabriel Demetrios Lafis

//! # Report Engine
//!
//! Turns CSV rows into a structured report by running a declaratively
//! configured sequence of transformers over them.
//!
//! ## Features
//!
//! - CSV ingestion with per-line field count checks
//! - Date and date-time reformatting
//! - Group-by aggregation (sum, average)
//! - Multi-column arithmetic
//! - Row ordering
//! - printf-style string formatting
//! - JSON-lines and CSV output
//!
//! ## Example
//!
//! ```rust
//! use report_engine::{
//!     data::{DataSet, Row, Value},
//!     processing::{Aggregator, OrderBy, Pipeline},
//! };
//!
//! let mut rows = DataSet::from_rows(
//!     vec!["grp".to_string(), "val".to_string()],
//!     vec![
//!         Row::from_pairs([("grp", Value::text("b")), ("val", Value::text("5"))]),
//!         Row::from_pairs([("grp", Value::text("a")), ("val", Value::text("10"))]),
//!         Row::from_pairs([("grp", Value::text("a")), ("val", Value::text("20"))]),
//!     ],
//! );
//!
//! let pipeline = Pipeline::new("example")
//!     .add(Aggregator::new("grp").sum("val", "total"))
//!     .add(OrderBy::asc("grp"));
//!
//! pipeline.execute(&mut rows).unwrap();
//!
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows.data[0].get("total"), Some(&Value::Float(30.0)));
//! ```

pub mod data;
pub mod generator;
pub mod processing;
pub mod report;
pub mod storage;
pub mod utils;

// Re-export main types
pub use data::{DataSet, Row, Value};
pub use generator::{ReportGenerator, RunSummary};
pub use processing::{Pipeline, Transformer, TransformerConfig};
pub use report::{Column, Report};
pub use storage::{FileFormat, FileStorage};
pub use utils::Config;
