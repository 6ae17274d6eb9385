//! datatooltk - typed tabular data for the LaTeX datatool package
//!
//! This library reads CSV/TSV files and spreadsheet workbooks into a
//! [`Table`] of typed values, and writes tables back out as DTLTEX, CSV or
//! XLSX.
//!
//! # Features
//!
//! - Locale-aware classification of raw text into string, integer, decimal,
//!   currency, date, time and date-time values
//! - Spreadsheet cells typed from their number format (currency, dates, times)
//! - LaTeX-safe text mapping of literal content
//! - Background imports with progress reporting
//! - Undo/redo for table edits
//!
//! # Example
//!
//! ```no_run
//! use datatooltk::import::import_file;
//! use datatooltk::settings::Settings;
//! use std::path::Path;
//!
//! let settings = Settings::default();
//! let table = import_file(Path::new("scores.xlsx"), None, &settings)?;
//!
//! for column in table.columns() {
//!     println!("{}: {}", column.key, column.datum_type);
//! }
//! # Ok::<(), datatooltk::error::DatatoolError>(())
//! ```

pub mod cli;
pub mod core;
pub mod edit;
pub mod error;
pub mod excel;
pub mod import;
pub mod settings;
pub mod types;
pub mod worker;
pub mod writer;

// Re-export commonly used types
pub use crate::core::{classify, format, Datum, DatumType, Julian, Number};
pub use error::{DatatoolError, DatatoolResult};
pub use settings::Settings;
pub use types::{Column, Table};
