//! # sheet2sql
//!
//! Converts a spreadsheet worksheet into MySQL statements: an optional
//! `CREATE TABLE` derived from the header row and the inferred column types,
//! and one `INSERT` per data row.
//!
//! ## Features
//!
//! - **Multi-format support**: Read Excel files (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.xla`, `.xlam`)
//!   and OpenDocument spreadsheet files (`.ods`)
//! - **Type inference**: Every column is typed once at load time as text, integer, float,
//!   boolean or timestamp, and mapped to `TEXT`, `INT`, `FLOAT`, `BOOLEAN` or `DATETIME`
//! - **Safe identifiers**: Column names are reduced to `[A-Za-z0-9_]`, truncated and
//!   deduplicated case-insensitively
//! - **Custom data ranges**: Restrict the sheet to an Excel-style range such as `B2:F200`
//!
//! ## Pipeline
//!
//! 1. [`Worksheet::load`] reads the selected sheet into typed columns
//! 2. [`Table::derive`] sanitizes names and picks SQL types
//! 3. [`write_inserts`] writes one statement per row
//!
//! [`convert`] runs all three and writes the output files.

pub mod convert;
pub mod database;
pub mod error;
pub mod spreadsheet;

pub use crate::convert::{convert, Conversion, Options, Summary};
pub use crate::database::column::{ColumnType, ColumnTypeOverride};
pub use crate::database::insert::{write_inserts, ValueStyle};
pub use crate::database::naming::{sanitize_column_names, ColumnNamer};
pub use crate::database::table::Table;
pub use crate::error::Sheet2SqlError;
pub use crate::spreadsheet::criteria::Criteria;
pub use crate::spreadsheet::range::Range;
pub use crate::spreadsheet::worksheet::{Scalar, ScalarType, Worksheet};
