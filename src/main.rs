//! Command-line interface for sheet2sql
//!
//! # Usage Examples
//!
//! ```bash
//! # INSERT statements only
//! sheet2sql customers.xlsx customers.sql customers
//!
//! # INSERT statements plus the CREATE TABLE statement
//! sheet2sql customers.xlsx customers.sql customers --create-table customers_table.sql
//!
//! # First sheet matching "Orders*", data in B3:H500, ZIP codes kept as text
//! sheet2sql book.xlsx orders.sql orders --sheet 'Orders*' --range B3:H500 \
//!   --column-type 'Zip*=text' --typed-values
//! ```
//!
//! Set `RUST_LOG=debug` to see every derived column.

use anyhow::Context;
use clap::builder::{NonEmptyStringValueParser, TypedValueParser};
use clap::Parser;
use glob::Pattern;
use sheet2sql::database::naming::{DEFAULT_MAX_LENGTH, MIN_MAX_LENGTH};
use sheet2sql::{convert, ColumnTypeOverride, Conversion, Criteria, Options, Range, ValueStyle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sheet2sql")]
#[command(about = "Convert an Excel worksheet to MySQL INSERT statements")]
#[command(long_about = None)]
struct Cli {
    /// Path to the input spreadsheet (.xlsx, .xlsm, .xlsb, .xls, .ods)
    input_file: PathBuf,

    /// Path to the output SQL file
    output_file: PathBuf,

    /// Name of the SQL table
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    table_name: String,

    /// Path to the table SQL file receiving the CREATE TABLE statement
    #[arg(long, alias = "create_table", value_name = "PATH")]
    create_table: Option<PathBuf>,

    /// Glob pattern selecting the sheet (default: first sheet)
    #[arg(long, value_name = "PATTERN")]
    sheet: Option<Pattern>,

    /// Excel-style range to read, e.g. A1:F200, B:D or 3:
    #[arg(long, value_name = "RANGE")]
    range: Option<Range>,

    /// Treat the first row as data and name columns column1, column2, ...
    #[arg(long)]
    no_header: bool,

    /// Number of data rows inspected for type inference (default: all)
    #[arg(long, value_name = "N")]
    analyze_rows: Option<usize>,

    /// Maximum length of generated column identifiers
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_MAX_LENGTH,
        value_parser = clap::value_parser!(u16).range(MIN_MAX_LENGTH as i64..=DEFAULT_MAX_LENGTH as i64).map(usize::from)
    )]
    max_identifier_length: usize,

    /// Force the SQL type of columns whose name matches PATTERN (repeatable)
    #[arg(long = "column-type", value_name = "PATTERN=TYPE")]
    column_types: Vec<ColumnTypeOverride>,

    /// Write numbers and booleans as unquoted literals
    #[arg(long)]
    typed_values: bool,

    /// Leave out rows where every cell is empty
    #[arg(long)]
    skip_empty_rows: bool,

    /// Fail on error cells such as #N/A instead of writing NULL
    #[arg(long)]
    strict_cell_errors: bool,
}

impl Cli {
    fn into_conversion(self) -> Conversion {
        Conversion {
            input: self.input_file,
            output: self.output_file,
            table_name: self.table_name,
            create_table: self.create_table,
            options: Options {
                criteria: Criteria {
                    sheet_name_pattern: self.sheet,
                    range: self.range,
                    header: !self.no_header,
                    analyze_rows: self.analyze_rows,
                    error_as_null: !self.strict_cell_errors,
                    skip_empty_rows: self.skip_empty_rows,
                },
                max_identifier_length: self.max_identifier_length,
                column_types: self.column_types,
                value_style: if self.typed_values {
                    ValueStyle::Typed
                } else {
                    ValueStyle::Quoted
                },
            },
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let conversion = Cli::parse().into_conversion();
    let summary = convert(&conversion).with_context(|| {
        format!(
            "Failed to convert '{}' into table '{}'",
            conversion.input.display(),
            conversion.table_name
        )
    })?;
    tracing::debug!(sheet = %summary.sheet, columns = ?summary.columns, rows = summary.rows, "Done");
    Ok(())
}
