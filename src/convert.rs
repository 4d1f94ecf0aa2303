//! # Conversion Pipeline
//!
//! Loads the worksheet, derives the table and writes the SQL files. Both
//! output files are created (or truncated) up front and flushed before the
//! pipeline moves on; a failure half way leaves a truncated file behind.
use crate::database::column::ColumnTypeOverride;
use crate::database::insert::{write_inserts, ValueStyle};
use crate::database::naming::DEFAULT_MAX_LENGTH;
use crate::database::table::Table;
use crate::error::{ResultMessage, Sheet2SqlError};
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::worksheet::Worksheet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings of the SQL side of a conversion.
#[derive(Clone, Debug)]
pub struct Options {
    /// Sheet selection and loading rules
    pub criteria: Criteria,
    /// Longest generated column identifier
    pub max_identifier_length: usize,
    /// `PATTERN=TYPE` rules applied before inferred types
    pub column_types: Vec<ColumnTypeOverride>,
    /// Literal style of INSERT values
    pub value_style: ValueStyle,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            criteria: Criteria::default(),
            max_identifier_length: DEFAULT_MAX_LENGTH,
            column_types: Vec::new(),
            value_style: ValueStyle::Quoted,
        }
    }
}

/// One spreadsheet to SQL conversion request.
#[derive(Clone, Debug)]
pub struct Conversion {
    /// Spreadsheet to read
    pub input: PathBuf,
    /// File receiving the INSERT statements
    pub output: PathBuf,
    /// Target table name
    pub table_name: String,
    /// File receiving the CREATE TABLE statement, if wanted
    pub create_table: Option<PathBuf>,
    pub options: Options,
}

/// What a finished conversion produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Name of the sheet that was read
    pub sheet: String,
    /// Sanitized column identifiers, without `id`
    pub columns: Vec<String>,
    /// Number of INSERT statements written
    pub rows: usize,
}

/// Runs the whole pipeline: load, derive, write.
///
/// # Errors
///
/// Returns an error, prefixed with the offending path, when the spreadsheet
/// cannot be read or an output file cannot be written. Invalid options
/// (identifier length) fail before any file is created.
pub fn convert(conversion: &Conversion) -> Result<Summary, Sheet2SqlError> {
    let options = &conversion.options;
    let worksheet = Worksheet::load(&conversion.input, &options.criteria)
        .with_prefix(&conversion.input.to_string_lossy())?;
    info!(
        sheet = %worksheet.name,
        columns = worksheet.columns.len(),
        rows = worksheet.rows,
        "Read spreadsheet '{}'.",
        conversion.input.display()
    );

    let table = Table::derive(
        &conversion.table_name,
        &worksheet,
        options.max_identifier_length,
        &options.column_types,
    )?;
    for column in &table.columns {
        debug!(source = %column.source, name = %column.name, kind = column.kind.as_str(), "Derived column");
    }

    if let Some(path) = &conversion.create_table {
        write_file(path, |out| table.write_create_statement(out))?;
        info!("CREATE TABLE statement written to '{}'.", path.display());
    }

    let columns = table.column_names_with_id();
    let rows = write_file(&conversion.output, |out| {
        write_inserts(
            out,
            &conversion.table_name,
            &columns,
            &worksheet,
            options.value_style,
        )
    })?;
    info!(rows, "SQL file '{}' created successfully.", conversion.output.display());

    Ok(Summary {
        sheet: worksheet.name,
        columns: table.columns.into_iter().map(|column| column.name).collect(),
        rows,
    })
}

/// Creates `path`, hands a buffered writer to `write` and flushes it.
fn write_file<T, F>(path: &Path, write: F) -> Result<T, Sheet2SqlError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<T>,
{
    let result: std::io::Result<T> = (|| {
        let mut out = BufWriter::new(File::create(path)?);
        let value = write(&mut out)?;
        out.flush()?;
        Ok(value)
    })();
    result
        .map_err(Sheet2SqlError::from)
        .with_prefix(&path.to_string_lossy())
}
