//! # Spreadsheet Processing Module
//!
//! This module reads Excel (.xlsx, .xlsm, .xlsb, .xls, .xla, .xlam) and
//! OpenDocument (.ods) files through calamine, turning the selected sheet into
//! raw cells with positions. The typed, column-oriented view used by the SQL
//! side lives in [`worksheet`].
use crate::spreadsheet::range::Range;
use crate::spreadsheet::worksheet::Scalar;
use crate::spreadsheet::SpreadsheetError::{EmptySheet, InvalidCellValue, InvalidFileFormat};
use calamine::{
    open_workbook, Data, Ods, OdsError, Reader, Xls, XlsError, Xlsb, XlsbError, Xlsx, XlsxError,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

pub mod criteria;
pub mod range;
pub mod worksheet;

/// Custom error types for spreadsheet operations.
///
/// This enum covers all possible errors that can occur during spreadsheet
/// reading, parsing, and data extraction operations.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Error in Excel 2007+ format (.xlsx, .xlsm, .xlam)
    #[error("Invalid xlsx file format: {0}")]
    InvalidXlsxFileFormat(#[from] XlsxError),

    /// Error in Excel Binary format (.xlsb)
    #[error("Invalid xlsb file format: {0}")]
    InvalidXlsbFileFormat(#[from] XlsbError),

    /// Error in legacy Excel format (.xls, .xla)
    #[error("Invalid xls file format: {0}")]
    InvalidXlsFileFormat(#[from] XlsError),

    /// Error in OpenDocument format (.ods)
    #[error("Invalid ods file format: {0}")]
    InvalidOdsFileFormat(#[from] OdsError),

    /// Unsupported or unrecognized file format
    #[error("Cannot detect file format for '{name}'")]
    InvalidFileFormat { name: String },

    /// Requested sheet not found or spreadsheet is empty
    #[error("Sheet not found or spreadsheet is empty")]
    SheetNotFound,

    /// Sheet exists but contains no data
    #[error("Empty sheet or missing data")]
    EmptySheet,

    /// Invalid cell value that cannot be converted
    #[error("Invalid cell value at '{position}': {message}")]
    InvalidCellValue { position: String, message: String },
}

/// Type alias for buffered file reader
pub type FileReader = BufReader<File>;

/// Wrapper enum for different spreadsheet format readers.
///
/// This enum provides a unified interface over the various spreadsheet
/// formats supported by the calamine library.
pub enum Spreadsheet {
    /// Excel 2007+ format reader (.xlsx, .xlsm, .xlam)
    Xlsx(Xlsx<FileReader>),
    /// Excel Binary format reader (.xlsb)
    Xlsb(Xlsb<FileReader>),
    /// Legacy Excel format reader (.xls, .xla)
    Xls(Xls<FileReader>),
    /// OpenDocument format reader (.ods)
    Ods(Ods<FileReader>),
}

/// Convert 0-based row & column indexes to an Excel-style cell position.
///
/// # Arguments
///
/// * `row` - The 0-based row index
/// * `column` - The 0-based column index
///
/// # Returns
///
/// * `String` - Excel-style cell position in upper case, e.g. `B3`
pub fn cell_position(row: usize, column: usize) -> String {
    let mut column = column + 1;
    let mut position = String::new();
    while column > 0 {
        column -= 1;
        position.insert(0, (b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    position.push_str((row + 1).to_string().as_str());
    position
}

/// Represents a single cell in a spreadsheet with its position and value.
#[derive(Debug)]
pub struct Cell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub column: usize,
    /// The actual cell data from the spreadsheet
    pub value: Data,
}

impl Cell {
    /// Get Excel-style cell position.
    pub fn get_position(&self) -> String {
        cell_position(self.row, self.column)
    }

    /// Converts the raw calamine value into a [`Scalar`].
    ///
    /// Whole floats become integers, date and date-time cells become
    /// timestamps, and time-of-day or duration cells are rendered as
    /// `HH:MM:SS` text. Error cells become `Null` when `error_as_null` is set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCellValue` for an error cell when `error_as_null` is false.
    pub fn to_scalar(&self, error_as_null: bool) -> Result<Scalar, SpreadsheetError> {
        let scalar = match &self.value {
            Data::Empty => Scalar::Null,
            Data::Bool(value) => Scalar::Boolean(*value),
            Data::Int(value) => Scalar::Integer(*value),
            Data::Float(value) => float_to_scalar(*value),
            Data::String(value) => Scalar::Text(value.to_owned()),
            Data::DateTime(value) => {
                let days = value.as_f64();
                if value.is_duration() || (0.0..1.0).contains(&days) {
                    Scalar::Text(clock_string(days))
                } else {
                    value
                        .as_datetime()
                        .map(Scalar::Timestamp)
                        .unwrap_or_else(|| float_to_scalar(days))
                }
            }
            Data::DateTimeIso(value) => parse_iso_datetime(value)
                .map(Scalar::Timestamp)
                .unwrap_or_else(|| Scalar::Text(value.to_owned())),
            Data::DurationIso(value) => Scalar::Text(value.to_owned()),
            Data::Error(error) if !error_as_null => {
                return Err(InvalidCellValue {
                    position: self.get_position(),
                    message: error.to_string(),
                })
            }
            _ => Scalar::Null,
        };
        Ok(scalar)
    }
}

/// Excel stores every number as a double; whole values are integers.
fn float_to_scalar(value: f64) -> Scalar {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.2e18 {
        Scalar::Integer(value as i64)
    } else {
        Scalar::Float(value)
    }
}

/// Formats a fraction of days as `HH:MM:SS`, keeping milliseconds when present.
fn clock_string(days: f64) -> String {
    let mut hours = (days * 86_400_000f64).round() as i64;
    let milliseconds = hours % 1_000;
    hours /= 1_000;
    let seconds = hours % 60;
    hours /= 60;
    let minutes = hours % 60;
    hours /= 60;
    if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Parses the ISO 8601 date and date-time strings found in OpenDocument files.
fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Represents a spreadsheet sheet with its data and boundaries.
///
/// This struct contains all the used cells of a sheet along with the
/// boundaries that the loader reads from.
#[derive(Debug)]
pub struct Sheet {
    /// Sheet name inside the workbook
    pub name: String,
    /// Whether the sheet has a header row
    pub with_header: bool,
    /// Starting row index (0-based, inclusive)
    pub row_lower_bound: usize,
    /// Ending row index (0-based, inclusive)
    pub row_upper_bound: usize,
    /// Starting column index (0-based, inclusive)
    pub column_lower_bound: usize,
    /// Ending column index (0-based, inclusive)
    pub column_upper_bound: usize,
    /// All cells in the sheet
    pub cells: Vec<Cell>,
    /// Index mapping from (row, column) to cell vector position
    pub indexes: HashMap<(usize, usize), usize>,
}

/// Macro to extract range data from calamine readers.
///
/// Every reader hands back a `calamine::Range<Data>`; used cells are stored
/// with absolute positions so that Excel-style ranges can be applied later.
macro_rules! extract_range {
    ($name:expr, $with_header:expr, $range:expr) => {
        match ($range.start(), $range.end()) {
            (Some(start), Some(end)) if !$range.is_empty() => {
                let start = (start.0 as usize, start.1 as usize);
                let end = (end.0 as usize, end.1 as usize);
                let mut cells: Vec<Cell> = Vec::new();
                let mut indexes: HashMap<(usize, usize), usize> = HashMap::new();

                for (row, column, value) in $range.used_cells() {
                    let row = start.0 + row;
                    let column = start.1 + column;
                    indexes.insert((row, column), cells.len());
                    cells.push(Cell {
                        row,
                        column,
                        value: value.to_owned(),
                    })
                }
                Ok(Sheet {
                    name: $name.to_owned(),
                    with_header: $with_header,
                    row_lower_bound: start.0,
                    row_upper_bound: end.0,
                    column_lower_bound: start.1,
                    column_upper_bound: end.1,
                    cells,
                    indexes,
                })
            }
            _ => Err(EmptySheet),
        }
    };
}

impl Spreadsheet {
    /// Opens a spreadsheet file and returns the appropriate reader.
    ///
    /// The file format is detected from the file extension:
    /// - `.xlsx`, `.xlsm`, `.xlam` - Excel 2007+ format
    /// - `.xlsb` - Excel Binary format
    /// - `.xls`, `.xla` - Legacy Excel format
    /// - `.ods` - OpenDocument format
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file format is not supported
    /// - The file cannot be opened or read
    /// - The file is corrupted or invalid
    pub fn open<P>(path: P) -> Result<Spreadsheet, SpreadsheetError>
    where
        P: AsRef<Path>,
    {
        let extension = path
            .as_ref()
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") | Some("xlam") => Ok(Self::Xlsx(open_workbook(path)?)),
            Some("xlsb") => Ok(Self::Xlsb(open_workbook(path)?)),
            Some("xls") | Some("xla") => Ok(Self::Xls(open_workbook(path)?)),
            Some("ods") => Ok(Self::Ods(open_workbook(path)?)),
            _ => Err(InvalidFileFormat {
                name: path.as_ref().to_string_lossy().to_string(),
            }),
        }
    }

    /// Returns the names of all sheets in the spreadsheet, in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        match self {
            Self::Xlsx(xlsx) => xlsx.sheet_names(),
            Self::Xlsb(xlsb) => xlsb.sheet_names(),
            Self::Xls(xls) => xls.sheet_names(),
            Self::Ods(ods) => ods.sheet_names(),
        }
    }

    /// Opens a specific sheet from the spreadsheet.
    ///
    /// # Arguments
    ///
    /// * `sheet_name` - Name of the sheet to open
    /// * `with_header` - Whether the first row should be treated as headers
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The specified sheet is not found
    /// - The sheet is empty or contains no data
    /// - There's an error reading the sheet data
    pub fn open_sheet(
        &mut self,
        sheet_name: &str,
        with_header: bool,
    ) -> Result<Sheet, SpreadsheetError> {
        match self {
            Self::Xlsx(xlsx) => {
                let range = xlsx.worksheet_range(sheet_name)?;
                extract_range!(sheet_name, with_header, range)
            }
            Self::Xlsb(xlsb) => {
                let range = xlsb.worksheet_range(sheet_name)?;
                extract_range!(sheet_name, with_header, range)
            }
            Self::Xls(xls) => {
                let range = xls.worksheet_range(sheet_name)?;
                extract_range!(sheet_name, with_header, range)
            }
            Self::Ods(ods) => {
                let range = ods.worksheet_range(sheet_name)?;
                extract_range!(sheet_name, with_header, range)
            }
        }
    }
}

impl Sheet {
    /// Narrows the sheet boundaries to an Excel-style range.
    ///
    /// Unbounded sides of the range keep the boundaries of the used area.
    pub fn restrict(&mut self, range: &Range) {
        if let Some(column_lower_bound) = range.column_lower_bound {
            self.column_lower_bound = column_lower_bound;
        }
        if let Some(row_lower_bound) = range.row_lower_bound {
            self.row_lower_bound = row_lower_bound;
        }
        if let Some(column_upper_bound) = range.column_upper_bound {
            self.column_upper_bound = column_upper_bound;
        }
        if let Some(row_upper_bound) = range.row_upper_bound {
            self.row_upper_bound = row_upper_bound;
        }
    }

    /// Gets a cell at the specified position.
    ///
    /// Returns None if the position is outside the sheet boundaries
    /// or if no cell exists at that position.
    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        if self.row_lower_bound <= row
            && row <= self.row_upper_bound
            && self.column_lower_bound <= column
            && column <= self.column_upper_bound
        {
            self.indexes
                .get(&(row, column))
                .and_then(|index| self.cells.get(*index))
        } else {
            None
        }
    }

    /// Range of column indexes inside the sheet boundaries.
    pub fn columns(&self) -> std::ops::RangeInclusive<usize> {
        self.column_lower_bound..=self.column_upper_bound
    }

    /// Range of row indexes holding data, i.e. without the header row.
    pub fn data_rows(&self) -> std::ops::Range<usize> {
        let lower = self.row_lower_bound + usize::from(self.with_header);
        lower..(self.row_upper_bound + 1).max(lower)
    }

    /// Extracts the column names of the sheet.
    ///
    /// If headers are enabled, reads the first row and renders every value as
    /// text; a missing or empty header cell is named `Unnamed: <n>` with `n`
    /// the 0-based column offset. If headers are disabled, generates default
    /// column names (column1, column2, etc.).
    pub fn header(&self) -> Vec<String> {
        self.columns()
            .enumerate()
            .map(|(offset, column)| {
                if !self.with_header {
                    return format!("column{}", offset + 1);
                }
                self.get(self.row_lower_bound, column)
                    .and_then(|cell| cell.to_scalar(true).ok())
                    .and_then(|scalar| scalar.to_text())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| format!("Unnamed: {offset}"))
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Builds a sheet from `(row, column, value)` triples.
    pub(crate) fn sheet(with_header: bool, cells: Vec<(usize, usize, Data)>) -> Sheet {
        let mut sheet = Sheet {
            name: "Sheet1".to_owned(),
            with_header,
            row_lower_bound: usize::MAX,
            row_upper_bound: 0,
            column_lower_bound: usize::MAX,
            column_upper_bound: 0,
            cells: Vec::new(),
            indexes: HashMap::new(),
        };
        for (row, column, value) in cells {
            sheet.row_lower_bound = sheet.row_lower_bound.min(row);
            sheet.row_upper_bound = sheet.row_upper_bound.max(row);
            sheet.column_lower_bound = sheet.column_lower_bound.min(column);
            sheet.column_upper_bound = sheet.column_upper_bound.max(column);
            sheet.indexes.insert((row, column), sheet.cells.len());
            sheet.cells.push(Cell { row, column, value });
        }
        sheet
    }

    fn cell(value: Data) -> Cell {
        Cell {
            row: 4,
            column: 27,
            value,
        }
    }

    #[test]
    fn positions() {
        assert_eq!(cell_position(0, 0), "A1");
        assert_eq!(cell_position(9, 25), "Z10");
        assert_eq!(cell_position(4, 27), "AB5");
        assert_eq!(cell_position(0, 702), "AAA1");
    }

    #[test]
    fn whole_floats_are_integers() {
        assert_eq!(cell(Data::Float(42.0)).to_scalar(true).unwrap(), Scalar::Integer(42));
        assert_eq!(cell(Data::Float(4.5)).to_scalar(true).unwrap(), Scalar::Float(4.5));
        assert_eq!(cell(Data::Int(-7)).to_scalar(true).unwrap(), Scalar::Integer(-7));
    }

    #[test]
    fn iso_values() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        assert_eq!(
            cell(Data::DateTimeIso("2024-03-01T08:15:00".to_owned()))
                .to_scalar(true)
                .unwrap(),
            Scalar::Timestamp(expected)
        );
        assert_eq!(
            cell(Data::DateTimeIso("2024-03-01".to_owned())).to_scalar(true).unwrap(),
            Scalar::Timestamp(expected.date().and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(
            cell(Data::DurationIso("PT1H30M".to_owned())).to_scalar(true).unwrap(),
            Scalar::Text("PT1H30M".to_owned())
        );
    }

    #[test]
    fn error_cells() {
        let error = cell(Data::Error(calamine::CellErrorType::Div0));
        assert_eq!(error.to_scalar(true).unwrap(), Scalar::Null);
        let message = error.to_scalar(false).unwrap_err().to_string();
        assert!(message.starts_with("Invalid cell value at 'AB5'"), "{message}");
    }

    #[test]
    fn clock_strings() {
        assert_eq!(clock_string(0.5), "12:00:00");
        assert_eq!(clock_string(0.75 + 1.0 / 86_400.0), "18:00:01");
        assert_eq!(clock_string(1.25), "30:00:00");
    }

    #[test]
    fn header_names() {
        let sheet = sheet(
            true,
            vec![
                (0, 0, Data::String("Name".to_owned())),
                (0, 2, Data::Float(2024.0)),
                (1, 0, Data::String("Ada".to_owned())),
                (1, 1, Data::Int(1)),
                (1, 2, Data::Int(2)),
            ],
        );
        assert_eq!(sheet.header(), vec!["Name", "Unnamed: 1", "2024"]);
        assert_eq!(sheet.data_rows(), 1..2);
    }

    #[test]
    fn generated_header_names() {
        let sheet = sheet(
            false,
            vec![(2, 1, Data::Int(1)), (3, 3, Data::Int(2))],
        );
        assert_eq!(sheet.header(), vec!["column1", "column2", "column3"]);
        assert_eq!(sheet.data_rows(), 2..4);
    }

    #[test]
    fn restrict_to_range() {
        let mut sheet = sheet(
            true,
            vec![
                (0, 0, Data::String("a".to_owned())),
                (0, 1, Data::String("b".to_owned())),
                (0, 2, Data::String("c".to_owned())),
                (1, 0, Data::Int(1)),
                (1, 1, Data::Int(2)),
                (1, 2, Data::Int(3)),
            ],
        );
        sheet.restrict(&Range::try_from("B:C").unwrap());
        assert_eq!(sheet.header(), vec!["b", "c"]);
        assert!(sheet.get(1, 0).is_none());
        assert!(sheet.get(1, 1).is_some());
    }

    #[test]
    fn header_only_sheet_has_no_rows() {
        let sheet = sheet(true, vec![(0, 0, Data::String("a".to_owned()))]);
        assert!(sheet.data_rows().is_empty());
    }

    #[test]
    fn unknown_extension() {
        let error = Spreadsheet::open("people.csv").err().unwrap();
        assert_eq!(error.to_string(), "Cannot detect file format for 'people.csv'");
    }
}
