//! Column-oriented, typed view of a single sheet.
//!
//! Loading decides the scalar type of every column once; everything after
//! that reads the worksheet without touching the spreadsheet again.
use crate::error::Sheet2SqlError;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::{Sheet, Spreadsheet, SpreadsheetError};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::debug;

/// A single cell value after loading.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(NaiveDateTime),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Scalar type of this value, None for `Null`.
    pub fn kind(&self) -> Option<ScalarType> {
        match self {
            Scalar::Null => None,
            Scalar::Text(_) => Some(ScalarType::Text),
            Scalar::Integer(_) => Some(ScalarType::Integer),
            Scalar::Float(_) => Some(ScalarType::Float),
            Scalar::Boolean(_) => Some(ScalarType::Boolean),
            Scalar::Timestamp(_) => Some(ScalarType::Timestamp),
        }
    }

    /// Text rendering of the value, None for `Null`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Text(value) => Some(value.to_owned()),
            Scalar::Integer(value) => Some(value.to_string()),
            Scalar::Float(value) => Some(float_text(*value)),
            Scalar::Boolean(value) => Some(if *value { "TRUE" } else { "FALSE" }.to_owned()),
            Scalar::Timestamp(value) => Some(value.to_string()),
        }
    }
}

/// Shortest round-trip rendering; whole values keep a `.0` so floats stay floats.
pub(crate) fn float_text(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{text}.0")
    } else {
        text
    }
}

/// Inferred scalar type of a worksheet column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScalarType {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    /// No value to infer from
    Unknown,
}

impl ScalarType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Text => "text",
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Boolean => "boolean",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Unknown => "unknown",
        }
    }

    /// Detects the most specific common type of a sequence of values.
    ///
    /// Type inference priority (most to least specific):
    /// 1. Boolean - if all values are boolean
    /// 2. Integer - if all values are integers
    /// 3. Float - if all values are numeric
    /// 4. Timestamp - if all values are timestamps
    /// 5. Text - fallback for mixed or string data
    ///
    /// Nulls are ignored; a sequence without values is `Unknown`.
    pub fn detect<'a>(values: impl IntoIterator<Item = &'a Scalar>) -> ScalarType {
        let kinds: Vec<ScalarType> = values.into_iter().filter_map(Scalar::kind).collect();
        if kinds.is_empty() {
            ScalarType::Unknown
        } else if kinds.iter().all(|kind| *kind == ScalarType::Boolean) {
            ScalarType::Boolean
        } else if kinds.iter().all(|kind| *kind == ScalarType::Integer) {
            ScalarType::Integer
        } else if kinds
            .iter()
            .all(|kind| matches!(kind, ScalarType::Integer | ScalarType::Float))
        {
            ScalarType::Float
        } else if kinds.iter().all(|kind| *kind == ScalarType::Timestamp) {
            ScalarType::Timestamp
        } else {
            ScalarType::Text
        }
    }
}

/// A named column with its inferred type and one value per row.
#[derive(Clone, Debug)]
pub struct WorksheetColumn {
    /// Column name as found in the header row
    pub name: String,
    /// Inferred scalar type
    pub kind: ScalarType,
    /// Values in row order
    pub values: Vec<Scalar>,
}

impl WorksheetColumn {
    /// Aligns numeric values with the inferred column type.
    fn normalize(&mut self) {
        for value in self.values.iter_mut() {
            let aligned = match (self.kind, &*value) {
                (ScalarType::Float, Scalar::Integer(integer)) => Scalar::Float(*integer as f64),
                (ScalarType::Integer, Scalar::Float(float))
                    if float.fract() == 0.0 && float.abs() < 9.2e18 =>
                {
                    Scalar::Integer(*float as i64)
                }
                _ => continue,
            };
            *value = aligned;
        }
    }
}

/// In-memory tabular representation of the selected sheet.
#[derive(Clone, Debug)]
pub struct Worksheet {
    /// Sheet name inside the workbook
    pub name: String,
    /// Columns in sheet order
    pub columns: Vec<WorksheetColumn>,
    /// Number of data rows
    pub rows: usize,
}

impl Worksheet {
    /// Opens the spreadsheet at `path` and loads the sheet selected by `criteria`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, no sheet matches the
    /// criteria, the sheet is empty, or a cell error is found while
    /// `error_as_null` is disabled.
    pub fn load(path: &Path, criteria: &Criteria) -> Result<Worksheet, Sheet2SqlError> {
        let mut spreadsheet = Spreadsheet::open(path)?;
        let sheet_names = spreadsheet.sheet_names();
        let sheet_name = criteria
            .select(&sheet_names)
            .ok_or(SpreadsheetError::SheetNotFound)?
            .to_owned();
        debug!(sheet = %sheet_name, "Opening sheet");
        let mut sheet = spreadsheet.open_sheet(&sheet_name, criteria.header)?;
        if let Some(range) = &criteria.range {
            sheet.restrict(range);
        }
        let worksheet = Worksheet::from_sheet(&sheet, criteria)?;
        debug!(
            sheet = %worksheet.name,
            columns = worksheet.columns.len(),
            rows = worksheet.rows,
            "Loaded worksheet"
        );
        Ok(worksheet)
    }

    /// Builds the typed worksheet from raw sheet cells.
    pub fn from_sheet(sheet: &Sheet, criteria: &Criteria) -> Result<Worksheet, SpreadsheetError> {
        let mut columns: Vec<WorksheetColumn> = sheet
            .header()
            .into_iter()
            .map(|name| WorksheetColumn {
                name,
                kind: ScalarType::Unknown,
                values: Vec::new(),
            })
            .collect();

        let mut rows = 0;
        for row in sheet.data_rows() {
            let values = sheet
                .columns()
                .map(|column| {
                    sheet
                        .get(row, column)
                        .map_or(Ok(Scalar::Null), |cell| cell.to_scalar(criteria.error_as_null))
                })
                .collect::<Result<Vec<Scalar>, SpreadsheetError>>()?;
            if criteria.skip_empty_rows && values.iter().all(Scalar::is_null) {
                continue;
            }
            for (column, value) in columns.iter_mut().zip(values) {
                column.values.push(value);
            }
            rows += 1;
        }

        let analyze_rows = criteria.analyze_rows.unwrap_or(usize::MAX);
        for column in columns.iter_mut() {
            column.kind = ScalarType::detect(column.values.iter().take(analyze_rows));
            column.normalize();
            debug!(column = %column.name, kind = column.kind.as_str(), "Inferred column type");
        }

        Ok(Worksheet {
            name: sheet.name.to_owned(),
            columns,
            rows,
        })
    }

    /// Values of the row at `index`, in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = &Scalar> + '_ {
        self.columns.iter().map(move |column| &column.values[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::tests::sheet;
    use calamine::Data;

    fn text(value: &str) -> Data {
        Data::String(value.to_owned())
    }

    #[test]
    fn detect_types() {
        use Scalar::*;
        let stamp = NaiveDateTime::parse_from_str("2024-01-05 10:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(ScalarType::detect(&[Text("a".into()), Null]), ScalarType::Text);
        assert_eq!(ScalarType::detect(&[Integer(1), Null, Integer(2)]), ScalarType::Integer);
        assert_eq!(ScalarType::detect(&[Integer(1), Float(2.5)]), ScalarType::Float);
        assert_eq!(ScalarType::detect(&[Boolean(true), Boolean(false)]), ScalarType::Boolean);
        assert_eq!(ScalarType::detect(&[Timestamp(stamp)]), ScalarType::Timestamp);
        assert_eq!(ScalarType::detect(&[Boolean(true), Integer(1)]), ScalarType::Text);
        assert_eq!(ScalarType::detect(&[Null, Null]), ScalarType::Unknown);
        assert_eq!(ScalarType::detect(&[]), ScalarType::Unknown);
    }

    #[test]
    fn type_names() {
        assert_eq!(ScalarType::Timestamp.as_str(), "timestamp");
        assert_eq!(ScalarType::detect(&[Scalar::Integer(1)]).as_str(), "integer");
        assert_eq!(ScalarType::detect(std::iter::empty()).as_str(), "unknown");
    }

    #[test]
    fn float_rendering() {
        assert_eq!(float_text(3.0), "3.0");
        assert_eq!(float_text(2.5), "2.5");
        assert_eq!(float_text(-0.125), "-0.125");
        assert_eq!(Scalar::Float(1.0).to_text().unwrap(), "1.0");
    }

    #[test]
    fn loads_columns_in_order() {
        let sheet = sheet(
            true,
            vec![
                (0, 0, text("Name")),
                (0, 1, text("Age")),
                (0, 2, text("Score")),
                (1, 0, text("O'Brien")),
                (1, 1, Data::Float(41.0)),
                (1, 2, Data::Float(3.0)),
                (2, 0, text("Ada")),
                (2, 2, Data::Float(7.5)),
            ],
        );
        let worksheet = Worksheet::from_sheet(&sheet, &Criteria::default()).unwrap();
        assert_eq!(worksheet.rows, 2);
        let kinds: Vec<ScalarType> = worksheet.columns.iter().map(|column| column.kind).collect();
        assert_eq!(kinds, vec![ScalarType::Text, ScalarType::Integer, ScalarType::Float]);
        assert_eq!(worksheet.columns[1].values, vec![Scalar::Integer(41), Scalar::Null]);
        assert_eq!(worksheet.columns[2].values, vec![Scalar::Float(3.0), Scalar::Float(7.5)]);
        let second: Vec<&Scalar> = worksheet.row(1).collect();
        assert_eq!(second, vec![&Scalar::Text("Ada".into()), &Scalar::Null, &Scalar::Float(7.5)]);
    }

    #[test]
    fn empty_rows() {
        let cells = vec![
            (0, 0, text("a")),
            (1, 0, Data::Int(1)),
            (3, 0, Data::Int(3)),
        ];
        let kept = Worksheet::from_sheet(&sheet(true, cells.clone()), &Criteria::default()).unwrap();
        assert_eq!(kept.rows, 3);
        assert_eq!(kept.columns[0].values[1], Scalar::Null);

        let criteria = Criteria {
            skip_empty_rows: true,
            ..Criteria::default()
        };
        let skipped = Worksheet::from_sheet(&sheet(true, cells), &criteria).unwrap();
        assert_eq!(skipped.rows, 2);
        assert_eq!(skipped.columns[0].values, vec![Scalar::Integer(1), Scalar::Integer(3)]);
    }

    #[test]
    fn analyze_rows_limits_inference() {
        let cells = vec![
            (0, 0, text("code")),
            (1, 0, Data::Int(1)),
            (2, 0, text("A-7")),
        ];
        let criteria = Criteria {
            analyze_rows: Some(1),
            ..Criteria::default()
        };
        let worksheet = Worksheet::from_sheet(&sheet(true, cells), &criteria).unwrap();
        assert_eq!(worksheet.columns[0].kind, ScalarType::Integer);
        assert_eq!(worksheet.columns[0].values[1], Scalar::Text("A-7".into()));
    }

    #[test]
    fn strict_cell_errors() {
        let cells = vec![
            (0, 0, text("ratio")),
            (1, 0, Data::Error(calamine::CellErrorType::NA)),
        ];
        let lenient = Worksheet::from_sheet(&sheet(true, cells), &Criteria::default()).unwrap();
        assert_eq!(lenient.columns[0].values, vec![Scalar::Null]);
        assert_eq!(lenient.columns[0].kind, ScalarType::Unknown);

        let cells = vec![
            (0, 0, text("ratio")),
            (1, 0, Data::Error(calamine::CellErrorType::NA)),
        ];
        let criteria = Criteria {
            error_as_null: false,
            ..Criteria::default()
        };
        assert!(Worksheet::from_sheet(&sheet(true, cells), &criteria).is_err());
    }
}
