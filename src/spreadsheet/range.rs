use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]*)(\d*)(:([A-Z]*)(\d*))?$").expect("Hardcode regex pattern")
});

/// Errors related to Excel-style range parsing.
#[derive(Error, Debug)]
pub enum RangeError {
    #[error("Invalid range format '{0}'")]
    FormatError(String),
}

/// Represents a cell range within a spreadsheet.
///
/// A range can specify partial boundaries - any bound can be None to indicate
/// no constraint in that direction. This allows for flexible range specifications
/// like "A1:", "B:D", ":10", etc.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Range {
    /// Starting row index (0-based, inclusive)
    pub row_lower_bound: Option<usize>,
    /// Ending row index (0-based, inclusive)
    pub row_upper_bound: Option<usize>,
    /// Starting column index (0-based, inclusive)
    pub column_lower_bound: Option<usize>,
    /// Ending column index (0-based, inclusive)
    pub column_upper_bound: Option<usize>,
}

impl Range {
    /// Converts Excel-style column letters to a 0-based column index:
    /// A = 0, B = 1, ..., Z = 25, AA = 26, ...
    ///
    /// Empty letters mean no bound; `None` is returned when the index does
    /// not fit in `usize`.
    fn parse_column(letters: &str) -> Option<Option<usize>> {
        if letters.is_empty() {
            return Some(None);
        }
        letters
            .chars()
            .map(|letter| letter as usize - 'A' as usize + 1)
            .try_fold(0usize, |index, digit| {
                index.checked_mul(26)?.checked_add(digit)
            })
            .map(|column| Some(column - 1))
    }

    /// Converts a 1-based row number to a 0-based row index.
    ///
    /// Empty digits and row 0 mean no bound; `None` is returned when the
    /// number does not fit in `usize`.
    fn parse_row(number: &str) -> Option<Option<usize>> {
        if number.is_empty() {
            return Some(None);
        }
        number
            .parse()
            .ok()
            .map(|row: usize| row.checked_sub(1))
    }
}

impl TryFrom<&str> for Range {
    type Error = RangeError;

    /// Parses a range string into a Range struct.
    ///
    /// Supports various range formats:
    /// - "A1:C3" - Full range from A1 to C3
    /// - "A1:" - From A1 to end of data
    /// - ":C3" - From beginning to C3
    /// - "A:C" - All rows in columns A to C
    /// - "1:3" - Rows 1 to 3, all columns
    /// - "A1" - Single cell A1
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim().to_ascii_uppercase();
        let format_error = || RangeError::FormatError(value.to_owned());
        let captures = RANGE_PATTERN
            .captures(value.as_str())
            .filter(|_| !value.is_empty())
            .ok_or_else(format_error)?;
        let group = |index: usize| captures.get(index).map_or("", |matcher| matcher.as_str());
        Ok(Range {
            column_lower_bound: Self::parse_column(group(1)).ok_or_else(format_error)?,
            row_lower_bound: Self::parse_row(group(2)).ok_or_else(format_error)?,
            column_upper_bound: Self::parse_column(group(4)).ok_or_else(format_error)?,
            row_upper_bound: Self::parse_row(group(5)).ok_or_else(format_error)?,
        })
    }
}

impl std::str::FromStr for Range {
    type Err = RangeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Range::try_from(value)
    }
}
