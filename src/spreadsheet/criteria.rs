use crate::spreadsheet::range::Range;
use glob::Pattern;

/// Criteria for selecting and loading data from a spreadsheet.
#[derive(Clone, Debug)]
pub struct Criteria {
    /// Sheet name pattern; the first sheet is used when absent.
    pub sheet_name_pattern: Option<Pattern>,

    /// Data range within the sheet to extract.
    pub range: Option<Range>,

    /// Whether the first row of the range holds column names.
    pub header: bool,

    /// Maximum number of data rows inspected for type inference (all rows when absent).
    pub analyze_rows: Option<usize>,

    /// Convert cell errors (`#N/A`, `#DIV/0!`, ...) to null values instead of failing.
    pub error_as_null: bool,

    /// Skip rows where all columns are empty.
    pub skip_empty_rows: bool,
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria {
            sheet_name_pattern: None,
            range: None,
            header: true,
            analyze_rows: None,
            error_as_null: true,
            skip_empty_rows: false,
        }
    }
}

impl Criteria {
    /// Checks if a sheet name matches the criteria pattern.
    /// Returns true if no pattern is specified or if the name matches it.
    pub fn accept(&self, sheet_name: &str) -> bool {
        self.sheet_name_pattern
            .as_ref()
            .map_or(true, |pattern| pattern.matches(sheet_name))
    }

    /// Picks the first sheet accepted by the criteria.
    pub fn select<'a>(&self, sheet_names: &'a [String]) -> Option<&'a str> {
        sheet_names
            .iter()
            .find(|name| self.accept(name))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["Summary".to_owned(), "Data 2023".to_owned(), "Data 2024".to_owned()]
    }

    #[test]
    fn first_sheet_without_pattern() {
        let criteria = Criteria::default();
        assert_eq!(criteria.select(&names()), Some("Summary"));
    }

    #[test]
    fn first_matching_sheet() {
        let criteria = Criteria {
            sheet_name_pattern: Some(Pattern::new("Data*").unwrap()),
            ..Criteria::default()
        };
        assert_eq!(criteria.select(&names()), Some("Data 2023"));
    }

    #[test]
    fn no_matching_sheet() {
        let criteria = Criteria {
            sheet_name_pattern: Some(Pattern::new("Archive").unwrap()),
            ..Criteria::default()
        };
        assert_eq!(criteria.select(&names()), None);
        assert!(!criteria.accept("Summary"));
    }
}
