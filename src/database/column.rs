use crate::spreadsheet::worksheet::ScalarType;
use glob::Pattern;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to column type parsing and validation.
#[derive(Error, Debug)]
pub enum ColumnError {
    #[error("Invalid column type '{0}'")]
    TypeError(String),

    #[error("Invalid column type override '{0}', expected PATTERN=TYPE")]
    OverrideError(String),
}

/// MySQL column types emitted in CREATE TABLE statements.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// Unbounded text
    Text,
    /// 32-bit signed integers
    Int,
    /// Single precision floating point numbers
    Float,
    /// Boolean values (TINYINT(1) in MySQL)
    Boolean,
    /// Date and time without time zone
    DateTime,
}

/// Represents a table column with its SQL identifier and type.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Column name as found in the spreadsheet header
    pub source: String,
    /// Sanitized SQL identifier
    pub name: String,
    /// Column data type
    pub kind: ColumnType,
}

impl ColumnType {
    /// Returns the SQL spelling of the column type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Int => "INT",
            ColumnType::Float => "FLOAT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::DateTime => "DATETIME",
        }
    }

    /// Parses a column type from a string representation.
    /// Supports various aliases for each type.
    pub fn parse(name: &str) -> Result<Self, ColumnError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "BOOL" | "BOOLEAN" => Ok(Self::Boolean),
            "INT" | "BIGINT" | "INTEGER" => Ok(Self::Int),
            "FLOAT" | "DOUBLE" | "DECIMAL" | "NUMERIC" => Ok(Self::Float),
            "TEXT" | "STRING" | "VARCHAR" => Ok(Self::Text),
            "DATETIME" | "TIMESTAMP" => Ok(Self::DateTime),
            _ => Err(ColumnError::TypeError(name.to_string())),
        }
    }

    /// Looks up the SQL type of an inferred scalar type; unknown types are TEXT.
    pub const fn from_scalar_type(kind: ScalarType) -> Self {
        match kind {
            ScalarType::Text => ColumnType::Text,
            ScalarType::Integer => ColumnType::Int,
            ScalarType::Float => ColumnType::Float,
            ScalarType::Boolean => ColumnType::Boolean,
            ScalarType::Timestamp => ColumnType::DateTime,
            ScalarType::Unknown => ColumnType::Text,
        }
    }
}

/// A user supplied `PATTERN=TYPE` rule forcing the type of matching columns.
#[derive(Clone, Debug)]
pub struct ColumnTypeOverride {
    /// Glob pattern on the original column name
    pub pattern: Pattern,
    pub kind: ColumnType,
}

impl ColumnTypeOverride {
    /// First override whose pattern matches `source`, if any.
    pub fn find(overrides: &[ColumnTypeOverride], source: &str) -> Option<ColumnType> {
        overrides
            .iter()
            .find(|rule| rule.pattern.matches(source))
            .map(|rule| rule.kind)
    }
}

impl FromStr for ColumnTypeOverride {
    type Err = ColumnError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (pattern, kind) = value
            .rsplit_once('=')
            .ok_or_else(|| ColumnError::OverrideError(value.to_owned()))?;
        Ok(ColumnTypeOverride {
            pattern: Pattern::new(pattern)
                .map_err(|_| ColumnError::OverrideError(value.to_owned()))?,
            kind: ColumnType::parse(kind)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_table() {
        let types: Vec<&str> = [
            ScalarType::Text,
            ScalarType::Integer,
            ScalarType::Float,
            ScalarType::Boolean,
            ScalarType::Timestamp,
            ScalarType::Unknown,
        ]
        .into_iter()
        .map(|kind| ColumnType::from_scalar_type(kind).as_str())
        .collect();
        assert_eq!(types, vec!["TEXT", "INT", "FLOAT", "BOOLEAN", "DATETIME", "TEXT"]);
    }

    #[test]
    fn parse_aliases() {
        assert_eq!(ColumnType::parse("varchar").unwrap(), ColumnType::Text);
        assert_eq!(ColumnType::parse("BigInt").unwrap(), ColumnType::Int);
        assert_eq!(ColumnType::parse("double").unwrap(), ColumnType::Float);
        assert_eq!(ColumnType::parse("bool").unwrap(), ColumnType::Boolean);
        assert_eq!(ColumnType::parse(" timestamp ").unwrap(), ColumnType::DateTime);
        assert_eq!(
            ColumnType::parse("blob").unwrap_err().to_string(),
            "Invalid column type 'blob'"
        );
    }

    #[test]
    fn overrides() {
        let rules: Vec<ColumnTypeOverride> = ["Zip*=text", "*Date=datetime"]
            .into_iter()
            .map(|rule| rule.parse().unwrap())
            .collect();
        assert_eq!(ColumnTypeOverride::find(&rules, "Zip Code"), Some(ColumnType::Text));
        assert_eq!(ColumnTypeOverride::find(&rules, "Start Date"), Some(ColumnType::DateTime));
        assert_eq!(ColumnTypeOverride::find(&rules, "Amount"), None);
    }

    #[test]
    fn bad_overrides() {
        assert!("Amount".parse::<ColumnTypeOverride>().is_err());
        assert!("Amount=money".parse::<ColumnTypeOverride>().is_err());
        assert!("[=int".parse::<ColumnTypeOverride>().is_err());
    }
}
