//! INSERT statement generation.
use crate::database::quote_identifier;
use crate::spreadsheet::worksheet::{float_text, Scalar, Worksheet};
use std::io::Write;

/// How non-null values are written in VALUES lists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ValueStyle {
    /// Every value is a quoted string literal, whatever the column type.
    #[default]
    Quoted,
    /// Numbers are unquoted and booleans are `TRUE`/`FALSE`; other values stay quoted.
    Typed,
}

/// Escapes a string for use inside a single-quoted MySQL literal.
///
/// Backslashes are doubled first, then single quotes.
pub fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

fn quote_string(value: &str) -> String {
    format!("'{}'", escape_string(value))
}

/// Renders one value as a SQL literal.
pub fn render_value(value: &Scalar, style: ValueStyle) -> String {
    match (style, value) {
        (_, Scalar::Null) => "NULL".to_owned(),
        (ValueStyle::Quoted, Scalar::Boolean(value)) => quote_string(if *value { "1" } else { "0" }),
        (ValueStyle::Typed, Scalar::Boolean(value)) => if *value { "TRUE" } else { "FALSE" }.to_owned(),
        (ValueStyle::Typed, Scalar::Integer(value)) => value.to_string(),
        (ValueStyle::Typed, Scalar::Float(value)) if value.is_finite() => float_text(*value),
        (_, value) => quote_string(&value.to_text().unwrap_or_default()),
    }
}

/// Builds INSERT statements for one table and column list.
#[derive(Clone, Debug)]
pub struct InsertBuilder {
    /// `INSERT INTO ... VALUES (NULL` shared by every row
    prefix: String,
    style: ValueStyle,
}

impl InsertBuilder {
    /// `columns` are the sanitized identifiers with `id` first.
    pub fn new(table_name: &str, columns: &[&str], style: ValueStyle) -> Self {
        let columns: Vec<String> = columns.iter().map(|name| quote_identifier(name)).collect();
        InsertBuilder {
            prefix: format!(
                "INSERT INTO {} ({}) VALUES (NULL",
                quote_identifier(table_name),
                columns.join(", ")
            ),
            style,
        }
    }

    /// One INSERT statement; the `id` value is always `NULL` so MySQL assigns it.
    pub fn statement<'a>(&self, values: impl IntoIterator<Item = &'a Scalar>) -> String {
        let mut statement = self.prefix.clone();
        for value in values {
            statement.push_str(", ");
            statement.push_str(&render_value(value, self.style));
        }
        statement.push_str(");");
        statement
    }
}

/// Writes one INSERT statement per worksheet row, one per line, in row order.
///
/// Returns the number of statements written.
pub fn write_inserts<W: Write>(
    out: &mut W,
    table_name: &str,
    columns: &[&str],
    worksheet: &Worksheet,
    style: ValueStyle,
) -> std::io::Result<usize> {
    let builder = InsertBuilder::new(table_name, columns, style);
    for row in 0..worksheet.rows {
        writeln!(out, "{}", builder.statement(worksheet.row(row)))?;
    }
    Ok(worksheet.rows)
}
