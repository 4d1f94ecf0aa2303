use crate::database::column::{Column, ColumnType, ColumnTypeOverride};
use crate::database::naming::{sanitize_column_names, NamingError, ID_COLUMN};
use crate::database::quote_identifier;
use crate::spreadsheet::worksheet::Worksheet;
use std::io::Write;

/// Target table derived from a worksheet.
#[derive(Clone, Debug)]
pub struct Table {
    /// Table name, used verbatim (quoted) in the generated SQL
    pub name: String,
    /// Data columns, without the `id` primary key
    pub columns: Vec<Column>,
}

impl Table {
    /// Derives the table schema from the worksheet.
    ///
    /// Column names are sanitized in sheet order; the SQL type of every column
    /// comes from the first matching override, or else from its inferred type.
    pub fn derive(
        name: &str,
        worksheet: &Worksheet,
        max_identifier_length: usize,
        overrides: &[ColumnTypeOverride],
    ) -> Result<Table, NamingError> {
        let sources: Vec<&str> = worksheet
            .columns
            .iter()
            .map(|column| column.name.as_str())
            .collect();
        let names = sanitize_column_names(&sources, max_identifier_length)?;
        let columns = worksheet
            .columns
            .iter()
            .zip(names)
            .map(|(column, name)| Column {
                source: column.name.to_owned(),
                name,
                kind: ColumnTypeOverride::find(overrides, &column.name)
                    .unwrap_or(ColumnType::from_scalar_type(column.kind)),
            })
            .collect();
        Ok(Table {
            name: name.to_owned(),
            columns,
        })
    }

    /// Column identifiers with the `id` primary key first.
    pub fn column_names_with_id(&self) -> Vec<&str> {
        std::iter::once(ID_COLUMN)
            .chain(self.columns.iter().map(|column| column.name.as_str()))
            .collect()
    }

    /// Renders the `CREATE TABLE IF NOT EXISTS` statement, newline terminated.
    pub fn create_statement(&self) -> String {
        let definitions: Vec<String> = std::iter::once(format!(
            "  {} INT NOT NULL AUTO_INCREMENT PRIMARY KEY",
            quote_identifier(ID_COLUMN)
        ))
        .chain(self.columns.iter().map(|column| {
            format!("  {} {}", quote_identifier(&column.name), column.kind.as_str())
        }))
        .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n) ENGINE=InnoDB AUTO_INCREMENT=1 DEFAULT CHARSET=utf8mb4;\n",
            quote_identifier(&self.name),
            definitions.join(",\n")
        )
    }

    pub fn write_create_statement<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.create_statement().as_bytes())
    }
}
