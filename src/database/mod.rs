//! SQL side of the conversion: identifiers, column types, CREATE TABLE and INSERT text.

pub mod column;
pub mod insert;
pub mod naming;
pub mod table;

/// Quotes a MySQL identifier with backticks, doubling embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
