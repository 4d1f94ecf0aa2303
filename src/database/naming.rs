//! Column name sanitizing.
//!
//! Spreadsheet headers are free text; MySQL identifiers here are limited to
//! `[A-Za-z0-9_]`, at most 64 characters, and must be unique regardless of case.
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use thiserror::Error;

/// MySQL limit for column identifiers.
pub const DEFAULT_MAX_LENGTH: usize = 64;

/// Shortest accepted identifier limit, leaves room for a `_N` suffix.
pub const MIN_MAX_LENGTH: usize = 8;

/// Name of the auto-increment primary key column.
pub const ID_COLUMN: &str = "id";

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Hardcode regex pattern"));
static INVALID_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]").expect("Hardcode regex pattern"));

/// Errors related to column naming.
#[derive(Error, Debug)]
pub enum NamingError {
    #[error("Invalid identifier length {0}, expected a value between 8 and 64")]
    InvalidMaxLength(usize),
}

/// Cleans a raw column name without deduplication.
///
/// Surrounding whitespace is trimmed, inner whitespace runs become a single
/// underscore, anything outside `[A-Za-z0-9_]` is dropped and the result is
/// cut to `max_length`. The result may be empty.
pub fn clean_name(raw: &str, max_length: usize) -> String {
    let name = WHITESPACE.replace_all(raw.trim(), "_");
    let mut name = INVALID_CHARACTERS.replace_all(&name, "").into_owned();
    name.truncate(max_length);
    name
}

/// Appends `_count`, cutting the base so the result fits in `max_length`.
fn suffixed(base: &str, count: usize, max_length: usize) -> String {
    let suffix = format!("_{count}");
    let keep = max_length.saturating_sub(suffix.len()).min(base.len());
    format!("{}{}", &base[..keep], suffix)
}

/// Produces unique SQL identifiers for the columns of one table.
///
/// The first occurrence of a name (compared case-insensitively) is kept as
/// is; later ones get `_2`, `_3`, ... from a counter kept per base name.
#[derive(Debug)]
pub struct ColumnNamer {
    max_length: usize,
    /// Last suffix handed out per lowercase base name
    counters: HashMap<String, usize>,
    /// Every lowercase identifier produced so far
    produced: HashSet<String>,
}

impl ColumnNamer {
    pub fn new(max_length: usize) -> Result<Self, NamingError> {
        if !(MIN_MAX_LENGTH..=DEFAULT_MAX_LENGTH).contains(&max_length) {
            return Err(NamingError::InvalidMaxLength(max_length));
        }
        Ok(ColumnNamer {
            max_length,
            counters: HashMap::new(),
            produced: HashSet::new(),
        })
    }

    /// Marks an identifier as taken without producing it.
    pub fn reserve(&mut self, name: &str) {
        let key = name.to_ascii_lowercase();
        self.counters.entry(key.clone()).or_insert(1);
        self.produced.insert(key);
    }

    /// Sanitizes the name of the column at 1-based `position`.
    ///
    /// A name with nothing left after cleaning becomes `col_<position>`.
    pub fn name(&mut self, raw: &str, position: usize) -> String {
        let mut base = clean_name(raw, self.max_length);
        if base.is_empty() {
            base = format!("col_{position}");
            base.truncate(self.max_length);
        }

        let key = base.to_ascii_lowercase();
        let counter = self.counters.entry(key.clone()).or_insert(1);
        if self.produced.insert(key) {
            return base;
        }
        loop {
            *counter += 1;
            let candidate = suffixed(&base, *counter, self.max_length);
            if self.produced.insert(candidate.to_ascii_lowercase()) {
                return candidate;
            }
        }
    }
}

/// Sanitizes all column names of a table, in column order.
///
/// `id` is reserved for the primary key, so a column called `id` is renamed.
pub fn sanitize_column_names<S>(names: &[S], max_length: usize) -> Result<Vec<String>, NamingError>
where
    S: AsRef<str>,
{
    let mut namer = ColumnNamer::new(max_length)?;
    namer.reserve(ID_COLUMN);
    Ok(names
        .iter()
        .enumerate()
        .map(|(index, name)| namer.name(name.as_ref(), index + 1))
        .collect())
}
