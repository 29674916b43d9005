use thiserror::Error;

/// Errors surfaced by the ambient parts of the crate (config, catalogs, CLI).
///
/// Parsing and mutation never fail; advisory validation has its own
/// structured results (`TagSyntaxError`, `SrtIssue`).
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty value for parameter '{0}'")]
    EmptyValue(String),

    #[error("Invalid value for parameter '{name}': {value}")]
    InvalidValue { name: String, value: String },

    #[error("Parameter '{name}' out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        name: String,
        value: String,
        min: f64,
        max: f64,
    },

    #[error("Catalog source unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("No SRT entry at position {0}")]
    NoSuchEntry(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
