//! Error taxonomy for the diagnosis engine
//!
//! Degenerate numeric inputs (zero denominators, empty sections) are not
//! errors: the calculators resolve them to zero contributions. Only
//! assumptions outside their valid range and malformed household records
//! are rejected.

use thiserror::Error;

/// Errors raised at the library boundary
#[derive(Debug, Error)]
pub enum DiagnosisError {
    /// An assumption is outside its valid range
    #[error("invalid assumption `{field}` = {value}: {reason}")]
    InvalidAssumption {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The household has no `self` person to anchor the horizon on
    #[error("household has no primary (self) person")]
    MissingPrimary,

    /// A household record cannot be normalized
    #[error("invalid household record: {0}")]
    InvalidRecord(String),

    /// A category tag in a ledger file is not recognized
    #[error("unknown {field} tag: {value}")]
    UnknownTag { field: &'static str, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, DiagnosisError>;
