//! Structured errors for the failure modes the program handles specially.
//!
//! Everything else propagates as `anyhow::Error` with context attached at the
//! I/O seam where it occurred.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The export header is missing a column the loader depends on. Fatal
    /// before any row is processed.
    #[error("required column '{0}' is missing from the input header")]
    MissingColumn(String),

    /// Each run assumes a fresh target store; re-importing over existing data
    /// would duplicate every row.
    #[error("target database already contains {0} record(s); clear it before re-importing")]
    StoreNotEmpty(i64),
}
