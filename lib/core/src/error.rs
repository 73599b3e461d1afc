use crate::profile::ProfileId;
use crate::vector::SchemaVersion;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the matching core.
///
/// `Clone` is required so that a failed vectorization can be cached and
/// replayed to coalesced callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("profile {id}: neither industry nor business model could be derived")]
    IncompleteProfile { id: ProfileId },

    #[error("taxonomy v{version} has no entry for code '{code}' or any parent of it")]
    UnrecognizedTaxonomyCode { code: String, version: u32 },

    #[error("feature vectors were built under different schemas: {left} vs {right}")]
    DimensionMismatch {
        left: SchemaVersion,
        right: SchemaVersion,
    },

    #[error("profile {id}: mandatory financial fields are missing")]
    InsufficientFinancialData { id: ProfileId },

    #[error("candidate catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
