//! Error types for the generation pipeline.

use crate::basis::BasisKey;
use thiserror::Error;

/// Errors that can occur while deriving or emitting kernels.
#[derive(Debug, Error)]
pub enum GenError {
    /// A configuration outside the provider's supported ranges.
    #[error("unsupported configuration: {key}")]
    UnsupportedConfig { key: BasisKey },

    /// The provider failed to derive a basis quantity. Symbolic derivation
    /// is deterministic, so this is propagated and never retried.
    #[error("basis derivation failed for {key}: {reason}")]
    BasisDerivation { key: BasisKey, reason: String },

    /// A reflection ratio did not reduce to +1 or -1. Signals a malformed
    /// basis or unsupported geometry; the configuration must be aborted
    /// rather than emit incorrect code.
    #[error("sign invariant violated in {kernel}: direction {dir}, basis {index} flips to `{rendered}`")]
    SignInvariant {
        kernel: String,
        dir: usize,
        index: usize,
        rendered: String,
    },

    /// Two distinct (configuration, operation) pairs derived the same
    /// external name. Fatal for the whole run.
    #[error("duplicate kernel name: {name}")]
    NameCollision { name: String },

    /// Writing a finished output unit failed.
    #[error("emission failed: {0}")]
    Emission(#[from] std::io::Error),
}

impl GenError {
    /// Whether this error must abort the entire run rather than just the
    /// configuration that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GenError::NameCollision { .. })
    }
}

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, GenError>;
