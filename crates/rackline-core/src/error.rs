//! Error taxonomy for chain ordering and persistence.

use thiserror::Error;

/// Errors raised by order stores and the reorder controller.
///
/// None of these are fatal to the surrounding application: the display stays
/// usable and the plugins keep processing even when ordering is degraded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The persisted order could not be read.
    ///
    /// Recovered locally by substituting [`OrderRecord::default`](crate::OrderRecord).
    #[error("order store unavailable: {reason}")]
    StoreUnavailable {
        /// What went wrong while reading.
        reason: String,
    },

    /// A proposed order is not a permutation of the plugin set.
    ///
    /// Rejected before any write takes place.
    #[error("invalid plugin order: {reason}")]
    InvalidOrder {
        /// Why the order was rejected.
        reason: String,
    },

    /// A reorder was requested for an identifier missing from the order.
    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    /// The backing store rejected a write.
    ///
    /// The observable order is left unchanged and no notification is sent.
    #[error("failed to persist plugin order: {reason}")]
    PersistenceWriteFailure {
        /// Underlying failure description.
        reason: String,
    },

    /// A chain name that does not match any [`ChainKind`](crate::ChainKind).
    #[error("unknown chain: {0}")]
    UnknownChain(String),
}

impl ChainError {
    /// Create a store unavailable error.
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        ChainError::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an invalid order error.
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        ChainError::InvalidOrder {
            reason: reason.into(),
        }
    }

    /// Create a persistence write failure.
    pub fn write_failure(reason: impl Into<String>) -> Self {
        ChainError::PersistenceWriteFailure {
            reason: reason.into(),
        }
    }

    /// Whether this error signals a broken internal invariant rather than an
    /// environmental problem (unreadable store, failed write).
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ChainError::InvalidOrder { .. } | ChainError::UnknownPlugin(_)
        )
    }
}
