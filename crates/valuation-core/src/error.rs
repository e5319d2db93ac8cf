//! Error types for valuation operations.
//!
//! This module defines [`ValuationError`] covering data-resolution failures,
//! caller parameter errors, upstream provider failures, and persistence
//! errors. Tie-out validation findings are deliberately *not* errors: they
//! are advisory, reduce a period's quality score, and travel with results
//! inside `ValidationReport` instead of interrupting the pipeline.

use thiserror::Error;

/// Errors that can occur while resolving facts or computing a valuation.
#[derive(Error, Debug)]
pub enum ValuationError {
    /// A required concept could not be resolved directly or reconciled.
    #[error("missing data: {concept} could not be resolved from filings")]
    MissingData {
        /// The concept that failed to resolve.
        concept: String,
    },

    /// A reconstruction rule was attempted but its own inputs were missing.
    #[error("cannot reconstruct {concept}: missing {missing}")]
    Reconciliation {
        /// The concept the rule tried to synthesize.
        concept: String,
        /// The rule inputs that were unavailable.
        missing: String,
    },

    /// Caller-supplied parameters are structurally invalid.
    #[error("invalid assumption: {0}")]
    InvalidAssumption(String),

    /// The fact provider failed or returned malformed data.
    ///
    /// Surfaced as-is; retries belong to the fetch collaborator, not the core.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(String),

    /// Error parsing provider or persisted data.
    #[error("parse error: {0}")]
    Parse(String),

    /// Error interacting with the persistence store.
    #[error("store error: {0}")]
    Store(String),

    /// The requested provider is not configured.
    #[error("provider not configured: {0}")]
    ProviderNotConfigured(String),
}

/// Result type alias using [`ValuationError`].
pub type Result<T> = std::result::Result<T, ValuationError>;
