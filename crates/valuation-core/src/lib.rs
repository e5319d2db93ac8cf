#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the valuation pipeline.
//!
//! This crate provides the foundational abstractions shared by every stage of
//! the pipeline:
//!
//! - [`Concept`](concept::Concept) - Canonical financial concepts with ordered alias fallbacks
//! - [`FactProvider`](provider::FactProvider) - Source of raw per-concept observations
//! - [`ValuationStore`](store::ValuationStore) - Persistence for companies, periods and results
//! - [`ValuationConfig`](config::ValuationConfig) - Pipeline configuration knobs
//! - [`ValuationError`](error::ValuationError) - Error taxonomy

/// Canonical financial concepts and their source-label fallback chains.
pub mod concept;
/// Pipeline configuration knobs.
pub mod config;
/// Error types for valuation operations.
pub mod error;
/// Filing form definitions.
pub mod filing;
/// Fact provider trait for raw filing observations.
pub mod provider;
/// Persistence trait for normalized rows and valuation results.
pub mod store;
/// Core data types (Ticker, facts, statement rows, valuations).
pub mod types;

// Re-export commonly used items at crate root
pub use concept::Concept;
pub use config::{
    FcffConfig, FcffMode, JoinPolicy, MonteCarloConfig, TaxRateConfig, ValidationConfig,
    ValuationConfig,
};
pub use error::{Result, ValuationError};
pub use filing::FilingForm;
pub use provider::FactProvider;
pub use store::ValuationStore;
pub use types::{
    Company, DiscountedCashFlow, FactObservation, FilingPeriod, Provenance, RawFact, RawFactSet,
    StatementRow, Ticker, Valuation,
};
