//! Fact provider trait for raw filing observations.
//!
//! A fact provider is the upstream collaborator that already fetched and
//! cached a company's filings. The core never performs network fetches or
//! retries; a provider failure is surfaced as
//! [`ValuationError::UpstreamFetch`](crate::error::ValuationError::UpstreamFetch).

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{Company, RawFactSet, Ticker},
};

/// Source of raw per-concept observations for a company.
///
/// Implementations adapt whatever document or store the collaborator holds
/// (an EDGAR companyfacts document, a warehouse table, a test fixture) into
/// the label-keyed [`RawFactSet`] shape the extractor consumes.
#[async_trait]
pub trait FactProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "SEC EDGAR companyfacts").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Fetches company reference information for a ticker.
    async fn company(&self, ticker: &Ticker) -> Result<Company>;

    /// Fetches all raw observations for a ticker, keyed by source label.
    ///
    /// Absence of a label is a valid outcome consumed downstream; only
    /// transport or format failures are errors.
    async fn raw_facts(&self, ticker: &Ticker) -> Result<RawFactSet>;
}
