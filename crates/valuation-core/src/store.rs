//! Persistence trait for normalized rows and valuation results.
//!
//! This module defines the [`ValuationStore`] trait that provides a unified
//! interface for persisting companies, filing periods (with their quality
//! scores), normalized statement rows, and valuation runs.

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{Company, FilingPeriod, StatementRow, Ticker, Valuation},
};

/// Trait for persisting pipeline inputs and results.
///
/// Implementations can store data in various backends (SQLite, in-memory,
/// etc.). Writes are append-mostly: period rows use insert-if-absent
/// semantics keyed by `(ticker, fiscal_year, form)`, with only the quality
/// score updatable after validation.
#[async_trait]
pub trait ValuationStore: Send + Sync {
    /// Retrieves a stored company record.
    ///
    /// Returns `Ok(Some(company))` if present, `Ok(None)` if not stored.
    async fn get_company(&self, ticker: &Ticker) -> Result<Option<Company>>;

    /// Stores a company record.
    async fn put_company(&self, company: &Company) -> Result<()>;

    /// Retrieves the filing periods stored for a company.
    ///
    /// Returns `Ok(Some(periods))` sorted by fiscal year, `Ok(None)` if none
    /// are stored.
    async fn get_periods(&self, ticker: &Ticker) -> Result<Option<Vec<FilingPeriod>>>;

    /// Stores a filing period, inserting if absent and otherwise updating
    /// only the quality score.
    async fn put_period(&self, ticker: &Ticker, period: &FilingPeriod) -> Result<()>;

    /// Retrieves the normalized statement rows stored for a company.
    async fn get_statement_rows(&self, ticker: &Ticker) -> Result<Option<Vec<StatementRow>>>;

    /// Stores normalized statement rows for a company.
    async fn put_statement_rows(&self, ticker: &Ticker, rows: &[StatementRow]) -> Result<()>;

    /// Retrieves a stored valuation keyed by company and base fiscal year.
    async fn get_valuation(
        &self,
        ticker: &Ticker,
        base_fiscal_year: i32,
    ) -> Result<Option<Valuation>>;

    /// Stores a valuation run keyed by company and base fiscal year.
    async fn put_valuation(
        &self,
        ticker: &Ticker,
        base_fiscal_year: i32,
        valuation: &Valuation,
    ) -> Result<()>;

    /// Clears all stored data.
    async fn clear(&self) -> Result<()>;
}
