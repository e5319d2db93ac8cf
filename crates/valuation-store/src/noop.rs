//! No-op store implementation.

use async_trait::async_trait;
use tracing::trace;

use valuation_core::{
    Company, FilingPeriod, Result, StatementRow, Ticker, Valuation, ValuationStore,
};

/// A no-op store that persists nothing.
///
/// All `get_*` methods return `Ok(None)` and all `put_*` methods return
/// `Ok(())`. Useful for disabling persistence or testing code paths without
/// stored state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl NoopStore {
    /// Create a new no-op store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ValuationStore for NoopStore {
    async fn get_company(&self, _ticker: &Ticker) -> Result<Option<Company>> {
        trace!("NoopStore: get_company called, returning None");
        Ok(None)
    }

    async fn put_company(&self, _company: &Company) -> Result<()> {
        trace!("NoopStore: put_company called, doing nothing");
        Ok(())
    }

    async fn get_periods(&self, _ticker: &Ticker) -> Result<Option<Vec<FilingPeriod>>> {
        trace!("NoopStore: get_periods called, returning None");
        Ok(None)
    }

    async fn put_period(&self, _ticker: &Ticker, _period: &FilingPeriod) -> Result<()> {
        trace!("NoopStore: put_period called, doing nothing");
        Ok(())
    }

    async fn get_statement_rows(&self, _ticker: &Ticker) -> Result<Option<Vec<StatementRow>>> {
        trace!("NoopStore: get_statement_rows called, returning None");
        Ok(None)
    }

    async fn put_statement_rows(&self, _ticker: &Ticker, _rows: &[StatementRow]) -> Result<()> {
        trace!("NoopStore: put_statement_rows called, doing nothing");
        Ok(())
    }

    async fn get_valuation(
        &self,
        _ticker: &Ticker,
        _base_fiscal_year: i32,
    ) -> Result<Option<Valuation>> {
        trace!("NoopStore: get_valuation called, returning None");
        Ok(None)
    }

    async fn put_valuation(
        &self,
        _ticker: &Ticker,
        _base_fiscal_year: i32,
        _valuation: &Valuation,
    ) -> Result<()> {
        trace!("NoopStore: put_valuation called, doing nothing");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopStore: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_gets_return_none() {
        let store = NoopStore::new();
        let ticker = Ticker::new("AAPL");

        assert!(store.get_company(&ticker).await.unwrap().is_none());
        assert!(store.get_periods(&ticker).await.unwrap().is_none());
        assert!(store.get_statement_rows(&ticker).await.unwrap().is_none());
        assert!(store.get_valuation(&ticker, 2023).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_noop_puts_succeed_without_storing() {
        let store = NoopStore::new();
        let ticker = Ticker::new("AAPL");
        let company = Company::new(ticker.clone(), "Apple Inc.");

        store.put_company(&company).await.unwrap();
        assert!(store.get_company(&ticker).await.unwrap().is_none());
    }
}
