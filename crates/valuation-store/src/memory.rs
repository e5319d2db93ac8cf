//! In-memory store implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use valuation_core::{
    Company, FilingPeriod, Result, StatementRow, Ticker, Valuation, ValuationStore,
};

/// Simple in-memory store for testing and development.
///
/// Data is held in `RwLock`-protected `HashMap`s and lost when the store is
/// dropped. Values are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    companies: RwLock<HashMap<Ticker, Company>>,
    periods: RwLock<HashMap<Ticker, Vec<FilingPeriod>>>,
    rows: RwLock<HashMap<Ticker, Vec<StatementRow>>>,
    valuations: RwLock<HashMap<(Ticker, i32), Valuation>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ValuationStore for InMemoryStore {
    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn get_company(&self, ticker: &Ticker) -> Result<Option<Company>> {
        Ok(self.companies.read().await.get(ticker).cloned())
    }

    #[instrument(skip(self, company), fields(ticker = %company.ticker))]
    async fn put_company(&self, company: &Company) -> Result<()> {
        self.companies
            .write()
            .await
            .insert(company.ticker.clone(), company.clone());
        debug!("stored company");
        Ok(())
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn get_periods(&self, ticker: &Ticker) -> Result<Option<Vec<FilingPeriod>>> {
        Ok(self.periods.read().await.get(ticker).cloned())
    }

    #[instrument(skip(self, period), fields(ticker = %ticker, fiscal_year = period.fiscal_year))]
    async fn put_period(&self, ticker: &Ticker, period: &FilingPeriod) -> Result<()> {
        let mut periods = self.periods.write().await;
        let entries = periods.entry(ticker.clone()).or_default();

        // Insert-if-absent on (fiscal_year, form); only the quality score is
        // updatable afterwards.
        if let Some(existing) = entries
            .iter_mut()
            .find(|p| p.fiscal_year == period.fiscal_year && p.form == period.form)
        {
            existing.quality_score = period.quality_score;
            debug!("updated period quality score");
        } else {
            entries.push(period.clone());
            entries.sort_by_key(|p| p.fiscal_year);
            debug!("stored new period");
        }
        Ok(())
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn get_statement_rows(&self, ticker: &Ticker) -> Result<Option<Vec<StatementRow>>> {
        Ok(self.rows.read().await.get(ticker).cloned())
    }

    #[instrument(skip(self, rows), fields(ticker = %ticker, count = rows.len()))]
    async fn put_statement_rows(&self, ticker: &Ticker, rows: &[StatementRow]) -> Result<()> {
        self.rows
            .write()
            .await
            .insert(ticker.clone(), rows.to_vec());
        debug!("stored statement rows");
        Ok(())
    }

    #[instrument(skip(self), fields(ticker = %ticker, base_fiscal_year))]
    async fn get_valuation(
        &self,
        ticker: &Ticker,
        base_fiscal_year: i32,
    ) -> Result<Option<Valuation>> {
        Ok(self
            .valuations
            .read()
            .await
            .get(&(ticker.clone(), base_fiscal_year))
            .cloned())
    }

    #[instrument(skip(self, valuation), fields(ticker = %ticker, base_fiscal_year))]
    async fn put_valuation(
        &self,
        ticker: &Ticker,
        base_fiscal_year: i32,
        valuation: &Valuation,
    ) -> Result<()> {
        self.valuations
            .write()
            .await
            .insert((ticker.clone(), base_fiscal_year), valuation.clone());
        debug!("stored valuation");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.companies.write().await.clear();
        self.periods.write().await.clear();
        self.rows.write().await.clear();
        self.valuations.write().await.clear();
        debug!("cleared all stored data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use valuation_core::FilingForm;

    fn period(year: i32, quality: Option<f64>) -> FilingPeriod {
        FilingPeriod {
            fiscal_year: year,
            period_end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
            form: FilingForm::Annual,
            accession: format!("0001-{}-000001", year % 100),
            quality_score: quality,
        }
    }

    #[tokio::test]
    async fn test_company_round_trip() {
        let store = InMemoryStore::new();
        let ticker = Ticker::new("AAPL");

        assert!(store.get_company(&ticker).await.unwrap().is_none());

        let company = Company::new(ticker.clone(), "Apple Inc.").with_cik("0000320193");
        store.put_company(&company).await.unwrap();

        let retrieved = store.get_company(&ticker).await.unwrap().unwrap();
        assert_eq!(retrieved, company);
    }

    #[tokio::test]
    async fn test_period_insert_if_absent_updates_quality_only() {
        let store = InMemoryStore::new();
        let ticker = Ticker::new("AAPL");

        store.put_period(&ticker, &period(2023, None)).await.unwrap();
        store
            .put_period(&ticker, &period(2023, Some(0.8)))
            .await
            .unwrap();
        store.put_period(&ticker, &period(2022, None)).await.unwrap();

        let periods = store.get_periods(&ticker).await.unwrap().unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].fiscal_year, 2022);
        assert_eq!(periods[1].quality_score, Some(0.8));
    }

    #[tokio::test]
    async fn test_valuation_keyed_by_base_year() {
        let store = InMemoryStore::new();
        let ticker = Ticker::new("AAPL");

        let valuation = Valuation {
            wacc: 0.10,
            terminal_growth: 0.03,
            horizon: 5,
            explicit: Vec::new(),
            pv_explicit: 400.0,
            terminal_value: 1471.43,
            pv_terminal: 913.65,
            enterprise_value: 1313.65,
            net_debt: 100.0,
            shares_outstanding: 10.0,
            equity_value: 1213.65,
            price_per_share: 121.365,
        };
        store.put_valuation(&ticker, 2023, &valuation).await.unwrap();

        assert!(store.get_valuation(&ticker, 2022).await.unwrap().is_none());
        let retrieved = store.get_valuation(&ticker, 2023).await.unwrap().unwrap();
        assert_eq!(retrieved, valuation);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryStore::new();
        let ticker = Ticker::new("AAPL");

        store
            .put_company(&Company::new(ticker.clone(), "Apple Inc."))
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert!(store.get_company(&ticker).await.unwrap().is_none());
    }
}
