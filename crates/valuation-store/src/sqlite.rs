//! SQLite-based store implementation.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

use valuation_core::{
    Company, FilingForm, FilingPeriod, Result, StatementRow, Ticker, Valuation, ValuationError,
    ValuationStore,
};

/// SQLite-backed store for valuation data.
///
/// Persists companies, filing periods (with quality scores), normalized
/// statement rows and valuation runs across restarts. Statement rows and
/// valuations are stored as JSON blobs alongside their key columns.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation
    /// fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| ValuationError::Store(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| ValuationError::Store(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS companies (
                ticker TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                cik TEXT,
                sector TEXT,
                stored_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| ValuationError::Store(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS filing_periods (
                ticker TEXT NOT NULL,
                fiscal_year INTEGER NOT NULL,
                form TEXT NOT NULL,
                period_end TEXT NOT NULL,
                accession TEXT,
                quality_score REAL,
                stored_at TEXT NOT NULL,
                PRIMARY KEY (ticker, fiscal_year, form)
            )",
            [],
        )
        .map_err(|e| ValuationError::Store(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_filing_periods_ticker
             ON filing_periods(ticker)",
            [],
        )
        .map_err(|e| ValuationError::Store(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS statement_rows (
                ticker TEXT NOT NULL,
                fiscal_year INTEGER NOT NULL,
                data_json TEXT NOT NULL,
                stored_at TEXT NOT NULL,
                PRIMARY KEY (ticker, fiscal_year)
            )",
            [],
        )
        .map_err(|e| ValuationError::Store(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS valuations (
                ticker TEXT NOT NULL,
                base_fiscal_year INTEGER NOT NULL,
                wacc REAL NOT NULL,
                terminal_growth REAL NOT NULL,
                enterprise_value REAL NOT NULL,
                equity_value REAL NOT NULL,
                price_per_share REAL NOT NULL,
                data_json TEXT NOT NULL,
                stored_at TEXT NOT NULL,
                PRIMARY KEY (ticker, base_fiscal_year)
            )",
            [],
        )
        .map_err(|e| ValuationError::Store(e.to_string()))?;

        debug!("SQLite store schema initialized");
        Ok(())
    }
}

#[async_trait]
impl ValuationStore for SqliteStore {
    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn get_company(&self, ticker: &Ticker) -> Result<Option<Company>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        let result = conn
            .query_row(
                "SELECT ticker, name, cik, sector FROM companies WHERE ticker = ?1",
                params![ticker.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        Ok(result.map(|(ticker, name, cik, sector)| Company {
            ticker: Ticker::new(ticker),
            name,
            cik,
            sector,
        }))
    }

    #[instrument(skip(self, company), fields(ticker = %company.ticker))]
    async fn put_company(&self, company: &Company) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO companies (ticker, name, cik, sector, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                company.ticker.as_str(),
                company.name,
                company.cik,
                company.sector,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(|e| ValuationError::Store(e.to_string()))?;

        debug!("stored company");
        Ok(())
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn get_periods(&self, ticker: &Ticker) -> Result<Option<Vec<FilingPeriod>>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT fiscal_year, form, period_end, accession, quality_score
                 FROM filing_periods
                 WHERE ticker = ?1
                 ORDER BY fiscal_year ASC",
            )
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        let rows = stmt
            .query_map(params![ticker.as_str()], |row| {
                Ok((
                    row.get::<_, i32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                ))
            })
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        let mut periods = Vec::new();
        for row in rows {
            let (fiscal_year, form, period_end, accession, quality_score) =
                row.map_err(|e| ValuationError::Store(e.to_string()))?;
            let form = FilingForm::from_form(&form)
                .ok_or_else(|| ValuationError::Parse(format!("invalid filing form: {form}")))?;
            let period_end = period_end
                .parse()
                .map_err(|e| ValuationError::Parse(format!("invalid period end: {e}")))?;
            periods.push(FilingPeriod {
                fiscal_year,
                period_end,
                form,
                accession: accession.unwrap_or_default(),
                quality_score,
            });
        }

        if periods.is_empty() {
            debug!("no stored periods found");
            return Ok(None);
        }

        debug!("found {} stored periods", periods.len());
        Ok(Some(periods))
    }

    #[instrument(skip(self, period), fields(ticker = %ticker, fiscal_year = period.fiscal_year))]
    async fn put_period(&self, ticker: &Ticker, period: &FilingPeriod) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        // Insert-if-absent on the period key; re-puts only update the
        // quality score set by the validator.
        conn.execute(
            "INSERT INTO filing_periods
             (ticker, fiscal_year, form, period_end, accession, quality_score, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(ticker, fiscal_year, form)
             DO UPDATE SET quality_score = excluded.quality_score",
            params![
                ticker.as_str(),
                period.fiscal_year,
                period.form.as_str(),
                period.period_end.to_string(),
                period.accession,
                period.quality_score,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(|e| ValuationError::Store(e.to_string()))?;

        debug!("stored period");
        Ok(())
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn get_statement_rows(&self, ticker: &Ticker) -> Result<Option<Vec<StatementRow>>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT data_json FROM statement_rows
                 WHERE ticker = ?1
                 ORDER BY fiscal_year ASC",
            )
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        let json_rows = stmt
            .query_map(params![ticker.as_str()], |row| row.get::<_, String>(0))
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        let mut rows = Vec::new();
        for json in json_rows {
            let json = json.map_err(|e| ValuationError::Store(e.to_string()))?;
            let row: StatementRow =
                serde_json::from_str(&json).map_err(|e| ValuationError::Parse(e.to_string()))?;
            rows.push(row);
        }

        if rows.is_empty() {
            debug!("no stored statement rows found");
            return Ok(None);
        }

        debug!("found {} stored statement rows", rows.len());
        Ok(Some(rows))
    }

    #[instrument(skip(self, rows), fields(ticker = %ticker, count = rows.len()))]
    async fn put_statement_rows(&self, ticker: &Ticker, rows: &[StatementRow]) -> Result<()> {
        let stored_at = Utc::now().to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| ValuationError::Store(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        for row in rows {
            let data_json =
                serde_json::to_string(row).map_err(|e| ValuationError::Parse(e.to_string()))?;
            tx.execute(
                "INSERT OR REPLACE INTO statement_rows
                 (ticker, fiscal_year, data_json, stored_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![ticker.as_str(), row.fiscal_year, data_json, stored_at],
            )
            .map_err(|e| ValuationError::Store(e.to_string()))?;
        }

        tx.commit().map_err(|e| ValuationError::Store(e.to_string()))?;
        debug!("stored {} statement rows", rows.len());
        Ok(())
    }

    #[instrument(skip(self), fields(ticker = %ticker, base_fiscal_year))]
    async fn get_valuation(
        &self,
        ticker: &Ticker,
        base_fiscal_year: i32,
    ) -> Result<Option<Valuation>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        let result = conn
            .query_row(
                "SELECT data_json FROM valuations
                 WHERE ticker = ?1 AND base_fiscal_year = ?2",
                params![ticker.as_str(), base_fiscal_year],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        match result {
            Some(json) => {
                let valuation: Valuation = serde_json::from_str(&json)
                    .map_err(|e| ValuationError::Parse(e.to_string()))?;
                debug!("found stored valuation");
                Ok(Some(valuation))
            }
            None => {
                debug!("no stored valuation found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, valuation), fields(ticker = %ticker, base_fiscal_year))]
    async fn put_valuation(
        &self,
        ticker: &Ticker,
        base_fiscal_year: i32,
        valuation: &Valuation,
    ) -> Result<()> {
        let data_json =
            serde_json::to_string(valuation).map_err(|e| ValuationError::Parse(e.to_string()))?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO valuations
             (ticker, base_fiscal_year, wacc, terminal_growth, enterprise_value,
              equity_value, price_per_share, data_json, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                ticker.as_str(),
                base_fiscal_year,
                valuation.wacc,
                valuation.terminal_growth,
                valuation.enterprise_value,
                valuation.equity_value,
                valuation.price_per_share,
                data_json,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(|e| ValuationError::Store(e.to_string()))?;

        debug!("stored valuation");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        conn.execute("DELETE FROM companies", [])
            .map_err(|e| ValuationError::Store(e.to_string()))?;
        conn.execute("DELETE FROM filing_periods", [])
            .map_err(|e| ValuationError::Store(e.to_string()))?;
        conn.execute("DELETE FROM statement_rows", [])
            .map_err(|e| ValuationError::Store(e.to_string()))?;
        conn.execute("DELETE FROM valuations", [])
            .map_err(|e| ValuationError::Store(e.to_string()))?;

        debug!("cleared all stored data");
        Ok(())
    }
}
