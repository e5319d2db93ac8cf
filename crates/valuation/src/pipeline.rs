//! The end-to-end valuation pipeline.
//!
//! A [`ValuationPipeline`] owns an ordered list of fact providers (tried in
//! order until one yields facts), an optional store for write-back, and the
//! pipeline configuration. Each [`run`](ValuationPipeline::run) is a
//! synchronous batch computation over one company's filings; only the
//! provider and store seams are asynchronous.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use valuation_core::{
    Company, Concept, FactProvider, FilingForm, FilingPeriod, RawFactSet, Result, StatementRow,
    Ticker, Valuation, ValuationConfig, ValuationError, ValuationStore,
};
use valuation_engine::{
    compute_wacc, dcf_value, project, simulate, CostOfCapital, FcffEngine, FcffSeries,
    GrowthModel, SimulationOutcome, WaccInputs,
};
use valuation_facts::{align, extract_all, reconcile, ExcludedPeriod, ReconciliationGap,
    ResolvedConcepts,
};
use valuation_validate::{ValidationReport, Validator};

/// How the discount rate is supplied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DiscountRate {
    /// Caller supplies the rate directly.
    Given(f64),
    /// Derive the rate from CAPM inputs and the capital structure.
    Capm(WaccInputs),
}

/// A single valuation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuationRequest {
    /// Company to value.
    pub ticker: Ticker,
    /// Discount rate, given or CAPM-derived.
    pub discount: DiscountRate,
    /// Perpetual growth rate beyond the horizon.
    pub terminal_growth: f64,
    /// Explicit forecast horizon in years.
    pub horizon: u32,
    /// Projection strategy.
    pub growth: GrowthModel,
    /// Whether to sample the valuation distribution after the point estimate.
    pub simulate: bool,
}

/// Everything a run produced, with the audit trail attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuationOutcome {
    /// Company the valuation covers.
    pub company: Company,
    /// Fiscal year of the base period the projection grew from.
    pub base_fiscal_year: i32,
    /// The DCF point estimate with its bridge.
    pub valuation: Valuation,
    /// Per-period FCFF results and the mode that produced them.
    pub fcff: FcffSeries,
    /// Cost-of-capital breakdown, when CAPM inputs were supplied.
    pub cost_of_capital: Option<CostOfCapital>,
    /// Validation reports per aligned period.
    pub validation: Vec<ValidationReport>,
    /// Concepts the reconciler could not reconstruct.
    pub gaps: Vec<ReconciliationGap>,
    /// Periods excluded under the strict join policy.
    pub excluded: Vec<ExcludedPeriod>,
    /// Sampled valuation distribution, when requested.
    pub simulation: Option<SimulationOutcome>,
}

/// The pipeline: providers with ordered fallback, optional store, config.
#[derive(Default)]
pub struct ValuationPipeline {
    providers: Vec<Arc<dyn FactProvider>>,
    store: Option<Arc<dyn ValuationStore>>,
    config: ValuationConfig,
}

impl std::fmt::Debug for ValuationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValuationPipeline")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("store", &self.store.as_ref().map(|_| "configured"))
            .field("config", &self.config)
            .finish()
    }
}

impl ValuationPipeline {
    /// Create an empty pipeline with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty pipeline with the given configuration.
    #[must_use]
    pub fn with_config(config: ValuationConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Register a fact provider; providers are tried in registration order.
    pub fn register_provider(&mut self, provider: Arc<dyn FactProvider>) {
        debug!(provider = provider.name(), "registering fact provider");
        self.providers.push(provider);
    }

    /// Builder form of [`register_provider`](Self::register_provider).
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn FactProvider>) -> Self {
        self.register_provider(provider);
        self
    }

    /// Set the store results are written back to.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ValuationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Add a pre-loaded EDGAR companyfacts provider.
    #[cfg(feature = "edgar")]
    #[must_use]
    pub fn with_edgar(self, provider: valuation_edgar::EdgarProvider) -> Self {
        self.with_provider(Arc::new(provider))
    }

    /// Use an in-memory store.
    #[cfg(feature = "store")]
    #[must_use]
    pub fn with_in_memory_store(self) -> Self {
        self.with_store(Arc::new(valuation_store::InMemoryStore::new()))
    }

    /// Use a SQLite store at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    #[cfg(feature = "store-sqlite")]
    pub fn with_sqlite_store(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let store = valuation_store::SqliteStore::new(path)?;
        Ok(self.with_store(Arc::new(store)))
    }

    /// Fetch company info and raw facts, trying providers in order.
    async fn fetch_facts(&self, ticker: &Ticker) -> Result<(Company, RawFactSet)> {
        if self.providers.is_empty() {
            return Err(ValuationError::ProviderNotConfigured(
                "no fact providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.providers {
            debug!(provider = provider.name(), ticker = %ticker, "fetching raw facts");
            match provider.raw_facts(ticker).await {
                Ok(raw) => {
                    let company = provider.company(ticker).await?;
                    return Ok((company, raw));
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ValuationError::UpstreamFetch("all providers failed with no error".to_string())
        }))
    }

    /// Run one valuation request end to end.
    pub async fn run(&self, request: &ValuationRequest) -> Result<ValuationOutcome> {
        // Fact resolution: raw facts → concept series → reconciled →
        // aligned rows. Annual filings only.
        let (company, raw) = self.fetch_facts(&request.ticker).await?;
        let mut resolved = extract_all(&raw, FilingForm::Annual);
        let gaps = reconcile(&mut resolved);
        let aligned = align(&resolved, self.config.join_policy);

        // Validation annotates every surviving period; it gates the FCFF
        // engine only through component presence.
        let validator = Validator::new(self.config.validation);
        let validation: Vec<ValidationReport> =
            aligned.rows.iter().map(|row| validator.validate(row)).collect();

        // Cash flow per period under the configured output mode.
        let fcff = FcffEngine::new(self.config.fcff).compute_series(&aligned.rows)?;
        let (base_fiscal_year, base_fcff) = fcff
            .latest()
            .map(|base| (base.fiscal_year, base.fcff))
            .ok_or_else(|| ValuationError::MissingData {
                concept: "free cash flow".to_string(),
            })?;
        let base_row = aligned
            .rows
            .iter()
            .find(|r| r.fiscal_year == base_fiscal_year)
            .ok_or_else(|| ValuationError::MissingData {
                concept: "base period".to_string(),
            })?;

        // Discount rate: given, or one deterministic CAPM pass.
        let (wacc, cost_of_capital) = match &request.discount {
            DiscountRate::Given(wacc) => (*wacc, None),
            DiscountRate::Capm(inputs) => {
                let breakdown = compute_wacc(inputs);
                (breakdown.wacc, Some(breakdown))
            }
        };

        // Projection and the DCF point estimate.
        let projection = project(&request.growth, base_fcff, request.horizon)?;
        let shares = base_row
            .shares_outstanding
            .ok_or_else(|| ValuationError::MissingData {
                concept: Concept::SharesOutstanding.to_string(),
            })?;
        let valuation = dcf_value(
            &projection.fcffs(),
            wacc,
            request.terminal_growth,
            base_row.net_debt(),
            shares,
        )?;

        // Parameter uncertainty, when requested.
        let simulation = if request.simulate {
            Some(simulate(
                base_fcff,
                wacc,
                request.terminal_growth,
                &self.config.monte_carlo,
            )?)
        } else {
            None
        };

        let outcome = ValuationOutcome {
            company,
            base_fiscal_year,
            valuation,
            fcff,
            cost_of_capital,
            validation,
            gaps,
            excluded: aligned.excluded,
            simulation,
        };

        self.persist(&request.ticker, &resolved, &aligned.rows, &outcome)
            .await;

        Ok(outcome)
    }

    /// Write results back to the store, if one is configured.
    ///
    /// Store failures are logged and do not invalidate a computed result.
    async fn persist(
        &self,
        ticker: &Ticker,
        resolved: &ResolvedConcepts,
        rows: &[StatementRow],
        outcome: &ValuationOutcome,
    ) {
        let Some(store) = &self.store else {
            return;
        };

        if let Err(e) = store.put_company(&outcome.company).await {
            warn!(error = %e, "failed to store company");
        }

        for row in rows {
            let quality_score = outcome
                .validation
                .iter()
                .find(|r| r.fiscal_year == row.fiscal_year)
                .map(|r| r.quality_score);
            let period = FilingPeriod {
                fiscal_year: row.fiscal_year,
                period_end: row.period_end,
                form: FilingForm::Annual,
                accession: accession_for(resolved, row.fiscal_year),
                quality_score,
            };
            if let Err(e) = store.put_period(ticker, &period).await {
                warn!(error = %e, fiscal_year = row.fiscal_year, "failed to store period");
            }
        }

        if let Err(e) = store.put_statement_rows(ticker, rows).await {
            warn!(error = %e, "failed to store statement rows");
        }

        if let Err(e) = store
            .put_valuation(ticker, outcome.base_fiscal_year, &outcome.valuation)
            .await
        {
            warn!(error = %e, "failed to store valuation");
        }
    }
}

/// Accession for a fiscal year, taken from the first income concept that
/// resolved for it.
fn accession_for(resolved: &ResolvedConcepts, fiscal_year: i32) -> String {
    [Concept::Ebit, Concept::NetIncome, Concept::Revenue]
        .into_iter()
        .filter_map(|c| resolved.get(c))
        .find_map(|s| s.observation_for(fiscal_year))
        .map(|o| o.accession.clone())
        .unwrap_or_default()
}
