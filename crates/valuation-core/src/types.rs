//! Core data types for the valuation pipeline.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Ticker`] - Company ticker symbol
//! - [`Company`] - Company reference information
//! - [`RawFact`] / [`RawFactSet`] - Provider-shaped raw observations
//! - [`FactObservation`] - A resolved, provenance-carrying observation
//! - [`FilingPeriod`] - One fiscal year's filing with its quality score
//! - [`StatementRow`] - Per-fiscal-year merged statement record
//! - [`Valuation`] - Complete DCF output with the equity bridge

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::concept::Concept;
use crate::filing::FilingForm;

/// A company ticker symbol.
///
/// Tickers are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ticker {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Company reference information.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Ticker symbol.
    pub ticker: Ticker,
    /// Registered company name.
    pub name: String,
    /// SEC Central Index Key, zero-padded to 10 digits when present.
    pub cik: Option<String>,
    /// Business sector, when known.
    pub sector: Option<String>,
}

impl Company {
    /// Creates new company info with required fields.
    #[must_use]
    pub fn new(ticker: Ticker, name: impl Into<String>) -> Self {
        Self {
            ticker,
            name: name.into(),
            cik: None,
            sector: None,
        }
    }

    /// Sets the SEC CIK number.
    #[must_use]
    pub fn with_cik(mut self, cik: impl Into<String>) -> Self {
        self.cik = Some(cik.into());
        self
    }

    /// Sets the business sector.
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }
}

/// A single raw observation as surfaced by a fact provider, before concept
/// resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawFact {
    /// Reported value.
    pub value: f64,
    /// Fiscal year the observation belongs to.
    pub fiscal_year: i32,
    /// End date of the reporting period.
    pub period_end: NaiveDate,
    /// Filing form the observation was reported on.
    pub form: FilingForm,
    /// Accession number of the filed document.
    pub accession: String,
}

/// Raw observations keyed by source label, as returned by a [`FactProvider`].
///
/// [`FactProvider`]: crate::provider::FactProvider
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFactSet {
    facts: BTreeMap<String, Vec<RawFact>>,
}

impl RawFactSet {
    /// Creates an empty fact set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observation under a source label.
    pub fn insert(&mut self, label: impl Into<String>, fact: RawFact) {
        self.facts.entry(label.into()).or_default().push(fact);
    }

    /// Returns the observations recorded under a source label, if any.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&[RawFact]> {
        self.facts.get(label).map(Vec::as_slice)
    }

    /// Returns an iterator over the source labels present in this set.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.facts.keys().map(String::as_str)
    }

    /// Returns the number of distinct source labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if no labels are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// A resolved observation: one concept, one fiscal year, with provenance.
///
/// Produced once by extraction and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactObservation {
    /// The canonical concept this observation resolves.
    pub concept: Concept,
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Reported value.
    pub value: f64,
    /// The source label that actually supplied the value.
    pub source_label: String,
    /// Filing form the observation was reported on.
    pub form: FilingForm,
    /// End date of the reporting period.
    pub period_end: NaiveDate,
    /// Accession number of the filed document.
    pub accession: String,
}

/// One fiscal year's filing for a company.
///
/// The `quality_score` is set exclusively by the validator; the rest of the
/// record is immutable once extracted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilingPeriod {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// End date of the reporting period.
    pub period_end: NaiveDate,
    /// Filing form.
    pub form: FilingForm,
    /// Accession number of the filed document.
    pub accession: String,
    /// Validation pass rate in `[0, 1]`, once the validator has run.
    pub quality_score: Option<f64>,
}

/// How a statement-row value was obtained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Taken directly from a filing under the given source label.
    Reported {
        /// The source label that supplied the value.
        label: String,
    },
    /// Synthesized by a reconciliation rule.
    Derived {
        /// The identity rule that produced the value.
        rule: String,
    },
}

impl Provenance {
    /// Returns true for values synthesized by a reconciliation rule.
    #[must_use]
    pub const fn is_derived(&self) -> bool {
        matches!(self, Self::Derived { .. })
    }
}

/// A per-fiscal-year merged statement record.
///
/// Ephemeral: derived by the aligner from resolved concept series, never
/// authoritative data. Holds the concepts required for FCFF plus the
/// balance-sheet context used by the validator, the working-capital
/// derivation, and the equity bridge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// End date of the reporting period.
    pub period_end: NaiveDate,

    // FCFF components
    /// Operating income.
    pub ebit: Option<f64>,
    /// Income before income taxes.
    pub pre_tax_income: Option<f64>,
    /// Income tax expense.
    pub tax_expense: Option<f64>,
    /// Depreciation and amortization.
    pub depreciation_amortization: Option<f64>,
    /// Capital expenditures.
    pub capital_expenditure: Option<f64>,
    /// Reported change in operating working capital.
    pub change_in_working_capital: Option<f64>,

    // Context for validation, working-capital derivation and the bridge
    /// Total revenue.
    pub revenue: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
    /// Operating cash flow.
    pub operating_cash_flow: Option<f64>,
    /// Current assets.
    pub current_assets: Option<f64>,
    /// Current liabilities.
    pub current_liabilities: Option<f64>,
    /// Cash and cash equivalents.
    pub cash: Option<f64>,
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Total liabilities.
    pub total_liabilities: Option<f64>,
    /// Stockholders' equity.
    pub stockholders_equity: Option<f64>,
    /// Long-term debt.
    pub long_term_debt: Option<f64>,
    /// Short-term debt.
    pub short_term_debt: Option<f64>,
    /// Total debt, reported or composed from the long- and short-term sides.
    pub total_debt: Option<f64>,
    /// Shares outstanding.
    pub shares_outstanding: Option<f64>,

    /// How each populated concept was obtained.
    pub provenance: BTreeMap<Concept, Provenance>,
}

impl StatementRow {
    /// Creates an empty row for a fiscal year.
    #[must_use]
    pub fn new(fiscal_year: i32, period_end: NaiveDate) -> Self {
        Self {
            fiscal_year,
            period_end,
            ..Default::default()
        }
    }

    /// Returns the value stored for a concept, if populated.
    #[must_use]
    pub fn value(&self, concept: Concept) -> Option<f64> {
        match concept {
            Concept::Ebit => self.ebit,
            Concept::PreTaxIncome => self.pre_tax_income,
            Concept::NetIncome => self.net_income,
            Concept::TaxExpense => self.tax_expense,
            Concept::DepreciationAmortization => self.depreciation_amortization,
            Concept::CapitalExpenditure => self.capital_expenditure,
            Concept::ChangeInWorkingCapital => self.change_in_working_capital,
            Concept::Revenue => self.revenue,
            Concept::OperatingCashFlow => self.operating_cash_flow,
            Concept::CurrentAssets => self.current_assets,
            Concept::CurrentLiabilities => self.current_liabilities,
            Concept::Cash => self.cash,
            Concept::TotalAssets => self.total_assets,
            Concept::TotalLiabilities => self.total_liabilities,
            Concept::StockholdersEquity => self.stockholders_equity,
            Concept::LongTermDebt => self.long_term_debt,
            Concept::ShortTermDebt => self.short_term_debt,
            Concept::TotalDebt => self.total_debt,
            Concept::SharesOutstanding => self.shares_outstanding,
        }
    }

    /// Stores a value for a concept with its provenance.
    pub fn set(&mut self, concept: Concept, value: f64, provenance: Provenance) {
        let slot = match concept {
            Concept::Ebit => &mut self.ebit,
            Concept::PreTaxIncome => &mut self.pre_tax_income,
            Concept::NetIncome => &mut self.net_income,
            Concept::TaxExpense => &mut self.tax_expense,
            Concept::DepreciationAmortization => &mut self.depreciation_amortization,
            Concept::CapitalExpenditure => &mut self.capital_expenditure,
            Concept::ChangeInWorkingCapital => &mut self.change_in_working_capital,
            Concept::Revenue => &mut self.revenue,
            Concept::OperatingCashFlow => &mut self.operating_cash_flow,
            Concept::CurrentAssets => &mut self.current_assets,
            Concept::CurrentLiabilities => &mut self.current_liabilities,
            Concept::Cash => &mut self.cash,
            Concept::TotalAssets => &mut self.total_assets,
            Concept::TotalLiabilities => &mut self.total_liabilities,
            Concept::StockholdersEquity => &mut self.stockholders_equity,
            Concept::LongTermDebt => &mut self.long_term_debt,
            Concept::ShortTermDebt => &mut self.short_term_debt,
            Concept::TotalDebt => &mut self.total_debt,
            Concept::SharesOutstanding => &mut self.shares_outstanding,
        };
        *slot = Some(value);
        self.provenance.insert(concept, provenance);
    }

    /// Returns true if the concept was synthesized by a reconciliation rule.
    #[must_use]
    pub fn is_derived(&self, concept: Concept) -> bool {
        self.provenance
            .get(&concept)
            .is_some_and(Provenance::is_derived)
    }

    /// Concepts from the FCFF-required set that are missing from this row.
    #[must_use]
    pub fn missing_required(&self) -> Vec<Concept> {
        Concept::REQUIRED_FOR_FCFF
            .into_iter()
            .filter(|c| self.value(*c).is_none())
            .collect()
    }

    /// Returns true if every FCFF-required concept is populated.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Net debt for the equity bridge: total debt minus cash.
    ///
    /// Missing sides contribute zero, matching how filings with no reported
    /// debt are treated.
    #[must_use]
    pub fn net_debt(&self) -> f64 {
        self.total_debt.unwrap_or(0.0) - self.cash.unwrap_or(0.0)
    }
}

/// One discounted cash flow in the explicit forecast period.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountedCashFlow {
    /// Forecast year (1-based).
    pub year: u32,
    /// Projected cash flow.
    pub cash_flow: f64,
    /// Present value at the discount rate.
    pub present_value: f64,
}

/// Complete DCF valuation output, including the inspectable equity bridge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Discount rate used.
    pub wacc: f64,
    /// Perpetual growth rate beyond the horizon.
    pub terminal_growth: f64,
    /// Explicit forecast horizon in years.
    pub horizon: u32,
    /// Per-year discounted cash flows for the explicit period.
    pub explicit: Vec<DiscountedCashFlow>,
    /// Present value of the explicit period.
    pub pv_explicit: f64,
    /// Gordon-growth terminal value at the horizon.
    pub terminal_value: f64,
    /// Present value of the terminal value.
    pub pv_terminal: f64,
    /// Enterprise value.
    pub enterprise_value: f64,
    /// Net debt subtracted in the bridge.
    pub net_debt: f64,
    /// Shares outstanding used for the per-share figure.
    pub shares_outstanding: f64,
    /// Equity value after the bridge.
    pub equity_value: f64,
    /// Intrinsic value per share.
    pub price_per_share: f64,
}
