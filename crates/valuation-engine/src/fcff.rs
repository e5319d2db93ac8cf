//! Free Cash Flow to the Firm per usable period.
//!
//! `FCFF = NOPAT + D&A − CapEx − ΔNWC`, with `NOPAT = EBIT × (1 − tax rate)`.
//! The effective tax rate is clamped into configured bounds before use and
//! falls back to a statutory default when pre-tax income is non-positive.
//! Change in working capital resolves through a three-tier fallback, and the
//! tier actually used is recorded on the result as part of the audit trail.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use valuation_core::{
    Concept, FcffConfig, FcffMode, Result, StatementRow, ValuationError,
};

/// Where a period's tax rate came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxRateSource {
    /// Effective rate computed from tax expense over pre-tax income.
    Effective,
    /// Configured statutory fallback; pre-tax income was non-positive or
    /// unusable as a denominator.
    StatutoryDefault,
}

/// Which fallback tier supplied the change in working capital.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NwcTier {
    /// Directly reported under a working-capital concept.
    Reported,
    /// Derived from current-asset, current-liability and cash deltas across
    /// consecutive periods.
    DerivedFromBalanceSheet,
    /// No source available; assumed zero.
    AssumedZero,
}

/// FCFF and its components for one period, with provenance tags.
///
/// Always recomputable from the source statement row; never stored as
/// independent truth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FcffResult {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Operating income.
    pub ebit: f64,
    /// Tax rate applied, already clamped.
    pub tax_rate: f64,
    /// Where the tax rate came from.
    pub tax_rate_source: TaxRateSource,
    /// `EBIT × (1 − tax_rate)`.
    pub nopat: f64,
    /// Depreciation and amortization added back.
    pub depreciation_amortization: f64,
    /// Capital expenditures subtracted.
    pub capital_expenditure: f64,
    /// Change in net working capital subtracted.
    pub change_in_nwc: f64,
    /// Which fallback tier supplied the ΔNWC figure.
    pub nwc_tier: NwcTier,
    /// Free cash flow to the firm.
    pub fcff: f64,
}

impl FcffResult {
    /// Recomputes FCFF from the stored components.
    ///
    /// Equal to [`fcff`](Self::fcff) by construction; exposed so callers can
    /// verify the round trip.
    #[must_use]
    pub fn recompute(&self) -> f64 {
        self.nopat + self.depreciation_amortization
            - self.capital_expenditure
            - self.change_in_nwc
    }
}

/// FCFF results for the periods the configured mode selected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FcffSeries {
    /// The output mode that produced this series; callers must be told
    /// whether they received one period or a history.
    pub mode: FcffMode,
    /// Per-period results, oldest first.
    pub results: Vec<FcffResult>,
}

impl FcffSeries {
    /// The most recent period's result.
    #[must_use]
    pub fn latest(&self) -> Option<&FcffResult> {
        self.results.last()
    }
}

/// Computes FCFF per usable period under a configured policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct FcffEngine {
    config: FcffConfig,
}

impl FcffEngine {
    /// Creates an engine with the given policy.
    #[must_use]
    pub const fn new(config: FcffConfig) -> Self {
        Self { config }
    }

    /// Effective tax rate for a row, clamped, with its source.
    ///
    /// The clamp band tightens when pre-tax income was reconciled rather
    /// than reported, since reconstructed denominators deserve less trust at
    /// the extremes.
    #[must_use]
    pub fn tax_rate(&self, row: &StatementRow) -> (f64, TaxRateSource) {
        let tax = &self.config.tax;
        match (row.tax_expense, row.pre_tax_income) {
            (Some(expense), Some(pre_tax)) if pre_tax > 0.0 => {
                let (lo, hi) = if row.is_derived(Concept::PreTaxIncome) {
                    tax.reconciled_clamp
                } else {
                    tax.reported_clamp
                };
                let rate = (expense / pre_tax).clamp(lo, hi);
                (rate, TaxRateSource::Effective)
            }
            _ => {
                warn!(
                    fiscal_year = row.fiscal_year,
                    rate = tax.statutory_rate,
                    "pre-tax income non-positive or missing, using statutory tax rate"
                );
                (tax.statutory_rate, TaxRateSource::StatutoryDefault)
            }
        }
    }

    /// Resolves change in working capital through the three-tier fallback.
    ///
    /// Tier order: reported concept, balance-sheet delta against the
    /// previous period (when enabled and both periods carry current assets,
    /// current liabilities and cash), assumed zero.
    #[must_use]
    pub fn resolve_nwc(
        &self,
        row: &StatementRow,
        prev: Option<&StatementRow>,
    ) -> (f64, NwcTier) {
        if let Some(reported) = row.change_in_working_capital {
            return (reported, NwcTier::Reported);
        }

        if self.config.derive_nwc_from_balance_sheet
            && let Some(prev) = prev
            && let (Some(current), Some(previous)) = (net_working_capital(row), net_working_capital(prev))
        {
            return (current - previous, NwcTier::DerivedFromBalanceSheet);
        }

        (0.0, NwcTier::AssumedZero)
    }

    /// Computes FCFF for one usable row.
    ///
    /// `prev` is the chronologically preceding row, used only by the
    /// working-capital derivation tier.
    pub fn compute(
        &self,
        row: &StatementRow,
        prev: Option<&StatementRow>,
    ) -> Result<FcffResult> {
        if let Some(missing) = row.missing_required().first() {
            return Err(ValuationError::MissingData {
                concept: missing.to_string(),
            });
        }

        // Required set verified above.
        let ebit = row.ebit.unwrap_or_default();
        let depreciation_amortization = row.depreciation_amortization.unwrap_or_default();
        let capital_expenditure = row.capital_expenditure.unwrap_or_default();

        let (tax_rate, tax_rate_source) = self.tax_rate(row);
        let nopat = ebit * (1.0 - tax_rate);
        let (change_in_nwc, nwc_tier) = self.resolve_nwc(row, prev);
        let fcff = nopat + depreciation_amortization - capital_expenditure - change_in_nwc;

        debug!(
            fiscal_year = row.fiscal_year,
            fcff,
            ?nwc_tier,
            ?tax_rate_source,
            "computed FCFF"
        );

        Ok(FcffResult {
            fiscal_year: row.fiscal_year,
            ebit,
            tax_rate,
            tax_rate_source,
            nopat,
            depreciation_amortization,
            capital_expenditure,
            change_in_nwc,
            nwc_tier,
            fcff,
        })
    }

    /// Computes FCFF across aligned rows under the configured output mode.
    ///
    /// Rows must be sorted oldest first. Unusable rows never produce a
    /// result but still serve as the previous period for the
    /// working-capital derivation. The derivation tier only sees a previous
    /// row from the immediately preceding fiscal year; deltas across a gap
    /// are not working-capital changes.
    pub fn compute_series(&self, rows: &[StatementRow]) -> Result<FcffSeries> {
        let mut results = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            if !row.is_usable() {
                continue;
            }
            let prev = index
                .checked_sub(1)
                .map(|i| &rows[i])
                .filter(|p| p.fiscal_year + 1 == row.fiscal_year);
            results.push(self.compute(row, prev)?);
        }

        if results.is_empty() {
            let concept = rows
                .last()
                .and_then(|row| row.missing_required().first().copied())
                .map_or_else(|| "statement data".to_string(), |c| c.to_string());
            return Err(ValuationError::MissingData { concept });
        }

        // Keep the newest periods the mode allows; `results` is non-empty here.
        let keep = match self.config.mode {
            FcffMode::LatestOnly => 1,
            FcffMode::Historical { max_periods } => results.len().min(max_periods),
        };
        let results = results.split_off(results.len() - keep);
        Ok(FcffSeries {
            mode: self.config.mode,
            results,
        })
    }
}

/// Net working capital for the derivation tier:
/// `(current assets − cash) − current liabilities`.
fn net_working_capital(row: &StatementRow) -> Option<f64> {
    let current_assets = row.current_assets?;
    let current_liabilities = row.current_liabilities?;
    let cash = row.cash?;
    Some((current_assets - cash) - current_liabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn usable_row(year: i32) -> StatementRow {
        let mut row = StatementRow::new(year, NaiveDate::from_ymd_opt(year, 12, 31).unwrap());
        row.ebit = Some(1000.0);
        row.pre_tax_income = Some(900.0);
        row.tax_expense = Some(200.0);
        row.depreciation_amortization = Some(50.0);
        row.capital_expenditure = Some(80.0);
        row
    }

    #[test]
    fn test_worked_example() {
        // EBIT 1000, pre-tax 900, tax 200, D&A 50, CapEx 80, ΔNWC 20.
        let mut row = usable_row(2023);
        row.change_in_working_capital = Some(20.0);

        let result = FcffEngine::default().compute(&row, None).unwrap();
        assert!((result.tax_rate - 200.0 / 900.0).abs() < 1e-12);
        assert!((result.nopat - 1000.0 * (1.0 - 200.0 / 900.0)).abs() < 1e-9);
        assert!((result.fcff - (result.nopat + 50.0 - 80.0 - 20.0)).abs() < 1e-9);
        assert!((result.fcff - 727.78).abs() < 0.01);
        assert_eq!(result.nwc_tier, NwcTier::Reported);
        assert_eq!(result.tax_rate_source, TaxRateSource::Effective);
    }

    #[test]
    fn test_fcff_round_trip() {
        let mut row = usable_row(2023);
        row.change_in_working_capital = Some(20.0);
        let result = FcffEngine::default().compute(&row, None).unwrap();
        assert_eq!(result.recompute(), result.fcff);
    }

    #[test]
    fn test_extreme_tax_ratio_is_clamped() {
        let mut row = usable_row(2023);
        row.pre_tax_income = Some(10.0);
        row.tax_expense = Some(9.0); // 90% raw ratio

        let (rate, source) = FcffEngine::default().tax_rate(&row);
        assert_eq!(rate, 0.35);
        assert_eq!(source, TaxRateSource::Effective);
    }

    #[test]
    fn test_negative_pre_tax_income_falls_back_to_statutory() {
        let mut row = usable_row(2023);
        row.pre_tax_income = Some(-100.0);

        let (rate, source) = FcffEngine::default().tax_rate(&row);
        assert_eq!(rate, 0.21);
        assert_eq!(source, TaxRateSource::StatutoryDefault);
        assert!(rate.is_finite());
    }

    #[test]
    fn test_reconciled_pre_tax_income_uses_tighter_clamp() {
        use valuation_core::Provenance;

        let mut row = usable_row(2023);
        row.set(
            Concept::PreTaxIncome,
            900.0,
            Provenance::Derived {
                rule: "net income + tax expense".to_string(),
            },
        );
        row.tax_expense = Some(45.0); // 5% raw ratio

        let (rate, _) = FcffEngine::default().tax_rate(&row);
        assert_eq!(rate, 0.15);
    }

    #[test]
    fn test_nwc_derived_from_balance_sheet_deltas() {
        let mut prev = usable_row(2022);
        prev.current_assets = Some(500.0);
        prev.current_liabilities = Some(300.0);
        prev.cash = Some(50.0);

        let mut row = usable_row(2023);
        row.current_assets = Some(540.0);
        row.current_liabilities = Some(310.0);
        row.cash = Some(55.0);

        // NWC: (500-50)-300 = 150, then (540-55)-310 = 175.
        let (nwc, tier) = FcffEngine::default().resolve_nwc(&row, Some(&prev));
        assert!((nwc - 25.0).abs() < 1e-12);
        assert_eq!(tier, NwcTier::DerivedFromBalanceSheet);
    }

    #[test]
    fn test_nwc_assumed_zero_when_balance_sheet_absent() {
        let row = usable_row(2023);
        let prev = usable_row(2022);

        let (nwc, tier) = FcffEngine::default().resolve_nwc(&row, Some(&prev));
        assert_eq!(nwc, 0.0);
        assert_eq!(tier, NwcTier::AssumedZero);
    }

    #[test]
    fn test_nwc_derivation_tier_can_be_disabled() {
        let engine = FcffEngine::new(FcffConfig {
            derive_nwc_from_balance_sheet: false,
            ..Default::default()
        });

        let mut prev = usable_row(2022);
        prev.current_assets = Some(500.0);
        prev.current_liabilities = Some(300.0);
        prev.cash = Some(50.0);
        let mut row = usable_row(2023);
        row.current_assets = Some(540.0);
        row.current_liabilities = Some(310.0);
        row.cash = Some(55.0);

        let (nwc, tier) = engine.resolve_nwc(&row, Some(&prev));
        assert_eq!(nwc, 0.0);
        assert_eq!(tier, NwcTier::AssumedZero);
    }

    #[test]
    fn test_nwc_not_derived_across_a_year_gap() {
        let mut old = usable_row(2020);
        old.current_assets = Some(500.0);
        old.current_liabilities = Some(300.0);
        old.cash = Some(50.0);

        let mut row = usable_row(2023);
        row.current_assets = Some(540.0);
        row.current_liabilities = Some(310.0);
        row.cash = Some(55.0);

        let series = FcffEngine::default()
            .compute_series(&[old, row])
            .unwrap();
        let latest = series.latest().unwrap();
        assert_eq!(latest.fiscal_year, 2023);
        assert_eq!(latest.nwc_tier, NwcTier::AssumedZero);
    }

    #[test]
    fn test_latest_only_mode_reports_single_period() {
        let engine = FcffEngine::new(FcffConfig {
            mode: FcffMode::LatestOnly,
            ..Default::default()
        });

        let rows = vec![usable_row(2021), usable_row(2022), usable_row(2023)];
        let series = engine.compute_series(&rows).unwrap();

        assert_eq!(series.mode, FcffMode::LatestOnly);
        assert_eq!(series.results.len(), 1);
        assert_eq!(series.results[0].fiscal_year, 2023);
    }

    #[test]
    fn test_historical_mode_caps_periods() {
        let engine = FcffEngine::new(FcffConfig {
            mode: FcffMode::Historical { max_periods: 2 },
            ..Default::default()
        });

        let rows = vec![usable_row(2021), usable_row(2022), usable_row(2023)];
        let series = engine.compute_series(&rows).unwrap();

        let years: Vec<i32> = series.results.iter().map(|r| r.fiscal_year).collect();
        assert_eq!(years, vec![2022, 2023]);
    }

    #[test]
    fn test_no_usable_rows_names_missing_concept() {
        let mut row = usable_row(2023);
        row.capital_expenditure = None;

        let err = FcffEngine::default().compute_series(&[row]).unwrap_err();
        match err {
            ValuationError::MissingData { concept } => {
                assert!(concept.contains("capital expenditure"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
