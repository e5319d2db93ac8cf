#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Tie-out validation for aligned filing periods.
//!
//! Validation annotates, it does not abort: every check contributes to the
//! period's quality score and travels with the result. The single gating
//! check is required-component presence, since a period without D&A and
//! CapEx cannot feed the FCFF engine; everything else is advisory.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use valuation_core::{StatementRow, ValidationConfig};

/// One tie-out check outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationCheck {
    /// Check name.
    pub name: String,
    /// Expected value, where the check compares two figures.
    pub expected: Option<f64>,
    /// Actual value, where the check compares two figures.
    pub actual: Option<f64>,
    /// Relative variance between expected and actual.
    pub variance: Option<f64>,
    /// Tolerance the variance was compared against.
    pub tolerance: Option<f64>,
    /// Whether the check passed.
    pub passed: bool,
    /// Advisory note or warning attached to the check.
    pub note: Option<String>,
}

/// The validator's verdict for one period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Fiscal year the report covers.
    pub fiscal_year: i32,
    /// Individual check outcomes.
    pub checks: Vec<ValidationCheck>,
    /// Passed checks over total checks, in `[0, 1]`.
    pub quality_score: f64,
    /// Whether the period may feed the FCFF engine.
    pub usable: bool,
}

impl ValidationReport {
    /// Returns the outcome of a named check, if it ran.
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&ValidationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Runs tie-out checks and scores data quality for aligned periods.
#[derive(Clone, Copy, Debug, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Creates a validator with the given tolerances.
    #[must_use]
    pub const fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validates one aligned period.
    pub fn validate(&self, row: &StatementRow) -> ValidationReport {
        let checks = vec![
            self.check_balance_identity(row),
            self.check_cash_flow_plausibility(row),
            self.check_required_components(row),
        ];

        let passed = checks.iter().filter(|c| c.passed).count();
        let quality_score = passed as f64 / checks.len() as f64;
        // Only the component-presence check gates the FCFF engine.
        let usable = checks
            .iter()
            .find(|c| c.name == "required components")
            .is_some_and(|c| c.passed);

        if !usable {
            warn!(
                fiscal_year = row.fiscal_year,
                "period cannot feed the FCFF engine"
            );
        }
        debug!(
            fiscal_year = row.fiscal_year,
            quality_score, usable, "validated period"
        );

        ValidationReport {
            fiscal_year: row.fiscal_year,
            checks,
            quality_score,
            usable,
        }
    }

    /// Primary tie-out: assets = liabilities + equity, within tolerance.
    fn check_balance_identity(&self, row: &StatementRow) -> ValidationCheck {
        let name = "balance identity".to_string();
        let tolerance = self.config.balance_tolerance;

        let (Some(assets), Some(liabilities), Some(equity)) = (
            row.total_assets,
            row.total_liabilities,
            row.stockholders_equity,
        ) else {
            return ValidationCheck {
                name,
                expected: None,
                actual: None,
                variance: None,
                tolerance: Some(tolerance),
                passed: false,
                note: Some("balance sheet totals not resolved".to_string()),
            };
        };

        let expected = liabilities + equity;
        let variance = if assets != 0.0 {
            (assets - expected).abs() / assets.abs()
        } else {
            0.0
        };
        let passed = variance <= tolerance;

        ValidationCheck {
            name,
            expected: Some(expected),
            actual: Some(assets),
            variance: Some(variance),
            tolerance: Some(tolerance),
            passed,
            note: None,
        }
    }

    /// Advisory plausibility flags on operating cash flow vs. net income.
    ///
    /// Always passes; unusual relationships are recorded as notes.
    fn check_cash_flow_plausibility(&self, row: &StatementRow) -> ValidationCheck {
        let name = "cash flow plausibility".to_string();
        let (low, high) = self.config.ocf_net_income_band;

        let mut note = None;
        let mut variance = None;

        if let (Some(ocf), Some(net_income)) = (row.operating_cash_flow, row.net_income) {
            if ocf < 0.0 && net_income > 0.0 {
                note = Some(
                    "negative operating cash flow despite positive net income".to_string(),
                );
            } else if net_income > 0.0 {
                let ratio = ocf / net_income;
                variance = Some(ratio);
                if ratio < low || ratio > high {
                    note = Some(format!(
                        "operating cash flow is {ratio:.2}x net income, outside [{low}, {high}]"
                    ));
                }
            }
        } else {
            note = Some("operating cash flow or net income not resolved".to_string());
        }

        ValidationCheck {
            name,
            expected: None,
            actual: row.operating_cash_flow,
            variance,
            tolerance: None,
            passed: true,
            note,
        }
    }

    /// D&A and CapEx must be present for NOPAT-based cash flow.
    fn check_required_components(&self, row: &StatementRow) -> ValidationCheck {
        let name = "required components".to_string();

        let mut missing = Vec::new();
        if row.depreciation_amortization.is_none() {
            missing.push("depreciation & amortization");
        }
        if row.capital_expenditure.is_none() {
            missing.push("capital expenditure");
        }

        let passed = missing.is_empty();
        ValidationCheck {
            name,
            expected: None,
            actual: None,
            variance: None,
            tolerance: None,
            passed,
            note: (!passed).then(|| format!("missing {}", missing.join(", "))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row_with_balance(assets: f64, liabilities: f64, equity: f64) -> StatementRow {
        let mut row = StatementRow::new(2023, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        row.total_assets = Some(assets);
        row.total_liabilities = Some(liabilities);
        row.stockholders_equity = Some(equity);
        row.depreciation_amortization = Some(50.0);
        row.capital_expenditure = Some(80.0);
        row
    }

    #[test]
    fn test_balance_identity_exact_passes() {
        let report = Validator::default().validate(&row_with_balance(100.0, 60.0, 40.0));
        let check = report.check("balance identity").unwrap();
        assert!(check.passed);
        assert_eq!(check.variance, Some(0.0));
    }

    #[test]
    fn test_balance_identity_ten_percent_variance_fails() {
        let report = Validator::default().validate(&row_with_balance(100.0, 60.0, 30.0));
        let check = report.check("balance identity").unwrap();
        assert!(!check.passed);
        let variance = check.variance.unwrap();
        assert!((variance - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_negative_ocf_with_positive_net_income_flags_not_fails() {
        let mut row = row_with_balance(100.0, 60.0, 40.0);
        row.operating_cash_flow = Some(-10.0);
        row.net_income = Some(25.0);

        let report = Validator::default().validate(&row);
        let check = report.check("cash flow plausibility").unwrap();
        assert!(check.passed);
        assert!(check.note.as_deref().unwrap().contains("negative operating cash flow"));
    }

    #[test]
    fn test_ocf_ratio_outside_band_is_noted() {
        let mut row = row_with_balance(100.0, 60.0, 40.0);
        row.operating_cash_flow = Some(100.0);
        row.net_income = Some(20.0);

        let report = Validator::default().validate(&row);
        let check = report.check("cash flow plausibility").unwrap();
        assert!(check.passed);
        assert!(check.note.as_deref().unwrap().contains("5.00x"));
    }

    #[test]
    fn test_missing_components_gate_usability() {
        let mut row = row_with_balance(100.0, 60.0, 40.0);
        row.depreciation_amortization = None;

        let report = Validator::default().validate(&row);
        assert!(!report.usable);
        let check = report.check("required components").unwrap();
        assert!(check
            .note
            .as_deref()
            .unwrap()
            .contains("depreciation & amortization"));
    }

    #[test]
    fn test_quality_score_is_pass_rate() {
        // Balance identity fails, plausibility passes, components pass.
        let report = Validator::default().validate(&row_with_balance(100.0, 60.0, 30.0));
        assert!((report.quality_score - 2.0 / 3.0).abs() < 1e-12);
        assert!(report.usable);
    }
}
