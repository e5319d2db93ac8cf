//! Weighted average cost of capital.
//!
//! A deterministic single pass: CAPM cost of equity, capital-structure
//! weights from market values, after-tax cost of debt. No iteration or
//! market-clearing.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inputs to the cost-of-capital computation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaccInputs {
    /// Risk-free rate.
    pub risk_free_rate: f64,
    /// Equity risk premium.
    pub equity_risk_premium: f64,
    /// Equity beta.
    pub beta: f64,
    /// Market value of equity.
    pub market_value_equity: f64,
    /// Market value of debt.
    pub market_value_debt: f64,
    /// Assumed pre-tax cost of debt.
    pub cost_of_debt: f64,
    /// Tax rate applied to the debt shield.
    pub tax_rate: f64,
}

/// Cost-of-capital breakdown.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostOfCapital {
    /// CAPM cost of equity.
    pub cost_of_equity: f64,
    /// Equity weight in the capital structure.
    pub weight_equity: f64,
    /// Debt weight in the capital structure.
    pub weight_debt: f64,
    /// Weighted average cost of capital.
    pub wacc: f64,
}

/// Computes WACC from CAPM and capital-structure weights.
///
/// `cost_of_equity = risk_free + beta × equity_risk_premium`;
/// `wacc = w_e × cost_of_equity + w_d × cost_of_debt × (1 − tax)`.
/// A degenerate zero capitalization weights fully to equity.
#[must_use]
pub fn compute(inputs: &WaccInputs) -> CostOfCapital {
    let cost_of_equity = inputs.risk_free_rate + inputs.beta * inputs.equity_risk_premium;

    let total = inputs.market_value_equity + inputs.market_value_debt;
    let weight_equity = if total > 0.0 {
        inputs.market_value_equity / total
    } else {
        1.0
    };
    let weight_debt = 1.0 - weight_equity;

    let wacc = weight_equity * cost_of_equity
        + weight_debt * inputs.cost_of_debt * (1.0 - inputs.tax_rate);

    debug!(cost_of_equity, weight_equity, wacc, "computed cost of capital");

    CostOfCapital {
        cost_of_equity,
        weight_equity,
        weight_debt,
        wacc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capm_and_weights() {
        let result = compute(&WaccInputs {
            risk_free_rate: 0.04,
            equity_risk_premium: 0.055,
            beta: 1.2,
            market_value_equity: 800.0,
            market_value_debt: 200.0,
            cost_of_debt: 0.05,
            tax_rate: 0.25,
        });

        assert!((result.cost_of_equity - 0.106).abs() < 1e-12);
        assert!((result.weight_equity - 0.8).abs() < 1e-12);
        assert!((result.weight_debt - 0.2).abs() < 1e-12);
        // 0.8 × 0.106 + 0.2 × 0.05 × 0.75 = 0.0923
        assert!((result.wacc - 0.0923).abs() < 1e-12);
    }

    #[test]
    fn test_zero_capitalization_weights_to_equity() {
        let result = compute(&WaccInputs {
            risk_free_rate: 0.04,
            equity_risk_premium: 0.055,
            beta: 1.0,
            market_value_equity: 0.0,
            market_value_debt: 0.0,
            cost_of_debt: 0.05,
            tax_rate: 0.25,
        });

        assert_eq!(result.weight_equity, 1.0);
        assert_eq!(result.weight_debt, 0.0);
        assert!((result.wacc - result.cost_of_equity).abs() < 1e-12);
    }
}
