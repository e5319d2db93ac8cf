//! Discounted cash flow valuation with a Gordon-growth terminal value.
//!
//! Fails fast on structurally invalid assumptions (`wacc ≤ terminal_growth`,
//! non-positive shares outstanding) rather than producing a negative or
//! infinite terminal value. The full per-year present-value breakdown and
//! the equity bridge are returned together with the final number.

use tracing::debug;

use valuation_core::{DiscountedCashFlow, Result, Valuation, ValuationError};

/// Runs a complete DCF valuation over projected explicit-period cash flows.
///
/// `fcffs` holds the explicit forecast flows, year 1 first; `net_debt` is
/// `total_debt − cash` from the base period.
pub fn value(
    fcffs: &[f64],
    wacc: f64,
    terminal_growth: f64,
    net_debt: f64,
    shares_outstanding: f64,
) -> Result<Valuation> {
    if fcffs.is_empty() {
        return Err(ValuationError::InvalidAssumption(
            "explicit forecast period is empty".to_string(),
        ));
    }
    if wacc <= terminal_growth {
        return Err(ValuationError::InvalidAssumption(format!(
            "wacc ({wacc:.4}) must exceed terminal growth ({terminal_growth:.4})"
        )));
    }
    if shares_outstanding <= 0.0 {
        return Err(ValuationError::InvalidAssumption(format!(
            "shares outstanding must be positive, got {shares_outstanding}"
        )));
    }

    let horizon = fcffs.len() as u32;

    let explicit: Vec<DiscountedCashFlow> = fcffs
        .iter()
        .enumerate()
        .map(|(index, &cash_flow)| {
            let year = index as u32 + 1;
            DiscountedCashFlow {
                year,
                cash_flow,
                present_value: cash_flow / (1.0 + wacc).powi(year as i32),
            }
        })
        .collect();
    let pv_explicit: f64 = explicit.iter().map(|cf| cf.present_value).sum();

    // Gordon growth: TV = FCFF_n × (1 + g) / (wacc − g).
    let final_fcff = fcffs[fcffs.len() - 1];
    let terminal_value = final_fcff * (1.0 + terminal_growth) / (wacc - terminal_growth);
    let pv_terminal = terminal_value / (1.0 + wacc).powi(horizon as i32);

    let enterprise_value = pv_explicit + pv_terminal;
    let equity_value = enterprise_value - net_debt;
    let price_per_share = equity_value / shares_outstanding;

    debug!(
        enterprise_value,
        equity_value, price_per_share, "completed DCF valuation"
    );

    Ok(Valuation {
        wacc,
        terminal_growth,
        horizon,
        explicit,
        pv_explicit,
        terminal_value,
        pv_terminal,
        enterprise_value,
        net_debt,
        shares_outstanding,
        equity_value,
        price_per_share,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_value_worked_example() {
        // wacc 0.10, g 0.03, FCFF 100 flat, horizon 5:
        // TV = 100 × 1.03 / 0.07 ≈ 1471.43, pv ≈ TV / 1.1^5 ≈ 913.6.
        let fcffs = [100.0; 5];
        let valuation = value(&fcffs, 0.10, 0.03, 0.0, 1.0).unwrap();

        assert!((valuation.terminal_value - 1471.43).abs() < 0.01);
        assert!((valuation.pv_terminal - 1471.428_571 / 1.1_f64.powi(5)).abs() < 1e-6);
        assert!((valuation.pv_terminal - 913.65).abs() < 0.1);
    }

    #[test]
    fn test_wacc_not_above_growth_is_rejected() {
        let fcffs = [100.0; 5];
        let err = value(&fcffs, 0.03, 0.03, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidAssumption(_)));

        let err = value(&fcffs, 0.02, 0.03, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidAssumption(_)));
    }

    #[test]
    fn test_non_positive_shares_rejected() {
        let fcffs = [100.0; 5];
        let err = value(&fcffs, 0.10, 0.03, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidAssumption(_)));
    }

    #[test]
    fn test_bridge_is_inspectable() {
        let fcffs = [100.0, 110.0, 121.0];
        let valuation = value(&fcffs, 0.10, 0.03, 50.0, 10.0).unwrap();

        assert_eq!(valuation.explicit.len(), 3);
        assert_eq!(valuation.horizon, 3);

        // Year-1 PV = 100 / 1.1.
        assert!((valuation.explicit[0].present_value - 100.0 / 1.1).abs() < 1e-9);

        // The bridge recomposes.
        let pv_sum: f64 = valuation.explicit.iter().map(|cf| cf.present_value).sum();
        assert!((valuation.pv_explicit - pv_sum).abs() < 1e-9);
        assert!(
            (valuation.enterprise_value - (valuation.pv_explicit + valuation.pv_terminal)).abs()
                < 1e-9
        );
        assert!((valuation.equity_value - (valuation.enterprise_value - 50.0)).abs() < 1e-9);
        assert!((valuation.price_per_share - valuation.equity_value / 10.0).abs() < 1e-9);
    }
}
