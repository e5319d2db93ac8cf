//! FCFF projection across an explicit forecast horizon.
//!
//! Two selectable strategies:
//!
//! - an explicit growth schedule, one rate per forecast year;
//! - reinvestment-based organic growth from base-year operating economics,
//!   where each year's reinvestment is the capital needed to support that
//!   year's revenue growth.
//!
//! Organic projections deliberately allow negative FCFF during high-growth
//! years; growth is value-creating only while the implied return on invested
//! capital exceeds the discount rate, which callers can check via
//! [`OrganicGrowth::implied_roic`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use valuation_core::{Result, ValuationError};

/// One projected forecast year.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedYear {
    /// Forecast year, 1-based.
    pub year: u32,
    /// Projected revenue; only populated by the organic strategy.
    pub revenue: Option<f64>,
    /// Projected NOPAT; only populated by the organic strategy.
    pub nopat: Option<f64>,
    /// Reinvestment consumed to support growth.
    pub reinvestment: f64,
    /// Projected free cash flow to the firm.
    pub fcff: f64,
}

/// Base-year operating economics for the reinvestment-based strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganicGrowth {
    /// Revenue from the base year.
    pub base_revenue: f64,
    /// EBIT over revenue.
    pub operating_margin: f64,
    /// Effective corporate tax rate.
    pub tax_rate: f64,
    /// Revenue growth per forecast year; length must equal the horizon.
    pub growth_rates: Vec<f64>,
    /// Revenue generated per unit of invested capital.
    pub sales_to_capital: f64,
}

impl OrganicGrowth {
    /// Implied return on invested capital:
    /// `margin × (1 − tax) × sales-to-capital`.
    ///
    /// Growth creates value only while this exceeds the discount rate.
    #[must_use]
    pub fn implied_roic(&self) -> f64 {
        self.operating_margin * (1.0 - self.tax_rate) * self.sales_to_capital
    }
}

/// Selectable projection strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GrowthModel {
    /// One growth rate per forecast year applied to the base FCFF.
    Schedule(Vec<f64>),
    /// Reinvestment-based organic growth.
    Organic(OrganicGrowth),
}

/// An ordered FCFF projection over the explicit horizon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Year-0 cash flow the projection grows from (not discounted).
    pub base_fcff: f64,
    /// Forecast years 1..=horizon.
    pub years: Vec<ProjectedYear>,
}

impl Projection {
    /// The projected cash flows, year 1 first.
    #[must_use]
    pub fn fcffs(&self) -> Vec<f64> {
        self.years.iter().map(|y| y.fcff).collect()
    }

    /// True if any forecast year projects negative FCFF.
    ///
    /// Expected for high-growth organic projections; flagged for
    /// interpretation, not an error.
    #[must_use]
    pub fn has_negative_years(&self) -> bool {
        self.years.iter().any(|y| y.fcff < 0.0)
    }
}

/// Projects FCFF across the horizon using the selected strategy.
pub fn project(model: &GrowthModel, base_fcff: f64, horizon: u32) -> Result<Projection> {
    match model {
        GrowthModel::Schedule(rates) => project_schedule(base_fcff, rates, horizon),
        GrowthModel::Organic(params) => project_organic(params, horizon),
    }
}

/// Explicit schedule: each year's FCFF = prior-year FCFF × (1 + g).
pub fn project_schedule(base_fcff: f64, rates: &[f64], horizon: u32) -> Result<Projection> {
    if rates.len() != horizon as usize {
        return Err(ValuationError::InvalidAssumption(format!(
            "growth schedule has {} rates but the horizon is {} years",
            rates.len(),
            horizon
        )));
    }

    let mut years = Vec::with_capacity(rates.len());
    let mut fcff = base_fcff;
    for (index, rate) in rates.iter().enumerate() {
        fcff *= 1.0 + rate;
        years.push(ProjectedYear {
            year: index as u32 + 1,
            revenue: None,
            nopat: None,
            reinvestment: 0.0,
            fcff,
        });
    }

    debug!(horizon, base_fcff, "projected FCFF from explicit schedule");
    Ok(Projection { base_fcff, years })
}

/// Reinvestment-based organic growth from base-year economics.
pub fn project_organic(params: &OrganicGrowth, horizon: u32) -> Result<Projection> {
    if params.growth_rates.len() != horizon as usize {
        return Err(ValuationError::InvalidAssumption(format!(
            "growth schedule has {} rates but the horizon is {} years",
            params.growth_rates.len(),
            horizon
        )));
    }
    if params.sales_to_capital <= 0.0 {
        return Err(ValuationError::InvalidAssumption(
            "sales-to-capital ratio must be positive".to_string(),
        ));
    }

    // Year 0: base year, no reinvestment.
    let nopat_0 = params.base_revenue * params.operating_margin * (1.0 - params.tax_rate);

    let mut years = Vec::with_capacity(params.growth_rates.len());
    let mut prev_revenue = params.base_revenue;
    for (index, growth) in params.growth_rates.iter().enumerate() {
        let revenue = prev_revenue * (1.0 + growth);
        let nopat = revenue * params.operating_margin * (1.0 - params.tax_rate);
        let reinvestment = (revenue - prev_revenue) / params.sales_to_capital;
        let fcff = nopat - reinvestment;

        years.push(ProjectedYear {
            year: index as u32 + 1,
            revenue: Some(revenue),
            nopat: Some(nopat),
            reinvestment,
            fcff,
        });
        prev_revenue = revenue;
    }

    debug!(
        horizon,
        implied_roic = params.implied_roic(),
        "projected FCFF from organic growth"
    );
    Ok(Projection {
        base_fcff: nopat_0,
        years,
    })
}
