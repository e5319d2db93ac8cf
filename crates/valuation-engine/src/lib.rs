#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Valuation engines.
//!
//! - [`fcff`] - per-period free cash flow to the firm
//! - [`projection`] - explicit-schedule and organic growth projection
//! - [`wacc`] - CAPM cost of capital
//! - [`dcf`] - discounted cash flow with the equity bridge
//! - [`monte_carlo`] - seeded parallel simulation of parameter uncertainty
//! - [`sensitivity`] - WACC × growth sensitivity grid

/// Discounted cash flow valuation.
pub mod dcf;
/// FCFF computation per usable period.
pub mod fcff;
/// Monte Carlo simulation of valuation uncertainty.
pub mod monte_carlo;
/// FCFF projection strategies.
pub mod projection;
/// Sensitivity grids.
pub mod sensitivity;
/// Cost of capital.
pub mod wacc;

pub use dcf::value as dcf_value;
pub use fcff::{FcffEngine, FcffResult, FcffSeries, NwcTier, TaxRateSource};
pub use monte_carlo::{simulate, SimulationOutcome};
pub use projection::{
    project, project_organic, project_schedule, GrowthModel, OrganicGrowth, ProjectedYear,
    Projection,
};
pub use sensitivity::{perpetuity_matrix, SensitivityMatrix};
pub use wacc::{compute as compute_wacc, CostOfCapital, WaccInputs};
