//! Pipeline configuration knobs.
//!
//! Every contestable policy choice lives here rather than being buried in a
//! code path: tax clamp bounds, join policy, working-capital fallback
//! enablement, FCFF output mode, Monte Carlo sampling parameters, and
//! validation tolerances.

use serde::{Deserialize, Serialize};

/// Effective tax rate policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxRateConfig {
    /// Statutory fallback used when pre-tax income is non-positive or the
    /// effective ratio cannot be formed. US statutory 21%; some filers
    /// warrant 25%.
    pub statutory_rate: f64,
    /// Clamp bounds applied to an effective rate computed from reported
    /// pre-tax income.
    pub reported_clamp: (f64, f64),
    /// Tighter clamp bounds applied when pre-tax income was reconciled
    /// rather than reported.
    pub reconciled_clamp: (f64, f64),
}

impl Default for TaxRateConfig {
    fn default() -> Self {
        Self {
            statutory_rate: 0.21,
            reported_clamp: (0.0, 0.35),
            reconciled_clamp: (0.15, 0.30),
        }
    }
}

/// How many usable periods the FCFF engine reports on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FcffMode {
    /// Only the single most recent usable period. Common when filings yield
    /// one clean year.
    LatestOnly,
    /// A short historical series, newest last.
    Historical {
        /// Upper bound on the number of periods reported.
        max_periods: usize,
    },
}

impl Default for FcffMode {
    fn default() -> Self {
        Self::Historical { max_periods: 5 }
    }
}

/// FCFF engine policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FcffConfig {
    /// Tax rate policy.
    pub tax: TaxRateConfig,
    /// Output mode: latest period only, or a short historical series.
    pub mode: FcffMode,
    /// Whether the working-capital fallback may derive ΔNWC from
    /// balance-sheet deltas when no reported figure exists. When disabled,
    /// an unreported ΔNWC goes straight to the assumed-zero tier.
    pub derive_nwc_from_balance_sheet: bool,
}

impl Default for FcffConfig {
    fn default() -> Self {
        Self {
            tax: TaxRateConfig::default(),
            mode: FcffMode::default(),
            derive_nwc_from_balance_sheet: true,
        }
    }
}

/// Join policy for the statement aligner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinPolicy {
    /// Only fiscal years where every required concept resolves survive.
    #[default]
    Strict,
    /// Union of fiscal years, with gaps left for downstream fallback.
    Permissive,
}

/// Monte Carlo simulator parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of draws.
    pub samples: usize,
    /// Standard deviation of the WACC distribution.
    pub wacc_std_dev: f64,
    /// Standard deviation of the terminal growth distribution.
    pub growth_std_dev: f64,
    /// Base seed; each draw derives its own stream from this, so runs are
    /// reproducible regardless of parallel scheduling.
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            samples: 5000,
            wacc_std_dev: 0.01,
            growth_std_dev: 0.005,
            seed: 0,
        }
    }
}

/// Validator tolerances.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum relative variance for the balance identity to pass.
    pub balance_tolerance: f64,
    /// Sane band for the operating-cash-flow / net-income ratio; values
    /// outside are flagged.
    pub ocf_net_income_band: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: 0.01,
            ocf_net_income_band: (-1.0, 3.0),
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Aligner join policy.
    pub join_policy: JoinPolicy,
    /// FCFF engine policy.
    pub fcff: FcffConfig,
    /// Validator tolerances.
    pub validation: ValidationConfig,
    /// Monte Carlo parameters.
    pub monte_carlo: MonteCarloConfig,
}
