#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! End-to-end FCFF/DCF valuation over regulatory filing data.
//!
//! # Example
//!
//! ```no_run
//! use valuation::{DiscountRate, GrowthModel, Ticker, ValuationPipeline, ValuationRequest};
//! use valuation_edgar::EdgarProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let document = std::fs::read_to_string("CIK0000320193.json")?;
//!     let mut provider = EdgarProvider::new();
//!     provider.load_document(Ticker::new("AAPL"), &document)?;
//!
//!     let pipeline = ValuationPipeline::new()
//!         .with_edgar(provider)
//!         .with_sqlite_store("valuations.db")?;
//!
//!     let outcome = pipeline
//!         .run(&ValuationRequest {
//!             ticker: Ticker::new("AAPL"),
//!             discount: DiscountRate::Given(0.09),
//!             terminal_growth: 0.025,
//!             horizon: 5,
//!             growth: GrowthModel::Schedule(vec![0.07, 0.06, 0.05, 0.04, 0.03]),
//!             simulate: true,
//!         })
//!         .await?;
//!
//!     println!("price per share: {:.2}", outcome.valuation.price_per_share);
//!     Ok(())
//! }
//! ```

/// The end-to-end valuation pipeline.
pub mod pipeline;

pub use pipeline::{DiscountRate, ValuationOutcome, ValuationPipeline, ValuationRequest};

// Re-export the building blocks callers interact with.
pub use valuation_core::{
    Company, Concept, FcffMode, FilingForm, JoinPolicy, MonteCarloConfig, Result, StatementRow,
    Ticker, Valuation, ValuationConfig, ValuationError,
};
pub use valuation_engine::{
    GrowthModel, OrganicGrowth, Projection, SimulationOutcome, WaccInputs,
};
pub use valuation_validate::{ValidationCheck, ValidationReport};
