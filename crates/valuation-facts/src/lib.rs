#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Fact extraction, reconciliation and statement alignment.
//!
//! The three stages that turn a raw, label-keyed fact set into aligned
//! statement rows:
//!
//! - [`extract`] - ordered-alias resolution into per-concept series
//! - [`reconcile`](mod@reconcile) - accounting-identity synthesis of missing concepts
//! - [`align`](mod@align) - row-per-fiscal-year merge under an explicit join policy

/// Statement alignment under strict or permissive join policies.
pub mod align;
/// Ordered-alias fact extraction.
pub mod extract;
/// Accounting-identity reconciliation.
pub mod reconcile;

pub use align::{align, AlignedStatements, ExcludedPeriod};
pub use extract::{extract_all, extract_series, ConceptSeries, ResolvedConcepts};
pub use reconcile::{reconcile, ReconciliationGap};

use valuation_core::{FilingForm, JoinPolicy, RawFactSet};

/// Runs the full extract → reconcile → align chain for a raw fact set.
///
/// Convenience for the common path; each stage is also usable on its own.
#[must_use]
pub fn resolve_statements(
    raw: &RawFactSet,
    form: FilingForm,
    policy: JoinPolicy,
) -> (AlignedStatements, Vec<ReconciliationGap>) {
    let mut resolved = extract_all(raw, form);
    let gaps = reconcile(&mut resolved);
    (align(&resolved, policy), gaps)
}
