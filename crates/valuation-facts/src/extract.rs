//! Ordered-alias fact extraction.
//!
//! Resolution walks a concept's source labels in fallback-preference order;
//! the first label with observations on the requested filing form wins.
//! Within a label, observations are deduplicated to one per fiscal year with
//! the greatest accession winning, so restatements supersede the figures they
//! restate. An unresolved concept yields an empty series, never an error:
//! absence is a valid, observable outcome the reconciler consumes.

use std::collections::BTreeMap;
use tracing::debug;

use valuation_core::{Concept, FactObservation, FilingForm, RawFactSet};

/// A resolved time series for one concept, one observation per fiscal year.
#[derive(Clone, Debug, PartialEq)]
pub struct ConceptSeries {
    /// The concept this series resolves.
    pub concept: Concept,
    /// Observations sorted by fiscal year, oldest first.
    pub observations: Vec<FactObservation>,
    /// Set when the series was synthesized by a reconciliation rule rather
    /// than read from a filing.
    pub derived_rule: Option<String>,
}

impl ConceptSeries {
    /// Creates an empty (unresolved) series for a concept.
    #[must_use]
    pub const fn empty(concept: Concept) -> Self {
        Self {
            concept,
            observations: Vec::new(),
            derived_rule: None,
        }
    }

    /// Returns true if the concept did not resolve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of fiscal years resolved.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns the observation for a fiscal year, if resolved.
    #[must_use]
    pub fn observation_for(&self, fiscal_year: i32) -> Option<&FactObservation> {
        self.observations
            .iter()
            .find(|o| o.fiscal_year == fiscal_year)
    }

    /// Returns the value for a fiscal year, if resolved.
    #[must_use]
    pub fn value_for(&self, fiscal_year: i32) -> Option<f64> {
        self.observation_for(fiscal_year).map(|o| o.value)
    }

    /// Fiscal years covered by this series, oldest first.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.observations.iter().map(|o| o.fiscal_year)
    }

    /// The most recent observation, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&FactObservation> {
        self.observations.last()
    }
}

/// All concept series resolved for a company, indexed by concept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedConcepts {
    series: BTreeMap<Concept, ConceptSeries>,
}

impl ResolvedConcepts {
    /// Creates an empty resolution set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the series for a concept.
    pub fn insert(&mut self, series: ConceptSeries) {
        self.series.insert(series.concept, series);
    }

    /// Returns the series for a concept, empty series included.
    #[must_use]
    pub fn get(&self, concept: Concept) -> Option<&ConceptSeries> {
        self.series.get(&concept)
    }

    /// Returns true if the concept resolved to at least one observation.
    #[must_use]
    pub fn is_resolved(&self, concept: Concept) -> bool {
        self.get(concept).is_some_and(|s| !s.is_empty())
    }

    /// Iterates over the non-empty series in this set.
    pub fn resolved_series(&self) -> impl Iterator<Item = &ConceptSeries> {
        self.series.values().filter(|s| !s.is_empty())
    }
}

/// Resolves a single concept against a raw fact set.
///
/// Walks the concept's aliases in order; filters to the requested filing
/// form; keeps one observation per fiscal year (greatest accession wins).
#[must_use]
pub fn extract_series(
    raw: &RawFactSet,
    concept: Concept,
    form: FilingForm,
) -> ConceptSeries {
    for alias in concept.aliases() {
        let Some(facts) = raw.get(alias) else {
            continue;
        };

        let mut by_year: BTreeMap<i32, &valuation_core::RawFact> = BTreeMap::new();
        for fact in facts.iter().filter(|f| f.form == form) {
            by_year
                .entry(fact.fiscal_year)
                .and_modify(|current| {
                    // Accessions order chronologically; a later filing
                    // restates the earlier one.
                    if fact.accession > current.accession {
                        *current = fact;
                    }
                })
                .or_insert(fact);
        }

        if by_year.is_empty() {
            // Label exists but carries no observations on this form.
            continue;
        }

        let observations = by_year
            .into_values()
            .map(|fact| FactObservation {
                concept,
                fiscal_year: fact.fiscal_year,
                value: fact.value,
                source_label: (*alias).to_string(),
                form: fact.form,
                period_end: fact.period_end,
                accession: fact.accession.clone(),
            })
            .collect::<Vec<_>>();

        debug!(
            concept = %concept,
            label = alias,
            years = observations.len(),
            "resolved concept"
        );

        return ConceptSeries {
            concept,
            observations,
            derived_rule: None,
        };
    }

    debug!(concept = %concept, "concept did not resolve under any label");
    ConceptSeries::empty(concept)
}

/// Resolves every known concept against a raw fact set.
#[must_use]
pub fn extract_all(raw: &RawFactSet, form: FilingForm) -> ResolvedConcepts {
    let mut resolved = ResolvedConcepts::new();
    for concept in Concept::ALL {
        resolved.insert(extract_series(raw, concept, form));
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use valuation_core::RawFact;

    fn fact(year: i32, value: f64, form: FilingForm, accession: &str) -> RawFact {
        RawFact {
            value,
            fiscal_year: year,
            period_end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
            form,
            accession: accession.to_string(),
        }
    }

    #[test]
    fn test_first_alias_wins() {
        let mut raw = RawFactSet::new();
        raw.insert(
            "NetIncomeLoss",
            fact(2023, 500.0, FilingForm::Annual, "0001-24-000001"),
        );
        raw.insert(
            "ProfitLoss",
            fact(2023, 999.0, FilingForm::Annual, "0001-24-000001"),
        );

        let series = extract_series(&raw, Concept::NetIncome, FilingForm::Annual);
        assert_eq!(series.len(), 1);
        assert_eq!(series.value_for(2023), Some(500.0));
        assert_eq!(series.observations[0].source_label, "NetIncomeLoss");
    }

    #[test]
    fn test_falls_back_when_preferred_alias_absent() {
        let mut raw = RawFactSet::new();
        raw.insert(
            "ProfitLoss",
            fact(2023, 999.0, FilingForm::Annual, "0001-24-000001"),
        );

        let series = extract_series(&raw, Concept::NetIncome, FilingForm::Annual);
        assert_eq!(series.value_for(2023), Some(999.0));
        assert_eq!(series.observations[0].source_label, "ProfitLoss");
    }

    #[test]
    fn test_falls_back_when_preferred_alias_has_no_annual_observations() {
        let mut raw = RawFactSet::new();
        raw.insert(
            "NetIncomeLoss",
            fact(2023, 120.0, FilingForm::Quarterly, "0001-24-000001"),
        );
        raw.insert(
            "ProfitLoss",
            fact(2023, 480.0, FilingForm::Annual, "0001-24-000002"),
        );

        let series = extract_series(&raw, Concept::NetIncome, FilingForm::Annual);
        assert_eq!(series.value_for(2023), Some(480.0));
    }

    #[test]
    fn test_restatement_supersedes_original_filing() {
        let mut raw = RawFactSet::new();
        raw.insert(
            "OperatingIncomeLoss",
            fact(2022, 100.0, FilingForm::Annual, "0001-23-000010"),
        );
        // Next year's 10-K restates the comparative figure.
        raw.insert(
            "OperatingIncomeLoss",
            fact(2022, 104.0, FilingForm::Annual, "0001-24-000010"),
        );

        let series = extract_series(&raw, Concept::Ebit, FilingForm::Annual);
        assert_eq!(series.len(), 1);
        assert_eq!(series.value_for(2022), Some(104.0));
    }

    #[test]
    fn test_unresolved_concept_is_empty_not_an_error() {
        let raw = RawFactSet::new();
        let series = extract_series(&raw, Concept::Ebit, FilingForm::Annual);
        assert!(series.is_empty());
        assert_eq!(series.concept, Concept::Ebit);
    }

    #[test]
    fn test_series_sorted_by_fiscal_year() {
        let mut raw = RawFactSet::new();
        raw.insert(
            "OperatingIncomeLoss",
            fact(2023, 120.0, FilingForm::Annual, "0001-24-000001"),
        );
        raw.insert(
            "OperatingIncomeLoss",
            fact(2021, 90.0, FilingForm::Annual, "0001-22-000001"),
        );
        raw.insert(
            "OperatingIncomeLoss",
            fact(2022, 100.0, FilingForm::Annual, "0001-23-000001"),
        );

        let series = extract_series(&raw, Concept::Ebit, FilingForm::Annual);
        let years: Vec<i32> = series.years().collect();
        assert_eq!(years, vec![2021, 2022, 2023]);
    }
}
