//! Statement alignment: merging concept series into per-fiscal-year rows.
//!
//! The join policy is an explicit, testable configuration, not an implicit
//! default: `Strict` keeps only fiscal years where every FCFF-required
//! concept resolved, `Permissive` keeps the union of years with gaps left
//! for downstream fallbacks. Either way, a year dropped from valuation is
//! reported to the caller as an [`ExcludedPeriod`], never silently.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use valuation_core::{Concept, JoinPolicy, Provenance, StatementRow};

use crate::extract::ResolvedConcepts;

/// A fiscal year excluded from valuation, with the concepts that failed to
/// resolve for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedPeriod {
    /// The excluded fiscal year.
    pub fiscal_year: i32,
    /// Required concepts missing for that year.
    pub missing: Vec<Concept>,
}

/// The aligner's output: surviving rows plus inspectable exclusions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlignedStatements {
    /// Per-fiscal-year rows, oldest first.
    pub rows: Vec<StatementRow>,
    /// Fiscal years excluded under the strict policy.
    pub excluded: Vec<ExcludedPeriod>,
}

impl AlignedStatements {
    /// Rows where every FCFF-required concept is populated.
    pub fn usable_rows(&self) -> impl Iterator<Item = &StatementRow> {
        self.rows.iter().filter(|r| r.is_usable())
    }

    /// The most recent row, if any survived alignment.
    #[must_use]
    pub fn latest(&self) -> Option<&StatementRow> {
        self.rows.last()
    }
}

/// Merges resolved concept series into one row per fiscal year.
#[must_use]
pub fn align(resolved: &ResolvedConcepts, policy: JoinPolicy) -> AlignedStatements {
    // Candidate years come from the FCFF-required concepts; a year known
    // only through balance-sheet context is not a statement year.
    let mut years: Vec<i32> = Concept::REQUIRED_FOR_FCFF
        .into_iter()
        .filter_map(|c| resolved.get(c))
        .flat_map(|s| s.years().collect::<Vec<_>>())
        .collect();
    years.sort_unstable();
    years.dedup();

    let mut aligned = AlignedStatements::default();

    for year in years {
        let Some(period_end) = Concept::ALL
            .into_iter()
            .filter_map(|c| resolved.get(c))
            .find_map(|s| s.observation_for(year).map(|o| o.period_end))
        else {
            continue;
        };

        let mut row = StatementRow::new(year, period_end);
        for concept in Concept::ALL {
            let Some(series) = resolved.get(concept) else {
                continue;
            };
            let Some(observation) = series.observation_for(year) else {
                continue;
            };
            let provenance = match &series.derived_rule {
                Some(rule) => Provenance::Derived { rule: rule.clone() },
                None => Provenance::Reported {
                    label: observation.source_label.clone(),
                },
            };
            row.set(concept, observation.value, provenance);
        }

        let missing = row.missing_required();
        match policy {
            JoinPolicy::Strict if !missing.is_empty() => {
                warn!(
                    fiscal_year = year,
                    missing = ?missing,
                    "excluding period under strict join policy"
                );
                aligned.excluded.push(ExcludedPeriod {
                    fiscal_year: year,
                    missing,
                });
            }
            _ => aligned.rows.push(row),
        }
    }

    debug!(
        rows = aligned.rows.len(),
        excluded = aligned.excluded.len(),
        ?policy,
        "aligned statements"
    );
    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use valuation_core::{FilingForm, RawFact, RawFactSet};

    use crate::extract::extract_all;
    use crate::reconcile::reconcile;

    fn fact(year: i32, value: f64) -> RawFact {
        RawFact {
            value,
            fiscal_year: year,
            period_end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
            form: FilingForm::Annual,
            accession: format!("0001-{}-000001", year % 100),
        }
    }

    fn full_year(raw: &mut RawFactSet, year: i32) {
        raw.insert("OperatingIncomeLoss", fact(year, 1000.0));
        raw.insert("NetIncomeLoss", fact(year, 700.0));
        raw.insert("IncomeTaxExpenseBenefit", fact(year, 200.0));
        raw.insert("DepreciationDepletionAndAmortization", fact(year, 50.0));
        raw.insert("PaymentsToAcquirePropertyPlantAndEquipment", fact(year, 80.0));
    }

    #[test]
    fn test_strict_keeps_complete_years_only() {
        let mut raw = RawFactSet::new();
        full_year(&mut raw, 2022);
        full_year(&mut raw, 2023);
        // 2021 has EBIT only.
        raw.insert("OperatingIncomeLoss", fact(2021, 900.0));

        let mut resolved = extract_all(&raw, FilingForm::Annual);
        reconcile(&mut resolved);
        let aligned = align(&resolved, JoinPolicy::Strict);

        let years: Vec<i32> = aligned.rows.iter().map(|r| r.fiscal_year).collect();
        assert_eq!(years, vec![2022, 2023]);

        assert_eq!(aligned.excluded.len(), 1);
        let excluded = &aligned.excluded[0];
        assert_eq!(excluded.fiscal_year, 2021);
        assert!(excluded.missing.contains(&Concept::TaxExpense));
    }

    #[test]
    fn test_permissive_keeps_gappy_years() {
        let mut raw = RawFactSet::new();
        full_year(&mut raw, 2023);
        raw.insert("OperatingIncomeLoss", fact(2021, 900.0));

        let mut resolved = extract_all(&raw, FilingForm::Annual);
        reconcile(&mut resolved);
        let aligned = align(&resolved, JoinPolicy::Permissive);

        assert_eq!(aligned.rows.len(), 2);
        assert!(aligned.excluded.is_empty());

        let gappy = &aligned.rows[0];
        assert_eq!(gappy.fiscal_year, 2021);
        assert!(!gappy.is_usable());
        assert_eq!(aligned.usable_rows().count(), 1);
    }

    #[test]
    fn test_reconciled_values_carry_derived_provenance() {
        let mut raw = RawFactSet::new();
        full_year(&mut raw, 2023);

        let mut resolved = extract_all(&raw, FilingForm::Annual);
        reconcile(&mut resolved);
        let aligned = align(&resolved, JoinPolicy::Strict);

        let row = aligned.latest().unwrap();
        // No pre-tax label in the fixture: reconciled from NI + tax.
        assert_eq!(row.pre_tax_income, Some(900.0));
        assert!(row.is_derived(Concept::PreTaxIncome));
        assert!(!row.is_derived(Concept::Ebit));
    }

    #[test]
    fn test_context_concepts_ride_along() {
        let mut raw = RawFactSet::new();
        full_year(&mut raw, 2023);
        raw.insert("AssetsCurrent", fact(2023, 500.0));
        raw.insert("LiabilitiesCurrent", fact(2023, 300.0));
        raw.insert("CashAndCashEquivalentsAtCarryingValue", fact(2023, 50.0));

        let mut resolved = extract_all(&raw, FilingForm::Annual);
        reconcile(&mut resolved);
        let aligned = align(&resolved, JoinPolicy::Strict);

        let row = aligned.latest().unwrap();
        assert_eq!(row.current_assets, Some(500.0));
        assert_eq!(row.current_liabilities, Some(300.0));
        assert_eq!(row.cash, Some(50.0));
    }
}
