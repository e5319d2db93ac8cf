//! Accounting-identity reconciliation for unresolved concepts.
//!
//! When a concept fails to resolve under any source label, the reconciler
//! attempts to synthesize it from related concepts:
//!
//! - pre-tax income = net income + tax expense (years where both resolve)
//! - total debt = long-term debt + short-term debt (either side suffices)
//!
//! Synthesized series are tagged with the rule that produced them, so the
//! derivation stays visible all the way into statement-row provenance. A
//! rule whose own inputs are missing leaves the concept unresolved and
//! surfaces a named [`ReconciliationGap`] instead of failing silently.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use valuation_core::{Concept, FactObservation};

use crate::extract::{ConceptSeries, ResolvedConcepts};

/// A concept the reconciler could not reconstruct, with the reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationGap {
    /// The concept that remains unresolved.
    pub concept: Concept,
    /// Why reconstruction was impossible.
    pub reason: String,
}

/// Applies every reconciliation rule to the resolved set.
///
/// Returns the gaps for concepts that stayed unresolved after all rules ran.
/// Whether a gap is fatal depends on the caller: the aligner's strict policy
/// rejects periods missing FCFF-required concepts, while context concepts
/// merely degrade downstream fallbacks.
pub fn reconcile(resolved: &mut ResolvedConcepts) -> Vec<ReconciliationGap> {
    let mut gaps = Vec::new();

    reconcile_pre_tax_income(resolved, &mut gaps);
    reconcile_total_debt(resolved, &mut gaps);

    gaps
}

/// Pre-tax income = net income + tax expense, on the years both resolve.
fn reconcile_pre_tax_income(resolved: &mut ResolvedConcepts, gaps: &mut Vec<ReconciliationGap>) {
    if resolved.is_resolved(Concept::PreTaxIncome) {
        return;
    }

    const RULE: &str = "net income + tax expense";

    let net_income = resolved.get(Concept::NetIncome);
    let tax = resolved.get(Concept::TaxExpense);

    let (Some(net_income), Some(tax)) = (
        net_income.filter(|s| !s.is_empty()),
        tax.filter(|s| !s.is_empty()),
    ) else {
        let missing = match (
            resolved.is_resolved(Concept::NetIncome),
            resolved.is_resolved(Concept::TaxExpense),
        ) {
            (false, false) => "net income and tax expense",
            (false, true) => "net income",
            _ => "tax expense",
        };
        warn!(missing, "cannot reconstruct pre-tax income");
        gaps.push(ReconciliationGap {
            concept: Concept::PreTaxIncome,
            reason: format!("cannot reconstruct pre-tax income: missing {missing}"),
        });
        return;
    };

    let observations: Vec<FactObservation> = net_income
        .observations
        .iter()
        .filter_map(|ni| {
            let tax_value = tax.value_for(ni.fiscal_year)?;
            Some(FactObservation {
                concept: Concept::PreTaxIncome,
                fiscal_year: ni.fiscal_year,
                value: ni.value + tax_value,
                source_label: RULE.to_string(),
                form: ni.form,
                period_end: ni.period_end,
                accession: ni.accession.clone(),
            })
        })
        .collect();

    if observations.is_empty() {
        gaps.push(ReconciliationGap {
            concept: Concept::PreTaxIncome,
            reason: "cannot reconstruct pre-tax income: net income and tax expense share no fiscal years".to_string(),
        });
        return;
    }

    debug!(years = observations.len(), "reconstructed pre-tax income");
    resolved.insert(ConceptSeries {
        concept: Concept::PreTaxIncome,
        observations,
        derived_rule: Some(RULE.to_string()),
    });
}

/// Total debt = long-term debt + short-term debt; a single reported side is
/// accepted as the total.
fn reconcile_total_debt(resolved: &mut ResolvedConcepts, gaps: &mut Vec<ReconciliationGap>) {
    if resolved.is_resolved(Concept::TotalDebt) {
        return;
    }

    const RULE: &str = "long-term + short-term debt";

    let long = resolved
        .get(Concept::LongTermDebt)
        .filter(|s| !s.is_empty())
        .cloned();
    let short = resolved
        .get(Concept::ShortTermDebt)
        .filter(|s| !s.is_empty())
        .cloned();

    if long.is_none() && short.is_none() {
        gaps.push(ReconciliationGap {
            concept: Concept::TotalDebt,
            reason: "cannot reconstruct total debt: missing long-term and short-term debt"
                .to_string(),
        });
        return;
    }

    // Union of years across both sides; a missing side contributes zero.
    let mut years: Vec<i32> = long
        .iter()
        .chain(short.iter())
        .flat_map(|s| s.years().collect::<Vec<_>>())
        .collect();
    years.sort_unstable();
    years.dedup();

    let observations: Vec<FactObservation> = years
        .into_iter()
        .filter_map(|year| {
            let long_obs = long.as_ref().and_then(|s| s.observation_for(year));
            let short_obs = short.as_ref().and_then(|s| s.observation_for(year));
            let template = long_obs.or(short_obs)?;
            let total = long_obs.map_or(0.0, |o| o.value) + short_obs.map_or(0.0, |o| o.value);
            Some(FactObservation {
                concept: Concept::TotalDebt,
                fiscal_year: year,
                value: total,
                source_label: RULE.to_string(),
                form: template.form,
                period_end: template.period_end,
                accession: template.accession.clone(),
            })
        })
        .collect();

    debug!(years = observations.len(), "composed total debt");
    resolved.insert(ConceptSeries {
        concept: Concept::TotalDebt,
        observations,
        derived_rule: Some(RULE.to_string()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use valuation_core::{FilingForm, RawFact, RawFactSet};

    use crate::extract::extract_all;

    fn fact(year: i32, value: f64) -> RawFact {
        RawFact {
            value,
            fiscal_year: year,
            period_end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
            form: FilingForm::Annual,
            accession: format!("0001-{}-000001", year % 100),
        }
    }

    #[test]
    fn test_pre_tax_income_reconstructed_from_net_income_and_tax() {
        let mut raw = RawFactSet::new();
        raw.insert("NetIncomeLoss", fact(2022, 700.0));
        raw.insert("NetIncomeLoss", fact(2023, 800.0));
        raw.insert("IncomeTaxExpenseBenefit", fact(2022, 180.0));
        raw.insert("IncomeTaxExpenseBenefit", fact(2023, 200.0));

        let mut resolved = extract_all(&raw, FilingForm::Annual);
        let gaps = reconcile(&mut resolved);

        let pbt = resolved.get(Concept::PreTaxIncome).unwrap();
        assert_eq!(pbt.value_for(2022), Some(880.0));
        assert_eq!(pbt.value_for(2023), Some(1000.0));
        assert_eq!(pbt.derived_rule.as_deref(), Some("net income + tax expense"));
        assert!(!gaps.iter().any(|g| g.concept == Concept::PreTaxIncome));
    }

    #[test]
    fn test_reconstruction_joins_only_shared_years() {
        let mut raw = RawFactSet::new();
        raw.insert("NetIncomeLoss", fact(2022, 700.0));
        raw.insert("NetIncomeLoss", fact(2023, 800.0));
        raw.insert("IncomeTaxExpenseBenefit", fact(2023, 200.0));

        let mut resolved = extract_all(&raw, FilingForm::Annual);
        reconcile(&mut resolved);

        let pbt = resolved.get(Concept::PreTaxIncome).unwrap();
        assert_eq!(pbt.value_for(2022), None);
        assert_eq!(pbt.value_for(2023), Some(1000.0));
    }

    #[test]
    fn test_gap_names_missing_inputs() {
        let mut raw = RawFactSet::new();
        raw.insert("NetIncomeLoss", fact(2023, 800.0));

        let mut resolved = extract_all(&raw, FilingForm::Annual);
        let gaps = reconcile(&mut resolved);

        let gap = gaps
            .iter()
            .find(|g| g.concept == Concept::PreTaxIncome)
            .unwrap();
        assert!(gap.reason.contains("tax expense"), "{}", gap.reason);
        assert!(!resolved.is_resolved(Concept::PreTaxIncome));
    }

    #[test]
    fn test_reported_pre_tax_income_left_untouched() {
        let mut raw = RawFactSet::new();
        raw.insert(
            "IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
            fact(2023, 950.0),
        );
        raw.insert("NetIncomeLoss", fact(2023, 800.0));
        raw.insert("IncomeTaxExpenseBenefit", fact(2023, 200.0));

        let mut resolved = extract_all(&raw, FilingForm::Annual);
        reconcile(&mut resolved);

        let pbt = resolved.get(Concept::PreTaxIncome).unwrap();
        assert_eq!(pbt.value_for(2023), Some(950.0));
        assert!(pbt.derived_rule.is_none());
    }

    #[test]
    fn test_total_debt_accepts_single_side() {
        let mut raw = RawFactSet::new();
        raw.insert("LongTermDebt", fact(2023, 400.0));

        let mut resolved = extract_all(&raw, FilingForm::Annual);
        reconcile(&mut resolved);

        let debt = resolved.get(Concept::TotalDebt).unwrap();
        assert_eq!(debt.value_for(2023), Some(400.0));
    }

    #[test]
    fn test_total_debt_sums_both_sides() {
        let mut raw = RawFactSet::new();
        raw.insert("LongTermDebt", fact(2023, 400.0));
        raw.insert("ShortTermBorrowings", fact(2023, 50.0));

        let mut resolved = extract_all(&raw, FilingForm::Annual);
        reconcile(&mut resolved);

        let debt = resolved.get(Concept::TotalDebt).unwrap();
        assert_eq!(debt.value_for(2023), Some(450.0));
    }
}
