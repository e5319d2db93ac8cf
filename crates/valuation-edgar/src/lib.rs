#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR companyfacts adapter.
//!
//! The EDGAR Company Facts API returns every XBRL-tagged fact a filer has
//! reported, organized by taxonomy and tag. This crate parses such a
//! document and exposes it through the [`FactProvider`] trait:
//!
//! ```no_run
//! use valuation_core::{FactProvider, Ticker};
//! use valuation_edgar::EdgarProvider;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = std::fs::read_to_string("CIK0000320193.json")?;
//!
//! let mut provider = EdgarProvider::new();
//! provider.load_document(Ticker::new("AAPL"), &document)?;
//!
//! let facts = provider.raw_facts(&Ticker::new("AAPL")).await?;
//! println!("{} source labels", facts.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use valuation_core::{
    Company, FactProvider, FilingForm, RawFact, RawFactSet, Result, Ticker, ValuationError,
};

/// Unit preference order for monetary, share and ratio facts.
const UNIT_PREFERENCE: [&str; 3] = ["USD", "shares", "pure"];

/// Taxonomies scanned for facts, in preference order.
const TAXONOMIES: [&str; 2] = ["us-gaap", "dei"];

/// A fact provider over pre-fetched EDGAR companyfacts documents.
///
/// Holds one parsed document per ticker. Loading replaces any document
/// previously held for that ticker.
#[derive(Debug, Default)]
pub struct EdgarProvider {
    documents: HashMap<Ticker, CompanyFacts>,
}

impl EdgarProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and stores a companyfacts JSON document for a ticker.
    ///
    /// # Errors
    /// Returns [`ValuationError::Parse`] if the document does not match the
    /// companyfacts shape.
    pub fn load_document(&mut self, ticker: Ticker, json: &str) -> Result<()> {
        let facts: CompanyFacts = serde_json::from_str(json)
            .map_err(|e| ValuationError::Parse(format!("companyfacts document: {e}")))?;
        debug!(ticker = %ticker, entity = %facts.entity_name, "loaded companyfacts document");
        self.documents.insert(ticker, facts);
        Ok(())
    }

    /// Parses and stores a companyfacts document from a JSON value.
    pub fn load_value(&mut self, ticker: Ticker, json: serde_json::Value) -> Result<()> {
        let facts: CompanyFacts = serde_json::from_value(json)
            .map_err(|e| ValuationError::Parse(format!("companyfacts document: {e}")))?;
        self.documents.insert(ticker, facts);
        Ok(())
    }

    fn document(&self, ticker: &Ticker) -> Result<&CompanyFacts> {
        self.documents.get(ticker).ok_or_else(|| {
            ValuationError::UpstreamFetch(format!(
                "no companyfacts document loaded for {ticker}"
            ))
        })
    }
}

#[async_trait]
impl FactProvider for EdgarProvider {
    fn name(&self) -> &str {
        "SEC EDGAR companyfacts"
    }

    fn description(&self) -> &str {
        "Pre-fetched SEC EDGAR companyfacts documents (10-K and 10-Q XBRL facts)"
    }

    async fn company(&self, ticker: &Ticker) -> Result<Company> {
        let document = self.document(ticker)?;
        Ok(Company::new(ticker.clone(), &document.entity_name)
            .with_cik(format!("{:0>10}", document.cik)))
    }

    async fn raw_facts(&self, ticker: &Ticker) -> Result<RawFactSet> {
        let document = self.document(ticker)?;

        let mut set = RawFactSet::new();
        for taxonomy in TAXONOMIES {
            let Some(tags) = document.facts.get(taxonomy) else {
                continue;
            };
            for (tag, tag_facts) in tags {
                let Some(units) = &tag_facts.units else {
                    continue;
                };
                // One unit per tag: USD preferred, then shares, then pure.
                let Some(values) = UNIT_PREFERENCE.iter().find_map(|u| units.get(*u)) else {
                    continue;
                };
                for value in values {
                    if let Some(fact) = value.to_raw_fact() {
                        set.insert(tag.clone(), fact);
                    }
                }
            }
        }

        if set.is_empty() {
            warn!(ticker = %ticker, "companyfacts document yielded no usable facts");
        }
        Ok(set)
    }
}

// =============================================================================
// Companyfacts document types
// =============================================================================

/// A parsed EDGAR Company Facts document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyFacts {
    /// CIK number.
    cik: u64,
    /// Entity name.
    entity_name: String,
    /// Facts organized by taxonomy and tag.
    facts: HashMap<String, HashMap<String, TagFacts>>,
}

/// Facts for a specific XBRL tag.
#[derive(Debug, Deserialize)]
struct TagFacts {
    /// Label/description.
    #[serde(default)]
    #[allow(dead_code)]
    label: Option<String>,
    /// Units (USD, shares, etc.) containing the actual fact values.
    units: Option<HashMap<String, Vec<FactValue>>>,
}

/// A single fact value with filing metadata.
#[derive(Debug, Clone, Deserialize)]
struct FactValue {
    /// End date of the period.
    end: String,
    /// Value.
    val: f64,
    /// Accession number.
    #[serde(default)]
    accn: Option<String>,
    /// Fiscal year.
    #[serde(default)]
    fy: Option<i32>,
    /// Fiscal period (FY, Q1..Q3).
    #[serde(default)]
    #[allow(dead_code)]
    fp: Option<String>,
    /// Form type.
    #[serde(default)]
    form: Option<String>,
}

impl FactValue {
    /// Converts to the provider-neutral raw fact shape.
    ///
    /// Values missing a fiscal year, a parseable period end, or reported on
    /// a form the pipeline does not model are skipped.
    fn to_raw_fact(&self) -> Option<RawFact> {
        let form = FilingForm::from_form(self.form.as_deref()?)?;
        let fiscal_year = self.fy?;
        let period_end = NaiveDate::parse_from_str(&self.end, "%Y-%m-%d").ok()?;

        Some(RawFact {
            value: self.val,
            fiscal_year,
            period_end,
            form,
            accession: self.accn.clone().unwrap_or_default(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
