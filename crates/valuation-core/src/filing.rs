//! Filing form definitions.
//!
//! This module defines [`FilingForm`], the regulatory form a fact observation
//! was reported on. The valuation pipeline only consumes annual filings, but
//! providers surface quarterly observations too and the extractor filters on
//! this type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Regulatory filing form for a reporting period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingForm {
    /// Annual report (form 10-K).
    #[default]
    Annual,
    /// Quarterly report (form 10-Q).
    Quarterly,
}

impl FilingForm {
    /// Returns the regulatory form string ("10-K" or "10-Q").
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Annual => "10-K",
            Self::Quarterly => "10-Q",
        }
    }

    /// Parses a regulatory form string into a filing form.
    ///
    /// Returns `None` for forms the pipeline does not model (8-K, S-1, ...).
    #[must_use]
    pub fn from_form(form: &str) -> Option<Self> {
        match form {
            "10-K" => Some(Self::Annual),
            "10-Q" => Some(Self::Quarterly),
            _ => None,
        }
    }

    /// Returns true for annual filings.
    #[must_use]
    pub const fn is_annual(self) -> bool {
        matches!(self, Self::Annual)
    }
}

impl fmt::Display for FilingForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
