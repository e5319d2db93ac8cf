//! Canonical financial concepts and their source-label fallback chains.
//!
//! Filings tag the same economic quantity under different XBRL labels
//! depending on the filer and the year. Each [`Concept`] therefore carries an
//! *ordered* list of acceptable source labels; the order encodes fallback
//! preference and is part of the concept's definition, not something callers
//! choose per lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical financial concept the pipeline can resolve from filings.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Concept {
    /// Operating income (EBIT).
    Ebit,
    /// Income before income taxes.
    PreTaxIncome,
    /// Net income.
    NetIncome,
    /// Income tax expense.
    TaxExpense,
    /// Depreciation and amortization.
    DepreciationAmortization,
    /// Capital expenditures.
    CapitalExpenditure,
    /// Reported change in operating working capital.
    ChangeInWorkingCapital,
    /// Total revenue.
    Revenue,
    /// Net cash provided by operating activities.
    OperatingCashFlow,
    /// Current assets.
    CurrentAssets,
    /// Current liabilities.
    CurrentLiabilities,
    /// Cash and cash equivalents.
    Cash,
    /// Total assets.
    TotalAssets,
    /// Total liabilities.
    TotalLiabilities,
    /// Stockholders' equity.
    StockholdersEquity,
    /// Long-term debt.
    LongTermDebt,
    /// Short-term debt and current debt maturities.
    ShortTermDebt,
    /// Total debt, when reported directly.
    TotalDebt,
    /// Shares outstanding (weighted diluted preferred).
    SharesOutstanding,
}

impl Concept {
    /// Every concept the pipeline knows how to resolve.
    pub const ALL: [Self; 19] = [
        Self::Ebit,
        Self::PreTaxIncome,
        Self::NetIncome,
        Self::TaxExpense,
        Self::DepreciationAmortization,
        Self::CapitalExpenditure,
        Self::ChangeInWorkingCapital,
        Self::Revenue,
        Self::OperatingCashFlow,
        Self::CurrentAssets,
        Self::CurrentLiabilities,
        Self::Cash,
        Self::TotalAssets,
        Self::TotalLiabilities,
        Self::StockholdersEquity,
        Self::LongTermDebt,
        Self::ShortTermDebt,
        Self::TotalDebt,
        Self::SharesOutstanding,
    ];

    /// Concepts that must resolve (directly or via reconciliation) before a
    /// period can feed the FCFF engine.
    pub const REQUIRED_FOR_FCFF: [Self; 5] = [
        Self::Ebit,
        Self::PreTaxIncome,
        Self::TaxExpense,
        Self::DepreciationAmortization,
        Self::CapitalExpenditure,
    ];

    /// Acceptable source labels for this concept, in fallback-preference order.
    ///
    /// Different filers use different XBRL tags for the same concept; the
    /// extractor walks this list in order and the first label with usable
    /// observations wins.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Ebit => &["OperatingIncomeLoss"],
            Self::PreTaxIncome => &[
                "IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
                "IncomeLossFromContinuingOperationsBeforeIncomeTaxes",
                "IncomeBeforeTax",
            ],
            Self::NetIncome => &[
                "NetIncomeLoss",
                "ProfitLoss",
                "NetIncomeLossAvailableToCommonStockholdersBasic",
            ],
            Self::TaxExpense => &["IncomeTaxExpenseBenefit"],
            Self::DepreciationAmortization => &[
                "DepreciationDepletionAndAmortization",
                "DepreciationAndAmortization",
                "Depreciation",
            ],
            Self::CapitalExpenditure => &[
                "PaymentsToAcquirePropertyPlantAndEquipment",
                "PaymentsForAcquisitionsOfProductiveAssets",
                "PaymentsForCapitalImprovements",
            ],
            Self::ChangeInWorkingCapital => &[
                "IncreaseDecreaseInOperatingCapital",
                "IncreaseDecreaseInOperatingAssets",
            ],
            Self::Revenue => &[
                "Revenues",
                "RevenueFromContractWithCustomerExcludingAssessedTax",
                "SalesRevenueNet",
                "RevenueFromContractWithCustomerIncludingAssessedTax",
            ],
            Self::OperatingCashFlow => &[
                "NetCashProvidedByUsedInOperatingActivities",
                "CashProvidedByUsedInOperatingActivities",
            ],
            Self::CurrentAssets => &["AssetsCurrent"],
            Self::CurrentLiabilities => &["LiabilitiesCurrent"],
            Self::Cash => &[
                "CashAndCashEquivalentsAtCarryingValue",
                "Cash",
                "CashCashEquivalentsAndShortTermInvestments",
            ],
            Self::TotalAssets => &["Assets"],
            Self::TotalLiabilities => &["Liabilities"],
            Self::StockholdersEquity => &[
                "StockholdersEquity",
                "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
            ],
            Self::LongTermDebt => &[
                "LongTermDebt",
                "LongTermDebtNoncurrent",
                "LongTermDebtAndCapitalLeaseObligations",
            ],
            Self::ShortTermDebt => &[
                "ShortTermBorrowings",
                "DebtCurrent",
                "CurrentPortionOfLongTermDebt",
            ],
            Self::TotalDebt => &["Debt", "TotalDebt"],
            Self::SharesOutstanding => &[
                "WeightedAverageNumberOfDilutedSharesOutstanding",
                "WeightedAverageNumberOfSharesOutstandingBasic",
                "CommonStockSharesOutstanding",
            ],
        }
    }

    /// Human-readable name used in error messages and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ebit => "EBIT",
            Self::PreTaxIncome => "pre-tax income",
            Self::NetIncome => "net income",
            Self::TaxExpense => "tax expense",
            Self::DepreciationAmortization => "depreciation & amortization",
            Self::CapitalExpenditure => "capital expenditure",
            Self::ChangeInWorkingCapital => "change in working capital",
            Self::Revenue => "revenue",
            Self::OperatingCashFlow => "operating cash flow",
            Self::CurrentAssets => "current assets",
            Self::CurrentLiabilities => "current liabilities",
            Self::Cash => "cash and equivalents",
            Self::TotalAssets => "total assets",
            Self::TotalLiabilities => "total liabilities",
            Self::StockholdersEquity => "stockholders' equity",
            Self::LongTermDebt => "long-term debt",
            Self::ShortTermDebt => "short-term debt",
            Self::TotalDebt => "total debt",
            Self::SharesOutstanding => "shares outstanding",
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
