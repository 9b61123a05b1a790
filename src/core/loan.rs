//! Loan records and their categorical fields.
//!
//! `LoanRecord` mirrors the JSON shape persisted under the per-type storage
//! keys, so field names serialize in camelCase.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loan category. Drives both intake requirements and list filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanType {
    /// Unsecured personal loan
    Personal,
    /// Vehicle purchase loan
    Vehicle,
    /// Business loan
    Business,
    /// Medical expense loan
    Medical,
}

impl LoanType {
    /// All loan types in tab order.
    pub const ALL: [Self; 4] = [Self::Personal, Self::Vehicle, Self::Business, Self::Medical];

    /// Name as shown to users and stored in records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Vehicle => "Vehicle",
            Self::Business => "Business",
            Self::Medical => "Medical",
        }
    }

    /// Storage key under which loans of this type are persisted.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Personal => "personalLoans",
            Self::Vehicle => "vehicleLoans",
            Self::Business => "businessLoans",
            Self::Medical => "medicalLoans",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loan lifecycle status: `Initiated -> Accepted -> Started -> Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// Application submitted
    Initiated,
    /// Approved by an officer
    Accepted,
    /// Funds disbursed, repayments running
    Started,
    /// Fully closed
    Ended,
}

impl LoanStatus {
    /// Name as stored in records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initiated => "Initiated",
            Self::Accepted => "Accepted",
            Self::Started => "Started",
            Self::Ended => "Ended",
        }
    }

    /// The next status in the lifecycle, `None` once ended.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Initiated => Some(Self::Accepted),
            Self::Accepted => Some(Self::Started),
            Self::Started => Some(Self::Ended),
            Self::Ended => None,
        }
    }

    /// Whether moving to `target` goes forward in the lifecycle.
    #[must_use]
    pub fn can_advance_to(self, target: Self) -> bool {
        target > self
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One loan application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    /// Unique id, `LN<timestamp><random>` for generated loans
    pub id: String,
    /// Borrower (or business) name
    pub borrower_name: String,
    /// Borrower email
    pub borrower_email: String,
    /// Borrower phone number
    pub borrower_phone: String,
    /// Borrower postal address
    pub borrower_address: String,
    /// Loan category
    pub loan_type: LoanType,
    /// Principal amount
    pub amount: f64,
    /// Lifecycle status
    pub status: LoanStatus,
    /// Next repayment date, `YYYY-MM-DD`
    pub next_due_date: String,
    /// Annual interest rate in percent
    pub interest_rate: f64,
    /// Term in months
    pub term: u32,
    /// Creation date, `YYYY-MM-DD`
    pub created_date: String,
}

/// Generates a loan id from the current time plus a random suffix in `0..1000`.
///
/// The suffix is not zero-padded, so the id length varies and only the fixed
/// width of the millisecond part keeps the two parts apart. Two ids made in
/// the same millisecond collide one time in a thousand.
#[must_use]
pub fn generate_loan_id(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("LN{}{suffix}", now.timestamp_millis())
}

/// Selects which loan types a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeFilter {
    /// No type restriction
    #[default]
    All,
    /// Only loans of one type
    Only(LoanType),
}

impl TypeFilter {
    /// Whether a loan of type `loan_type` passes this filter.
    #[must_use]
    pub fn admits(self, loan_type: LoanType) -> bool {
        match self {
            Self::All => true,
            Self::Only(t) => t == loan_type,
        }
    }
}

impl TryFrom<String> for TypeFilter {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        if value == "All" {
            return Ok(Self::All);
        }
        LoanType::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .map(Self::Only)
            .ok_or_else(|| format!("unknown loan type filter `{value}`"))
    }
}

impl From<TypeFilter> for String {
    fn from(value: TypeFilter) -> Self {
        match value {
            TypeFilter::All => "All".to_string(),
            TypeFilter::Only(t) => t.as_str().to_string(),
        }
    }
}
