//! Loan application intake.
//!
//! A submission turns into a `LoanRecord` only after the borrower's phone has
//! been verified by OTP and every document its loan type requires has been
//! attached. The OTP step is simulated: any six-digit code is accepted.

use crate::{
    core::{
        loan::{LoanRecord, LoanStatus, LoanType, generate_loan_id},
        store::{KeyValueStore, KeyedLoanStore, append_loan},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Months, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Largest accepted document, in bytes.
pub const MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Content types accepted for uploaded documents.
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["application/pdf", "image/jpeg", "image/jpg", "image/png"];

const MIN_PHONE_LEN: usize = 10;
const OTP_LEN: usize = 6;

/// Unit the tenure was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenureUnit {
    /// Months
    #[default]
    Months,
    /// Years
    Years,
}

impl TenureUnit {
    /// Converts a tenure in this unit to months.
    #[must_use]
    pub const fn to_months(self, tenure: u32) -> u32 {
        match self {
            Self::Months => tenure,
            Self::Years => tenure.saturating_mul(12),
        }
    }
}

/// Mock phone verification.
#[derive(Debug, Clone, Default)]
pub struct OtpVerification {
    sent_to: Option<String>,
    verified: bool,
}

impl OtpVerification {
    /// Creates an unverified state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// "Sends" a code to `phone` and returns it so the caller can show it.
    pub fn send(&mut self, phone: &str) -> Result<String> {
        if phone.trim().len() < MIN_PHONE_LEN {
            return Err(Error::InvalidPhone {
                phone: phone.to_string(),
            });
        }
        let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        self.sent_to = Some(phone.to_string());
        self.verified = false;
        info!("Mock OTP sent to {phone}");
        Ok(code.to_string())
    }

    /// Accepts any six-digit code.
    pub fn verify(&mut self, code: &str) -> Result<()> {
        if code.len() != OTP_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidOtp);
        }
        self.verified = true;
        Ok(())
    }

    /// Whether a code has been accepted.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified
    }

    /// Phone number the last code was sent to.
    #[must_use]
    pub fn sent_to(&self) -> Option<&str> {
        self.sent_to.as_deref()
    }
}

/// Kinds of supporting documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    /// Aadhaar card
    AadhaarCard,
    /// PAN card
    PanCard,
    /// Driving licence
    DrivingLicense,
    /// Proof of address
    AddressProof,
    /// Proof of income
    IncomeProof,
    /// Vehicle registration certificate
    VehicleRc,
    /// Vehicle insurance
    VehicleInsurance,
    /// Vehicle invoice
    VehicleInvoice,
    /// Business registration document
    BusinessRegistration,
    /// GST certificate
    GstCertificate,
    /// Bank statement
    BankStatement,
}

impl DocumentKind {
    /// Label shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AadhaarCard => "Aadhaar Card",
            Self::PanCard => "PAN Card",
            Self::DrivingLicense => "Driving License",
            Self::AddressProof => "Address Proof",
            Self::IncomeProof => "Income Proof",
            Self::VehicleRc => "Vehicle RC",
            Self::VehicleInsurance => "Vehicle Insurance",
            Self::VehicleInvoice => "Vehicle Invoice",
            Self::BusinessRegistration => "Business Registration",
            Self::GstCertificate => "GST Certificate",
            Self::BankStatement => "Bank Statement",
        }
    }
}

/// Documents that must be attached before a loan of `loan_type` is submitted.
#[must_use]
pub const fn required_documents(loan_type: LoanType) -> &'static [DocumentKind] {
    match loan_type {
        LoanType::Personal | LoanType::Medical => {
            &[DocumentKind::AadhaarCard, DocumentKind::PanCard]
        }
        LoanType::Vehicle => &[
            DocumentKind::AadhaarCard,
            DocumentKind::PanCard,
            DocumentKind::DrivingLicense,
            DocumentKind::AddressProof,
            DocumentKind::IncomeProof,
        ],
        LoanType::Business => &[
            DocumentKind::BusinessRegistration,
            DocumentKind::GstCertificate,
            DocumentKind::BankStatement,
        ],
    }
}

/// Metadata of an uploaded file. Contents are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    /// Which document this is
    pub kind: DocumentKind,
    /// Original file name
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
}

impl UploadedDocument {
    /// Checks the content type and size limits.
    pub fn validate(&self) -> Result<()> {
        if !ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str()) {
            return Err(Error::UnsupportedFileType {
                content_type: self.content_type.clone(),
            });
        }
        if self.size > MAX_DOCUMENT_SIZE {
            return Err(Error::FileTooLarge { size: self.size });
        }
        Ok(())
    }
}

/// Documents attached to one application, at most one per kind.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    documents: HashMap<DocumentKind, UploadedDocument>,
}

impl DocumentSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a document, replacing any earlier one of the same kind.
    pub fn attach(&mut self, document: UploadedDocument) -> Result<()> {
        document.validate()?;
        self.documents.insert(document.kind, document);
        Ok(())
    }

    /// Detaches the document of `kind`, if any.
    pub fn remove(&mut self, kind: DocumentKind) -> Option<UploadedDocument> {
        self.documents.remove(&kind)
    }

    /// Whether a document of `kind` is attached.
    #[must_use]
    pub fn contains(&self, kind: DocumentKind) -> bool {
        self.documents.contains_key(&kind)
    }

    /// Required documents for `loan_type` that are not attached.
    #[must_use]
    pub fn missing(&self, loan_type: LoanType) -> Vec<DocumentKind> {
        required_documents(loan_type)
            .iter()
            .copied()
            .filter(|kind| !self.contains(*kind))
            .collect()
    }
}

/// Purchase terms of a vehicle loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleTerms {
    /// On-road price
    pub vehicle_price: f64,
    /// Amount paid upfront
    pub down_payment: f64,
}

/// Data entered on a loan application form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    /// Loan category
    pub loan_type: LoanType,
    /// Borrower name, or business name for business loans
    pub borrower_name: String,
    /// Borrower phone
    pub phone_number: String,
    /// Borrower email
    pub email: String,
    /// Borrower or business address
    pub address: String,
    /// Requested principal
    pub loan_amount: f64,
    /// Annual interest rate in percent
    pub interest_rate: f64,
    /// Tenure in `tenure_unit`
    pub tenure: u32,
    /// Unit of `tenure`
    pub tenure_unit: TenureUnit,
    /// Vehicle purchase terms, vehicle loans only
    #[serde(default)]
    pub vehicle: Option<VehicleTerms>,
}

impl LoanApplication {
    /// Term in months.
    #[must_use]
    pub const fn term_months(&self) -> u32 {
        self.tenure_unit.to_months(self.tenure)
    }

    /// Runs the submission checks in the order the form reports them.
    pub fn validate(&self, otp: &OtpVerification, documents: &DocumentSet) -> Result<()> {
        if !otp.is_verified() {
            return Err(Error::PhoneNotVerified);
        }
        let missing = documents.missing(self.loan_type);
        if !missing.is_empty() {
            return Err(Error::MissingDocuments {
                missing: missing.iter().map(|k| k.label().to_string()).collect(),
            });
        }
        if self
            .vehicle
            .is_some_and(|terms| terms.down_payment >= terms.vehicle_price)
        {
            return Err(Error::DownPaymentTooHigh);
        }
        if !(self.loan_amount.is_finite() && self.loan_amount > 0.0) {
            return Err(Error::InvalidAmount {
                amount: self.loan_amount,
            });
        }
        if !(self.interest_rate.is_finite() && self.interest_rate >= 0.0) {
            return Err(Error::InvalidInterestRate {
                rate: self.interest_rate,
            });
        }
        Ok(())
    }

    /// Builds the record for this application as of `now`.
    #[must_use]
    pub fn to_record(&self, now: DateTime<Utc>) -> LoanRecord {
        let today = now.date_naive();
        LoanRecord {
            id: generate_loan_id(now),
            borrower_name: self.borrower_name.clone(),
            borrower_email: self.email.clone(),
            borrower_phone: self.phone_number.clone(),
            borrower_address: self.address.clone(),
            loan_type: self.loan_type,
            amount: self.loan_amount,
            status: LoanStatus::Initiated,
            next_due_date: format_date(next_due_date(today, self.term_months())),
            interest_rate: self.interest_rate,
            term: self.term_months(),
            created_date: format_date(today),
        }
    }
}

/// `today` plus `months`, clamped to the end of shorter months.
#[must_use]
pub fn next_due_date(today: NaiveDate, months: u32) -> NaiveDate {
    today.checked_add_months(Months::new(months)).unwrap_or(today)
}

/// ISO `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Validates an application and appends the new loan under its type's key.
pub async fn submit<S: KeyValueStore>(
    backend: &S,
    application: &LoanApplication,
    otp: &OtpVerification,
    documents: &DocumentSet,
    now: DateTime<Utc>,
) -> Result<LoanRecord> {
    application.validate(otp, documents)?;
    let record = application.to_record(now);
    let store = KeyedLoanStore::for_type(backend, application.loan_type);
    append_loan(&store, record.clone()).await?;
    info!(
        "{} loan application {} submitted for {}",
        record.loan_type, record.id, record.borrower_name
    );
    Ok(record)
}
