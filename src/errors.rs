//! Unified error types for the loan desk core.
//!
//! The query engine and responder are total and never produce these. Errors
//! come from configuration, persistence backends and the application intake
//! checks that the UI reports back to the loan officer.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description
        message: String,
    },

    /// Database layer failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON encoding failure while writing a loan collection
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An assistant rule pattern failed to compile
    #[error("Invalid assistant pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page size is not one of the configured options
    #[error("Page size {size} is not one of the allowed options")]
    InvalidPageSize {
        /// The rejected page size
        size: usize,
    },

    /// Phone number too short to send an OTP to
    #[error("Invalid phone number: {phone}")]
    InvalidPhone {
        /// The rejected phone number
        phone: String,
    },

    /// OTP was not exactly six digits
    #[error("Please enter a valid 6-digit OTP")]
    InvalidOtp,

    /// Submission attempted before the phone number was verified
    #[error("Please verify your phone number with OTP")]
    PhoneNotVerified,

    /// One or more required documents were not uploaded
    #[error("Please upload all required documents: {}", missing.join(", "))]
    MissingDocuments {
        /// Labels of the missing documents
        missing: Vec<String>,
    },

    /// Uploaded file has an unsupported content type
    #[error("Invalid file type {content_type}. Please upload PDF, JPG, or PNG files.")]
    UnsupportedFileType {
        /// The rejected MIME type
        content_type: String,
    },

    /// Uploaded file exceeds the size limit
    #[error("File too large ({size} bytes). Maximum size is 10MB.")]
    FileTooLarge {
        /// Size of the rejected file in bytes
        size: u64,
    },

    /// Down payment must be strictly below the vehicle price
    #[error("Down payment cannot be greater than or equal to vehicle price")]
    DownPaymentTooHigh,

    /// Amount must be positive and finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Interest rate must be finite and not negative
    #[error("Invalid interest rate: {rate}")]
    InvalidInterestRate {
        /// The rejected rate
        rate: f64,
    },

    /// A loan carries a value JSON cannot represent
    #[error("Loan {id} has a non-finite {field}")]
    NonFiniteField {
        /// Loan id
        id: String,
        /// Field name as stored
        field: &'static str,
    },

    /// A stored collection exists but does not decode; it is left untouched
    #[error("Stored loans under `{key}` are unreadable: {message}")]
    CorruptStore {
        /// Storage key
        key: String,
        /// Decoder message
        message: String,
    },

    /// No review document has this id
    #[error("Document not found: {id}")]
    DocumentNotFound {
        /// The unknown id
        id: String,
    },

    /// Rejections and revision requests need a reason
    #[error("A comment is required to {action} a document")]
    CommentRequired {
        /// The review action attempted
        action: &'static str,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
