//! Core business logic - loan records, queries, storage and applications
//!
//! Nothing in here knows about a UI. Callers hand in the storage backend and
//! the clock; functions return plain data or `Result`s.

/// New loan applications, OTP verification and document checks
pub mod application;
/// Document review workflow by loan stage
pub mod documents;
/// JSON exports, bulk actions and artifact names
pub mod export;
/// Loan record types
pub mod loan;
/// EMI maths and payment ledger
pub mod payment;
/// Filtering, sorting, pagination and statistics
pub mod query;
/// Key-value persistence of loan collections
pub mod store;
