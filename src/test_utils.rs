//! Shared test utilities for the loan desk.
//!
//! This module provides the stock sample loans, a record builder with
//! sensible defaults, test tracing and an in-memory database.

use crate::{
    core::loan::{LoanRecord, LoanStatus, LoanType},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a tracing subscriber that writes through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a loan record with sensible defaults.
///
/// # Defaults
/// * email and phone derived from `id`
/// * amount: 100000
/// * interest rate 12%, term 12 months
/// * created 2024-01-01, next due 2024-02-01
pub fn make_loan(id: &str, name: &str, loan_type: LoanType, status: LoanStatus) -> LoanRecord {
    LoanRecord {
        id: id.to_string(),
        borrower_name: name.to_string(),
        borrower_email: format!("{}@example.com", id.to_lowercase()),
        borrower_phone: "+91 90000 00000".to_string(),
        borrower_address: "1 Test Street, Bangalore".to_string(),
        loan_type,
        amount: 100_000.0,
        status,
        next_due_date: "2024-02-01".to_string(),
        interest_rate: 12.0,
        term: 12,
        created_date: "2024-01-01".to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn stock_loan(
    id: &str,
    name: &str,
    contact: (&str, &str, &str),
    loan_type: LoanType,
    amount: f64,
    status: LoanStatus,
    terms: (f64, u32),
    dates: (&str, &str),
) -> LoanRecord {
    let (email, phone, address) = contact;
    let (interest_rate, term) = terms;
    let (next_due_date, created_date) = dates;
    LoanRecord {
        id: id.to_string(),
        borrower_name: name.to_string(),
        borrower_email: email.to_string(),
        borrower_phone: phone.to_string(),
        borrower_address: address.to_string(),
        loan_type,
        amount,
        status,
        next_due_date: next_due_date.to_string(),
        interest_rate,
        term,
        created_date: created_date.to_string(),
    }
}

/// The eight loans the dashboard ships with, two of each type.
pub fn sample_loans() -> Vec<LoanRecord> {
    vec![
        stock_loan(
            "LN001",
            "Rajesh Kumar",
            (
                "rajesh.kumar@email.com",
                "+91 98765 43210",
                "123 MG Road, Bangalore, Karnataka 560001",
            ),
            LoanType::Personal,
            500_000.0,
            LoanStatus::Started,
            (12.5, 36),
            ("2024-02-15", "2024-01-10"),
        ),
        stock_loan(
            "LN002",
            "Priya Sharma",
            (
                "priya.sharma@email.com",
                "+91 87654 32109",
                "456 Park Street, Mumbai, Maharashtra 400001",
            ),
            LoanType::Vehicle,
            800_000.0,
            LoanStatus::Accepted,
            (10.8, 60),
            ("2024-02-20", "2024-01-08"),
        ),
        stock_loan(
            "LN003",
            "Amit Patel",
            (
                "amit.patel@email.com",
                "+91 76543 21098",
                "789 Ring Road, Ahmedabad, Gujarat 380001",
            ),
            LoanType::Business,
            2_000_000.0,
            LoanStatus::Initiated,
            (14.2, 84),
            ("2024-02-25", "2024-01-05"),
        ),
        stock_loan(
            "LN004",
            "Sunita Reddy",
            (
                "sunita.reddy@email.com",
                "+91 65432 10987",
                "321 Tank Bund Road, Hyderabad, Telangana 500001",
            ),
            LoanType::Medical,
            300_000.0,
            LoanStatus::Started,
            (11.5, 24),
            ("2024-02-18", "2024-01-12"),
        ),
        stock_loan(
            "LN005",
            "Vikram Singh",
            (
                "vikram.singh@email.com",
                "+91 54321 09876",
                "654 Civil Lines, Delhi, Delhi 110001",
            ),
            LoanType::Personal,
            750_000.0,
            LoanStatus::Ended,
            (13.0, 48),
            ("2024-03-01", "2024-01-03"),
        ),
        stock_loan(
            "LN006",
            "Meera Joshi",
            (
                "meera.joshi@email.com",
                "+91 43210 98765",
                "987 FC Road, Pune, Maharashtra 411001",
            ),
            LoanType::Vehicle,
            1_200_000.0,
            LoanStatus::Started,
            (9.8, 72),
            ("2024-02-22", "2024-01-15"),
        ),
        stock_loan(
            "LN007",
            "Arjun Nair",
            (
                "arjun.nair@email.com",
                "+91 32109 87654",
                "147 Marine Drive, Kochi, Kerala 682001",
            ),
            LoanType::Business,
            1_500_000.0,
            LoanStatus::Accepted,
            (15.5, 60),
            ("2024-02-28", "2024-01-20"),
        ),
        stock_loan(
            "LN008",
            "Kavya Iyer",
            (
                "kavya.iyer@email.com",
                "+91 21098 76543",
                "258 Anna Salai, Chennai, Tamil Nadu 600001",
            ),
            LoanType::Medical,
            450_000.0,
            LoanStatus::Initiated,
            (12.0, 30),
            ("2024-03-05", "2024-01-18"),
        ),
    ]
}
