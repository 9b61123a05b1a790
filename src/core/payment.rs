//! Repayment tracking and EMI arithmetic.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};

/// Equated monthly installment for a fully amortised loan.
///
/// A zero rate spreads the principal evenly; zero months yields 0.
#[must_use]
pub fn emi(principal: f64, annual_rate_percent: f64, months: u32) -> f64 {
    if months == 0 {
        return 0.0;
    }
    let n = f64::from(months);
    let r = annual_rate_percent / 12.0 / 100.0;
    if r == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Totals over the life of a loan at a given EMI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentSummary {
    /// Monthly installment
    pub monthly_emi: f64,
    /// Sum of all installments
    pub total_amount: f64,
    /// Interest portion of `total_amount`
    pub total_interest: f64,
}

/// EMI plus lifetime totals.
#[must_use]
pub fn repayment_summary(principal: f64, annual_rate_percent: f64, months: u32) -> RepaymentSummary {
    let monthly_emi = emi(principal, annual_rate_percent, months);
    let total_amount = monthly_emi * f64::from(months);
    RepaymentSummary {
        monthly_emi,
        total_amount,
        total_interest: total_amount - principal,
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer
    BankTransfer,
    /// UPI
    Upi,
    /// Cheque
    Cheque,
    /// Cash
    Cash,
    /// Online payment
    Online,
}

/// Settlement state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Settled
    Completed,
    /// Awaiting settlement
    Pending,
    /// Failed
    Failed,
}

/// A payment as entered by an officer, before it gets an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    /// Amount paid
    pub amount: f64,
    /// When it was paid
    pub payment_date: DateTime<Utc>,
    /// How it was paid
    pub payment_method: PaymentMethod,
    /// External reference
    pub transaction_id: String,
    /// Settlement state
    pub status: PaymentStatus,
    /// Principal portion
    pub principal_amount: f64,
    /// Interest portion
    pub interest_amount: f64,
    /// Outstanding balance after this payment
    pub remaining_balance: f64,
}

/// A recorded payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// `pay<millis>_<suffix>`
    pub id: String,
    /// Payment details
    #[serde(flatten)]
    pub details: NewPayment,
}

/// Payments of one loan, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentLedger {
    payments: Vec<PaymentRecord>,
}

impl PaymentLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a payment at the front of the ledger.
    pub fn record(&mut self, payment: NewPayment, now: DateTime<Utc>) -> Result<&PaymentRecord> {
        if payment.amount <= 0.0 || payment.amount.is_nan() {
            return Err(Error::InvalidAmount {
                amount: payment.amount,
            });
        }
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect();
        let record = PaymentRecord {
            id: format!("pay{}_{suffix}", now.timestamp_millis()),
            details: payment,
        };
        self.payments.insert(0, record);
        Ok(&self.payments[0])
    }

    /// All payments, newest first.
    #[must_use]
    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    /// Number of settled payments.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.payments
            .iter()
            .filter(|p| p.details.status == PaymentStatus::Completed)
            .count()
    }

    /// Sum of settled payment amounts.
    #[must_use]
    pub fn total_paid(&self) -> f64 {
        self.payments
            .iter()
            .filter(|p| p.details.status == PaymentStatus::Completed)
            .map(|p| p.details.amount)
            .sum()
    }
}
