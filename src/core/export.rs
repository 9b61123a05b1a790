//! Exports, bulk actions and generated artifact names.

use crate::{
    core::{
        application::format_date,
        loan::{LoanRecord, LoanStatus},
        store::LoanStore,
    },
    errors::Result,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, warn};

/// Pretty-printed JSON array of `loans`.
pub fn export_json(loans: &[LoanRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(loans)?)
}

/// File name for an export of the current list view.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("loans-export-{}.json", format_date(date))
}

/// File name for an export of selected loans.
#[must_use]
pub fn selected_export_file_name(date: NaiveDate) -> String {
    format!("selected-loans-export-{}.json", format_date(date))
}

/// File name of the application summary PDF,
/// `<Loan-Type>-Loan-Application-<id>-<date>.pdf`.
#[must_use]
pub fn pdf_file_name(loan: &LoanRecord, date: NaiveDate) -> String {
    format!(
        "{}-Loan-Application-{}-{}.pdf",
        loan.loan_type,
        loan.id,
        format_date(date)
    )
}

/// Loans whose id is in `ids`, in collection order.
#[must_use]
pub fn bulk_select(loans: &[LoanRecord], ids: &[String]) -> Vec<LoanRecord> {
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    loans
        .iter()
        .filter(|loan| wanted.contains(loan.id.as_str()))
        .cloned()
        .collect()
}

/// Sets the status of the selected loans in `store`. Returns how many
/// records changed. Backward moves are applied but logged. An unreadable
/// collection is an error and is left as stored.
pub async fn bulk_update_status<L: LoanStore>(
    store: &L,
    ids: &[String],
    status: LoanStatus,
) -> Result<usize> {
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut loans = store.load_for_update().await?;
    let mut changed = 0;
    for loan in loans
        .iter_mut()
        .filter(|loan| wanted.contains(loan.id.as_str()))
    {
        if loan.status == status {
            continue;
        }
        if !loan.status.can_advance_to(status) {
            warn!(
                "Loan {} moved backwards from {} to {}",
                loan.id, loan.status, status
            );
        }
        loan.status = status;
        changed += 1;
    }
    if changed > 0 {
        store.save(&loans).await?;
    }
    info!("Updated status of {changed} loan(s) to {status}");
    Ok(changed)
}
