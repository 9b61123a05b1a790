//! Loan list query engine.
//!
//! Derives the visible slice of a loan collection from a filter and a page
//! request. Every stage is a pure function and the composition order is
//! fixed: type filter, search filter, sort, paginate. Stats are always taken
//! from the unfiltered base collection so tab counts do not move while the
//! user types a search.

use crate::{
    core::loan::{LoanRecord, LoanType, TypeFilter},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Page sizes offered by the list when nothing else is configured.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

/// Page size used by a fresh list.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 25;

/// Maximum numbered links `visible_pages` shows before collapsing.
const MAX_VISIBLE_PAGES: usize = 5;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

impl SortOrder {
    /// Applies the direction to an ascending comparison result.
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// The loan field a list is sorted by, named as in the stored JSON.
///
/// Names that do not match a field are kept as `Unsupported`; sorting by
/// them leaves the order untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    /// `id`
    Id,
    /// `borrowerName`
    BorrowerName,
    /// `borrowerEmail`
    BorrowerEmail,
    /// `borrowerPhone`
    BorrowerPhone,
    /// `borrowerAddress`
    BorrowerAddress,
    /// `loanType`
    LoanType,
    /// `amount`
    Amount,
    /// `status`
    Status,
    /// `nextDueDate`
    NextDueDate,
    /// `interestRate`
    InterestRate,
    /// `term`
    Term,
    /// `createdDate`
    #[default]
    CreatedDate,
    /// Anything else
    Unsupported(String),
}

impl SortKey {
    /// Field name as used in the stored JSON.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Id => "id",
            Self::BorrowerName => "borrowerName",
            Self::BorrowerEmail => "borrowerEmail",
            Self::BorrowerPhone => "borrowerPhone",
            Self::BorrowerAddress => "borrowerAddress",
            Self::LoanType => "loanType",
            Self::Amount => "amount",
            Self::Status => "status",
            Self::NextDueDate => "nextDueDate",
            Self::InterestRate => "interestRate",
            Self::Term => "term",
            Self::CreatedDate => "createdDate",
            Self::Unsupported(name) => name,
        }
    }

    /// Reads this field out of a loan, `None` for unsupported keys.
    #[must_use]
    pub fn value_of<'a>(&self, loan: &'a LoanRecord) -> Option<FieldValue<'a>> {
        let value = match self {
            Self::Id => FieldValue::Text(&loan.id),
            Self::BorrowerName => FieldValue::Text(&loan.borrower_name),
            Self::BorrowerEmail => FieldValue::Text(&loan.borrower_email),
            Self::BorrowerPhone => FieldValue::Text(&loan.borrower_phone),
            Self::BorrowerAddress => FieldValue::Text(&loan.borrower_address),
            Self::LoanType => FieldValue::Text(loan.loan_type.as_str()),
            Self::Amount => FieldValue::Number(loan.amount),
            Self::Status => FieldValue::Text(loan.status.as_str()),
            Self::NextDueDate => FieldValue::Text(&loan.next_due_date),
            Self::InterestRate => FieldValue::Number(loan.interest_rate),
            Self::Term => FieldValue::Number(f64::from(loan.term)),
            Self::CreatedDate => FieldValue::Text(&loan.created_date),
            Self::Unsupported(_) => return None,
        };
        Some(value)
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        match value.as_str() {
            "id" => Self::Id,
            "borrowerName" => Self::BorrowerName,
            "borrowerEmail" => Self::BorrowerEmail,
            "borrowerPhone" => Self::BorrowerPhone,
            "borrowerAddress" => Self::BorrowerAddress,
            "loanType" => Self::LoanType,
            "amount" => Self::Amount,
            "status" => Self::Status,
            "nextDueDate" => Self::NextDueDate,
            "interestRate" => Self::InterestRate,
            "term" => Self::Term,
            "createdDate" => Self::CreatedDate,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.name().to_string()
    }
}

/// A comparable field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// String field
    Text(&'a str),
    /// Numeric field
    Number(f64),
}

/// Compares two field values in ascending order.
///
/// Text compares case-folded first, with lowercase ahead of uppercase on
/// ties. Numbers compare numerically. Mixed, missing or NaN values compare
/// equal.
#[must_use]
pub fn compare_values(a: Option<FieldValue<'_>>, b: Option<FieldValue<'_>>) -> Ordering {
    match (a, b) {
        (Some(FieldValue::Text(a)), Some(FieldValue::Text(b))) => locale_compare(a, b),
        (Some(FieldValue::Number(a)), Some(FieldValue::Number(b))) => {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        _ => Ordering::Equal,
    }
}

fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}

/// Query parameters for a loan list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Loan type tab
    #[serde(rename = "type")]
    pub loan_type: TypeFilter,
    /// Free-text search
    pub search: String,
    /// Field to sort by
    pub sort_by: SortKey,
    /// Sort direction
    pub sort_order: SortOrder,
}

/// A partial update to a `FilterSpec`; unset fields are kept.
#[derive(Debug, Clone, Default)]
pub struct FilterChange {
    /// New loan type tab
    pub loan_type: Option<TypeFilter>,
    /// New search text
    pub search: Option<String>,
    /// New sort field
    pub sort_by: Option<SortKey>,
    /// New sort direction
    pub sort_order: Option<SortOrder>,
}

impl FilterSpec {
    /// Returns this filter with the set fields of `change` applied.
    #[must_use]
    pub fn merged(self, change: FilterChange) -> Self {
        Self {
            loan_type: change.loan_type.unwrap_or(self.loan_type),
            search: change.search.unwrap_or(self.search),
            sort_by: change.sort_by.unwrap_or(self.sort_by),
            sort_order: change.sort_order.unwrap_or(self.sort_order),
        }
    }
}

/// Requested pagination window. `current_page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// 1-based page number
    pub current_page: usize,
    /// Page size
    pub items_per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            current_page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Switches to another page size from `options`, going back to page 1.
    pub fn with_page_size(self, size: usize, options: &[usize]) -> Result<Self> {
        if !options.contains(&size) {
            return Err(Error::InvalidPageSize { size });
        }
        Ok(Self {
            current_page: 1,
            items_per_page: size,
        })
    }

    /// Moves to `page`. Out-of-range pages are clamped on the next query.
    #[must_use]
    pub const fn at_page(self, page: usize) -> Self {
        Self {
            current_page: page,
            items_per_page: self.items_per_page,
        }
    }
}

/// Derived pagination state for a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number, always within `1..=total_pages`
    pub current_page: usize,
    /// Number of pages, at least 1
    pub total_pages: usize,
    /// Number of items after filtering
    pub total_items: usize,
    /// Page size
    pub items_per_page: usize,
}

impl PageInfo {
    /// 1-based `(first, last)` item numbers shown on the current page,
    /// `(0, 0)` when there is nothing to show.
    #[must_use]
    pub fn showing_range(&self) -> (usize, usize) {
        if self.total_items == 0 {
            return (0, 0);
        }
        let page = self.current_page.max(1);
        let first = (page - 1) * self.items_per_page + 1;
        let last = (page * self.items_per_page).min(self.total_items);
        (first.min(last), last)
    }
}

/// Aggregate counts by loan type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoanStats {
    /// All loans
    pub total: usize,
    /// Personal loans
    pub personal: usize,
    /// Vehicle loans
    pub vehicle: usize,
    /// Business loans
    pub business: usize,
    /// Medical loans
    pub medical: usize,
}

impl LoanStats {
    /// Count for one loan type.
    #[must_use]
    pub const fn count(&self, loan_type: LoanType) -> usize {
        match loan_type {
            LoanType::Personal => self.personal,
            LoanType::Vehicle => self.vehicle,
            LoanType::Business => self.business,
            LoanType::Medical => self.medical,
        }
    }

    /// Count for a tab, `total` for `All`.
    #[must_use]
    pub const fn count_for(&self, filter: TypeFilter) -> usize {
        match filter {
            TypeFilter::All => self.total,
            TypeFilter::Only(t) => self.count(t),
        }
    }
}

/// Whether stats follow changes to the engine's collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsMode {
    /// Computed once from the collection the engine was created with
    #[default]
    Snapshot,
    /// Recomputed whenever the collection is replaced
    Live,
}

/// One entry of a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// Numbered page
    Page(usize),
    /// Collapsed run of pages
    Ellipsis,
}

/// Output of a query run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Loans on the current page
    pub loans: Vec<LoanRecord>,
    /// Counts over the base collection
    pub stats: LoanStats,
    /// Pagination state after clamping
    pub page: PageInfo,
}

/// Keeps loans of the given type; `All` returns the input unchanged.
#[must_use]
pub fn filter_by_type(loans: Vec<LoanRecord>, filter: TypeFilter) -> Vec<LoanRecord> {
    match filter {
        TypeFilter::All => loans,
        TypeFilter::Only(_) => loans
            .into_iter()
            .filter(|loan| filter.admits(loan.loan_type))
            .collect(),
    }
}

/// Whether `loan` matches an already lowercased search query.
fn matches_search(loan: &LoanRecord, query_lower: &str) -> bool {
    loan.borrower_name.to_lowercase().contains(query_lower)
        || loan.loan_type.as_str().to_lowercase().contains(query_lower)
        || loan.id.to_lowercase().contains(query_lower)
}

/// Keeps loans whose borrower name, loan type or id contains `query`,
/// ignoring case. An empty query keeps everything.
#[must_use]
pub fn filter_by_search(loans: Vec<LoanRecord>, query: &str) -> Vec<LoanRecord> {
    if query.is_empty() {
        return loans;
    }
    let query_lower = query.to_lowercase();
    loans
        .into_iter()
        .filter(|loan| matches_search(loan, &query_lower))
        .collect()
}

/// Stable sort by `key` in `order`. Unsupported keys leave the order as is.
pub fn sort(loans: &mut [LoanRecord], key: &SortKey, order: SortOrder) {
    loans.sort_by(|a, b| order.apply(compare_values(key.value_of(a), key.value_of(b))));
}

/// Returns page `page` (1-based) of `loans`. Pages outside the collection,
/// including page 0, are empty. A page size of 0 is treated as 1.
#[must_use]
pub fn paginate(loans: &[LoanRecord], page: usize, page_size: usize) -> &[LoanRecord] {
    let size = page_size.max(1);
    let Some(start) = page.checked_sub(1).and_then(|p| p.checked_mul(size)) else {
        return &[];
    };
    if start >= loans.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(loans.len());
    &loans[start..end]
}

/// Counts loans in total and per type in one pass.
#[must_use]
pub fn compute_stats(loans: &[LoanRecord]) -> LoanStats {
    loans.iter().fold(LoanStats::default(), |mut stats, loan| {
        stats.total += 1;
        match loan.loan_type {
            LoanType::Personal => stats.personal += 1,
            LoanType::Vehicle => stats.vehicle += 1,
            LoanType::Business => stats.business += 1,
            LoanType::Medical => stats.medical += 1,
        }
        stats
    })
}

/// Derives page count and clamps the current page into `1..=total_pages`.
#[must_use]
pub fn recompute_page_info(
    total_items: usize,
    items_per_page: usize,
    current_page: usize,
) -> PageInfo {
    let size = items_per_page.max(1);
    let total_pages = total_items.div_ceil(size).max(1);
    PageInfo {
        current_page: current_page.clamp(1, total_pages),
        total_pages,
        total_items,
        items_per_page: size,
    }
}

/// Page links for a pagination control, at most five numbers plus ellipses.
#[must_use]
pub fn visible_pages(info: &PageInfo) -> Vec<PageLink> {
    let total = info.total_pages;
    let current = info.current_page;
    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(PageLink::Page).collect();
    }
    let mut links = Vec::with_capacity(MAX_VISIBLE_PAGES + 2);
    if current <= 3 {
        links.extend((1..=4).map(PageLink::Page));
        links.push(PageLink::Ellipsis);
        links.push(PageLink::Page(total));
    } else if current >= total - 2 {
        links.push(PageLink::Page(1));
        links.push(PageLink::Ellipsis);
        links.extend((total - 3..=total).map(PageLink::Page));
    } else {
        links.push(PageLink::Page(1));
        links.push(PageLink::Ellipsis);
        links.extend((current - 1..=current + 1).map(PageLink::Page));
        links.push(PageLink::Ellipsis);
        links.push(PageLink::Page(total));
    }
    links
}

/// Query engine over one base collection of loans.
#[derive(Debug, Clone)]
pub struct LoanQueryEngine {
    loans: Vec<LoanRecord>,
    stats: LoanStats,
    mode: StatsMode,
}

impl LoanQueryEngine {
    /// Creates an engine and computes the initial stats.
    #[must_use]
    pub fn new(loans: Vec<LoanRecord>, mode: StatsMode) -> Self {
        let stats = compute_stats(&loans);
        Self { loans, stats, mode }
    }

    /// Replaces the base collection. Stats follow only in `Live` mode.
    pub fn replace_loans(&mut self, loans: Vec<LoanRecord>) {
        if self.mode == StatsMode::Live {
            self.stats = compute_stats(&loans);
        }
        debug!(
            "Loan collection replaced with {} records ({:?} stats)",
            loans.len(),
            self.mode
        );
        self.loans = loans;
    }

    /// The base collection.
    #[must_use]
    pub fn loans(&self) -> &[LoanRecord] {
        &self.loans
    }

    /// Current tab counts.
    #[must_use]
    pub const fn stats(&self) -> LoanStats {
        self.stats
    }

    /// The configured stats mode.
    #[must_use]
    pub const fn mode(&self) -> StatsMode {
        self.mode
    }

    /// All loans matching `filter`, sorted, before pagination.
    #[must_use]
    pub fn matching(&self, filter: &FilterSpec) -> Vec<LoanRecord> {
        let typed = filter_by_type(self.loans.clone(), filter.loan_type);
        let mut found = filter_by_search(typed, &filter.search);
        sort(&mut found, &filter.sort_by, filter.sort_order);
        found
    }

    /// Runs the full pipeline for one filter and page request.
    #[must_use]
    pub fn run(&self, filter: &FilterSpec, page: PageRequest) -> QueryResult {
        let found = self.matching(filter);
        let info = recompute_page_info(found.len(), page.items_per_page, page.current_page);
        let visible = paginate(&found, info.current_page, info.items_per_page).to_vec();
        QueryResult {
            loans: visible,
            stats: self.stats,
            page: info,
        }
    }
}

/// Filter and page state of one list view.
///
/// Changing the filter or the page size returns to page 1; the current page
/// is clamped whenever a query reports a new page count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListState {
    /// Active filter
    pub filter: FilterSpec,
    /// Active page request
    pub page: PageRequest,
}

impl ListState {
    /// Applies a partial filter change and resets to page 1.
    pub fn change_filter(&mut self, change: FilterChange) {
        self.filter = std::mem::take(&mut self.filter).merged(change);
        self.page = self.page.at_page(1);
    }

    /// Clicking a sorted column header flips the direction, another column
    /// sorts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        let order = if self.filter.sort_by == key {
            self.filter.sort_order.flipped()
        } else {
            SortOrder::Asc
        };
        self.change_filter(FilterChange {
            sort_by: Some(key),
            sort_order: Some(order),
            ..FilterChange::default()
        });
    }

    /// Changes the page size, resetting to page 1.
    pub fn change_page_size(&mut self, size: usize, options: &[usize]) -> Result<()> {
        self.page = self.page.with_page_size(size, options)?;
        Ok(())
    }

    /// Moves to another page.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = self.page.at_page(page);
    }

    /// Runs the engine and adopts the clamped page.
    pub fn refresh(&mut self, engine: &LoanQueryEngine) -> QueryResult {
        let result = engine.run(&self.filter, self.page);
        self.page = self.page.at_page(result.page.current_page);
        result
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::loan::LoanStatus;
    use crate::test_utils::{make_loan, sample_loans};

    fn ids(loans: &[LoanRecord]) -> Vec<&str> {
        loans.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_filter_by_type_all_is_identity() {
        let loans = sample_loans();
        let filtered = filter_by_type(loans.clone(), TypeFilter::All);
        assert_eq!(filtered, loans);
    }

    #[test]
    fn test_filter_by_type_matches_stats() {
        let loans = sample_loans();
        let stats = compute_stats(&loans);
        for loan_type in LoanType::ALL {
            let filtered = filter_by_type(loans.clone(), TypeFilter::Only(loan_type));
            assert!(filtered.iter().all(|l| l.loan_type == loan_type));
            assert_eq!(filtered.len(), stats.count(loan_type));
        }
    }

    #[test]
    fn test_filter_by_type_preserves_order() {
        let filtered = filter_by_type(sample_loans(), TypeFilter::Only(LoanType::Vehicle));
        assert_eq!(ids(&filtered), vec!["LN002", "LN006"]);
    }

    #[test]
    fn test_filter_by_search_empty_is_identity() {
        let loans = sample_loans();
        assert_eq!(filter_by_search(loans.clone(), ""), loans);
    }

    #[test]
    fn test_filter_by_search_is_sound_and_complete() {
        let loans = sample_loans();
        for query in ["raj", "VEHICLE", "ln00", "a", "zzz", "Iyer"] {
            let found = filter_by_search(loans.clone(), query);
            let lower = query.to_lowercase();
            for loan in &loans {
                let hit = loan.borrower_name.to_lowercase().contains(&lower)
                    || loan.loan_type.as_str().to_lowercase().contains(&lower)
                    || loan.id.to_lowercase().contains(&lower);
                assert_eq!(found.contains(loan), hit, "query {query} loan {}", loan.id);
            }
        }
    }

    #[test]
    fn test_search_does_not_look_at_email() {
        let found = filter_by_search(sample_loans(), "email.com");
        assert!(found.is_empty());
    }

    #[test]
    fn test_sort_by_amount_both_directions() {
        let mut loans = sample_loans();
        sort(&mut loans, &SortKey::Amount, SortOrder::Asc);
        let amounts: Vec<f64> = loans.iter().map(|l| l.amount).collect();
        assert_eq!(amounts[0], 300_000.0);
        assert_eq!(amounts[7], 2_000_000.0);

        let ascending = ids(&loans).iter().map(ToString::to_string).collect::<Vec<_>>();
        sort(&mut loans, &SortKey::Amount, SortOrder::Desc);
        let mut descending = ids(&loans).iter().map(ToString::to_string).collect::<Vec<_>>();
        descending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut once = sample_loans();
        sort(&mut once, &SortKey::BorrowerName, SortOrder::Asc);
        let mut twice = once.clone();
        sort(&mut twice, &SortKey::BorrowerName, SortOrder::Asc);
        assert_eq!(once, twice);
        assert_eq!(once[0].borrower_name, "Amit Patel");
    }

    #[test]
    fn test_sort_by_created_date_desc_is_default() {
        let mut loans = sample_loans();
        let spec = FilterSpec::default();
        sort(&mut loans, &spec.sort_by, spec.sort_order);
        assert_eq!(loans[0].id, "LN007");
        assert_eq!(loans[7].id, "LN005");
    }

    #[test]
    fn test_sort_by_unsupported_key_keeps_order() {
        let mut loans = sample_loans();
        sort(&mut loans, &SortKey::from("collateral"), SortOrder::Asc);
        assert_eq!(loans, sample_loans());
    }

    #[test]
    fn test_text_comparison_folds_case() {
        assert_eq!(
            compare_values(Some(FieldValue::Text("apple")), Some(FieldValue::Text("Banana"))),
            Ordering::Less
        );
        assert_eq!(
            compare_values(Some(FieldValue::Text("a")), Some(FieldValue::Text("A"))),
            Ordering::Less
        );
    }

    #[test]
    fn test_mixed_values_compare_equal() {
        assert_eq!(
            compare_values(Some(FieldValue::Text("1")), Some(FieldValue::Number(2.0))),
            Ordering::Equal
        );
        assert_eq!(
            compare_values(Some(FieldValue::Number(f64::NAN)), Some(FieldValue::Number(1.0))),
            Ordering::Equal
        );
        assert_eq!(compare_values(None, None), Ordering::Equal);
    }

    #[test]
    fn test_sort_key_round_trips_names() {
        assert_eq!(SortKey::from("interestRate"), SortKey::InterestRate);
        assert_eq!(SortKey::from("bogus").name(), "bogus");
    }

    #[test]
    fn test_paginate_bounds() {
        let loans = sample_loans();
        assert_eq!(paginate(&loans, 1, 3).len(), 3);
        assert_eq!(paginate(&loans, 3, 3).len(), 2);
        assert!(paginate(&loans, 4, 3).is_empty());
        assert!(paginate(&loans, 0, 3).is_empty());
        assert!(paginate(&[], 1, 25).is_empty());
        assert_eq!(paginate(&loans, 2, 0).len(), 1);
    }

    #[test]
    fn test_pages_concatenate_to_whole() {
        let loans = sample_loans();
        for size in [1, 3, 5, 8, 10] {
            let info = recompute_page_info(loans.len(), size, 1);
            let rebuilt: Vec<LoanRecord> = (1..=info.total_pages)
                .flat_map(|p| paginate(&loans, p, size).to_vec())
                .collect();
            assert_eq!(rebuilt, loans);
            assert!((1..=info.total_pages).all(|p| paginate(&loans, p, size).len() <= size));
        }
    }

    #[test]
    fn test_page_info_has_at_least_one_page() {
        let info = recompute_page_info(0, 25, 4);
        assert_eq!(info.total_pages, 1);
        assert_eq!(info.current_page, 1);
        assert_eq!(info.showing_range(), (0, 0));
    }

    #[test]
    fn test_page_info_clamps_current_page() {
        let info = recompute_page_info(30, 10, 7);
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.current_page, 3);
        assert_eq!(info.showing_range(), (21, 30));
        assert_eq!(recompute_page_info(30, 10, 0).current_page, 1);
    }

    #[test]
    fn test_showing_range_of_hand_built_page_zero() {
        let info = PageInfo {
            current_page: 0,
            total_pages: 3,
            total_items: 30,
            items_per_page: 10,
        };
        assert_eq!(info.showing_range(), (1, 10));
    }

    #[test]
    fn test_stats_scenario() {
        let stats = compute_stats(&sample_loans());
        assert_eq!(
            stats,
            LoanStats {
                total: 8,
                personal: 2,
                vehicle: 2,
                business: 2,
                medical: 2,
            }
        );
    }

    #[test]
    fn test_stats_scenario_three_personal_one_medical() {
        let mut loans = sample_loans();
        loans[3].loan_type = LoanType::Personal;
        let stats = compute_stats(&loans);
        assert_eq!(stats.total, 8);
        assert_eq!(stats.personal, 3);
        assert_eq!(stats.vehicle, 2);
        assert_eq!(stats.business, 2);
        assert_eq!(stats.medical, 1);
    }

    #[test]
    fn test_personal_raj_scenario() {
        let engine = LoanQueryEngine::new(sample_loans(), StatsMode::Snapshot);
        let filter = FilterSpec {
            loan_type: TypeFilter::Only(LoanType::Personal),
            search: "Raj".to_string(),
            ..FilterSpec::default()
        };
        let result = engine.run(&filter, PageRequest::default());
        assert_eq!(result.loans.len(), 1);
        assert_eq!(result.loans[0].borrower_name, "Rajesh Kumar");
        assert_eq!(result.page.total_pages, 1);
        assert_eq!(result.page.total_items, 1);
        assert_eq!(result.stats.total, 8);
    }

    #[test]
    fn test_stats_ignore_active_filters() {
        let engine = LoanQueryEngine::new(sample_loans(), StatsMode::Snapshot);
        let filter = FilterSpec {
            loan_type: TypeFilter::Only(LoanType::Medical),
            search: "nobody".to_string(),
            ..FilterSpec::default()
        };
        let result = engine.run(&filter, PageRequest::default());
        assert!(result.loans.is_empty());
        assert_eq!(result.page.total_pages, 1);
        assert_eq!(result.stats, compute_stats(&sample_loans()));
    }

    #[test]
    fn test_snapshot_stats_survive_replacement() {
        let mut engine = LoanQueryEngine::new(sample_loans(), StatsMode::Snapshot);
        let mut more = sample_loans();
        more.push(make_loan("LN009", "New Borrower", LoanType::Business, LoanStatus::Initiated));
        engine.replace_loans(more);
        assert_eq!(engine.stats().total, 8);
        assert_eq!(engine.loans().len(), 9);
    }

    #[test]
    fn test_live_stats_follow_replacement() {
        let mut engine = LoanQueryEngine::new(sample_loans(), StatsMode::Live);
        let mut more = sample_loans();
        more.push(make_loan("LN009", "New Borrower", LoanType::Business, LoanStatus::Initiated));
        engine.replace_loans(more);
        assert_eq!(engine.stats().total, 9);
        assert_eq!(engine.stats().business, 3);
    }

    #[test]
    fn test_run_clamps_page_after_narrowing() {
        let engine = LoanQueryEngine::new(sample_loans(), StatsMode::Snapshot);
        let filter = FilterSpec {
            loan_type: TypeFilter::Only(LoanType::Vehicle),
            ..FilterSpec::default()
        };
        let page = PageRequest {
            current_page: 3,
            items_per_page: 10,
        };
        let result = engine.run(&filter, page);
        assert_eq!(result.page.current_page, 1);
        assert_eq!(result.loans.len(), 2);
    }

    #[test]
    fn test_list_state_filter_change_resets_page() {
        let engine = LoanQueryEngine::new(sample_loans(), StatsMode::Snapshot);
        let mut state = ListState::default();
        state.change_page_size(10, &DEFAULT_PAGE_SIZE_OPTIONS).unwrap();
        state.go_to_page(5);
        let result = state.refresh(&engine);
        assert_eq!(result.page.current_page, 1);

        state.go_to_page(2);
        state.change_filter(FilterChange {
            search: Some("kumar".to_string()),
            ..FilterChange::default()
        });
        assert_eq!(state.page.current_page, 1);
        assert_eq!(state.filter.search, "kumar");
        assert_eq!(state.filter.sort_by, SortKey::CreatedDate);
    }

    #[test]
    fn test_list_state_toggle_sort() {
        let mut state = ListState::default();
        state.toggle_sort(SortKey::Amount);
        assert_eq!(state.filter.sort_order, SortOrder::Asc);
        state.toggle_sort(SortKey::Amount);
        assert_eq!(state.filter.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_page_size_must_be_an_option() {
        let err = PageRequest::default()
            .with_page_size(30, &DEFAULT_PAGE_SIZE_OPTIONS)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPageSize { size: 30 }));
    }

    #[test]
    fn test_visible_pages_layouts() {
        use PageLink::{Ellipsis, Page};
        let info = |current, total| PageInfo {
            current_page: current,
            total_pages: total,
            total_items: total * 10,
            items_per_page: 10,
        };
        assert_eq!(visible_pages(&info(1, 3)), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(
            visible_pages(&info(2, 10)),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)]
        );
        assert_eq!(
            visible_pages(&info(9, 10)),
            vec![Page(1), Ellipsis, Page(7), Page(8), Page(9), Page(10)]
        );
        assert_eq!(
            visible_pages(&info(5, 10)),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_filter_spec_json_shape() {
        let spec: FilterSpec = serde_json::from_str(
            r#"{"type":"Personal","search":"raj","sortBy":"amount","sortOrder":"asc"}"#,
        )
        .unwrap();
        assert_eq!(spec.loan_type, TypeFilter::Only(LoanType::Personal));
        assert_eq!(spec.sort_by, SortKey::Amount);
        assert_eq!(spec.sort_order, SortOrder::Asc);
    }
}
