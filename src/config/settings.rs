//! Application settings loading from config.toml
//!
//! Every section is optional; missing values fall back to the behaviour of
//! the stock dashboard (25 loans per page, snapshot stats, newest first,
//! 800 ms assistant delay, no seed data).

use crate::{
    assistant::responder::{Responder, RuleSpec},
    core::{
        loan::LoanRecord,
        query::{
            DEFAULT_ITEMS_PER_PAGE, DEFAULT_PAGE_SIZE_OPTIONS, FilterSpec, ListState,
            PageRequest, SortKey, SortOrder, StatsMode,
        },
    },
    errors::{Error, Result},
};
use serde::Deserialize;
use std::{path::Path, time::Duration};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Loan list settings
    #[serde(default)]
    pub query: QuerySettings,
    /// Assistant settings
    #[serde(default)]
    pub assistant: AssistantSettings,
    /// Loans written to empty storage keys on startup
    #[serde(default)]
    pub seed_loans: Vec<LoanRecord>,
}

/// Loan list settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Page size of a fresh list
    pub default_items_per_page: usize,
    /// Page sizes a user may pick
    pub page_size_options: Vec<usize>,
    /// Whether tab counts follow store changes
    pub stats_mode: StatsMode,
    /// Initial sort field
    pub default_sort_by: SortKey,
    /// Initial sort direction
    pub default_sort_order: SortOrder,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_items_per_page: DEFAULT_ITEMS_PER_PAGE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            stats_mode: StatsMode::default(),
            default_sort_by: SortKey::default(),
            default_sort_order: SortOrder::default(),
        }
    }
}

impl QuerySettings {
    /// List state a new view starts from.
    #[must_use]
    pub fn initial_list_state(&self) -> ListState {
        ListState {
            filter: FilterSpec {
                sort_by: self.default_sort_by.clone(),
                sort_order: self.default_sort_order,
                ..FilterSpec::default()
            },
            page: PageRequest {
                current_page: 1,
                items_per_page: self.default_items_per_page,
            },
        }
    }
}

/// Assistant settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Simulated typing delay in milliseconds
    pub reply_delay_ms: u64,
    /// Extra rules evaluated before the built-in ones
    pub rules: Vec<RuleSpec>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            reply_delay_ms: 800,
            rules: Vec::new(),
        }
    }
}

impl AssistantSettings {
    /// Typing delay as a `Duration`.
    #[must_use]
    pub const fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Compiles the responder with the configured extra rules.
    pub fn build_responder(&self) -> Result<Responder> {
        Responder::with_extra_rules(&self.rules)
    }
}

impl AppConfig {
    /// Checks values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        let options = &self.query.page_size_options;
        if options.is_empty() || options.contains(&0) {
            return Err(Error::Config {
                message: "page_size_options must be non-empty and positive".to_string(),
            });
        }
        if !options.contains(&self.query.default_items_per_page) {
            return Err(Error::Config {
                message: format!(
                    "default_items_per_page {} is not one of page_size_options {options:?}",
                    self.query.default_items_per_page
                ),
            });
        }
        Ok(())
    }
}

/// Parses and validates configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The page size settings are inconsistent
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::loan::{LoanStatus, LoanType};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.query.default_items_per_page, 25);
        assert_eq!(config.query.page_size_options, vec![10, 25, 50, 100]);
        assert_eq!(config.query.stats_mode, StatsMode::Snapshot);
        assert_eq!(config.assistant.reply_delay(), Duration::from_millis(800));
        assert!(config.seed_loans.is_empty());

        let state = config.query.initial_list_state();
        assert_eq!(state.filter.sort_by, SortKey::CreatedDate);
        assert_eq!(state.filter.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [query]
            default_items_per_page = 10
            page_size_options = [10, 20]
            stats_mode = "live"
            default_sort_by = "amount"
            default_sort_order = "asc"

            [assistant]
            reply_delay_ms = 0

            [[assistant.rules]]
            pattern = "branch"
            reply = "Our branches are open 9 to 5."

            [[seed_loans]]
            id = "LN001"
            borrowerName = "Rajesh Kumar"
            borrowerEmail = "rajesh.kumar@email.com"
            borrowerPhone = "+91 98765 43210"
            borrowerAddress = "123 MG Road, Bangalore"
            loanType = "Personal"
            amount = 500000.0
            status = "Started"
            nextDueDate = "2024-02-15"
            interestRate = 12.5
            term = 36
            createdDate = "2024-01-10"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.query.stats_mode, StatsMode::Live);
        assert_eq!(config.query.default_sort_by, SortKey::Amount);
        assert_eq!(config.assistant.rules.len(), 1);
        assert_eq!(config.seed_loans.len(), 1);
        assert_eq!(config.seed_loans[0].loan_type, LoanType::Personal);
        assert_eq!(config.seed_loans[0].status, LoanStatus::Started);

        let responder = config.assistant.build_responder().unwrap();
        assert_eq!(
            responder.respond("Which branch?"),
            "Our branches are open 9 to 5."
        );
    }

    #[test]
    fn test_default_page_size_must_be_an_option() {
        let toml_str = r"
            [query]
            default_items_per_page = 30
        ";
        assert!(matches!(parse_config(toml_str), Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
