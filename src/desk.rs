//! Wiring of configuration, storage, query engine and assistant.
//!
//! `LoanDesk` is the caller the UI talks to: it owns the storage backend,
//! injects it wherever loans are read or written, and keeps the query engine
//! in step with what is stored.

use crate::{
    assistant::transcript::ChatSession,
    config::{AppConfig, database, load_default_config},
    core::{
        application::{DocumentSet, LoanApplication, OtpVerification, submit},
        loan::LoanRecord,
        query::{ListState, LoanQueryEngine, QueryResult},
        store::{DatabaseKeyValueStore, load_all_loans, seed_if_missing},
    },
    errors::Result,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing::info;

/// The loan desk core for one process.
#[derive(Debug)]
pub struct LoanDesk {
    config: AppConfig,
    storage: DatabaseKeyValueStore,
    engine: LoanQueryEngine,
}

impl LoanDesk {
    /// Connects to `DATABASE_URL` and opens the desk.
    pub async fn open(config: AppConfig) -> Result<Self> {
        let db = database::create_connection().await?;
        Self::with_connection(config, db).await
    }

    /// Opens the desk over an existing connection: creates tables, seeds
    /// empty storage keys and loads every loan.
    pub async fn with_connection(config: AppConfig, db: DatabaseConnection) -> Result<Self> {
        database::create_tables(&db).await?;
        let storage = DatabaseKeyValueStore::new(db);
        if !config.seed_loans.is_empty() {
            seed_if_missing(&storage, &config.seed_loans).await?;
        }
        let loans = load_all_loans(&storage).await?;
        info!("Loan desk opened with {} loans", loans.len());
        let engine = LoanQueryEngine::new(loans, config.query.stats_mode);
        Ok(Self {
            config,
            storage,
            engine,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Storage backend.
    #[must_use]
    pub const fn storage(&self) -> &DatabaseKeyValueStore {
        &self.storage
    }

    /// Query engine over the loaded loans.
    #[must_use]
    pub const fn engine(&self) -> &LoanQueryEngine {
        &self.engine
    }

    /// Re-reads every loan from storage into the engine.
    pub async fn reload(&mut self) -> Result<()> {
        let loans = load_all_loans(&self.storage).await?;
        self.engine.replace_loans(loans);
        Ok(())
    }

    /// List state a new view starts from.
    #[must_use]
    pub fn new_list_state(&self) -> ListState {
        self.config.query.initial_list_state()
    }

    /// Runs the query for a view, clamping its page.
    pub fn query(&self, state: &mut ListState) -> QueryResult {
        state.refresh(&self.engine)
    }

    /// Changes a view's page size within the configured options.
    pub fn change_page_size(&self, state: &mut ListState, size: usize) -> Result<()> {
        state.change_page_size(size, &self.config.query.page_size_options)
    }

    /// Submits an application and reloads the engine.
    pub async fn submit_application(
        &mut self,
        application: &LoanApplication,
        otp: &OtpVerification,
        documents: &DocumentSet,
    ) -> Result<LoanRecord> {
        let record = submit(&self.storage, application, otp, documents, Utc::now()).await?;
        self.reload().await?;
        Ok(record)
    }

    /// Starts an assistant conversation using the configured rules and delay.
    pub fn chat_session(&self) -> Result<ChatSession> {
        let responder = self.config.assistant.build_responder()?;
        Ok(ChatSession::with_delay(
            responder,
            self.config.assistant.reply_delay(),
        ))
    }
}

/// Loads `.env` and `config.toml`, then opens the desk.
pub async fn bootstrap() -> Result<LoanDesk> {
    dotenvy::dotenv().ok();
    let config = load_default_config()?;
    LoanDesk::open(config).await
}
