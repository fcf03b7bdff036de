pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::execute_strategy::StrategyExecutor;
use crate::application::recipe_engine::RecipeEngine;
use crate::application::register_template::RegisterTemplateUseCase;
use crate::application::run_bundle::{BundleOutcome, BundleUseCase, StrategyAttempt};
use crate::application::subscribe::SubscriptionUseCase;
use crate::application::trigger_eval::TriggerEvaluator;
use crate::domain::entities::bundle::Bundle;
use crate::domain::entities::position::Position;
use crate::domain::entities::recipe::Recipe;
use crate::domain::entities::strategy_template::StrategyTemplate;
use crate::domain::entities::subscription::Subscription;
use crate::domain::error::DomainError;
use crate::domain::ports::agent_registry::AgentRegistry;
use crate::domain::ports::bundle_store::BundleStore;
use crate::domain::ports::chain_state::ChainState;
use crate::domain::ports::live_state::{LiveStateReader, RatioSnapshot};
use crate::domain::ports::price_oracle::PriceOracle;
use crate::domain::ports::subscription_store::SubscriptionStore;
use crate::domain::ports::template_store::TemplateStore;
use crate::domain::values::action_kind::ActionKind;
use crate::domain::values::address::Address;
use crate::domain::values::combine_mode::CombineMode;
use crate::domain::values::param_source::ParamSource;
use crate::domain::values::trigger::{TriggerConfig, TriggerKind, TriggerPayload};
use crate::domain::values::value::Value;
use crate::infrastructure::oracles::fixed::FixedPriceOracle;
use crate::infrastructure::oracles::http::HttpPriceOracle;
use crate::infrastructure::sqlite::agent_registry::SqliteAgentRegistry;
use crate::infrastructure::sqlite::bundle_store::SqliteBundleStore;
use crate::infrastructure::sqlite::market::SqliteMarket;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::subscription_store::SqliteSubscriptionStore;
use crate::infrastructure::sqlite::template_store::SqliteTemplateStore;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub struct VaultPilot {
    market: Arc<SqliteMarket>,
    agents: Arc<dyn AgentRegistry>,
    templates_uc: RegisterTemplateUseCase,
    subscriptions_uc: SubscriptionUseCase,
    executor: Arc<StrategyExecutor>,
    bundles_uc: BundleUseCase,
    engine: RecipeEngine,
}

impl VaultPilot {
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let provider = std::env::var("VAULTPILOT_ORACLE").unwrap_or_else(|_| "fixed".into());

        let oracle: Arc<dyn PriceOracle> = match provider.as_str() {
            "http" => {
                let url = std::env::var("VAULTPILOT_PRICE_URL")
                    .map_err(|_| DomainError::NotFound("VAULTPILOT_PRICE_URL is not set".into()))?;
                Arc::new(HttpPriceOracle::new(url))
            }
            _ => Arc::new(FixedPriceOracle::default()),
        };

        Self::with_providers(db_path, oracle)
    }

    pub fn with_providers(
        db_path: &str,
        oracle: Arc<dyn PriceOracle>,
    ) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Storage(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Storage(format!("WAL error: {e}")))?;
        run_migrations(&conn)?;

        // One connection shared by every store and the market ledger, so a
        // recipe savepoint covers all simulated chain state at once.
        let conn = Arc::new(Mutex::new(conn));

        let market = Arc::new(SqliteMarket::new(conn.clone(), oracle));
        let adapters = Arc::new(infrastructure::adapters::registry(market.clone()));
        let templates: Arc<dyn TemplateStore> = Arc::new(SqliteTemplateStore::new(conn.clone()));
        let subscriptions: Arc<dyn SubscriptionStore> =
            Arc::new(SqliteSubscriptionStore::new(conn.clone()));
        let bundles: Arc<dyn BundleStore> = Arc::new(SqliteBundleStore::new(conn.clone()));
        let agents: Arc<dyn AgentRegistry> = Arc::new(SqliteAgentRegistry::new(conn));

        let engine = RecipeEngine::new(adapters.clone(), market.clone() as Arc<dyn ChainState>);
        let evaluator = TriggerEvaluator::new(market.clone() as Arc<dyn LiveStateReader>);
        let executor = Arc::new(StrategyExecutor::new(
            agents.clone(),
            subscriptions.clone(),
            templates.clone(),
            evaluator,
            engine.clone(),
        ));

        Ok(Self {
            market,
            agents,
            templates_uc: RegisterTemplateUseCase::new(templates.clone(), adapters),
            subscriptions_uc: SubscriptionUseCase::new(templates, subscriptions.clone()),
            executor: executor.clone(),
            bundles_uc: BundleUseCase::new(bundles, subscriptions, executor),
            engine,
        })
    }

    // ── templates ─────────────────────────────────────────────────────────

    pub fn register_template(
        &self,
        name: String,
        trigger_kinds: Vec<TriggerKind>,
        action_kinds: Vec<ActionKind>,
        param_mapping: Vec<Vec<ParamSource>>,
    ) -> Result<StrategyTemplate, DomainError> {
        self.templates_uc
            .execute(name, trigger_kinds, action_kinds, param_mapping)
    }

    pub fn template(&self, id: &str) -> Result<StrategyTemplate, DomainError> {
        self.templates_uc.get(id)
    }

    pub fn templates(&self) -> Result<Vec<StrategyTemplate>, DomainError> {
        self.templates_uc.list()
    }

    // ── subscriptions ─────────────────────────────────────────────────────

    pub fn subscribe(
        &self,
        owner: Address,
        template_id: &str,
        combine: CombineMode,
        action_consts: Vec<Vec<Value>>,
        triggers: Vec<TriggerConfig>,
    ) -> Result<Subscription, DomainError> {
        self.subscriptions_uc
            .subscribe(owner, template_id, combine, action_consts, triggers)
    }

    pub fn update_subscription(
        &self,
        caller: &Address,
        id: &str,
        action_consts: Vec<Vec<Value>>,
        triggers: Vec<TriggerConfig>,
    ) -> Result<Subscription, DomainError> {
        self.subscriptions_uc
            .update(caller, id, action_consts, triggers)
    }

    pub fn deactivate(&self, caller: &Address, id: &str) -> Result<(), DomainError> {
        self.subscriptions_uc.deactivate(caller, id)
    }

    pub fn subscription(&self, id: &str) -> Result<Subscription, DomainError> {
        self.subscriptions_uc.get(id)
    }

    pub fn subscriptions(&self, owner: Option<&Address>) -> Result<Vec<Subscription>, DomainError> {
        self.subscriptions_uc.list(owner)
    }

    // ── agents ────────────────────────────────────────────────────────────

    pub fn allow_agent(&self, agent: &Address) -> Result<(), DomainError> {
        self.agents.authorize(agent)
    }

    pub fn revoke_agent(&self, agent: &Address) -> Result<(), DomainError> {
        self.agents.revoke(agent)
    }

    // ── execution ─────────────────────────────────────────────────────────

    pub async fn poll(
        &self,
        subscription_id: &str,
        trigger_payloads: &[TriggerPayload],
    ) -> Result<bool, DomainError> {
        self.executor.poll(subscription_id, trigger_payloads).await
    }

    pub async fn execute_strategy(
        &self,
        caller: &Address,
        subscription_id: &str,
        trigger_payloads: &[TriggerPayload],
        action_args: &[Vec<Value>],
    ) -> Result<Vec<Value>, DomainError> {
        self.executor
            .execute(caller, subscription_id, trigger_payloads, action_args)
            .await
    }

    /// Runs a standalone recipe outside any subscription, still atomically.
    pub fn execute_recipe(&self, owner: &Address, recipe: &Recipe) -> Result<Vec<Value>, DomainError> {
        self.engine.execute(recipe, owner)
    }

    // ── bundles ───────────────────────────────────────────────────────────

    pub fn create_bundle(&self, entries: Vec<String>) -> Result<Bundle, DomainError> {
        self.bundles_uc.create(entries)
    }

    pub fn bundle(&self, id: &str) -> Result<Bundle, DomainError> {
        self.bundles_uc.get(id)
    }

    pub fn bundles(&self) -> Result<Vec<Bundle>, DomainError> {
        self.bundles_uc.list()
    }

    pub async fn run_bundle(
        &self,
        caller: &Address,
        bundle_id: &str,
        attempts: &[StrategyAttempt],
    ) -> Result<BundleOutcome, DomainError> {
        self.bundles_uc.run(caller, bundle_id, attempts).await
    }

    // ── simulated market ──────────────────────────────────────────────────

    pub fn open_position(
        &self,
        owner: &Address,
        collateral_token: &str,
        collateral_amount: u128,
        debt_token: &str,
        debt_amount: u128,
    ) -> Result<Position, DomainError> {
        self.market.open_position(
            owner,
            collateral_token,
            collateral_amount,
            debt_token,
            debt_amount,
        )
    }

    pub fn position(&self, id: u64) -> Result<Position, DomainError> {
        self.market.position(id)
    }

    pub fn positions(&self) -> Result<Vec<Position>, DomainError> {
        self.market.positions()
    }

    pub fn set_balance(
        &self,
        account: &Address,
        token: &str,
        amount: u128,
    ) -> Result<(), DomainError> {
        self.market.set_balance(account, token, amount)
    }

    pub fn balance(&self, account: &Address, token: &str) -> Result<u128, DomainError> {
        self.market.balance(account, token)
    }

    pub fn set_price(&self, token: &str, usd: f64) -> Result<(), DomainError> {
        self.market.set_price(token, usd)
    }

    pub fn spot_price(&self, token: &str) -> Result<f64, DomainError> {
        self.market.spot_price(token)
    }

    pub async fn sync_prices(&self, tokens: &[String]) -> Result<(), DomainError> {
        self.market.sync_prices(tokens).await
    }

    pub fn outstanding_flash(&self, token: &str) -> Result<u128, DomainError> {
        self.market.outstanding_flash(token)
    }

    pub async fn ratio(&self, position: u64) -> Result<RatioSnapshot, DomainError> {
        self.market.read_ratio(position).await
    }
}
