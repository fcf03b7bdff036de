use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vaultpilot",
    about = "Trigger-gated automation for leveraged lending positions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a simulated lending position
    OpenPosition {
        owner: String,
        collateral_token: String,
        collateral_amount: u128,
        debt_token: String,
        debt_amount: u128,
    },
    /// Show one position and its current collateralization ratio
    Position {
        id: u64,
    },
    /// List positions
    Positions,
    /// Set an account's token balance
    SetBalance {
        account: String,
        token: String,
        amount: u128,
    },
    /// Show an account's token balance
    Balance {
        account: String,
        token: String,
    },
    /// Store a USD quote for a token
    SetPrice {
        token: String,
        usd: f64,
    },
    /// Pull quotes from the configured oracle into the stored price table
    SyncPrices {
        tokens: Vec<String>,
    },
    /// Allowlist an automation agent
    AllowAgent {
        address: String,
    },
    /// Remove an agent from the allowlist
    RevokeAgent {
        address: String,
    },
    /// Register a strategy template
    RegisterTemplate {
        /// JSON with name, trigger_kinds, action_kinds, param_mapping
        json: String,
    },
    /// List registered templates
    Templates,
    /// Subscribe an owner to a template
    Subscribe {
        owner: String,
        template_id: String,
        /// JSON with combine, action_consts, triggers
        json: String,
    },
    /// List subscriptions
    Subscriptions {
        #[arg(long)]
        owner: Option<String>,
    },
    /// Replace an active subscription's parameters (owner only)
    UpdateSubscription {
        caller: String,
        id: String,
        /// JSON with action_consts, triggers
        json: String,
    },
    /// Deactivate a subscription (owner only, terminal)
    Deactivate {
        caller: String,
        id: String,
    },
    /// Evaluate a subscription's triggers without executing
    Poll {
        id: String,
        /// JSON array of trigger payloads (defaults to empty payloads)
        #[arg(long)]
        payloads: Option<String>,
    },
    /// Execute a strategy as an allowlisted agent
    Execute {
        caller: String,
        id: String,
        /// JSON with trigger_payloads, action_args
        json: String,
    },
    /// Run a standalone recipe atomically under an owner
    RunRecipe {
        owner: String,
        /// JSON with name, actions
        json: String,
    },
    /// Create a fallback bundle over existing subscriptions
    CreateBundle {
        /// JSON array of subscription ids, fallback order
        json: String,
    },
    /// List bundles
    Bundles,
    /// Run a bundle with first-success-wins fallback
    RunBundle {
        caller: String,
        id: String,
        /// JSON array of attempts, one per bundle entry
        json: String,
    },
}
