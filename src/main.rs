use clap::Parser;
use serde::Deserialize;
use vaultpilot::application::run_bundle::StrategyAttempt;
use vaultpilot::cli::commands::{Cli, Commands};
use vaultpilot::domain::entities::recipe::Recipe;
use vaultpilot::domain::values::action_kind::ActionKind;
use vaultpilot::domain::values::address::Address;
use vaultpilot::domain::values::combine_mode::CombineMode;
use vaultpilot::domain::values::param_source::ParamSource;
use vaultpilot::domain::values::trigger::{TriggerConfig, TriggerKind, TriggerPayload};
use vaultpilot::domain::values::value::Value;
use vaultpilot::VaultPilot;

#[derive(Deserialize)]
struct TemplateSpec {
    name: String,
    trigger_kinds: Vec<TriggerKind>,
    action_kinds: Vec<ActionKind>,
    param_mapping: Vec<Vec<ParamSource>>,
}

#[derive(Deserialize)]
struct SubscribeSpec {
    combine: CombineMode,
    action_consts: Vec<Vec<Value>>,
    triggers: Vec<TriggerConfig>,
}

#[derive(Deserialize)]
struct UpdateSpec {
    action_consts: Vec<Vec<Value>>,
    triggers: Vec<TriggerConfig>,
}

#[derive(Deserialize)]
struct ExecuteSpec {
    #[serde(default)]
    trigger_payloads: Vec<TriggerPayload>,
    action_args: Vec<Vec<Value>>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let db_path = std::env::var("VAULTPILOT_DB").unwrap_or_else(|_| "./vaultpilot.db".into());

    let vp = match VaultPilot::new(&db_path) {
        Ok(vp) => vp,
        Err(e) => {
            eprintln!("Error initializing VaultPilot: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(vp, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(vp: VaultPilot, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::OpenPosition {
            owner,
            collateral_token,
            collateral_amount,
            debt_token,
            debt_amount,
        } => {
            let position = vp.open_position(
                &Address::new(owner),
                &collateral_token,
                collateral_amount,
                &debt_token,
                debt_amount,
            )?;
            println!("{}", serde_json::to_string_pretty(&position)?);
        }
        Commands::Position { id } => {
            let position = vp.position(id)?;
            let mut out = serde_json::to_value(&position)?;
            if let Ok(snapshot) = vp.ratio(id).await {
                out["ratio"] = serde_json::json!(snapshot.ratio());
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Positions => {
            println!("{}", serde_json::to_string_pretty(&vp.positions()?)?);
        }
        Commands::SetBalance {
            account,
            token,
            amount,
        } => {
            vp.set_balance(&Address::new(account), &token, amount)?;
            println!("ok");
        }
        Commands::Balance { account, token } => {
            let amount = vp.balance(&Address::new(account), &token)?;
            println!("{amount}");
        }
        Commands::SetPrice { token, usd } => {
            vp.set_price(&token, usd)?;
            println!("ok");
        }
        Commands::SyncPrices { tokens } => {
            vp.sync_prices(&tokens).await?;
            println!("ok");
        }
        Commands::AllowAgent { address } => {
            vp.allow_agent(&Address::new(address))?;
            println!("ok");
        }
        Commands::RevokeAgent { address } => {
            vp.revoke_agent(&Address::new(address))?;
            println!("ok");
        }
        Commands::RegisterTemplate { json } => {
            let spec: TemplateSpec = serde_json::from_str(&json)?;
            let template = vp.register_template(
                spec.name,
                spec.trigger_kinds,
                spec.action_kinds,
                spec.param_mapping,
            )?;
            println!("{}", serde_json::to_string_pretty(&template)?);
        }
        Commands::Templates => {
            println!("{}", serde_json::to_string_pretty(&vp.templates()?)?);
        }
        Commands::Subscribe {
            owner,
            template_id,
            json,
        } => {
            let spec: SubscribeSpec = serde_json::from_str(&json)?;
            let subscription = vp.subscribe(
                Address::new(owner),
                &template_id,
                spec.combine,
                spec.action_consts,
                spec.triggers,
            )?;
            println!("{}", serde_json::to_string_pretty(&subscription)?);
        }
        Commands::Subscriptions { owner } => {
            let owner = owner.map(Address::new);
            let subscriptions = vp.subscriptions(owner.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&subscriptions)?);
        }
        Commands::UpdateSubscription { caller, id, json } => {
            let spec: UpdateSpec = serde_json::from_str(&json)?;
            let subscription = vp.update_subscription(
                &Address::new(caller),
                &id,
                spec.action_consts,
                spec.triggers,
            )?;
            println!("{}", serde_json::to_string_pretty(&subscription)?);
        }
        Commands::Deactivate { caller, id } => {
            vp.deactivate(&Address::new(caller), &id)?;
            println!("ok");
        }
        Commands::Poll { id, payloads } => {
            let payloads: Vec<TriggerPayload> = match payloads {
                Some(json) => serde_json::from_str(&json)?,
                None => {
                    let subscription = vp.subscription(&id)?;
                    vec![TriggerPayload::empty(); subscription.triggers.len()]
                }
            };
            let satisfied = vp.poll(&id, &payloads).await?;
            println!("{satisfied}");
        }
        Commands::Execute { caller, id, json } => {
            let spec: ExecuteSpec = serde_json::from_str(&json)?;
            let outputs = vp
                .execute_strategy(
                    &Address::new(caller),
                    &id,
                    &spec.trigger_payloads,
                    &spec.action_args,
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&outputs)?);
        }
        Commands::RunRecipe { owner, json } => {
            let recipe: Recipe = serde_json::from_str(&json)?;
            recipe.validate()?;
            let outputs = vp.execute_recipe(&Address::new(owner), &recipe)?;
            println!("{}", serde_json::to_string_pretty(&outputs)?);
        }
        Commands::CreateBundle { json } => {
            let entries: Vec<String> = serde_json::from_str(&json)?;
            let bundle = vp.create_bundle(entries)?;
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        }
        Commands::Bundles => {
            println!("{}", serde_json::to_string_pretty(&vp.bundles()?)?);
        }
        Commands::RunBundle { caller, id, json } => {
            let attempts: Vec<StrategyAttempt> = serde_json::from_str(&json)?;
            let outcome = vp.run_bundle(&Address::new(caller), &id, &attempts).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
