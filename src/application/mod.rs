pub mod execute_strategy;
pub mod recipe_engine;
pub mod register_template;
pub mod run_bundle;
pub mod subscribe;
pub mod trigger_eval;
