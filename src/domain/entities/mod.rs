pub mod action;
pub mod bundle;
pub mod position;
pub mod recipe;
pub mod strategy_template;
pub mod subscription;
