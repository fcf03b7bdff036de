pub mod agent_registry;
pub mod bundle_store;
pub mod market;
pub mod migrations;
pub mod subscription_store;
pub mod template_store;
