pub mod agent_registry;
pub mod bundle_store;
pub mod chain_state;
pub mod live_state;
pub mod price_oracle;
pub mod protocol_adapter;
pub mod subscription_store;
pub mod template_store;
