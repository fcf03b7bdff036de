pub mod action_kind;
pub mod address;
pub mod combine_mode;
pub mod param_source;
pub mod ratio_state;
pub mod trigger;
pub mod value;
