pub mod adapters;
pub mod oracles;
pub mod sqlite;
