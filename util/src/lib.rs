pub mod config;
pub mod execution_config;
