pub mod cli;
pub mod client;
pub mod load_config;
