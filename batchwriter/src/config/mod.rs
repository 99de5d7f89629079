pub mod cli_config;
pub mod options;
