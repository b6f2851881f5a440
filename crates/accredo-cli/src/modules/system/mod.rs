pub(crate) mod args;
pub(crate) mod config;
pub(crate) mod http;
pub(crate) mod types;

pub(crate) use config::{
    handle_config_command, load_config, open_storage, resolve_api_config, save_config,
};
pub(crate) use types::CliConfig;
