use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use accredo_session::{
    ApiConfig, FileSessionStorage, KeyringSessionStorage, MemorySessionStorage, SessionStorage,
};

use super::types::{CliConfig, StorageKind};
use crate::cli_args::{ConfigArgs, ConfigCommand};

pub(crate) fn handle_config_command(
    args: ConfigArgs,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Set(args) => {
            if args.api_url.is_none() && args.storage.is_none() {
                anyhow::bail!("nothing to set; pass --api-url or --storage");
            }
            if let Some(url) = args.api_url {
                ensure_http_url(&url)?;
                config.api_url = Some(url.trim_end_matches('/').to_string());
            }
            if let Some(storage) = args.storage {
                config.storage = Some(storage);
            }
        }
        ConfigCommand::Show => {
            let api = resolve_api_config(None, config);
            let storage = config.storage.unwrap_or_default();
            println!("api_url: {}", api.effective_base_url());
            println!("storage: {}", storage.as_str());
            println!("timeout: {}s", api.request_timeout.as_secs());
        }
        ConfigCommand::Reset => {
            *config = CliConfig::default();
        }
    }
    Ok(())
}

fn ensure_http_url(url: &str) -> anyhow::Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!("api url must start with http:// or https://: {url}");
    }
    Ok(())
}

pub(crate) fn config_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(Path::new(&home).join(".accredo"))
}

fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub(crate) fn load_config() -> anyhow::Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)?;
    Ok(config)
}

pub(crate) fn save_config(config: &CliConfig) -> anyhow::Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Saved url, then `ACCREDO_*` environment, then `--api-url`.
pub(crate) fn resolve_api_config(api_url_arg: Option<String>, config: &CliConfig) -> ApiConfig {
    let mut api = match config.api_url.as_deref() {
        Some(url) => ApiConfig::new(url),
        None => ApiConfig::default(),
    };
    api.apply_env_overrides();
    if let Some(url) = api_url_arg {
        api.base_url = url;
        api.server_base_url = None;
    }
    api
}

pub(crate) fn open_storage(kind: StorageKind) -> anyhow::Result<Arc<dyn SessionStorage>> {
    let storage: Arc<dyn SessionStorage> = match kind {
        StorageKind::File => Arc::new(FileSessionStorage::in_dir(&config_dir()?)),
        StorageKind::Keyring => Arc::new(KeyringSessionStorage),
        StorageKind::Memory => Arc::new(MemorySessionStorage::new()),
    };
    Ok(storage)
}
