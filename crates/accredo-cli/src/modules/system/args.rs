use clap::{Args, Subcommand};

pub use super::types::StorageKind;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Save the backend URL or the session storage")]
    Set(ConfigSetArgs),
    #[command(about = "Print the effective settings")]
    Show,
    #[command(about = "Forget saved settings")]
    Reset,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    #[arg(long, help = "Backend API base URL, e.g. https://portal.example.com/api")]
    pub api_url: Option<String>,
    #[arg(long, value_enum)]
    pub storage: Option<StorageKind>,
}
