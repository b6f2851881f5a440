use clap::{ArgAction, Parser, Subcommand};

pub use crate::modules::account::args::*;
pub use crate::modules::auth::args::*;
pub use crate::modules::portal::args::*;
pub use crate::modules::system::args::*;

#[derive(Parser)]
#[command(name = "accredo")]
#[command(about = "Accredo portal client")]
pub struct Cli {
    #[arg(long, help = "Backend API base URL (overrides ACCREDO_API_URL and config)")]
    pub api_url: Option<String>,
    #[arg(long, value_enum, env = "ACCREDO_SESSION_STORE")]
    pub session_store: Option<StorageKind>,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Sign in with email and password")]
    Login(LoginArgs),
    #[command(about = "Sign out and forget the stored session")]
    Logout,
    #[command(about = "Show the current session state")]
    Status,
    #[command(about = "Show the signed-in user's profile")]
    Whoami,
    #[command(about = "Update display name fields of the signed-in user")]
    Profile(ProfileArgs),
    #[command(about = "Send an authenticated request to the backend")]
    Request(RequestArgs),
    #[command(about = "Create a new account")]
    Register(RegisterArgs),
    #[command(about = "Confirm an account from the activation email")]
    Activate(ActivateArgs),
    #[command(about = "Email a password reset link")]
    ResetPassword(ResetPasswordArgs),
    #[command(about = "Set a new password from a reset link")]
    ResetPasswordConfirm(ResetPasswordConfirmArgs),
    Config(ConfigArgs),
}
