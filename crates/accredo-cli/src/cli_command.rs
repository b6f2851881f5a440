use accredo_session::AuthenticatedClient;

use crate::cli_args::*;
use crate::modules::account::{
    handle_activate, handle_register, handle_reset_password, handle_reset_password_confirm,
};
use crate::modules::auth::{
    handle_login, handle_logout, handle_profile, handle_status, handle_whoami,
};
use crate::modules::portal::handle_request;

pub(crate) async fn handle_command(
    command: Command,
    client: &AuthenticatedClient,
) -> anyhow::Result<()> {
    match command {
        Command::Login(args) => handle_login(args, client).await?,
        Command::Logout => handle_logout(client).await?,
        Command::Status => handle_status(client).await?,
        Command::Whoami => handle_whoami(client).await?,
        Command::Profile(args) => handle_profile(args, client).await?,
        Command::Request(args) => handle_request(args, client).await?,
        Command::Register(args) => handle_register(args, client).await?,
        Command::Activate(args) => handle_activate(args, client).await?,
        Command::ResetPassword(args) => handle_reset_password(args, client).await?,
        Command::ResetPasswordConfirm(args) => handle_reset_password_confirm(args, client).await?,
        Command::Config(_) => {
            unreachable!()
        }
    }
    Ok(())
}
