use accredo_core::api::auth::{PasswordResetConfirmRequest, RegisterRequest};
use accredo_session::{account, AuthenticatedClient};

use crate::cli_args::{ActivateArgs, RegisterArgs, ResetPasswordArgs, ResetPasswordConfirmArgs};
use crate::prompt_password;

pub(crate) async fn handle_register(
    args: RegisterArgs,
    client: &AuthenticatedClient,
) -> anyhow::Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };
    let request = RegisterRequest {
        email: args.email.trim().to_string(),
        password,
        first_name: args.first_name,
        last_name: args.last_name,
    };
    let user = account::register(client, &request).await?;
    println!(
        "Registered {}. Check your inbox to activate the account.",
        user.email.as_deref().unwrap_or(&request.email)
    );
    Ok(())
}

pub(crate) async fn handle_activate(
    args: ActivateArgs,
    client: &AuthenticatedClient,
) -> anyhow::Result<()> {
    account::activate(client, &args.uid, &args.token).await?;
    println!("Account activated. You can now run `accredo login`.");
    Ok(())
}

pub(crate) async fn handle_reset_password(
    args: ResetPasswordArgs,
    client: &AuthenticatedClient,
) -> anyhow::Result<()> {
    account::request_password_reset(client, &args.email).await?;
    println!("If the address is registered, a reset link is on its way.");
    Ok(())
}

pub(crate) async fn handle_reset_password_confirm(
    args: ResetPasswordConfirmArgs,
    client: &AuthenticatedClient,
) -> anyhow::Result<()> {
    let new_password = match args.new_password {
        Some(password) => password,
        None => prompt_password("New password: ")?,
    };
    let request = PasswordResetConfirmRequest {
        uid: args.uid,
        token: args.token,
        new_password,
    };
    account::confirm_password_reset(client, &request).await?;
    println!("Password updated. Sign in with the new password.");
    Ok(())
}
