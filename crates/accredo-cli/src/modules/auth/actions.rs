use accredo_core::{expires_at, ProfileUpdate, SessionStatus, UserProfile};
use accredo_session::AuthenticatedClient;
use chrono::{DateTime, Utc};
use tracing::info;

use super::gate::{run_protected, SESSION_EXPIRED_MESSAGE};
use crate::cli_args::{LoginArgs, ProfileArgs};
use crate::modules::system::http::print_json;
use crate::{prompt_line, prompt_password};

pub(crate) async fn handle_login(
    args: LoginArgs,
    client: &AuthenticatedClient,
) -> anyhow::Result<()> {
    let email = match args.email {
        Some(email) => email,
        None => prompt_line("Email: ")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };
    let user = client.store().sign_in(&email, &password).await?;
    info!(event = "cli_login", user_id = %user.id);
    println!("Signed in as {}", user.display_name());
    Ok(())
}

pub(crate) async fn handle_logout(client: &AuthenticatedClient) -> anyhow::Result<()> {
    client.store().sign_out().await;
    println!("Signed out");
    Ok(())
}

pub(crate) async fn handle_status(client: &AuthenticatedClient) -> anyhow::Result<()> {
    let store = client.store();
    match store.status().await {
        SessionStatus::Authenticated => {
            let Some(session) = store.snapshot().await else {
                println!("status: {}", SessionStatus::Unauthenticated);
                return Ok(());
            };
            println!("status: {}", SessionStatus::Authenticated);
            println!("user: {}", describe_user(&session.user));
            match expires_at(&session.access_token) {
                Some(at) if at > Utc::now() => {
                    println!("access token expires: {}", format_time(at));
                }
                Some(at) => {
                    println!("access token expired: {} (renewed on next use)", format_time(at));
                }
                None => println!("access token expires: unknown"),
            }
        }
        SessionStatus::Invalid => {
            println!("status: {}", SessionStatus::Invalid);
            println!("{SESSION_EXPIRED_MESSAGE}");
        }
        status => println!("status: {status}"),
    }
    Ok(())
}

pub(crate) async fn handle_whoami(client: &AuthenticatedClient) -> anyhow::Result<()> {
    let url = client.config().me_url();
    let body: serde_json::Value = run_protected(client.store(), client.get_json(&url)).await?;
    print_json(&body)
}

pub(crate) async fn handle_profile(
    args: ProfileArgs,
    client: &AuthenticatedClient,
) -> anyhow::Result<()> {
    let update = ProfileUpdate {
        name: args.name,
        first_name: args.first_name,
        last_name: args.last_name,
        slug: args.slug,
    };
    if update.is_empty() {
        anyhow::bail!("nothing to update; pass --name, --first-name, --last-name or --slug");
    }
    let url = client.config().me_url();
    let _: serde_json::Value =
        run_protected(client.store(), client.patch_json(&url, &update)).await?;
    let user = client.store().update_profile_fields(&update).await?;
    info!(event = "profile_updated", user_id = %user.id);
    print_json(&user)
}

fn describe_user(user: &UserProfile) -> String {
    match user.email.as_deref() {
        Some(email) if !email.is_empty() && user.display_name() != email => {
            format!("{} <{email}>", user.display_name())
        }
        _ => user.display_name(),
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
