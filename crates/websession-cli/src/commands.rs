use std::sync::Arc;

use reqwest::Method;
use tracing::debug;
use websession_core::{RestAuthClient, SessionCoordinator};

use crate::cli_args::{CallArgs, LoginArgs};

pub(crate) async fn handle_login(
    args: LoginArgs,
    coordinator: &Arc<SessionCoordinator>,
) -> anyhow::Result<()> {
    let credentials = args.credentials;
    coordinator
        .log_in(&credentials.username, &credentials.password)
        .await?;
    print_session(coordinator).await?;

    if args.logout {
        coordinator.log_off().await?;
        println!("Logged off");
    }
    Ok(())
}

pub(crate) async fn handle_check(coordinator: &Arc<SessionCoordinator>) -> anyhow::Result<()> {
    coordinator
        .check_logged_in_and_reinitialize_app_context()
        .await;
    println!("Status: {:?}", coordinator.status());
    match coordinator.current_user_profile().await {
        Some(_) => print_session(coordinator).await,
        None => {
            println!("No active session");
            Ok(())
        }
    }
}

pub(crate) async fn handle_call(
    args: CallArgs,
    coordinator: &Arc<SessionCoordinator>,
    client: &RestAuthClient,
) -> anyhow::Result<()> {
    let method = parse_method(&args.method)?;
    let body = args
        .body
        .as_deref()
        .map(|body| serde_json::from_str::<serde_json::Value>(body))
        .transpose()
        .map_err(|err| anyhow::anyhow!("--body is not valid JSON: {err}"))?;

    let credentials = args.credentials;
    coordinator
        .log_in(&credentials.username, &credentials.password)
        .await?;

    let mut request = client.request(method.clone(), &args.path);
    if let Some(body) = body.as_ref() {
        request = request.json(body);
    }
    debug!(event = "call_sending", %method, path = %args.path);
    let outcome = request.send().await;

    coordinator.log_off().await?;

    let response = outcome?;
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    println!("{status}");
    if !text.is_empty() {
        println!("{text}");
    }
    if !status.is_success() {
        anyhow::bail!("{method} {} failed: {status}", args.path);
    }
    Ok(())
}

async fn print_session(coordinator: &SessionCoordinator) -> anyhow::Result<()> {
    let profile = coordinator
        .current_user_profile()
        .await
        .ok_or_else(|| anyhow::anyhow!("no user profile after login"))?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    let csrf = coordinator.current_csrf_token();
    if let Some(header_name) = csrf.header_name() {
        println!("CSRF header: {header_name}");
    }
    Ok(())
}

pub(crate) fn parse_method(value: &str) -> anyhow::Result<Method> {
    let upper = value.trim().to_ascii_uppercase();
    if upper.is_empty() {
        anyhow::bail!("HTTP method is required");
    }
    Method::from_bytes(upper.as_bytes())
        .map_err(|err| anyhow::anyhow!("invalid HTTP method {value}: {err}"))
}
