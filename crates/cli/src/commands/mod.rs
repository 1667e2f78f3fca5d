mod packing;
mod trips;

use std::{
    io::{self, BufRead, Write},
    time::Duration,
};

use chrono::Utc;
use trip_store::{AuthContext, HttpClient};

use crate::{
    config::{AppConfig, Command},
    error::{AppError, Result},
    session,
};

const PASSWORD_ENV: &str = "TRAVELMATE_PASSWORD";

pub async fn run(config: &AppConfig, command: Command) -> Result<()> {
    let auth = match session::load(&config.session_path)? {
        Some(stored) => AuthContext::with_session(stored),
        None => AuthContext::new(),
    };
    let mut changes = auth.subscribe();
    let client = HttpClient::with_timeout(
        &config.base_url,
        auth.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;

    let result = dispatch(config, &client, command).await;
    if result.as_ref().is_err_and(AppError::is_auth) {
        auth.sign_out();
    }

    if changes.has_changed().unwrap_or(false) {
        changes.mark_unchanged();
        session::store(&config.session_path, auth.session().as_ref())?;
    }
    result
}

async fn dispatch(config: &AppConfig, client: &HttpClient, command: Command) -> Result<()> {
    match command {
        Command::Signup => signup(config, client).await,
        Command::Login => login(config, client).await,
        Command::Logout => {
            client.auth().sign_out();
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let session = client.auth().session().ok_or(AppError::NotSignedIn)?;
            println!("{}", session.username);
            Ok(())
        }
        Command::List { search } => {
            ensure_session(client).await?;
            trips::list(client, search).await
        }
        Command::Create(fields) => {
            ensure_session(client).await?;
            trips::create(client, fields).await
        }
        Command::Edit { id, fields } => {
            ensure_session(client).await?;
            trips::edit(client, id, fields).await
        }
        Command::Delete { id, yes } => {
            ensure_session(client).await?;
            trips::delete(client, id, yes).await
        }
        Command::Show { id } => {
            ensure_session(client).await?;
            trips::show(client, id).await
        }
        Command::AddActivity { id, activity } => {
            ensure_session(client).await?;
            trips::add_activity(client, id, activity).await
        }
        Command::Packing { id, action } => {
            ensure_session(client).await?;
            packing::run(client, id, action).await
        }
    }
}

async fn signup(config: &AppConfig, client: &HttpClient) -> Result<()> {
    let username = required_username(config)?;
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => {
            let password = prompt("Password: ")?;
            if prompt("Confirm password: ")? != password {
                return Err(AppError::Input("passwords do not match".to_string()));
            }
            password
        }
    };
    if password.is_empty() {
        return Err(AppError::Input("password must not be empty".to_string()));
    }

    let message = client.signup(username, &password).await?;
    println!("{message}");
    println!("Sign in with `travelmate --username {username} login`.");
    Ok(())
}

async fn login(config: &AppConfig, client: &HttpClient) -> Result<()> {
    required_username(config)?;
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => prompt("Password: ")?,
    };
    if password.is_empty() {
        return Err(AppError::Input("password must not be empty".to_string()));
    }

    let session = client.login(config.username.trim(), &password).await?;
    println!("Signed in as {}.", session.username);
    Ok(())
}

fn required_username(config: &AppConfig) -> Result<&str> {
    let username = config.username.trim();
    if username.is_empty() {
        return Err(AppError::Input(
            "username is required (--username or TRAVELMATE_USERNAME)".to_string(),
        ));
    }
    Ok(username)
}

/// Refreshes an expired access token once, if a refresh token is stored.
async fn ensure_session(client: &HttpClient) -> Result<()> {
    let session = client.auth().session().ok_or(AppError::NotSignedIn)?;
    if session.refresh.is_some() && session.access_expired(Utc::now()) {
        tracing::debug!("access token of {} expired, refreshing", session.username);
        client.refresh_access().await?;
    }
    Ok(())
}

/// Prints `message` on stderr and reads one line from stdin.
pub(crate) fn prompt(message: &str) -> Result<String> {
    let mut err = io::stderr();
    err.write_all(message.as_bytes())?;
    err.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
