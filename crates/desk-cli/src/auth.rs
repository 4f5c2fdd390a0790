//! # Session Subcommands
//!
//! `login`, `logout`, `whoami`, `nonce` and `health`. The session is kept in
//! the state file, so these commands are what the other subcommands rely on.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use desk_client::DeskClient;
use desk_core::Capability;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::output;
use crate::GlobalOpts;

/// Environment variable consulted when `--password` is omitted.
pub const PASSWORD_ENV: &str = "DESK_APP_PASSWORD";

/// Arguments for `desk login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// WordPress username or email.
    #[arg(long, short)]
    pub username: String,
    /// Application password. Falls back to `DESK_APP_PASSWORD`.
    #[arg(long, short)]
    pub password: Option<String>,
}

/// Arguments for `desk nonce`.
#[derive(Args, Debug)]
pub struct NonceArgs {
    #[command(subcommand)]
    pub command: NonceCommand,
}

#[derive(Subcommand, Debug)]
pub enum NonceCommand {
    /// Fetch a fresh nonce now.
    Refresh,
    /// Keep the nonce fresh in the foreground until interrupted.
    Watch,
    /// Show when the nonce was last refreshed.
    Status,
}

pub async fn run_login(args: &LoginArgs, opts: &GlobalOpts) -> Result<u8> {
    let password = resolve_password(args.password.as_deref())?;
    let client = opts.client()?;
    let user = client
        .login(&args.username, &password)
        .await
        .context("login failed")?;

    if opts.json {
        output::print_json(&user)?;
    } else {
        println!("Logged in as {} (user {})", user.name, user.id.get());
    }
    Ok(0)
}

fn resolve_password(flag: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(password) = flag {
        return Ok(Zeroizing::new(password.to_string()));
    }
    match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => Ok(Zeroizing::new(password)),
        _ => bail!("no password given; pass --password or set {PASSWORD_ENV}"),
    }
}

pub fn run_logout(opts: &GlobalOpts) -> Result<u8> {
    let client = opts.client()?;
    client.logout().context("failed to clear session")?;
    if !opts.json {
        println!("Logged out");
    }
    Ok(0)
}

pub fn run_whoami(opts: &GlobalOpts) -> Result<u8> {
    let client = opts.client()?;
    let session = client.session();
    if !session.is_authenticated() {
        eprintln!("Not logged in");
        return Ok(1);
    }
    let Some(user) = session.user().context("failed to read session")? else {
        eprintln!("Logged in, but no user profile is stored; run `desk login` again");
        return Ok(1);
    };

    if opts.json {
        output::print_json(&user)?;
        return Ok(0);
    }
    println!("{} (user {})", user.name, user.id.get());
    if let Some(email) = &user.email {
        println!("  email: {email}");
    }
    if !user.roles.is_empty() {
        println!("  roles: {}", user.roles.join(", "));
    }
    println!("  admin: {}", if user.is_admin() { "yes" } else { "no" });
    let granted: Vec<&str> = Capability::ALL
        .iter()
        .filter(|cap| user.can(**cap))
        .map(|cap| cap.as_str())
        .collect();
    println!("  can:   {}", if granted.is_empty() { "-".into() } else { granted.join(", ") });
    Ok(0)
}

/// Refuse locally when the stored user lacks `cap`.
///
/// The backend enforces the same rule; checking first gives a clearer
/// message than a 403. Without a stored profile the request goes through.
pub fn require(client: &DeskClient, cap: Capability) -> Result<()> {
    match client.session().user().context("failed to read session")? {
        Some(user) if !user.can(cap) => {
            bail!("{} lacks the {cap} capability", user.name)
        }
        _ => Ok(()),
    }
}

#[derive(Serialize)]
struct NonceStatus {
    authenticated: bool,
    has_nonce: bool,
    last_refresh: Option<chrono::DateTime<chrono::Utc>>,
    stale: bool,
}

pub async fn run_nonce(args: &NonceArgs, opts: &GlobalOpts) -> Result<u8> {
    let client = opts.client()?;
    match args.command {
        NonceCommand::Refresh => {
            client
                .transport()
                .refresh_nonce()
                .await
                .context("nonce refresh failed")?;
            if !opts.json {
                println!("Nonce refreshed");
            }
            Ok(0)
        }
        NonceCommand::Watch => {
            client.start_nonce_refresher()?;
            println!("Refreshing nonce in the background; press Ctrl-C to stop");
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
            tracing::info!("stopping nonce refresher");
            Ok(0)
        }
        NonceCommand::Status => {
            let session = client.session();
            let last_refresh = session.last_refresh().context("failed to read session")?;
            let status = NonceStatus {
                authenticated: session.is_authenticated(),
                has_nonce: session.nonce().context("failed to read session")?.is_some(),
                last_refresh,
                stale: client
                    .refresh_policy()
                    .is_stale(last_refresh, chrono::Utc::now()),
            };
            if opts.json {
                output::print_json(&status)?;
            } else {
                let when = last_refresh
                    .map(desk_core::format_datetime)
                    .unwrap_or_else(|| "never".into());
                println!("authenticated: {}", status.authenticated);
                println!("last refresh:  {when}");
                println!("stale:         {}", status.stale);
            }
            Ok(0)
        }
    }
}

pub async fn run_health(opts: &GlobalOpts) -> Result<u8> {
    let client = opts.client()?;
    let report = client.health_check().await;
    if opts.json {
        output::print_json(&serde_json::json!({
            "url": report.url,
            "reachable": report.is_reachable(),
            "status": report.status,
            "error": report.error,
            "authenticated": report.authenticated,
        }))?;
    } else if let Some(status) = report.status {
        println!("{} answered HTTP {status}", report.url);
    } else {
        println!(
            "{} unreachable: {}",
            report.url,
            output::or_dash(report.error.as_deref())
        );
    }
    Ok(if report.is_reachable() { 0 } else { 1 })
}
