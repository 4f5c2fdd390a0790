//! # desk-cli -- Command-line front end for the office desk
//!
//! ## Subcommands
//!
//! - `desk login` / `desk logout` / `desk whoami` -- session management.
//! - `desk nonce refresh` / `desk nonce watch` -- nonce maintenance.
//! - `desk clients`, `desk tasks`, `desk invoices`, `desk employees`,
//!   `desk notifications` -- resource listings and quick mutations.
//! - `desk phone` -- Saudi phone normalisation and WhatsApp links.
//! - `desk background` -- per-page background image preferences.
//! - `desk health` -- backend reachability.
//!
//! Session state lives in `<state-dir>/state.json` (default `~/.desk`), so
//! `desk login` once and later commands reuse the token and nonce.
//!
//! ```bash
//! export DESK_API_URL=https://office.example/wp-json/office/v1
//! desk login --username noura --password "abcd efgh ijkl mnop"
//! desk tasks list --status pending
//! desk phone 0551234567 --message "Your invoice is ready"
//! ```

pub mod auth;
pub mod background;
pub mod output;
pub mod phone;
pub mod resources;

use std::path::PathBuf;

use anyhow::{Context, Result};
use desk_client::{ConfigError, DeskApiConfig, DeskClient};
use url::Url;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Overrides `DESK_API_URL`.
    pub api_url: Option<String>,
    /// Overrides `DESK_STATE_DIR`.
    pub state_dir: Option<PathBuf>,
    /// Print JSON instead of tables.
    pub json: bool,
}

impl GlobalOpts {
    /// Resolve the client configuration from the environment plus flags.
    pub fn config(&self) -> Result<DeskApiConfig> {
        let mut config = match (&self.api_url, DeskApiConfig::from_env()) {
            (Some(url), Ok(mut config)) => {
                config.base_url = parse_url(url)?;
                config
            }
            (Some(url), Err(ConfigError::MissingUrl)) => DeskApiConfig::new(parse_url(url)?),
            (_, Err(e)) => {
                return Err(e).context("set DESK_API_URL or pass --api-url");
            }
            (None, Ok(config)) => config,
        };
        if let Some(dir) = &self.state_dir {
            config.state_dir = dir.clone();
        }
        Ok(config)
    }

    /// Open a client over the persisted session.
    pub fn client(&self) -> Result<DeskClient> {
        let config = self.config()?;
        tracing::debug!(?config, "opening office desk client");
        DeskClient::open(config).context("failed to open office desk client")
    }

    /// Location of `state.json`, without needing an API URL.
    pub fn state_file(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(desk_client::state_dir_from_env)
            .join("state.json")
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).with_context(|| format!("invalid --api-url {raw:?}"))
}
