//! # Background Subcommand
//!
//! Per-page background images and the sidebar flag. These live in the local
//! state file only, so no API URL or login is needed.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use desk_client::{FileStore, PreferenceStore};

use crate::output;
use crate::GlobalOpts;

#[derive(Args, Debug)]
pub struct BackgroundArgs {
    #[command(subcommand)]
    pub command: BackgroundCommand,
}

#[derive(Subcommand, Debug)]
pub enum BackgroundCommand {
    /// Set the background image of a page.
    Set {
        /// Page name, e.g. `dashboard` or `clients`.
        page: String,
        /// Image URL.
        url: String,
    },
    /// Show the background image of a page.
    Get { page: String },
    /// Remove the background image of a page.
    Remove { page: String },
    /// List every configured background.
    List,
    /// Toggle the collapsed sidebar and print the new state.
    Sidebar,
}

pub fn run_background(args: &BackgroundArgs, opts: &GlobalOpts) -> Result<u8> {
    let path = opts.state_file();
    let store = FileStore::open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let prefs = PreferenceStore::new(Arc::new(store));

    match &args.command {
        BackgroundCommand::Set { page, url } => {
            prefs
                .set_background(page, url)
                .with_context(|| format!("failed to set background for {page:?}"))?;
            Ok(0)
        }
        BackgroundCommand::Get { page } => match prefs.background(page)? {
            Some(url) => {
                println!("{url}");
                Ok(0)
            }
            None => Ok(1),
        },
        BackgroundCommand::Remove { page } => {
            prefs.remove_background(page)?;
            Ok(0)
        }
        BackgroundCommand::List => {
            let all = prefs.backgrounds()?;
            if opts.json {
                output::print_json(&all)?;
            } else {
                for (page, url) in &all {
                    println!("{page:<16}  {url}");
                }
            }
            Ok(0)
        }
        BackgroundCommand::Sidebar => {
            let collapsed = prefs.toggle_sidebar()?;
            println!("sidebar {}", if collapsed { "collapsed" } else { "expanded" });
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(dir: &std::path::Path) -> GlobalOpts {
        GlobalOpts {
            state_dir: Some(dir.to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn set_then_get_through_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let opts = opts(dir.path());
        let set = BackgroundArgs {
            command: BackgroundCommand::Set {
                page: "dashboard".into(),
                url: "https://cdn.example/bg.jpg".into(),
            },
        };
        assert_eq!(run_background(&set, &opts).unwrap(), 0);

        let store = FileStore::open(opts.state_file()).unwrap();
        let prefs = PreferenceStore::new(Arc::new(store));
        assert_eq!(
            prefs.background("dashboard").unwrap().as_deref(),
            Some("https://cdn.example/bg.jpg")
        );
    }

    #[test]
    fn missing_background_exits_nonzero() {
        let dir = tempfile::tempdir().unwrap();
        let get = BackgroundArgs {
            command: BackgroundCommand::Get {
                page: "clients".into(),
            },
        };
        assert_eq!(run_background(&get, &opts(dir.path())).unwrap(), 1);
    }
}
