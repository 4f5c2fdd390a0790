//! # desk CLI entry point
//!
//! Parses command-line arguments, sets up logging and a tokio runtime, and
//! dispatches to the subcommand handlers in the `desk_cli` library.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use desk_cli::auth::{run_health, run_login, run_logout, run_nonce, run_whoami, LoginArgs, NonceArgs};
use desk_cli::background::{run_background, BackgroundArgs};
use desk_cli::phone::{run_phone, PhoneArgs};
use desk_cli::resources::{
    run_clients, run_employees, run_invoices, run_notifications, run_tasks, ClientsArgs,
    EmployeesArgs, InvoicesArgs, NotificationsArgs, TasksArgs,
};
use desk_cli::GlobalOpts;

/// Office desk CLI
///
/// Talks to the office's WordPress REST backend: sign in with an
/// application password, keep the nonce fresh, and browse clients, tasks,
/// invoices, employees and notifications.
#[derive(Parser, Debug)]
#[command(name = "desk", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// REST root of the office plugin. Overrides `DESK_API_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding `state.json`. Overrides `DESK_STATE_DIR`.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with a WordPress application password.
    Login(LoginArgs),
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Nonce maintenance (refresh, watch, status).
    Nonce(NonceArgs),
    /// Client records.
    Clients(ClientsArgs),
    /// Tasks and their workflow status.
    Tasks(TasksArgs),
    /// Invoices and receivables.
    Invoices(InvoicesArgs),
    /// Employees, commissions and payouts.
    Employees(EmployeesArgs),
    /// Notifications.
    Notifications(NotificationsArgs),
    /// Normalise a Saudi phone number and print its WhatsApp link.
    Phone(PhoneArgs),
    /// Per-page background images.
    Background(BackgroundArgs),
    /// Check that the backend answers.
    Health,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("desk CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let opts = GlobalOpts {
        api_url: cli.api_url,
        state_dir: cli.state_dir,
        json: cli.json,
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = runtime.block_on(async {
        match cli.command {
            Commands::Login(args) => run_login(&args, &opts).await,
            Commands::Logout => run_logout(&opts),
            Commands::Whoami => run_whoami(&opts),
            Commands::Nonce(args) => run_nonce(&args, &opts).await,
            Commands::Clients(args) => run_clients(&args, &opts).await,
            Commands::Tasks(args) => run_tasks(&args, &opts).await,
            Commands::Invoices(args) => run_invoices(&args, &opts).await,
            Commands::Employees(args) => run_employees(&args, &opts).await,
            Commands::Notifications(args) => run_notifications(&args, &opts).await,
            Commands::Phone(args) => run_phone(&args, &opts),
            Commands::Background(args) => run_background(&args, &opts),
            Commands::Health => run_health(&opts).await,
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_cli::auth::NonceCommand;
    use desk_cli::resources::{TaskStatusArg, TasksCommand};

    #[test]
    fn cli_parse_login() {
        let cli = Cli::try_parse_from(["desk", "login", "--username", "noura", "--password", "x y z"])
            .unwrap();
        if let Commands::Login(args) = cli.command {
            assert_eq!(args.username, "noura");
            assert_eq!(args.password.as_deref(), Some("x y z"));
        } else {
            panic!("expected login");
        }
    }

    #[test]
    fn cli_parse_login_without_password() {
        let cli = Cli::try_parse_from(["desk", "login", "-u", "noura"]).unwrap();
        assert!(matches!(cli.command, Commands::Login(ref a) if a.password.is_none()));
    }

    #[test]
    fn cli_parse_nonce_refresh() {
        let cli = Cli::try_parse_from(["desk", "nonce", "refresh"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Nonce(NonceArgs {
                command: NonceCommand::Refresh
            })
        ));
    }

    #[test]
    fn cli_parse_task_status_change() {
        let cli = Cli::try_parse_from(["desk", "tasks", "status", "42", "in-progress"]).unwrap();
        if let Commands::Tasks(args) = cli.command {
            match args.command {
                TasksCommand::Status { id, status } => {
                    assert_eq!(id, 42);
                    assert_eq!(status, TaskStatusArg::InProgress);
                }
                other => panic!("unexpected {other:?}"),
            }
        } else {
            panic!("expected tasks");
        }
    }

    #[test]
    fn cli_parse_task_list_filters() {
        let cli = Cli::try_parse_from([
            "desk", "tasks", "list", "--status", "pending", "--page", "2", "--search", "VAT",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Tasks(_)));
    }

    #[test]
    fn cli_parse_unknown_task_status_errors() {
        assert!(Cli::try_parse_from(["desk", "tasks", "status", "42", "archived"]).is_err());
    }

    #[test]
    fn cli_parse_payout_amount() {
        let cli = Cli::try_parse_from(["desk", "employees", "pay", "7", "--amount", "1500.50"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Employees(_)));
        assert!(Cli::try_parse_from(["desk", "employees", "pay", "7", "--amount", "lots"]).is_err());
    }

    #[test]
    fn cli_parse_phone_with_message() {
        let cli = Cli::try_parse_from(["desk", "phone", "0551234567", "-m", "hello"]).unwrap();
        if let Commands::Phone(args) = cli.command {
            assert_eq!(args.number, "0551234567");
            assert_eq!(args.message.as_deref(), Some("hello"));
        } else {
            panic!("expected phone");
        }
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "desk",
            "invoices",
            "summary",
            "--json",
            "--api-url",
            "https://office.example/wp-json/office/v1",
            "-vv",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(cli.api_url.is_some());
    }

    #[test]
    fn cli_parse_background_set() {
        let cli =
            Cli::try_parse_from(["desk", "background", "set", "dashboard", "https://cdn.example/a.jpg"])
                .unwrap();
        assert!(matches!(cli.command, Commands::Background(_)));
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["desk"]).is_err());
    }
}
