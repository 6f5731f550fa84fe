//! Command-line shell for the corporate site back-office.
//!
//! ```bash
//! backoffice login --email admin@example.com --password-file ~/.backoffice-pass
//! backoffice jobs list --status open --filter department=Engineering
//! backoffice applications status a-12 shortlisted
//! backoffice --json-logs -v contacts reply c-3 --body "Thanks, we'll be in touch."
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use backoffice::logging::{self, LogFormat};
use clap::{Parser, Subcommand};

mod commands;
mod state;

use commands::applications::ApplicationsCommand;
use commands::auth::LoginArgs;
use commands::contacts::ContactsCommand;
use commands::jobs::JobsCommand;
use commands::users::UsersCommand;

#[derive(Debug, Parser)]
#[command(name = "backoffice", version, about = "Manage jobs, applications, contacts and users")]
struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'c', long = "config", global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long = "json-logs", global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and store the session
    Login(LoginArgs),
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in user, refreshed from the server
    Whoami,
    /// Dashboard counters
    Dashboard,
    #[command(subcommand)]
    Jobs(JobsCommand),
    #[command(subcommand)]
    Applications(ApplicationsCommand),
    #[command(subcommand)]
    Contacts(ContactsCommand),
    #[command(subcommand)]
    Users(UsersCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match state::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        config.logging.format
    };
    if let Err(e) = logging::init(level, format) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    log::debug!("backoffice v{}", env!("CARGO_PKG_VERSION"));

    let mut app = match state::open(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to open back-office: {}", e);
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    let ok = match cli.command {
        Command::Login(args) => commands::auth::login(&mut app, args).await,
        Command::Logout => commands::auth::logout(&mut app).await,
        Command::Whoami => commands::auth::whoami(&mut app).await,
        Command::Dashboard => commands::dashboard::statistics(&app).await,
        Command::Jobs(command) => commands::jobs::run(&app, command).await,
        Command::Applications(command) => commands::applications::run(&app, command).await,
        Command::Contacts(command) => commands::contacts::run(&app, command).await,
        Command::Users(command) => commands::users::run(&app, command).await,
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
