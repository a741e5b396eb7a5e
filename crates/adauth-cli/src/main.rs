//! adauth - Active Directory authentication and lookup from the command line

mod commands;
mod output;

use std::process::ExitCode;

use adauth_core::{DirectoryConfig, DEFAULT_PAGE_SIZE};
use adauth_ldap::AdAuthenticator;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::CommandContext;

#[derive(Parser)]
#[command(name = "adauth")]
#[command(version = adauth_core::VERSION)]
#[command(about = "Authenticate and query users against Active Directory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ADAUTH_CONFIG")]
    config: Option<String>,

    /// Directory host, overrides the configuration
    #[arg(long, global = true)]
    host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "ADAUTH_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    output: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a user's password and show the user
    Auth {
        /// Login, optionally as DOMAIN\login or login@domain
        login: String,

        /// Password to verify
        #[arg(short, long, env = "ADAUTH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show one user with group memberships
    User {
        login: String,
    },

    /// List every user
    Users,

    /// Search users by login or display name, one page at a time
    Search {
        /// Text the attribute must contain; empty matches everyone
        #[arg(default_value = "")]
        text: String,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Users per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,

        /// Match and order on display name instead of login
        #[arg(long)]
        by_name: bool,
    },

    /// List groups
    Groups {
        /// Only groups with this member distinguished name
        #[arg(long)]
        member: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e
                .downcast_ref::<adauth_core::Error>()
                .map(|err| err.code())
                .unwrap_or("Error");
            eprintln!("{} {}", format!("{}:", code).red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = if let Some(config_path) = &cli.config {
        DirectoryConfig::from_file(config_path)?
    } else {
        DirectoryConfig::from_env()
    };

    if let Some(host) = cli.host {
        config = config.with_host(host);
    }

    debug!(server = %config.server_url(), base = %config.base_path, "Directory configuration loaded");

    let ctx = CommandContext {
        authenticator: AdAuthenticator::new(config),
        output_format: cli.output,
    };

    match cli.command {
        Commands::Auth { login, password } => commands::auth::execute(&ctx, &login, &password).await,
        Commands::User { login } => commands::user::execute(&ctx, &login).await,
        Commands::Users => commands::users::execute(&ctx).await,
        Commands::Search {
            text,
            page,
            page_size,
            by_name,
        } => commands::search::execute(&ctx, &text, page, page_size, by_name).await,
        Commands::Groups { member } => commands::groups::execute(&ctx, member.as_deref()).await,
    }
}
