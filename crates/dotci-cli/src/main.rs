//! DotCi administration CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dotci")]
#[command(about = "DotCi credential administration", long_about = None)]
struct Cli {
    /// Path to the system configuration file
    #[arg(long, env = "DOTCI_CONFIG", default_value = "dotci.kdl")]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage repository access tokens
    Tokens {
        #[command(subcommand)]
        command: TokenCommands,
    },
    /// Print a freshly generated token encryption key
    Keygen,
    /// Create or upgrade the database schema
    Migrate,
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Show the stored record for a repository
    Get {
        /// Repository URL
        url: String,
        /// Print the decrypted token instead of masking it
        #[arg(long)]
        show_token: bool,
    },
    /// Store a token for a repository, replacing any existing one
    Put {
        /// Repository URL
        url: String,
        /// Login the token belongs to
        #[arg(long)]
        user: String,
        /// Access token
        #[arg(long, env = "DOTCI_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Replace the token on every repository owned by a user
    Update {
        /// Login whose tokens are replaced
        #[arg(long)]
        user: String,
        /// New access token
        #[arg(long, env = "DOTCI_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Check whether a repository has a token
    Check {
        /// Repository URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Keygen => {
            println!("{}", commands::keygen());
        }
        Commands::Migrate => {
            let config = commands::load_config(&cli.config)?;
            commands::migrate(&config).await?;
        }
        Commands::Tokens { command } => {
            let config = commands::load_config(&cli.config)?;
            let store = commands::connect(&config).await?;
            let output = match command {
                TokenCommands::Get { url, show_token } => {
                    commands::tokens::get(store.as_ref(), &url, show_token).await?
                }
                TokenCommands::Put { url, user, token } => {
                    commands::tokens::put(store.as_ref(), &url, &token, &user).await?
                }
                TokenCommands::Update { user, token } => {
                    commands::tokens::update(store.as_ref(), &user, &token).await?
                }
                TokenCommands::Check { url } => {
                    let (output, configured) =
                        commands::tokens::check(store.as_ref(), &url).await?;
                    println!("{}", output);
                    if !configured {
                        std::process::exit(1);
                    }
                    return Ok(());
                }
            };
            println!("{}", output);
        }
    }

    Ok(())
}
