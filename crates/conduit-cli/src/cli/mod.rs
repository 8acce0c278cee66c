//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use conduit_core::api::ApiClient;
use conduit_core::api::articles::ArticleListQuery;
use conduit_core::auth::{Session, TokenStore};
use conduit_core::config::{self, Config};
use conduit_core::models::UserUpdate;

mod commands;

#[derive(Parser)]
#[command(name = "conduit")]
#[command(version)]
#[command(about = "Command-line client for a Conduit publishing API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the API base URL (also CONDUIT_API_URL)
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a new account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and discard the stored credential
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Update settings for the signed-in user
    Settings {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    /// List articles
    Articles {
        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
        /// Filter by author username
        #[arg(long)]
        author: Option<String>,
        /// Filter by favoriting username
        #[arg(long)]
        favorited: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Show a public profile
    Profile {
        #[arg(value_name = "USERNAME")]
        username: String,
    },
    /// List the tags in use
    Tags,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config management needs no session or network.
    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let config = Config::load().context("load config")?;
    let api_url = config::resolve_api_url(cli.api_url.as_deref(), &config)?;

    let tokens = TokenStore::open_default();
    let client = ApiClient::new(api_url, tokens.clone());
    let session = Session::new(client.clone(), tokens);

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&session, &email, &password).await
        }
        Commands::Register {
            username,
            email,
            password,
        } => commands::auth::register(&session, &username, &email, &password).await,
        Commands::Logout => commands::auth::logout(&session),
        Commands::Whoami => commands::auth::whoami(&session).await,
        Commands::Settings {
            username,
            email,
            password,
            bio,
            image,
        } => {
            let changes = UserUpdate {
                username,
                email,
                password,
                bio,
                image,
            };
            commands::auth::settings(&session, &changes).await
        }
        Commands::Articles {
            tag,
            author,
            favorited,
            limit,
            offset,
        } => {
            let query = ArticleListQuery {
                tag,
                author,
                favorited,
                limit,
                offset,
            };
            commands::articles::list(&client, &query).await
        }
        Commands::Profile { username } => commands::profiles::show(&client, &username).await,
        Commands::Tags => commands::articles::tags(&client).await,
        Commands::Config { .. } => unreachable!("handled above"),
    }
}
