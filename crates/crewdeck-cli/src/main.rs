use anyhow::Result;
use clap::{Parser, Subcommand};
use crewdeck_application::CrewdeckApp;
use crewdeck_core::clock::SystemClock;
use crewdeck_core::config::RootConfig;
use crewdeck_infrastructure::{ConfigService, CrewdeckPaths};
use std::sync::Arc;

mod commands;

use commands::auth::{AccountAction, DemoRole, SignupArgs};
use commands::chat::ChatAction;
use commands::crm::CrmAction;
use commands::events::EventsAction;

#[derive(Parser)]
#[command(name = "crewdeck")]
#[command(about = "Crewdeck - event crew coordination from the terminal", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Sign in with email and password
    Login { email: String, password: String },
    /// Sign in as a built-in demo identity
    Demo {
        #[arg(value_enum)]
        role: DemoRole,
    },
    /// Create an account and sign in
    Signup(SignupArgs),
    /// Sign out
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Account directory
    Users {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Events, shot lists and timelines
    Events {
        #[command(subcommand)]
        action: EventsAction,
    },
    /// Team chat
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
    /// HubSpot CRM
    Crm {
        #[command(subcommand)]
        action: CrmAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write config.toml with defaults if it does not exist
    Init,
    /// Print the resolved file locations
    Paths,
}

fn init_tracing(config: &RootConfig) {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match config.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: log_level '{}' is not a valid tracing filter ({}); falling back to 'info'",
                    config.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = CrewdeckPaths::resolve()?;
    let config_service = ConfigService::new(&paths);
    let config = config_service.load()?;
    init_tracing(&config);
    let paths = paths.with_storage_settings(&config.storage);
    tracing::debug!("[CLI] Data dir: {}", paths.data_dir().display());

    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => commands::config::init(&config_service),
            ConfigAction::Paths => commands::config::paths(&paths, cli.json),
        };
    }

    let app = CrewdeckApp::bootstrap(paths, config, Arc::new(SystemClock)).await?;
    let json = cli.json;

    match cli.command {
        Commands::Config { .. } => {}
        Commands::Login { email, password } => commands::auth::login(&app, email, password, json).await?,
        Commands::Demo { role } => commands::auth::demo(&app, role, json).await?,
        Commands::Signup(args) => commands::auth::signup(&app, args, json).await?,
        Commands::Logout => commands::auth::logout(&app).await?,
        Commands::Whoami => commands::auth::whoami(&app, json)?,
        Commands::Users { action } => commands::auth::account(&app, action, json).await?,
        Commands::Events { action } => commands::events::run(&app, action, json).await?,
        Commands::Chat { action } => commands::chat::run(&app, action, json).await?,
        Commands::Crm { action } => commands::crm::run(&app, action, json).await?,
    }

    Ok(())
}
