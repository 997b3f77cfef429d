use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use habitual::cli::{run_init, run_progress, run_today};
use habitual::config::ServerConfig;
use habitual::engine::SystemClock;
use habitual::server::{AppState, create_router};
use habitual::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "habitual")]
#[command(about = "A weekly habit tracker with versioned habit rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and database
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// TOML config file. Flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the habits planned for a day
    Today {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show weekly progress for a month
    Progress {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        bail!(
            "Database not found at {}. Run 'habitual init' first.",
            db_path.display()
        );
    }

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    let state = Arc::new(AppState::new(Arc::new(store), Arc::new(SystemClock)));
    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("habitual=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => run_init(&data_dir)?,
        Commands::Serve {
            host,
            port,
            data_dir,
            config,
        } => {
            let mut server_config = match config {
                Some(path) => ServerConfig::from_file(&path)?,
                None => ServerConfig::default(),
            };
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            if let Some(data_dir) = data_dir {
                server_config.data_dir = data_dir;
            }

            run_serve(server_config).await?;
        }
        Commands::Today {
            data_dir,
            date,
            json,
        } => run_today(&data_dir, date.as_deref(), json)?,
        Commands::Progress {
            data_dir,
            month,
            json,
        } => run_progress(&data_dir, month.as_deref(), json)?,
    }

    Ok(())
}
