use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use contacts_service::{DatabaseConfig, ServiceConfig};

#[derive(Parser)]
#[command(name = "contacts-service")]
#[command(about = "Contacts management API with per-user history")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Server {
        /// Bind address, e.g. 0.0.0.0:8080
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        /// Database URL (overrides the config file)
        #[arg(long, env = "SURREALDB_URL")]
        db_url: Option<String>,
        /// Path to contacts.json
        #[arg(long, env = "CONTACTS_CONFIG")]
        config: Option<PathBuf>,
        /// HS256 signing key, at least 32 bytes (overrides the config file)
        #[arg(long, env = "CONTACTS_JWT_KEY", hide_env_values = true)]
        jwt_key: Option<String>,
    },
    /// Initialize the database
    Init {
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("contacts_service=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server {
            bind,
            db_url,
            config,
            jwt_key,
        } => {
            let mut service_config = ServiceConfig::resolve(config.as_deref())?;
            if let Some(url) = db_url {
                service_config.database.url = url;
            }
            if let Some(key) = jwt_key {
                service_config.jwt.key = key;
            }
            info!("Using database url for REST server: {}", service_config.database.url);

            let app = contacts_service::create_app(service_config).await?;

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("Server listening on http://{}", bind);

            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = contacts_service::create_connection(db_config).await?;
            contacts_service::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
    }

    Ok(())
}
