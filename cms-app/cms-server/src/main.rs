use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use cms_api::{build_router, AppState};
use cms_core::repositories::Repositories;
use cms_core::services::{AuthService, ProvisionOutcome};
use cms_infrastructure::{create_pool, postgres_repositories, run_migrations, InMemoryStore};
use cms_security::SessionCodec;
use cms_shared::config::{AppConfig, PasswordCheck, StorageBackend, SECRET_ENV_VAR};
use cms_shared::telemetry::init_telemetry;

#[derive(Parser, Debug)]
#[command(name = "cms-server", version, about = "Documentation CMS backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create an admin account if the email is not registered yet
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long, default_value = "admin")]
        username: String,

        /// Stored as an argon2 hash; only checked with `auth.password_check = "argon2"`
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry; the guard flushes the file writer on exit
    let _log_guard = init_telemetry(&config.log)?;

    if config.uses_insecure_secret() {
        warn!(
            "Session secret is the built-in default; set {} before exposing this server",
            SECRET_ENV_VAR
        );
    }

    let repos = open_store(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, repos).await,
        Command::CreateAdmin {
            email,
            username,
            password,
        } => create_admin(&config, repos, &username, &email, password.as_deref()).await,
    }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Repositories> {
    match config.database.backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database)
                .await
                .context("Failed to connect to database")?;
            run_migrations(&pool)
                .await
                .context("Failed to apply migrations")?;
            Ok(postgres_repositories(pool))
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory store; content is lost on shutdown");
            Ok(InMemoryStore::new().repositories())
        }
    }
}

async fn serve(config: AppConfig, repos: Repositories) -> anyhow::Result<()> {
    if config.auth.password_check == PasswordCheck::Disabled {
        warn!("Password checking is disabled: any password logs an admin in");
    }

    info!("{} starting ({})", config.app.name, config.app.env);

    let host: std::net::IpAddr = config
        .app
        .host
        .parse()
        .with_context(|| format!("Invalid app.host: {}", config.app.host))?;
    let addr = SocketAddr::from((host, config.app.port));

    let app = build_router(AppState::new(config, repos));

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn create_admin(
    config: &AppConfig,
    repos: Repositories,
    username: &str,
    email: &str,
    password: Option<&str>,
) -> anyhow::Result<()> {
    let auth = AuthService::new(
        repos.users,
        Arc::new(SessionCodec::new(&config.session.secret)),
        Duration::hours(config.session.ttl_hours),
        config.auth.password_check,
    );

    match auth.create_admin(username, email, password).await? {
        ProvisionOutcome::Created(user) => {
            println!("Admin user created: {} <{}> ({})", user.username, user.email, user.id);
        }
        ProvisionOutcome::AlreadyExists(user) => {
            println!("User already exists: {} ({})", user.email, user.role.as_str());
        }
    }
    Ok(())
}
