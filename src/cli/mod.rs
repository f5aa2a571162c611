use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::{self, Datastore, PgStore, UserView};
use crate::pipeline::{into_object, Resource, UserResource};
use crate::state::AppState;
use crate::types::Role;
use crate::validation::{Mode, Shape, UserInput};

#[derive(Parser)]
#[command(name = "inventory-api")]
#[command(about = "Inventory API - inventory and user management server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Bind address, overrides HOST")]
        host: Option<String>,

        #[arg(long, help = "Listen port, overrides PORT")]
        port: Option<u16>,
    },

    #[command(about = "Create an administrator account")]
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long, help = "Defaults to ADMIN_PASSWORD")]
        password: Option<String>,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    info!("Starting Inventory API in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = build_state(config).await?;
            seed_admin_from_config(&state).await?;
            serve(state).await
        }
        Commands::CreateAdmin {
            email,
            first_name,
            last_name,
            password,
        } => {
            let password = admin_password(password, &config.security)?;
            let state = build_state(config).await?;
            let admin = ensure_admin(&state.store, &first_name, &last_name, &email, &password).await?;
            println!("Administrator ready: {} ({})", admin.email, admin.id);
            Ok(())
        }
    }
}

/// Open the configured store and assemble application state
pub async fn build_state(config: AppConfig) -> Result<AppState> {
    let store = match config.database.url {
        Some(_) => {
            let pool = database::connect(&config.database).await?;
            let store = PgStore::new(pool);
            store.bootstrap().await?;
            Datastore::from_store(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store");
            Datastore::memory()
        }
    };

    AppState::new(config, store).context("failed to initialize token service")
}

async fn serve(state: AppState) -> Result<()> {
    let bind_addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Inventory API listening on http://{}", bind_addr);

    axum::serve(listener, crate::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// The `--password` flag, or `ADMIN_PASSWORD` when the flag is absent
fn admin_password(flag: Option<String>, security: &SecurityConfig) -> Result<String> {
    flag.or_else(|| security.admin_password.clone())
        .context("no administrator password: pass --password or set ADMIN_PASSWORD")
}

async fn seed_admin_from_config(state: &AppState) -> Result<()> {
    let security = &state.config.security;
    if let (Some(email), Some(password)) = (&security.admin_email, &security.admin_password) {
        ensure_admin(&state.store, "Admin", "User", email, password).await?;
    }
    Ok(())
}

/// Create an administrator unless the email is already registered.
/// An existing account is returned unchanged.
pub async fn ensure_admin(
    store: &Datastore,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<UserView> {
    let payload = into_object(json!({
        "firstName": first_name,
        "lastName": last_name,
        "email": email,
        "password": password,
        "role": Role::Admin.as_str(),
    }))?;

    let input = UserInput::validate(&payload, Mode::Create).map_err(|errors| {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        anyhow::anyhow!("invalid administrator: {}", messages.join(", "))
    })?;

    if let Some(existing) = store.directory.find_by_email(&input.email).await? {
        if existing.role != Role::Admin {
            warn!("{} exists but is not an administrator", existing.email);
        }
        return Ok(UserView::from(existing));
    }

    let new = UserResource::prepare(input, None).await?;
    let admin = store.users.insert(new).await?;
    info!(user_id = %admin.id, "Administrator created");
    Ok(UserView::from(admin))
}
