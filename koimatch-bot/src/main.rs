//! koimatch-bot - registration and mutual-crush matching service

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use koimatch_common::config;
use koimatch_common::db::init_database;
use koimatch_common::notify::{LogNotifier, Notifier, WebhookNotifier};
use tracing::info;

/// Mutual-crush registration and matching service
#[derive(Parser, Debug)]
#[command(name = "koimatch-bot", version)]
struct Args {
    /// Root folder holding the database (overrides env and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Address to bind the HTTP server to
    #[arg(long, env = "KOIMATCH_BIND")]
    bind: Option<String>,

    /// Notification delivery endpoint; logs notifications when unset
    #[arg(long, env = "KOIMATCH_NOTIFY_URL")]
    notify_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber first
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting koimatch-bot v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let service_config = config::load_default_service_config();

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), "KOIMATCH_ROOT");
    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let notify_url = args.notify_url.or(service_config.notify_url);
    let notifier: Arc<dyn Notifier> = match notify_url {
        Some(url) => {
            info!("Forwarding notifications to {}", url);
            Arc::new(WebhookNotifier::new(url))
        }
        None => {
            info!("No delivery endpoint configured - notifications are logged only");
            Arc::new(LogNotifier)
        }
    };

    let state = koimatch_bot::AppState::new(pool, notifier);
    let app = koimatch_bot::build_router(state);

    let bind_addr = args
        .bind
        .or(service_config.bind_addr)
        .unwrap_or_else(|| "127.0.0.1:5730".to_string());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("koimatch-bot listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
