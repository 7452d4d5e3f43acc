//! Application wiring.
//!
//! Builds the storage backend, catalog, submission store, pipeline, poller
//! and sweeper from configuration, plus the health router the HTTP server
//! exposes.

use anyhow::{Context, Result};
use axum::routing::get;
use axum::{Json, Router};
use cinemateca_catalog::FirebaseCatalog;
use cinemateca_core::Config;
use cinemateca_ingest::{InMemorySubmissionStore, Pipeline, Sweeper};
use cinemateca_storage::create_storage;
use cinemateca_telegram::{TelegramClient, TelegramTransport, UpdatePoller};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Running application: the health router plus handles to the background
/// tasks, so shutdown can be driven in order.
pub struct App {
    router: Router,
    sweeper: Sweeper,
    poller_shutdown: mpsc::Sender<()>,
    poller_task: JoinHandle<()>,
}

impl App {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Stop the poller first so no new events enter the pipeline, then the
    /// sweeper. In-flight pipeline runs finish on their own tasks.
    pub async fn shutdown(self) {
        let _ = self.poller_shutdown.send(()).await;
        if let Err(e) = self.poller_task.await {
            tracing::warn!(error = %e, "Poller task ended abnormally");
        }
        self.sweeper.shutdown().await;
    }
}

pub async fn initialize_app(config: &Config) -> Result<App> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(backend = %config.storage_backend, "Storage initialized");

    let db_url = config
        .firebase_db_url
        .clone()
        .context("FIREBASE_DB_URL not configured")?;
    let catalog = Arc::new(FirebaseCatalog::new(
        db_url,
        config.firebase_auth_token.clone(),
    ));

    let client = TelegramClient::new(&config.bot_token, config.poll_timeout)
        .context("Failed to create Telegram client")?;
    let transport = Arc::new(TelegramTransport::new(client.clone()));

    let store = Arc::new(InMemorySubmissionStore::new());

    let pipeline = Arc::new(Pipeline::new(
        store.clone(),
        transport,
        storage,
        catalog,
        config.allowed_conversation,
    ));
    if let Some(conversation) = config.allowed_conversation {
        tracing::info!(conversation = %conversation, "Restricted to a single conversation");
    }

    let sweeper = Sweeper::spawn(store, config.submission_ttl, config.sweep_interval);

    let (poller_shutdown, shutdown_rx) = mpsc::channel(1);
    let poller = UpdatePoller::new(client, pipeline);
    let poller_task = tokio::spawn(async move {
        poller.run(shutdown_rx).await;
    });

    let router = Router::new()
        .route("/", get(health))
        .route("/health", get(health));

    Ok(App {
        router,
        sweeper,
        poller_shutdown,
        poller_task,
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
