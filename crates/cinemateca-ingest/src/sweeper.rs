//! TTL sweeper: periodic eviction of abandoned submissions.
//!
//! Shutdown: [`Sweeper::shutdown`] signals the task to stop; a sweep in
//! progress finishes first.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::store::SubmissionStore;

/// Handle to the background sweep task.
pub struct Sweeper {
    shutdown_tx: mpsc::Sender<()>,
}

impl Sweeper {
    /// Spawn the sweep loop. Runs independently of event handling; entries
    /// older than `ttl` are evicted every `interval`.
    pub fn spawn(store: Arc<dyn SubmissionStore>, ttl: Duration, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match store.sweep_expired(Utc::now(), ttl).await {
                            Ok(0) => {}
                            Ok(removed) => {
                                tracing::info!(removed, "Swept expired submissions");
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Submission sweep failed");
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }

            tracing::debug!("Submission sweeper stopped");
        });

        Self { shutdown_tx }
    }

    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}
