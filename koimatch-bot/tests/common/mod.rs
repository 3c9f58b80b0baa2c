//! Shared test helpers

use std::sync::Arc;

use async_trait::async_trait;
use koimatch_common::db::init::init_memory_database;
use koimatch_common::notify::{NotificationKind, Notifier};
use koimatch_common::Result;
use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

/// Captures every dispatched notification for assertions
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, NotificationKind, Value)>>,
}

impl RecordingNotifier {
    pub async fn sent(&self) -> Vec<(String, NotificationKind, Value)> {
        self.sent.lock().await.clone()
    }

    pub async fn count_of(&self, user_id: &str, kind: NotificationKind) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(id, k, _)| id == user_id && *k == kind)
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user_id: &str, kind: NotificationKind, params: Value) -> Result<()> {
        self.sent
            .lock()
            .await
            .push((user_id.to_string(), kind, params));
        Ok(())
    }
}

/// Fresh in-memory database plus a recording notifier
pub async fn setup() -> (SqlitePool, Arc<RecordingNotifier>) {
    let pool = init_memory_database().await.expect("in-memory database");
    let notifier = Arc::new(RecordingNotifier::default());
    (pool, notifier)
}
