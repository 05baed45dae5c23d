//! Indexing progress notifications. The orchestrator talks to an
//! [`IndexingNotifier`] rather than a `tower_lsp::Client` directly, so the
//! scan lifecycle can be driven and tested without a live JSON-RPC
//! connection; [`TowerLspNotifier`] is the production implementation that
//! wraps the `tower_lsp::Client` handle the server is constructed with.

use serde::Deserialize;
use serde::Serialize;
use tower_lsp::Client;
use tower_lsp::lsp_types::notification::Notification;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingCompletedParams {
    pub message: String,
    pub time_in_seconds: f64,
}

pub enum IndexingStarted {}

impl Notification for IndexingStarted {
    type Params = ();
    const METHOD: &'static str = "shopware/indexingStarted";
}

pub enum IndexingCompleted {}

impl Notification for IndexingCompleted {
    type Params = IndexingCompletedParams;
    const METHOD: &'static str = "shopware/indexingCompleted";
}

/// Where the orchestrator reports the start and completion of an indexing
/// run. Implementations fire-and-forget: neither method blocks the caller
/// on delivery.
pub trait IndexingNotifier: Send + Sync {
    fn indexing_started(&self);
    fn indexing_completed(&self, message: String, time_in_seconds: f64);
}

pub struct TowerLspNotifier {
    client: Client,
}

impl TowerLspNotifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl IndexingNotifier for TowerLspNotifier {
    fn indexing_started(&self) {
        let client = self.client.clone();
        tokio::spawn(async move {
            client.send_notification::<IndexingStarted>(()).await;
        });
    }

    fn indexing_completed(&self, message: String, time_in_seconds: f64) {
        let client = self.client.clone();
        tokio::spawn(async move {
            client.send_notification::<IndexingCompleted>(IndexingCompletedParams { message, time_in_seconds }).await;
        });
    }
}

#[cfg(test)]
pub struct RecordingNotifier {
    pub events: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl Default for RecordingNotifier {
    fn default() -> Self {
        Self { events: std::sync::Mutex::new(Vec::new()) }
    }
}

#[cfg(test)]
impl IndexingNotifier for RecordingNotifier {
    fn indexing_started(&self) {
        self.events.lock().unwrap().push("started".to_string());
    }

    fn indexing_completed(&self, message: String, _time_in_seconds: f64) {
        self.events.lock().unwrap().push(format!("completed:{message}"));
    }
}
