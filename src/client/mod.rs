//! Remote artifact listing: the trait the tree store's fetches go through,
//! its MLflow REST implementation, and the background-task plumbing that
//! delivers listing outcomes onto the event channel.

pub mod mlflow;

#[cfg(test)]
mod mock;

pub use mlflow::MlflowClient;

#[cfg(test)]
pub use mock::MockLister;

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::event::Event;
use crate::tree::store::{ArtifactEntry, ListingRequest};

/// A remote artifact listing service.
///
/// `path = ""` addresses the run's artifact root. Implementations must be
/// callable concurrently for different paths and resolve or reject each
/// call exactly once.
#[async_trait]
pub trait ArtifactLister: Send + Sync {
    async fn list(&self, run_id: &str, path: &str) -> Result<Vec<ArtifactEntry>>;
}

/// Run a listing fetch in the background.
///
/// The outcome is sent back onto the event channel still tagged with the
/// request that issued it, so the store can compare the tag against its
/// current tree before merging.
pub fn spawn_listing(
    lister: Arc<dyn ArtifactLister>,
    request: ListingRequest,
    tx: mpsc::UnboundedSender<Event>,
) {
    tokio::spawn(async move {
        debug!(
            "listing fetch: run={} path={:?}",
            request.run_id, request.path
        );
        let result = lister
            .list(&request.run_id, &request.path)
            .await
            .map_err(|e| e.to_string());
        let _ = tx.send(Event::ListingDone { request, result });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str) -> ListingRequest {
        ListingRequest {
            run_id: "run-1".to_string(),
            epoch: 0,
            path: path.to_string(),
        }
    }

    #[tokio::test]
    async fn spawn_listing_delivers_entries() {
        let lister = MockLister::default();
        lister.ok(
            "run-1",
            "",
            vec![ArtifactEntry {
                name: "metrics.json".to_string(),
                is_dir: false,
                file_size: Some(512),
            }],
        );
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_listing(Arc::new(lister.clone()), request(""), tx);

        let event = rx.recv().await.expect("event delivered");
        match event {
            Event::ListingDone { request, result } => {
                assert_eq!(request.path, "");
                let entries = result.expect("listing succeeds");
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].name, "metrics.json");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(lister.calls(), vec![("run-1".to_string(), "".to_string())]);
    }

    #[tokio::test]
    async fn spawn_listing_delivers_failure_message() {
        let lister = MockLister::default();
        lister.err("run-1", "model", 403, "permission denied");
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_listing(Arc::new(lister), request("model"), tx);

        let event = rx.recv().await.expect("event delivered");
        match event {
            Event::ListingDone { result, .. } => {
                let message = result.expect_err("listing fails");
                assert!(message.contains("permission denied"), "{}", message);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
