use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::ArtifactLister;
use crate::error::{AppError, Result};
use crate::tree::store::ArtifactEntry;

#[derive(Clone, Debug)]
enum Response {
    Ok(Vec<ArtifactEntry>),
    Err { status: u16, message: String },
}

/// Canned-response lister for tests; records every call it receives.
#[derive(Clone, Default)]
pub struct MockLister {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    responses: HashMap<(String, String), Response>,
    calls: Vec<(String, String)>,
}

impl MockLister {
    pub fn ok(&self, run_id: &str, path: &str, entries: Vec<ArtifactEntry>) {
        let mut inner = self.inner.lock().expect("mock lister lock");
        inner
            .responses
            .insert((run_id.to_string(), path.to_string()), Response::Ok(entries));
    }

    pub fn err(&self, run_id: &str, path: &str, status: u16, message: &str) {
        let mut inner = self.inner.lock().expect("mock lister lock");
        inner.responses.insert(
            (run_id.to_string(), path.to_string()),
            Response::Err {
                status,
                message: message.to_string(),
            },
        );
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        let inner = self.inner.lock().expect("mock lister lock");
        inner.calls.clone()
    }
}

#[async_trait]
impl ArtifactLister for MockLister {
    async fn list(&self, run_id: &str, path: &str) -> Result<Vec<ArtifactEntry>> {
        let mut inner = self.inner.lock().expect("mock lister lock");
        inner.calls.push((run_id.to_string(), path.to_string()));

        match inner.responses.get(&(run_id.to_string(), path.to_string())) {
            Some(Response::Ok(entries)) => Ok(entries.clone()),
            Some(Response::Err { status, message }) => Err(AppError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Err(AppError::Api {
                status: 404,
                message: format!("no mock response for {}:{}", run_id, path),
            }),
        }
    }
}
