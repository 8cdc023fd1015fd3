use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::ArtifactLister;
use crate::error::{AppError, Result};
use crate::tree::store::ArtifactEntry;

/// Wire shape of one entry in an `artifacts/list` response.
///
/// MLflow reports each entry's full root-relative path; the entry name is
/// its final segment.
#[derive(Debug, Clone, Deserialize)]
struct FileInfo {
    path: String,
    is_dir: bool,
    file_size: Option<u64>,
}

/// Wire shape of an `artifacts/list` response. `files` is absent for an
/// empty directory.
#[derive(Debug, Clone, Deserialize)]
struct ListArtifactsResponse {
    #[serde(default)]
    files: Vec<FileInfo>,
}

/// REST client for an MLflow-compatible tracking server.
#[derive(Debug)]
pub struct MlflowClient {
    http: Client,
    base: Url,
}

impl MlflowClient {
    /// Build a client for `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| AppError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    /// The server base URL this client talks to.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/api/2.0/mlflow/{}",
            self.base.as_str().trim_end_matches('/'),
            endpoint
        )
    }
}

#[async_trait]
impl ArtifactLister for MlflowClient {
    async fn list(&self, run_id: &str, path: &str) -> Result<Vec<ArtifactEntry>> {
        let url = self.api_url("artifacts/list");
        debug!("GET {} run_id={} path={:?}", url, run_id, path);
        let response = self
            .http
            .get(&url)
            .query(&[("run_id", run_id), ("path", path)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let listing: ListArtifactsResponse = response.json().await?;
        Ok(listing.files.iter().map(entry_from_wire).collect())
    }
}

fn entry_from_wire(info: &FileInfo) -> ArtifactEntry {
    let name = info
        .path
        .rsplit('/')
        .next()
        .unwrap_or(&info.path)
        .to_string();
    ArtifactEntry {
        name,
        is_dir: info.is_dir,
        file_size: if info.is_dir { None } else { info.file_size },
    }
}

/// URL the presentation layer hands out for downloading a file artifact.
/// The tree itself never fetches file content.
pub fn download_url(base: &Url, run_id: &str, path: &str) -> String {
    let mut url = base.clone();
    url.set_path("/get-artifact");
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("run_uuid", run_id)
        .append_pair("path", path);
    url.to_string()
}
