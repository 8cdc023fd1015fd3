use std::time::Instant;

use reqwest::Url;

use crate::client::mlflow;
use crate::error::{AppError, Result};
use crate::tree::flatten::{flatten, RowKind, TreeRow};
use crate::tree::store::{ArtifactEntry, ListingRequest, MergeOutcome, TreeStore};

/// Main application state: the tree store plus everything the UI needs
/// around it (flattened rows, selection, run switching, status messages).
#[derive(Debug)]
pub struct App {
    pub store: TreeStore,
    /// Flattened projection of the store's tree, rebuilt after every merge.
    pub rows: Vec<TreeRow>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    /// Runs the user can switch between with `[` / `]`.
    pub runs: Vec<String>,
    pub run_index: usize,
    /// Tracking-server base URL, for building download URLs.
    pub base: Url,
    pub status_message: Option<(String, Instant)>,
    pub should_quit: bool,
}

impl App {
    /// Create an App browsing the first of `runs` and return the root
    /// listing request to issue.
    pub fn new(runs: Vec<String>, base: Url) -> Result<(Self, ListingRequest)> {
        let first = runs
            .first()
            .cloned()
            .ok_or_else(|| AppError::InvalidArgs("at least one run id is required".into()))?;
        let (store, request) = TreeStore::new(first);
        let mut app = Self {
            store,
            rows: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            runs,
            run_index: 0,
            base,
            status_message: None,
            should_quit: false,
        };
        app.refresh_rows();
        Ok((app, request))
    }

    /// Rebuild the flat row list from the tree and clamp the selection.
    pub fn refresh_rows(&mut self) {
        self.rows = flatten(self.store.root());
        if !self.rows.is_empty() && self.selected_index >= self.rows.len() {
            self.selected_index = self.rows.len() - 1;
        }
    }

    /// The currently selected row, if any.
    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.rows.get(self.selected_index)
    }

    /// Deliver a finished listing fetch to the store.
    ///
    /// Stale or unroutable results leave the rows untouched; merged results
    /// rebuild them, and a merged failure is also surfaced in the status bar.
    pub fn on_listing_done(
        &mut self,
        request: &ListingRequest,
        result: std::result::Result<Vec<ArtifactEntry>, String>,
    ) -> MergeOutcome {
        let failure = result.as_ref().err().cloned();
        let outcome = self.store.on_listing(request, result);
        if outcome == MergeOutcome::Merged {
            if let Some(message) = failure {
                let target = if request.path.is_empty() {
                    "root"
                } else {
                    request.path.as_str()
                };
                self.set_status_message(format!("✗ {}: {}", target, message));
            }
            self.refresh_rows();
        }
        outcome
    }

    /// Activate the selected row.
    ///
    /// Directories toggle (returning the listing request on first expand),
    /// inline error rows retry their directory, and files show their
    /// download URL in the status bar.
    pub fn toggle_selected(&mut self) -> Option<ListingRequest> {
        let row = self.selected_row()?.clone();
        let request = match row.kind {
            RowKind::Dir { .. } => self.store.toggle(&row.path),
            RowKind::Error => self.store.retry(&row.path),
            RowKind::File { .. } => {
                self.show_download_url();
                None
            }
            RowKind::Loading => None,
        };
        self.refresh_rows();
        request
    }

    /// Collapse the selected directory, or jump to its parent row.
    pub fn collapse_selected(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };
        if let RowKind::Dir { expanded: true, .. } = row.kind {
            self.store.toggle(&row.path);
            self.refresh_rows();
            return;
        }
        // Placeholder rows already carry their directory's path.
        let parent = match row.kind {
            RowKind::Loading | RowKind::Error => row.path.as_str(),
            _ => parent_path(&row.path),
        };
        if let Some(index) = self.rows.iter().position(|r| r.path == parent && r.is_dir()) {
            self.selected_index = index;
        }
    }

    /// Re-fetch the selected directory: retry if failed, refresh if loaded.
    pub fn refresh_selected(&mut self) -> Option<ListingRequest> {
        let row = self.selected_row()?.clone();
        let path = match row.kind {
            RowKind::Dir { .. } | RowKind::Error => row.path,
            _ => return None,
        };
        let request = self
            .store
            .retry(&path)
            .or_else(|| self.store.refresh(&path));
        self.refresh_rows();
        request
    }

    /// Switch to the next run in the list (wrapping).
    pub fn next_run(&mut self) -> Option<ListingRequest> {
        self.switch_run((self.run_index + 1) % self.runs.len())
    }

    /// Switch to the previous run in the list (wrapping).
    pub fn prev_run(&mut self) -> Option<ListingRequest> {
        self.switch_run((self.run_index + self.runs.len() - 1) % self.runs.len())
    }

    fn switch_run(&mut self, index: usize) -> Option<ListingRequest> {
        self.run_index = index;
        let run_id = self.runs[index].clone();
        let request = self.store.set_run(&run_id)?;
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.refresh_rows();
        self.set_status_message(format!(
            "run {}/{}: {}",
            index + 1,
            self.runs.len(),
            run_id
        ));
        Some(request)
    }

    /// Show the selected file's download URL in the status bar.
    pub fn show_download_url(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.is_file() {
            return;
        }
        let url = mlflow::download_url(&self.base, self.store.run_id(), &row.path);
        self.set_status_message(url);
    }

    /// Set a status message with current timestamp.
    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Clear the status message if it has been displayed for more than 5 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, ref created)) = self.status_message {
            if created.elapsed().as_secs() > 5 {
                self.status_message = None;
            }
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Move selection down by one row.
    pub fn select_next(&mut self) {
        let len = self.rows.len();
        if len > 0 && self.selected_index < len - 1 {
            self.selected_index += 1;
        }
    }

    /// Move selection up by one row.
    pub fn select_previous(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Jump to the first row.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last row.
    pub fn select_last(&mut self) {
        let len = self.rows.len();
        if len > 0 {
            self.selected_index = len - 1;
        }
    }

    /// Update the scroll offset to ensure the selected row is visible.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
    }
}

/// Everything before the final `/`; empty for top-level paths and the root.
fn parent_path(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}
