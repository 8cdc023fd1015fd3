use log::debug;

/// Load status of a directory node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
    /// The last listing fetch failed; carries the failure message.
    Failed(String),
}

/// One entry of a remote directory listing, as the tree consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub name: String,
    pub is_dir: bool,
    /// Present for files only.
    pub file_size: Option<u64>,
}

/// A node in the artifact tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNode {
    /// `/`-joined path relative to the artifact root; empty for the root.
    pub path: String,
    pub is_dir: bool,
    /// Present for files only.
    pub file_size: Option<u64>,
    /// UI visibility flag; meaningful for directories only.
    pub expanded: bool,
    /// Directories track their listing; files are born `Loaded`.
    pub load_state: LoadState,
    /// `Some` only after a successful listing merge. A forced refresh keeps
    /// the previous children here until a successful merge replaces them.
    pub children: Option<Vec<ArtifactNode>>,
}

impl ArtifactNode {
    fn root() -> Self {
        Self {
            path: String::new(),
            is_dir: true,
            file_size: None,
            expanded: false,
            load_state: LoadState::NotLoaded,
            children: None,
        }
    }

    fn from_entry(parent_path: &str, entry: &ArtifactEntry) -> Self {
        let path = join_path(parent_path, &entry.name);
        if entry.is_dir {
            Self {
                path,
                is_dir: true,
                file_size: None,
                expanded: false,
                load_state: LoadState::NotLoaded,
                children: None,
            }
        } else {
            // Files have nothing to fetch.
            Self {
                path,
                is_dir: false,
                file_size: entry.file_size,
                expanded: false,
                load_state: LoadState::Loaded,
                children: None,
            }
        }
    }

    /// Last path segment; empty for the root.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A listing fetch, tagged with the tree instance it was issued for.
///
/// The tag is what makes logical cancellation testable: a run change bumps
/// the store's epoch, and [`TreeStore::on_listing`] compares the request's
/// epoch before touching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub run_id: String,
    /// Identity of the tree instance, not of the run id: A -> B -> A yields
    /// three distinct epochs, so a fetch from the first A-tree can never
    /// land in the second.
    pub epoch: u64,
    pub path: String,
}

/// What [`TreeStore::on_listing`] did with a resolved fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Result merged into the node at the request path.
    Merged,
    /// The fetch was issued under a previous run's tree; result dropped.
    StaleRun,
    /// The target node no longer exists (removed by a refresh); dropped.
    PathMissing,
    /// The target node exists but is not awaiting a listing; dropped.
    NotLoading,
}

/// Single source of truth for the current run's artifact tree.
///
/// The store never performs I/O. Operations that need a remote listing
/// return a [`ListingRequest`] for the caller to execute; the outcome comes
/// back through [`TreeStore::on_listing`]. The `Loading` guard keeps at most
/// one fetch outstanding per (epoch, path).
#[derive(Debug)]
pub struct TreeStore {
    run_id: String,
    /// Bumped on every effective run change.
    epoch: u64,
    root: ArtifactNode,
}

impl TreeStore {
    /// Create a store for `run_id` and begin the root's initial load.
    pub fn new(run_id: impl Into<String>) -> (Self, ListingRequest) {
        let mut store = Self {
            run_id: run_id.into(),
            epoch: 0,
            root: ArtifactNode::root(),
        };
        let request = store.open_root();
        (store, request)
    }

    /// Expand the fresh root and move it to `Loading`.
    fn open_root(&mut self) -> ListingRequest {
        self.root.expanded = true;
        self.root.load_state = LoadState::Loading;
        ListingRequest {
            run_id: self.run_id.clone(),
            epoch: self.epoch,
            path: String::new(),
        }
    }

    /// Switch to a different run, discarding the current tree entirely.
    ///
    /// Selecting the already-current run is a no-op: no refetch, expand
    /// state preserved. On an actual switch the epoch bump invalidates every
    /// fetch still in flight for the previous tree.
    pub fn set_run(&mut self, run_id: &str) -> Option<ListingRequest> {
        if run_id == self.run_id {
            return None;
        }
        debug!("run change: {} -> {}", self.run_id, run_id);
        self.run_id = run_id.to_string();
        self.epoch += 1;
        self.root = ArtifactNode::root();
        Some(self.open_root())
    }

    /// Expand or collapse the directory at `path`.
    ///
    /// Expanding a directory whose children were never fetched, or whose
    /// last fetch failed, moves it to `Loading` and returns the fetch to
    /// issue. A directory already `Loading` or `Loaded` toggles without any
    /// new network activity; collapsing retains loaded children. Files and
    /// unknown paths are a no-op.
    pub fn toggle(&mut self, path: &str) -> Option<ListingRequest> {
        let run_id = self.run_id.clone();
        let epoch = self.epoch;
        let node = find_mut(&mut self.root, path)?;
        if !node.is_dir {
            return None;
        }
        if node.expanded {
            node.expanded = false;
            return None;
        }
        node.expanded = true;
        match node.load_state {
            LoadState::NotLoaded | LoadState::Failed(_) => {
                node.load_state = LoadState::Loading;
                Some(ListingRequest {
                    run_id,
                    epoch,
                    path: node.path.clone(),
                })
            }
            LoadState::Loading | LoadState::Loaded => None,
        }
    }

    /// Re-enter `Loading` on a failed directory without collapsing it first.
    pub fn retry(&mut self, path: &str) -> Option<ListingRequest> {
        let run_id = self.run_id.clone();
        let epoch = self.epoch;
        let node = find_mut(&mut self.root, path)?;
        if !node.is_dir || !matches!(node.load_state, LoadState::Failed(_)) {
            return None;
        }
        node.load_state = LoadState::Loading;
        Some(ListingRequest {
            run_id,
            epoch,
            path: node.path.clone(),
        })
    }

    /// Force a re-fetch of a settled directory's listing.
    ///
    /// Previously loaded children stay in place until a successful merge
    /// replaces them wholesale; a failed refresh leaves them untouched.
    /// No-op while `NotLoaded` or `Loading`.
    pub fn refresh(&mut self, path: &str) -> Option<ListingRequest> {
        let run_id = self.run_id.clone();
        let epoch = self.epoch;
        let node = find_mut(&mut self.root, path)?;
        if !node.is_dir {
            return None;
        }
        match node.load_state {
            LoadState::Loaded | LoadState::Failed(_) => {
                node.load_state = LoadState::Loading;
                Some(ListingRequest {
                    run_id,
                    epoch,
                    path: node.path.clone(),
                })
            }
            LoadState::NotLoaded | LoadState::Loading => None,
        }
    }

    /// Deliver the outcome of a listing fetch.
    ///
    /// The request's epoch is checked before anything is touched: a
    /// mismatch means the fetch belongs to a previous run's tree, and its
    /// result is dropped whole. On success the target's children are
    /// replaced wholesale (entries removed remotely disappear, new entries
    /// appear); on failure only the target's `load_state` changes. The
    /// `expanded` flag is never modified here.
    pub fn on_listing(
        &mut self,
        request: &ListingRequest,
        result: Result<Vec<ArtifactEntry>, String>,
    ) -> MergeOutcome {
        if request.epoch != self.epoch {
            debug!(
                "discarding stale listing: run={} path={:?}",
                request.run_id, request.path
            );
            return MergeOutcome::StaleRun;
        }
        let Some(node) = find_mut(&mut self.root, &request.path) else {
            debug!("listing target vanished: {:?}", request.path);
            return MergeOutcome::PathMissing;
        };
        if node.load_state != LoadState::Loading {
            debug!("listing target not loading: {:?}", request.path);
            return MergeOutcome::NotLoading;
        }
        match result {
            Ok(entries) => {
                let parent_path = node.path.clone();
                node.children = Some(
                    entries
                        .iter()
                        .map(|entry| ArtifactNode::from_entry(&parent_path, entry))
                        .collect(),
                );
                node.load_state = LoadState::Loaded;
            }
            Err(message) => {
                node.load_state = LoadState::Failed(message);
            }
        }
        MergeOutcome::Merged
    }

    /// The run this tree belongs to.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The root node, for rendering.
    pub fn root(&self) -> &ArtifactNode {
        &self.root
    }

    /// Find the node at `path`.
    pub fn find(&self, path: &str) -> Option<&ArtifactNode> {
        find(&self.root, path)
    }

    /// The failure message at `path`, if its last listing failed.
    pub fn error_at(&self, path: &str) -> Option<&str> {
        match &self.find(path)?.load_state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Join a parent path and a child name with `/`; the root joins bare.
fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Descend from the root to the node at `path`, one segment at a time.
///
/// Cost is proportional to the depth of `path`, not the size of the tree.
fn find<'a>(root: &'a ArtifactNode, path: &str) -> Option<&'a ArtifactNode> {
    if path.is_empty() {
        return Some(root);
    }
    let mut node = root;
    for segment in path.split('/') {
        node = node.children.as_ref()?.iter().find(|c| c.name() == segment)?;
    }
    Some(node)
}

fn find_mut<'a>(root: &'a mut ArtifactNode, path: &str) -> Option<&'a mut ArtifactNode> {
    if path.is_empty() {
        return Some(root);
    }
    let mut node = root;
    for segment in path.split('/') {
        node = node
            .children
            .as_mut()?
            .iter_mut()
            .find(|c| c.name() == segment)?;
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(name: &str) -> ArtifactEntry {
        ArtifactEntry {
            name: name.to_string(),
            is_dir: true,
            file_size: None,
        }
    }

    fn file(name: &str, size: u64) -> ArtifactEntry {
        ArtifactEntry {
            name: name.to_string(),
            is_dir: false,
            file_size: Some(size),
        }
    }

    /// A store for "run-1" with the root listing already merged:
    /// `model/` (dir) and `metrics.json` (file, 512 bytes).
    fn loaded_store() -> TreeStore {
        let (mut store, request) = TreeStore::new("run-1");
        let outcome = store.on_listing(&request, Ok(vec![dir("model"), file("metrics.json", 512)]));
        assert_eq!(outcome, MergeOutcome::Merged);
        store
    }

    #[test]
    fn new_store_begins_root_load() {
        let (store, request) = TreeStore::new("run-1");
        assert_eq!(request.run_id, "run-1");
        assert_eq!(request.path, "");
        assert!(store.root().expanded);
        assert_eq!(store.root().load_state, LoadState::Loading);
        assert!(store.root().children.is_none());
    }

    #[test]
    fn root_listing_populates_children_in_server_order() {
        let store = loaded_store();
        let root = store.root();
        assert_eq!(root.load_state, LoadState::Loaded);
        assert!(root.expanded);

        let children = root.children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].path, "model");
        assert!(children[0].is_dir);
        assert_eq!(children[0].load_state, LoadState::NotLoaded);
        assert!(!children[0].expanded);
        assert_eq!(children[1].path, "metrics.json");
        assert!(!children[1].is_dir);
        assert_eq!(children[1].file_size, Some(512));
        assert_eq!(children[1].load_state, LoadState::Loaded);
    }

    #[test]
    fn toggle_directory_loads_lazily() {
        let mut store = loaded_store();

        let request = store.toggle("model").expect("first expand issues a fetch");
        assert_eq!(request.path, "model");
        let model = store.find("model").unwrap();
        assert!(model.expanded);
        assert_eq!(model.load_state, LoadState::Loading);

        let outcome = store.on_listing(&request, Ok(vec![file("weights.bin", 4096)]));
        assert_eq!(outcome, MergeOutcome::Merged);
        let model = store.find("model").unwrap();
        assert_eq!(model.load_state, LoadState::Loaded);
        let children = model.children.as_ref().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].path, "model/weights.bin");
        assert_eq!(children[0].file_size, Some(4096));
    }

    #[test]
    fn toggle_file_is_noop() {
        let mut store = loaded_store();
        assert!(store.toggle("metrics.json").is_none());
        let node = store.find("metrics.json").unwrap();
        assert!(!node.expanded);
        assert_eq!(node.load_state, LoadState::Loaded);
    }

    #[test]
    fn toggle_unknown_path_is_noop() {
        let mut store = loaded_store();
        assert!(store.toggle("does/not/exist").is_none());
    }

    #[test]
    fn collapse_retains_children_and_reexpand_does_not_refetch() {
        let mut store = loaded_store();
        let request = store.toggle("model").unwrap();
        store.on_listing(&request, Ok(vec![file("weights.bin", 4096)]));

        assert!(store.toggle("model").is_none()); // collapse
        assert!(!store.find("model").unwrap().expanded);
        let before = store.find("model").unwrap().children.clone();

        assert!(store.toggle("model").is_none()); // re-expand, no fetch
        let model = store.find("model").unwrap();
        assert!(model.expanded);
        assert_eq!(model.load_state, LoadState::Loaded);
        assert_eq!(model.children, before);
    }

    #[test]
    fn at_most_one_fetch_while_loading() {
        let mut store = loaded_store();
        let mut fetches = 0;
        fetches += store.toggle("model").is_some() as usize; // expand -> fetch
        fetches += store.toggle("model").is_some() as usize; // collapse
        fetches += store.toggle("model").is_some() as usize; // expand, still Loading
        assert_eq!(fetches, 1);
    }

    #[test]
    fn late_resolution_after_collapse_still_merges() {
        let mut store = loaded_store();
        let request = store.toggle("model").unwrap();
        store.toggle("model"); // collapse while the fetch is in flight

        let outcome = store.on_listing(&request, Ok(vec![file("weights.bin", 4096)]));
        assert_eq!(outcome, MergeOutcome::Merged);
        let model = store.find("model").unwrap();
        assert_eq!(model.load_state, LoadState::Loaded);
        assert!(!model.expanded); // merge never touches the expand flag
    }

    #[test]
    fn set_run_same_id_is_noop() {
        let mut store = loaded_store();
        store.toggle("model");
        assert!(store.set_run("run-1").is_none());
        // Tree untouched: children still loaded, model still expanded.
        assert_eq!(store.root().load_state, LoadState::Loaded);
        assert!(store.find("model").unwrap().expanded);
    }

    #[test]
    fn set_run_discards_tree_and_reloads() {
        let mut store = loaded_store();
        let request = store.set_run("run-2").expect("run change issues a fetch");
        assert_eq!(request.run_id, "run-2");
        assert_eq!(request.path, "");
        assert_eq!(store.run_id(), "run-2");
        assert_eq!(store.root().load_state, LoadState::Loading);
        assert!(store.root().children.is_none());
        assert!(store.find("model").is_none());
    }

    #[test]
    fn stale_run_listing_is_discarded() {
        let (mut store, old_request) = TreeStore::new("run-1");
        let new_request = store.set_run("run-2").unwrap();

        let outcome = store.on_listing(&old_request, Ok(vec![dir("from-run-1")]));
        assert_eq!(outcome, MergeOutcome::StaleRun);
        // run-2's tree unaffected: still loading, nothing merged.
        assert_eq!(store.root().load_state, LoadState::Loading);
        assert!(store.root().children.is_none());

        let outcome = store.on_listing(&new_request, Ok(vec![dir("from-run-2")]));
        assert_eq!(outcome, MergeOutcome::Merged);
        assert!(store.find("from-run-2").is_some());
        assert!(store.find("from-run-1").is_none());
    }

    #[test]
    fn returning_to_a_run_still_discards_its_old_fetch() {
        let (mut store, first_request) = TreeStore::new("run-1");
        store.set_run("run-2");
        let third_request = store.set_run("run-1").unwrap();

        // Same run id, but the fetch belongs to the first run-1 tree.
        let outcome = store.on_listing(&first_request, Ok(vec![dir("stale")]));
        assert_eq!(outcome, MergeOutcome::StaleRun);
        assert!(store.find("stale").is_none());

        let outcome = store.on_listing(&third_request, Ok(vec![dir("fresh")]));
        assert_eq!(outcome, MergeOutcome::Merged);
        assert!(store.find("fresh").is_some());
    }

    #[test]
    fn failed_listing_marks_node_failed_and_retry_recovers() {
        let mut store = loaded_store();
        let request = store.toggle("model").unwrap();
        let outcome = store.on_listing(&request, Err("permission denied".to_string()));
        assert_eq!(outcome, MergeOutcome::Merged);

        let model = store.find("model").unwrap();
        assert_eq!(model.load_state, LoadState::Failed("permission denied".into()));
        assert!(model.expanded);
        assert!(model.children.is_none());
        assert_eq!(store.error_at("model"), Some("permission denied"));

        let request = store.retry("model").expect("retry on failed issues a fetch");
        assert_eq!(store.find("model").unwrap().load_state, LoadState::Loading);

        let outcome = store.on_listing(&request, Ok(vec![file("weights.bin", 4096)]));
        assert_eq!(outcome, MergeOutcome::Merged);
        let model = store.find("model").unwrap();
        assert_eq!(model.load_state, LoadState::Loaded);
        assert_eq!(model.children.as_ref().unwrap().len(), 1);
        assert_eq!(store.error_at("model"), None);
    }

    #[test]
    fn retry_is_noop_unless_failed() {
        let mut store = loaded_store();
        assert!(store.retry("model").is_none()); // NotLoaded
        let request = store.toggle("model").unwrap();
        assert!(store.retry("model").is_none()); // Loading
        store.on_listing(&request, Ok(vec![]));
        assert!(store.retry("model").is_none()); // Loaded
        assert!(store.retry("metrics.json").is_none()); // file
    }

    #[test]
    fn refresh_replaces_children_wholesale() {
        let mut store = loaded_store();
        let request = store.toggle("model").unwrap();
        store.on_listing(&request, Ok(vec![dir("checkpoints"), file("weights.bin", 4096)]));

        let request = store.refresh("model").expect("refresh issues a fetch");
        let model = store.find("model").unwrap();
        assert_eq!(model.load_state, LoadState::Loading);
        // Previous children stay visible while the refresh is in flight.
        assert_eq!(model.children.as_ref().unwrap().len(), 2);

        // Remotely, checkpoints/ disappeared and config.yaml appeared.
        store.on_listing(&request, Ok(vec![file("weights.bin", 4096), file("config.yaml", 64)]));
        let model = store.find("model").unwrap();
        assert_eq!(model.load_state, LoadState::Loaded);
        assert!(model.expanded); // unchanged by the refresh
        let names: Vec<&str> = model
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["weights.bin", "config.yaml"]);
        assert!(store.find("model/checkpoints").is_none());
    }

    #[test]
    fn refresh_failure_keeps_stale_children() {
        let mut store = loaded_store();
        let request = store.toggle("model").unwrap();
        store.on_listing(&request, Ok(vec![file("weights.bin", 4096)]));

        let request = store.refresh("model").unwrap();
        store.on_listing(&request, Err("server unavailable".to_string()));

        let model = store.find("model").unwrap();
        assert_eq!(model.load_state, LoadState::Failed("server unavailable".into()));
        // Only successful merges replace children.
        assert_eq!(model.children.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn refresh_is_noop_while_pending_or_unloaded() {
        let mut store = loaded_store();
        assert!(store.refresh("model").is_none()); // NotLoaded
        store.toggle("model");
        assert!(store.refresh("model").is_none()); // Loading
        assert!(store.refresh("metrics.json").is_none()); // file
    }

    #[test]
    fn resolution_for_replaced_node_is_not_applied() {
        let mut store = loaded_store();
        let model_request = store.toggle("model").unwrap();

        // A root refresh completes first and recreates "model" from scratch.
        let root_request = store.refresh("").unwrap();
        store.on_listing(&root_request, Ok(vec![dir("model")]));
        assert_eq!(store.find("model").unwrap().load_state, LoadState::NotLoaded);

        // The fetch issued for the old "model" node must not touch the new one.
        let outcome = store.on_listing(&model_request, Ok(vec![file("weights.bin", 4096)]));
        assert_eq!(outcome, MergeOutcome::NotLoading);
        let model = store.find("model").unwrap();
        assert_eq!(model.load_state, LoadState::NotLoaded);
        assert!(model.children.is_none());
    }

    #[test]
    fn resolution_for_vanished_node_is_dropped() {
        let mut store = loaded_store();
        let model_request = store.toggle("model").unwrap();

        // A root refresh removes "model" entirely.
        let root_request = store.refresh("").unwrap();
        store.on_listing(&root_request, Ok(vec![file("metrics.json", 512)]));

        let outcome = store.on_listing(&model_request, Ok(vec![file("weights.bin", 4096)]));
        assert_eq!(outcome, MergeOutcome::PathMissing);
        assert!(store.find("model").is_none());
    }

    #[test]
    fn empty_listing_yields_empty_children() {
        let mut store = loaded_store();
        let request = store.toggle("model").unwrap();
        store.on_listing(&request, Ok(vec![]));
        let model = store.find("model").unwrap();
        assert_eq!(model.load_state, LoadState::Loaded);
        assert!(model.children.as_ref().unwrap().is_empty());
    }

    #[test]
    fn nested_paths_are_parent_joined() {
        let mut store = loaded_store();
        let request = store.toggle("model").unwrap();
        store.on_listing(&request, Ok(vec![dir("checkpoints")]));
        let request = store.toggle("model/checkpoints").unwrap();
        assert_eq!(request.path, "model/checkpoints");
        store.on_listing(&request, Ok(vec![file("epoch-3.ckpt", 1024)]));

        let leaf = store.find("model/checkpoints/epoch-3.ckpt").unwrap();
        assert_eq!(leaf.name(), "epoch-3.ckpt");
        assert_eq!(leaf.file_size, Some(1024));
    }

    #[test]
    fn each_distinct_path_fetched_at_most_once_without_failures() {
        let mut store = loaded_store();
        let mut fetches = Vec::new();

        // Arbitrary toggle churn over two directories, no failures.
        fetches.extend(store.toggle("model")); // fetch
        fetches.extend(store.toggle("model")); // collapse
        fetches.extend(store.toggle("model")); // expand, loading
        let pending = fetches.last().cloned();
        if let Some(request) = pending {
            store.on_listing(&request, Ok(vec![dir("checkpoints")]));
        }
        fetches.extend(store.toggle("model")); // collapse
        fetches.extend(store.toggle("model")); // expand, loaded
        fetches.extend(store.toggle("model/checkpoints")); // fetch

        let mut paths: Vec<String> = fetches.iter().map(|r| r.path.clone()).collect();
        let before = paths.len();
        paths.dedup();
        assert_eq!(before, paths.len(), "a path was fetched twice: {:?}", paths);
    }

    #[test]
    fn join_path_root_and_nested() {
        assert_eq!(join_path("", "model"), "model");
        assert_eq!(join_path("model", "weights.bin"), "model/weights.bin");
    }

    #[test]
    fn find_descends_by_segments() {
        let mut store = loaded_store();
        let request = store.toggle("model").unwrap();
        store.on_listing(&request, Ok(vec![file("weights.bin", 4096)]));

        assert!(store.find("").is_some());
        assert!(store.find("model/weights.bin").is_some());
        assert!(store.find("model/missing.bin").is_none());
        assert!(store.find("metrics.json/nope").is_none());
    }
}
