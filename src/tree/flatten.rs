use crate::tree::store::{ArtifactNode, LoadState};

/// What a rendered row represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Dir { expanded: bool, loading: bool },
    File { file_size: Option<u64> },
    /// Placeholder under an expanded directory whose listing is in flight.
    Loading,
    /// Inline failure shown under an expanded directory in place of its
    /// children; the row's `name` carries the failure message.
    Error,
}

/// One visible row of the artifact tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    /// Path of the node this row belongs to. Placeholder rows carry the
    /// owning directory's path, so activating an error row can retry it.
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub is_last_sibling: bool,
    pub kind: RowKind,
}

impl TreeRow {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, RowKind::Dir { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, RowKind::File { .. })
    }
}

/// Project the tree into the ordered row list the widgets render.
///
/// Children of collapsed directories are skipped. An expanded directory
/// whose listing is in flight shows either its previously loaded children
/// (refresh in flight) or a single `Loading…` placeholder; a failed one
/// shows its error in place of its children.
pub fn flatten(root: &ArtifactNode) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    push_node(root, 0, true, &mut rows);
    rows
}

fn push_node(node: &ArtifactNode, depth: usize, is_last: bool, rows: &mut Vec<TreeRow>) {
    let name = if node.path.is_empty() {
        "root".to_string()
    } else {
        node.name().to_string()
    };
    let kind = if node.is_dir {
        RowKind::Dir {
            expanded: node.expanded,
            loading: node.load_state == LoadState::Loading,
        }
    } else {
        RowKind::File {
            file_size: node.file_size,
        }
    };
    rows.push(TreeRow {
        path: node.path.clone(),
        name,
        depth,
        is_last_sibling: is_last,
        kind,
    });

    if !node.is_dir || !node.expanded {
        return;
    }
    match &node.load_state {
        LoadState::Loading => match &node.children {
            Some(children) => push_children(children, depth + 1, rows),
            None => rows.push(TreeRow {
                path: node.path.clone(),
                name: "Loading…".to_string(),
                depth: depth + 1,
                is_last_sibling: true,
                kind: RowKind::Loading,
            }),
        },
        LoadState::Failed(message) => rows.push(TreeRow {
            path: node.path.clone(),
            name: message.clone(),
            depth: depth + 1,
            is_last_sibling: true,
            kind: RowKind::Error,
        }),
        LoadState::Loaded => {
            if let Some(children) = &node.children {
                push_children(children, depth + 1, rows);
            }
        }
        LoadState::NotLoaded => {}
    }
}

fn push_children(children: &[ArtifactNode], depth: usize, rows: &mut Vec<TreeRow>) {
    for (i, child) in children.iter().enumerate() {
        push_node(child, depth, i + 1 == children.len(), rows);
    }
}
