use callscope_core::CallGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Folder/file hierarchy reconstructed from flat call-graph keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Folder { children: BTreeMap<String, TreeNode> },
    /// `path` is the original call-graph key, not the segment name.
    File { path: String },
}

impl Default for TreeNode {
    fn default() -> Self {
        Self::folder()
    }
}

impl TreeNode {
    pub fn folder() -> Self {
        TreeNode::Folder {
            children: BTreeMap::new(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, TreeNode::File { .. })
    }

    pub fn children(&self) -> Option<&BTreeMap<String, TreeNode>> {
        match self {
            TreeNode::Folder { children } => Some(children),
            TreeNode::File { .. } => None,
        }
    }

    /// Children in display order: folders first, then files, each alphabetical.
    pub fn sorted_children(&self) -> Vec<(&str, &TreeNode)> {
        let Some(children) = self.children() else {
            return Vec::new();
        };
        let (mut folders, files): (Vec<_>, Vec<_>) = children
            .iter()
            .map(|(name, node)| (name.as_str(), node))
            .partition(|(_, node)| !node.is_file());
        folders.extend(files);
        folders
    }

    /// Walk `path` segment by segment from this node.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        let mut current = self;
        for segment in segments(path) {
            current = current.children()?.get(segment)?;
        }
        Some(current)
    }

    /// Every leaf path below this node, depth-first in key order.
    pub fn file_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TreeNode::File { path } => out.push(path),
            TreeNode::Folder { children } => {
                for child in children.values() {
                    child.collect_paths(out);
                }
            }
        }
    }

    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::File { .. } => 1,
            TreeNode::Folder { children } => children.values().map(TreeNode::file_count).sum(),
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

pub struct TreeBuilder;

impl TreeBuilder {
    pub fn build(graph: &CallGraph) -> TreeNode {
        let tree = Self::from_paths(graph.keys().map(String::as_str));
        tracing::debug!(
            "Built file tree with {} files from {} call-graph keys",
            tree.file_count(),
            graph.len()
        );
        tree
    }

    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> TreeNode {
        let mut root = BTreeMap::new();
        for path in paths {
            let parts: Vec<&str> = segments(path).collect();
            if parts.is_empty() {
                tracing::warn!("Skipping call-graph key with no path segments: {:?}", path);
                continue;
            }
            Self::insert(&mut root, &parts, path);
        }
        TreeNode::Folder { children: root }
    }

    fn insert(children: &mut BTreeMap<String, TreeNode>, parts: &[&str], path: &str) {
        let Some((first, rest)) = parts.split_first() else {
            return;
        };

        if rest.is_empty() {
            match children.get(*first) {
                None => {
                    children.insert(
                        first.to_string(),
                        TreeNode::File {
                            path: path.to_string(),
                        },
                    );
                }
                Some(existing) => {
                    tracing::warn!(
                        "Ignoring {:?}: segment {:?} already holds {}",
                        path,
                        first,
                        if existing.is_file() { "a file" } else { "a folder" }
                    );
                }
            }
            return;
        }

        match children
            .entry(first.to_string())
            .or_insert_with(TreeNode::folder)
        {
            TreeNode::Folder { children } => Self::insert(children, rest, path),
            TreeNode::File { path: existing } => {
                tracing::warn!(
                    "Ignoring {:?}: folder segment {:?} collides with file {:?}",
                    path,
                    first,
                    existing
                );
            }
        }
    }
}
