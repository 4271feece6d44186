use crate::tree::TreeNode;
use callscope_core::{CallGraph, FileStatus, FunctionInfo};
use std::collections::BTreeMap;

/// What the function list under a file should show for the current search.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionListing<'a> {
    /// Unsupported language or tagged file: name and badge only.
    Disabled { badge: String },
    Functions(Vec<(&'a str, &'a FunctionInfo)>),
    /// The file is visible but none of its functions match.
    NoMatches,
}

/// Search predicate over the file tree.
///
/// Matching is a case-insensitive, unanchored substring test on the search
/// text as typed. An empty (or all-whitespace) search makes everything visible.
pub struct TreeFilter<'a> {
    graph: &'a CallGraph,
    needle: String,
}

impl<'a> TreeFilter<'a> {
    pub fn new(graph: &'a CallGraph, search: &str) -> Self {
        let needle = if search.trim().is_empty() {
            String::new()
        } else {
            search.to_lowercase()
        };
        Self { graph, needle }
    }

    pub fn graph(&self) -> &'a CallGraph {
        self.graph
    }

    pub fn is_active(&self) -> bool {
        !self.needle.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        !self.is_active() || text.to_lowercase().contains(&self.needle)
    }

    pub fn is_visible(&self, node: &TreeNode) -> bool {
        if !self.is_active() {
            return true;
        }
        match node {
            TreeNode::File { path } => self.file_visible(path),
            TreeNode::Folder { children } => children.values().any(|child| self.is_visible(child)),
        }
    }

    /// A file matches by its own name, or by any function name when it is
    /// analyzable. Disabled files never match through their functions.
    pub fn file_visible(&self, path: &str) -> bool {
        if !self.is_active() {
            return true;
        }
        if self.matches(file_name(path)) {
            return true;
        }
        let Some(file) = self.graph.get(path) else {
            tracing::trace!("Tree leaf {:?} has no call-graph entry", path);
            return false;
        };
        if !FileStatus::of(path, file).is_analyzable() {
            return false;
        }
        file.functions()
            .is_some_and(|functions| functions.keys().any(|name| self.matches(name)))
    }

    pub fn functions(&self, path: &str) -> FunctionListing<'a> {
        let graph: &'a CallGraph = self.graph;
        let Some(file) = graph.get(path) else {
            return FunctionListing::NoMatches;
        };
        let functions = match (FileStatus::of(path, file), file.functions()) {
            (FileStatus::Disabled { badge }, _) => return FunctionListing::Disabled { badge },
            (FileStatus::Analyzable(_), Some(functions)) => functions,
            (FileStatus::Analyzable(_), None) => return FunctionListing::NoMatches,
        };

        let matching: Vec<(&'a str, &'a FunctionInfo)> = functions
            .iter()
            .filter(|(name, _)| self.matches(name))
            .map(|(name, info)| (name.as_str(), info))
            .collect();

        if matching.is_empty() {
            FunctionListing::NoMatches
        } else {
            FunctionListing::Functions(matching)
        }
    }

    /// Visible children of a folder in display order.
    pub fn visible_children<'n>(&self, folder: &'n TreeNode) -> Vec<(&'n str, &'n TreeNode)> {
        folder
            .sorted_children()
            .into_iter()
            .filter(|(_, child)| self.is_visible(child))
            .collect()
    }

    /// Copy of the visible part of `node`, or `None` when nothing matches.
    pub fn prune(&self, node: &TreeNode) -> Option<TreeNode> {
        match node {
            TreeNode::File { .. } => self.is_visible(node).then(|| node.clone()),
            TreeNode::Folder { children } => {
                let kept: BTreeMap<String, TreeNode> = children
                    .iter()
                    .filter_map(|(name, child)| self.prune(child).map(|c| (name.clone(), c)))
                    .collect();
                if kept.is_empty() && self.is_active() {
                    None
                } else {
                    Some(TreeNode::Folder { children: kept })
                }
            }
        }
    }
}

pub fn file_name(path: &str) -> &str {
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    fn graph() -> CallGraph {
        serde_json::from_str(
            r#"{
                "app/models/user.py": {"save_user": {"line": 3}, "load": {"line": 9}},
                "app/views.py": {"render_page": {"line": 1}},
                "docs/USER_GUIDE.md": {"type": "text", "lines": []},
                "docs/notes.txt": {"type": "text", "lines": []},
                "web/main.go": {"save_user": {"line": 1}}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_search_shows_everything() {
        let graph = graph();
        let tree = TreeBuilder::build(&graph);
        let filter = TreeFilter::new(&graph, "   ");
        assert!(!filter.is_active());
        assert_eq!(filter.prune(&tree), Some(tree.clone()));
        for path in tree.file_paths() {
            assert!(filter.file_visible(path));
        }
    }

    #[test]
    fn test_match_by_function_name_propagates_to_folders() {
        let graph = graph();
        let tree = TreeBuilder::build(&graph);
        let filter = TreeFilter::new(&graph, "SAVE");

        assert!(filter.file_visible("app/models/user.py"));
        assert!(filter.is_visible(tree.find("app").unwrap()));
        assert!(filter.is_visible(tree.find("app/models").unwrap()));
        assert!(!filter.file_visible("app/views.py"));
        assert!(!filter.is_visible(tree.find("docs").unwrap()));

        // main.go defines save_user but is not analyzable.
        assert!(!filter.file_visible("web/main.go"));
        assert!(!filter.is_visible(tree.find("web").unwrap()));
    }

    #[test]
    fn test_surrounding_whitespace_is_part_of_the_search() {
        let graph = graph();
        let filter = TreeFilter::new(&graph, " load");
        assert!(filter.is_active());
        assert!(!filter.file_visible("app/models/user.py"));
        assert!(!filter.matches("load"));
        assert!(filter.matches("reload all"));

        let filter = TreeFilter::new(&graph, "save_");
        assert!(filter.file_visible("app/models/user.py"));
    }

    #[test]
    fn test_disabled_file_matches_by_name() {
        let graph = graph();
        let filter = TreeFilter::new(&graph, "user");
        assert!(filter.file_visible("docs/USER_GUIDE.md"));
        assert!(!filter.file_visible("docs/notes.txt"));
        assert_eq!(
            filter.functions("docs/USER_GUIDE.md"),
            FunctionListing::Disabled {
                badge: "text".to_string()
            }
        );
    }

    #[test]
    fn test_function_listing_filters_and_signals_no_matches() {
        let graph = graph();

        let filter = TreeFilter::new(&graph, "load");
        match filter.functions("app/models/user.py") {
            FunctionListing::Functions(list) => {
                let names: Vec<&str> = list.iter().map(|(n, _)| *n).collect();
                assert_eq!(names, vec!["load"]);
            }
            other => panic!("Expected functions, got {other:?}"),
        }

        // File is visible through its name, yet no function matches.
        let filter = TreeFilter::new(&graph, "views");
        assert!(filter.file_visible("app/views.py"));
        assert_eq!(filter.functions("app/views.py"), FunctionListing::NoMatches);
    }

    #[test]
    fn test_prune_keeps_only_matching_branches() {
        let graph = graph();
        let tree = TreeBuilder::build(&graph);
        let filter = TreeFilter::new(&graph, "render");
        let pruned = filter.prune(&tree).unwrap();
        assert_eq!(pruned.file_paths(), vec!["app/views.py"]);

        let filter = TreeFilter::new(&graph, "no-such-thing");
        assert_eq!(filter.prune(&tree), None);
    }

    #[test]
    fn test_visible_children_order() {
        let graph = graph();
        let tree = TreeBuilder::build(&graph);
        let filter = TreeFilter::new(&graph, "");
        let app = tree.find("app").unwrap();
        let names: Vec<&str> = filter
            .visible_children(app)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["models", "views.py"]);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("a/b/c.py"), "c.py");
        assert_eq!(file_name("c.py"), "c.py");
        assert_eq!(file_name("a/b/"), "b");
    }
}
