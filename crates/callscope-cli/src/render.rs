use callscope_core::{Asymmetry, AsymmetrySide, CallRef, FileStatus, FunctionInfo};
use callscope_graph::{
    ColorAssigner, Direction, EdgeAggregator, ForceSimulation, FunctionListing, TreeFilter,
    TreeNode, node_radius,
};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sides {
    Outgoing,
    Incoming,
    Both,
}

pub fn tree(filter: &TreeFilter<'_>, root: &TreeNode) -> String {
    let mut out = String::new();
    if root.file_count() == 0 {
        out.push_str("(empty call graph)\n");
        return out;
    }
    let children = filter.visible_children(root);
    if children.is_empty() {
        out.push_str("No matching files\n");
        return out;
    }
    for (name, child) in children {
        write_node(&mut out, filter, name, child, 0);
    }
    out
}

fn write_node(out: &mut String, filter: &TreeFilter<'_>, name: &str, node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        TreeNode::Folder { .. } => {
            let _ = writeln!(out, "{indent}{name}/");
            for (child_name, child) in filter.visible_children(node) {
                write_node(out, filter, child_name, child, depth + 1);
            }
        }
        TreeNode::File { path } => {
            let badge = filter
                .graph()
                .get(path)
                .map(|file| FileStatus::of(path, file));
            match badge {
                Some(FileStatus::Disabled { badge }) => {
                    let _ = writeln!(out, "{indent}{name} [{badge}]");
                }
                _ => {
                    let _ = writeln!(out, "{indent}{name}");
                }
            }
        }
    }
}

fn format_ref(call: &CallRef) -> String {
    match call.line {
        Some(line) => format!("{} (line {})", call.function, line),
        None => call.function.clone(),
    }
}

fn write_refs(out: &mut String, heading: &str, refs: &[CallRef]) {
    let _ = writeln!(out, "  {heading}:");
    if refs.is_empty() {
        out.push_str("    (none)\n");
    }
    for call in refs {
        let _ = writeln!(out, "    {}", format_ref(call));
    }
}

/// Per-file overview: every (matching) function with its raw calls and callers.
pub fn functions(filter: &TreeFilter<'_>, path: &str) -> String {
    let mut out = String::new();
    match filter.functions(path) {
        FunctionListing::Disabled { badge } => {
            let _ = writeln!(out, "{path} [{badge}]: not analyzable");
        }
        FunctionListing::NoMatches => {
            let _ = writeln!(out, "{path}: no matching functions");
        }
        FunctionListing::Functions(list) => {
            let _ = writeln!(out, "{path}");
            for (name, info) in list {
                write_function(&mut out, name, info);
            }
        }
    }
    out
}

fn write_function(out: &mut String, name: &str, info: &FunctionInfo) {
    let line = info
        .line
        .map_or_else(|| "unknown".to_string(), |l| l.to_string());
    let fixture = if info.is_fixture { " [fixture]" } else { "" };
    let _ = writeln!(out, "\n{name} (line {line}){fixture}");
    let _ = writeln!(
        out,
        "  {}",
        info.docstring
            .as_deref()
            .filter(|doc| !doc.trim().is_empty())
            .unwrap_or("No docstring available")
    );
    write_refs(out, "Calls", &info.calls);
    write_refs(out, "Called by", &info.called_by);
}

pub fn edges(function: &str, info: &FunctionInfo, sides: Sides) -> String {
    let mut out = String::new();
    let mut directions = Vec::new();
    if matches!(sides, Sides::Outgoing | Sides::Both) {
        directions.push(Direction::Outgoing);
    }
    if matches!(sides, Sides::Incoming | Sides::Both) {
        directions.push(Direction::Incoming);
    }
    for direction in directions {
        for edge in EdgeAggregator::aggregate(function, info, direction) {
            let _ = writeln!(out, "{} -> {} {}", edge.source, edge.target, edge.label());
        }
    }
    if out.is_empty() {
        let _ = writeln!(out, "{function} has no edges");
    }
    out
}

#[derive(Debug, Serialize)]
pub struct LayoutReport {
    pub ticks: usize,
    pub settled: bool,
    pub nodes: Vec<NodeReport>,
    pub edges: Vec<EdgeReport>,
}

#[derive(Debug, Serialize)]
pub struct NodeReport {
    pub file: String,
    pub function: String,
    pub line: Option<u32>,
    pub is_fixture: bool,
    pub x: f32,
    pub y: f32,
    pub color: String,
    pub radius: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeReport {
    pub source: String,
    pub target: String,
    pub count: usize,
    pub lines: Vec<u32>,
}

pub fn layout(simulation: &ForceSimulation, ticks: usize) -> LayoutReport {
    let model = simulation.model();
    let colors = ColorAssigner::from_nodes(model.nodes());

    let nodes = model
        .node_indices()
        .filter_map(|idx| {
            let node = model.node_weight(idx)?;
            let position = simulation.display_position(idx)?;
            Some(NodeReport {
                file: node.file().to_string(),
                function: node.function().to_string(),
                line: node.line,
                is_fixture: node.is_fixture,
                x: position.x,
                y: position.y,
                color: colors.node_style(node).fill.to_hex(),
                radius: node_radius(node),
            })
        })
        .collect();

    let edges = model
        .edges()
        .iter()
        .map(|edge| EdgeReport {
            source: edge.source.clone(),
            target: edge.target.clone(),
            count: edge.count,
            lines: edge.display_lines(),
        })
        .collect();

    LayoutReport {
        ticks,
        settled: !simulation.is_running(),
        nodes,
        edges,
    }
}

pub fn asymmetries(found: &[Asymmetry]) -> String {
    let mut out = String::new();
    for asymmetry in found {
        let note = match asymmetry.side {
            AsymmetrySide::MissingCalledBy => "callee does not list the caller",
            AsymmetrySide::MissingCall => "caller does not list the call",
        };
        let _ = writeln!(out, "{} -> {}: {}", asymmetry.caller, asymmetry.callee, note);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use callscope_core::{CallGraph, lookup};
    use callscope_graph::{GraphModel, LayoutConfig, TreeBuilder};

    fn graph() -> CallGraph {
        serde_json::from_str(
            r#"{
                "a.py": {
                    "foo": {
                        "line": 1,
                        "docstring": "Entry point.",
                        "calls": [{"function": "bar", "line": 2}, {"function": "bar", "line": 5}],
                        "called_by": []
                    },
                    "bar": {"line": 7, "is_fixture": true, "called_by": [{"function": "foo", "line": 2}]}
                },
                "docs/readme.md": {"type": "text"},
                "web/app.go": {}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_tree_marks_disabled_files() {
        let graph = graph();
        let tree = TreeBuilder::build(&graph);
        let text = tree_text(&graph, &tree, "");
        assert_eq!(
            text,
            "docs/\n  readme.md [text]\nweb/\n  app.go [go]\na.py\n"
        );
    }

    fn tree_text(graph: &CallGraph, root: &TreeNode, search: &str) -> String {
        super::tree(&TreeFilter::new(graph, search), root)
    }

    #[test]
    fn test_tree_search_without_matches() {
        let graph = graph();
        let tree = TreeBuilder::build(&graph);
        assert_eq!(tree_text(&graph, &tree, "zzz"), "No matching files\n");
        assert_eq!(tree_text(&graph, &tree, "BAR"), "a.py\n");
    }

    #[test]
    fn test_functions_overview() {
        let graph = graph();
        let filter = TreeFilter::new(&graph, "");
        let text = functions(&filter, "a.py");
        assert!(text.contains("foo (line 1)\n  Entry point.\n  Calls:\n    bar (line 2)\n    bar (line 5)\n  Called by:\n    (none)\n"));
        assert!(text.contains("bar (line 7) [fixture]\n  No docstring available\n"));

        assert_eq!(
            functions(&filter, "docs/readme.md"),
            "docs/readme.md [text]: not analyzable\n"
        );
    }

    #[test]
    fn test_edges_both_directions() {
        let graph = graph();
        let foo = lookup(&graph, "a.py", "foo").unwrap();
        assert_eq!(edges("foo", foo, Sides::Both), "foo -> bar ×2 (lines 2, 5)\n");

        let bar = lookup(&graph, "a.py", "bar").unwrap();
        assert_eq!(edges("bar", bar, Sides::Outgoing), "bar has no edges\n");
        assert_eq!(edges("bar", bar, Sides::Incoming), "foo -> bar ×1 (line 2)\n");
    }

    #[test]
    fn test_layout_report() {
        let graph = graph();
        let model = GraphModel::for_selection(&graph, "a.py", "foo").unwrap();
        let mut simulation = ForceSimulation::new(model, LayoutConfig::default());
        let ticks = simulation.run(300);
        let report = layout(&simulation, ticks);

        assert!(report.settled);
        assert_eq!(report.nodes.len(), 2);
        assert_eq!(report.nodes[0].color, "#1f77b4");
        assert_eq!(report.nodes[1].radius, 14.0);
        assert_eq!(report.edges[0].lines, vec![2, 5]);
    }
}
