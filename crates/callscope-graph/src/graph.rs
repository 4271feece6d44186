use crate::aggregate::{AggregatedEdge, Direction, EdgeAggregator};
use callscope_core::{CallGraph, FunctionInfo, FunctionRef, Result, lookup, resolve_definition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// A function in the current view.
///
/// `position`/`velocity` belong to the physics; `pinned` is the fixed
/// position held while the node is dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: FunctionRef,
    pub line: Option<u32>,
    pub is_fixture: bool,
    /// No file in the graph defines this function (builtins, unanalyzed
    /// code); `id.file` is then the selected file.
    #[serde(default)]
    pub external: bool,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pinned: Option<Vec2>,
}

impl GraphNode {
    pub fn new(id: FunctionRef, line: Option<u32>, is_fixture: bool) -> Self {
        Self {
            id,
            line,
            is_fixture,
            external: false,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pinned: None,
        }
    }

    pub fn file(&self) -> &str {
        &self.id.file
    }

    pub fn function(&self) -> &str {
        &self.id.function
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub count: usize,
    pub lines: Vec<Option<u32>>,
    pub source_idx: NodeIndex,
    pub target_idx: NodeIndex,
}

impl GraphEdge {
    pub fn display_lines(&self) -> Vec<u32> {
        self.lines.iter().flatten().copied().collect()
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_idx == self.target_idx
    }
}

/// Nodes and aggregated edges for one selected function.
///
/// Nodes are keyed by function name: a view never shows two functions with
/// the same name.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    node_map: HashMap<String, NodeIndex>,
    pub root: Option<NodeIndex>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_selection(graph: &CallGraph, file: &str, function: &str) -> Result<GraphModel> {
        let info = lookup(graph, file, function)?;
        let mut model = GraphModel::new();

        for name in EdgeAggregator::node_names(function, info) {
            let node = if name == function {
                GraphNode::new(FunctionRef::new(file, function), info.line, info.is_fixture)
            } else {
                neighbor_node(graph, file, name, info)
            };
            let idx = model.add_node(node);
            if name == function {
                model.root = Some(idx);
            }
        }

        let outgoing = EdgeAggregator::aggregate(function, info, Direction::Outgoing);
        let has_self_loop = outgoing.iter().any(|edge| edge.target == function);
        for edge in outgoing {
            model.add_edge(edge);
        }
        for edge in EdgeAggregator::aggregate(function, info, Direction::Incoming) {
            // A recursive call shows up in both lists.
            if has_self_loop && edge.source == function {
                continue;
            }
            model.add_edge(edge);
        }

        tracing::debug!(
            "Built view for {}:{} with {} nodes and {} edges",
            file,
            function,
            model.node_count(),
            model.edge_count()
        );
        Ok(model)
    }

    /// Assemble a model from loose parts. Edges naming unknown nodes are
    /// dropped.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = GraphNode>,
        edges: impl IntoIterator<Item = AggregatedEdge>,
    ) -> Self {
        let mut model = GraphModel::new();
        for node in nodes {
            model.add_node(node);
        }
        for edge in edges {
            model.add_edge(edge);
        }
        model
    }

    /// Insert a node, returning the existing index when the name is taken.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(node.function()) {
            return idx;
        }
        let idx = NodeIndex(self.nodes.len());
        self.node_map.insert(node.function().to_string(), idx);
        self.nodes.push(node);
        idx
    }

    pub fn add_edge(&mut self, edge: AggregatedEdge) -> Option<EdgeIndex> {
        let (Some(&source_idx), Some(&target_idx)) =
            (self.node_map.get(&edge.source), self.node_map.get(&edge.target))
        else {
            tracing::trace!(
                "Dropping edge {} -> {}: endpoint not in view",
                edge.source,
                edge.target
            );
            return None;
        };
        let idx = EdgeIndex(self.edges.len());
        self.edges.push(GraphEdge {
            source: edge.source,
            target: edge.target,
            count: edge.count,
            lines: edge.lines,
            source_idx,
            target_idx,
        });
        Some(idx)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [GraphNode] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_indices(&self) -> impl DoubleEndedIterator<Item = NodeIndex> + use<> {
        (0..self.nodes.len()).map(NodeIndex)
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> + use<> {
        (0..self.edges.len()).map(EdgeIndex)
    }

    pub fn node_weight(&self, index: NodeIndex) -> Option<&GraphNode> {
        self.nodes.get(index.0)
    }

    pub fn edge_weight(&self, index: EdgeIndex) -> Option<&GraphEdge> {
        self.edges.get(index.0)
    }

    pub fn index_of(&self, function: &str) -> Option<NodeIndex> {
        self.node_map.get(function).copied()
    }

    /// Number of edge endpoints touching each node; a self-loop counts twice.
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.nodes.len()];
        for edge in &self.edges {
            degrees[edge.source_idx.0] += 1;
            degrees[edge.target_idx.0] += 1;
        }
        degrees
    }
}

fn neighbor_node(graph: &CallGraph, file: &str, name: &str, selected: &FunctionInfo) -> GraphNode {
    match resolve_definition(graph, file, name) {
        Some((def_file, def)) => {
            GraphNode::new(FunctionRef::new(def_file, name), def.line, def.is_fixture)
        }
        None => {
            let line = selected
                .calls
                .iter()
                .chain(&selected.called_by)
                .find(|call| call.function == name)
                .and_then(|call| call.line);
            GraphNode {
                external: true,
                ..GraphNode::new(FunctionRef::new(file, name), line, false)
            }
        }
    }
}

impl Index<NodeIndex> for GraphModel {
    type Output = GraphNode;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl IndexMut<NodeIndex> for GraphModel {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index.0]
    }
}

impl Index<EdgeIndex> for GraphModel {
    type Output = GraphEdge;
    fn index(&self, index: EdgeIndex) -> &Self::Output {
        &self.edges[index.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callscope_core::CallscopeError;

    fn graph() -> CallGraph {
        serde_json::from_str(
            r#"{
                "a.py": {
                    "foo": {
                        "line": 1,
                        "calls": [{"function": "bar", "line": 2}, {"function": "bar", "line": 5}],
                        "called_by": []
                    },
                    "bar": {"line": 8, "calls": [], "called_by": [{"function": "foo", "line": 2}]}
                },
                "lib/util.py": {
                    "helper": {"line": 4, "is_fixture": true},
                    "fact": {
                        "line": 10,
                        "calls": [{"function": "fact", "line": 12}, {"function": "helper", "line": 11}, {"function": "print", "line": 13}],
                        "called_by": [{"function": "fact", "line": 12}, {"function": "main", "line": 30}]
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_two_calls_collapse_to_one_edge() {
        let graph = graph();
        let model = GraphModel::for_selection(&graph, "a.py", "foo").unwrap();

        let names: Vec<&str> = model.nodes().iter().map(GraphNode::function).collect();
        assert_eq!(names, vec!["foo", "bar"]);
        assert_eq!(model.root, Some(NodeIndex(0)));
        assert_eq!(model.edge_count(), 1);

        let edge = &model.edges()[0];
        assert_eq!((edge.source.as_str(), edge.target.as_str()), ("foo", "bar"));
        assert_eq!(edge.count, 2);
        assert_eq!(edge.display_lines(), vec![2, 5]);
        assert_eq!(model[edge.target_idx].line, Some(8));
    }

    #[test]
    fn test_neighbor_resolution_and_fallback_lines() {
        let graph = graph();
        let model = GraphModel::for_selection(&graph, "lib/util.py", "fact").unwrap();

        let helper = &model[model.index_of("helper").unwrap()];
        assert_eq!(helper.file(), "lib/util.py");
        assert!(helper.is_fixture);
        assert_eq!(helper.line, Some(4));

        // Undefined names stay in the selected file with the call-site line.
        let print = &model[model.index_of("print").unwrap()];
        assert_eq!(print.file(), "lib/util.py");
        assert_eq!(print.line, Some(13));
        assert!(!print.is_fixture);
        assert!(print.external);
        assert!(!model[model.index_of("helper").unwrap()].external);

        let main = &model[model.index_of("main").unwrap()];
        assert_eq!(main.line, Some(30));
    }

    #[test]
    fn test_recursive_call_is_one_self_loop() {
        let graph = graph();
        let model = GraphModel::for_selection(&graph, "lib/util.py", "fact").unwrap();

        let loops: Vec<&GraphEdge> = model.edges().iter().filter(|e| e.is_self_loop()).collect();
        assert_eq!(loops.len(), 1);
        // fact->fact, fact->helper, fact->print, main->fact
        assert_eq!(model.edge_count(), 4);
        assert_eq!(model.degrees()[0], 5);
    }

    #[test]
    fn test_unknown_selection_is_an_error() {
        let graph = graph();
        assert!(matches!(
            GraphModel::for_selection(&graph, "b.py", "foo"),
            Err(CallscopeError::UnknownFile(_))
        ));
        assert!(matches!(
            GraphModel::for_selection(&graph, "a.py", "nope"),
            Err(CallscopeError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn test_edges_with_missing_endpoints_are_dropped() {
        let model = GraphModel::from_parts(
            [GraphNode::new(FunctionRef::new("a.py", "foo"), None, false)],
            [AggregatedEdge {
                source: "foo".to_string(),
                target: "ghost".to_string(),
                count: 1,
                lines: vec![None],
            }],
        );
        assert_eq!(model.node_count(), 1);
        assert_eq!(model.edge_count(), 0);
    }

    #[test]
    fn test_add_node_deduplicates_by_name() {
        let mut model = GraphModel::new();
        let a = model.add_node(GraphNode::new(FunctionRef::new("a.py", "f"), None, false));
        let b = model.add_node(GraphNode::new(FunctionRef::new("b.py", "f"), None, false));
        assert_eq!(a, b);
        assert_eq!(model.node_count(), 1);
        assert_eq!(model[a].file(), "a.py");
    }
}
