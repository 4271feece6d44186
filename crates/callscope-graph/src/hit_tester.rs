use crate::graph::{EdgeIndex, GraphEdge, GraphNode, NodeIndex, Vec2};
use crate::layout::ForceSimulation;
use crate::style::{FIXTURE_RADIUS, NODE_RADIUS};
use callscope_events::TooltipInfo;

/// Result of a hit test at a given position.
///
/// Nodes win over edges when both are under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    None,
    Node(NodeIndex),
    Edge(EdgeIndex),
}

/// Pointer picking in graph coordinates against display positions.
#[derive(Debug, Clone, Copy)]
pub struct HitTester {
    /// Extra slack around nodes and edges, in graph units.
    pub tolerance: f32,
}

impl Default for HitTester {
    fn default() -> Self {
        Self { tolerance: 4.0 }
    }
}

impl HitTester {
    pub fn with_tolerance(tolerance: f32) -> Self {
        Self { tolerance }
    }

    pub fn hit(&self, simulation: &ForceSimulation, point: Vec2) -> HitResult {
        if let Some(idx) = self.node_at(simulation, point) {
            return HitResult::Node(idx);
        }
        match self.edge_at(simulation, point) {
            Some(idx) => HitResult::Edge(idx),
            None => HitResult::None,
        }
    }

    /// Topmost node under `point`. Later nodes are drawn on top.
    pub fn node_at(&self, simulation: &ForceSimulation, point: Vec2) -> Option<NodeIndex> {
        let model = simulation.model();
        model
            .node_indices()
            .rev()
            .find(|&idx| {
                let radius = node_radius(&model[idx]) + self.tolerance;
                simulation
                    .display_position(idx)
                    .is_some_and(|p| p.distance(point) <= radius)
            })
    }

    /// Nearest edge within tolerance of `point`. Self-loops are not pickable.
    pub fn edge_at(&self, simulation: &ForceSimulation, point: Vec2) -> Option<EdgeIndex> {
        let model = simulation.model();
        model
            .edge_indices()
            .filter_map(|idx| {
                let edge = &model[idx];
                if edge.is_self_loop() {
                    return None;
                }
                let a = simulation.display_position(edge.source_idx)?;
                let b = simulation.display_position(edge.target_idx)?;
                let d = distance_to_segment(point, a, b);
                (d <= self.tolerance).then_some((idx, d))
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, _)| idx)
    }

    pub fn tooltip(&self, simulation: &ForceSimulation, hit: HitResult) -> Option<TooltipInfo> {
        let model = simulation.model();
        match hit {
            HitResult::None => None,
            HitResult::Node(idx) => model.node_weight(idx).map(Tooltip::for_node),
            HitResult::Edge(idx) => model.edge_weight(idx).map(Tooltip::for_edge),
        }
    }
}

pub fn node_radius(node: &GraphNode) -> f32 {
    if node.is_fixture {
        FIXTURE_RADIUS
    } else {
        NODE_RADIUS
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len_sq;
    let t = t.max(0.0).min(1.0);
    p.distance(a + ab * t)
}

/// Hover text for nodes and edges.
pub struct Tooltip;

impl Tooltip {
    pub fn for_node(node: &GraphNode) -> TooltipInfo {
        let mut description = format!(
            "File: {}\nLine: {}\nFunction: {}",
            node.file(),
            format_line(node.line),
            node.function()
        );
        if node.is_fixture {
            description.push_str("\n(fixture)");
        }
        TooltipInfo {
            title: node.function().to_string(),
            description,
        }
    }

    pub fn for_edge(edge: &GraphEdge) -> TooltipInfo {
        let lines = edge.display_lines();
        let description = if lines.is_empty() {
            "Line: unknown".to_string()
        } else {
            let joined: Vec<String> = lines.iter().map(u32::to_string).collect();
            format!("Line: {}", joined.join(", "))
        };
        TooltipInfo {
            title: format!("{} → {} (×{})", edge.source, edge.target, edge.count),
            description,
        }
    }
}

fn format_line(line: Option<u32>) -> String {
    line.map_or_else(|| "unknown".to_string(), |l| l.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphModel;
    use crate::layout::LayoutConfig;
    use callscope_core::CallGraph;

    fn simulation() -> ForceSimulation {
        let graph: CallGraph = serde_json::from_str(
            r#"{
                "a.py": {
                    "foo": {"line": 1, "calls": [{"function": "bar", "line": 2}, {"function": "bar", "line": 5}]},
                    "bar": {"line": 8, "is_fixture": true}
                }
            }"#,
        )
        .unwrap();
        let model = GraphModel::for_selection(&graph, "a.py", "foo").unwrap();
        let mut simulation = ForceSimulation::new(model, LayoutConfig::default());
        simulation.run(1000);
        simulation
    }

    #[test]
    fn test_node_hit_wins_over_edge() {
        let simulation = simulation();
        let tester = HitTester::default();
        let foo = simulation.display_position(NodeIndex(0)).unwrap();
        assert_eq!(tester.hit(&simulation, foo), HitResult::Node(NodeIndex(0)));
    }

    #[test]
    fn test_edge_hit_at_midpoint() {
        let simulation = simulation();
        let tester = HitTester::default();
        let a = simulation.display_position(NodeIndex(0)).unwrap();
        let b = simulation.display_position(NodeIndex(1)).unwrap();
        let mid = (a + b) * 0.5;
        assert_eq!(tester.hit(&simulation, mid), HitResult::Edge(EdgeIndex(0)));

        let tooltip = tester
            .tooltip(&simulation, HitResult::Edge(EdgeIndex(0)))
            .unwrap();
        assert_eq!(tooltip.description, "Line: 2, 5");
    }

    #[test]
    fn test_miss_far_away() {
        let simulation = simulation();
        let tester = HitTester::default();
        let far = Vec2::new(-1.0e4, -1.0e4);
        assert_eq!(tester.hit(&simulation, far), HitResult::None);
        assert!(tester.tooltip(&simulation, HitResult::None).is_none());
    }

    #[test]
    fn test_node_tooltip_marks_fixtures() {
        let simulation = simulation();
        let bar = &simulation.model()[NodeIndex(1)];
        let info = Tooltip::for_node(bar);
        assert_eq!(info.title, "bar");
        assert_eq!(info.description, "File: a.py\nLine: 8\nFunction: bar\n(fixture)");
        assert_eq!(node_radius(bar), FIXTURE_RADIUS);
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Vec2::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Vec2::new(-4.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Vec2::new(1.0, 1.0), a, a), 2.0_f32.sqrt());
    }
}
