use callscope_core::{CallRef, FunctionInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Group `calls` by callee.
    Outgoing,
    /// Group `called_by` by caller.
    Incoming,
}

/// One edge per distinct (source, target) pair with every call-site line.
///
/// `lines` keeps unknown lines as `None`; they are dropped only for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedEdge {
    pub source: String,
    pub target: String,
    pub count: usize,
    pub lines: Vec<Option<u32>>,
}

impl AggregatedEdge {
    pub fn display_lines(&self) -> Vec<u32> {
        self.lines.iter().flatten().copied().collect()
    }

    pub fn label(&self) -> String {
        let lines = self.display_lines();
        if lines.is_empty() {
            return format!("×{}", self.count);
        }
        let joined = lines
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let noun = if lines.len() == 1 { "line" } else { "lines" };
        format!("×{} ({} {})", self.count, noun, joined)
    }
}

pub struct EdgeAggregator;

impl EdgeAggregator {
    pub fn aggregate(function: &str, info: &FunctionInfo, direction: Direction) -> Vec<AggregatedEdge> {
        let refs = match direction {
            Direction::Outgoing => &info.calls,
            Direction::Incoming => &info.called_by,
        };
        Self::aggregate_refs(function, refs, direction)
    }

    /// Group raw call sites by neighbor, in first-encounter order.
    pub fn aggregate_refs(
        function: &str,
        refs: &[CallRef],
        direction: Direction,
    ) -> Vec<AggregatedEdge> {
        let mut edges: Vec<AggregatedEdge> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        for call in refs {
            let slot = *slots.entry(call.function.as_str()).or_insert_with(|| {
                let (source, target) = match direction {
                    Direction::Outgoing => (function.to_string(), call.function.clone()),
                    Direction::Incoming => (call.function.clone(), function.to_string()),
                };
                edges.push(AggregatedEdge {
                    source,
                    target,
                    count: 0,
                    lines: Vec::new(),
                });
                edges.len() - 1
            });
            let edge = &mut edges[slot];
            edge.count += 1;
            edge.lines.push(call.line);
        }

        edges
    }

    /// Node names for a selection: the function itself, then distinct
    /// callees, then distinct callers, each name once.
    pub fn node_names<'a>(function: &'a str, info: &'a FunctionInfo) -> Vec<&'a str> {
        let mut names = vec![function];
        for call in info.calls.iter().chain(&info.called_by) {
            let name = call.function.as_str();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}
