use crate::graph::{GraphModel, GraphNode, NodeIndex, Vec2};
use crate::quadtree::QuadTree;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Range offered by the link-distance slider.
pub const LINK_DISTANCE_RANGE: RangeInclusive<f32> = 50.0..=400.0;

const INITIAL_RADIUS: f32 = 10.0;

pub trait Layouter {
    /// Display positions for every node of `model`, in node order.
    fn execute(&self, model: &GraphModel) -> Vec<Vec2>;
}

/// Physics constants and canvas geometry for the force layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub link_distance: f32,
    pub charge_strength: f32,
    pub theta: f32,
    pub distance_min: f32,
    pub center_strength: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub drag_alpha_target: f32,
    pub velocity_decay: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            margin: 20.0,
            link_distance: 100.0,
            charge_strength: -300.0,
            theta: 0.9,
            distance_min: 1.0,
            center_strength: 1.0,
            alpha_decay: 0.1,
            alpha_min: 0.001,
            drag_alpha_target: 0.3,
            velocity_decay: 0.4,
        }
    }
}

impl LayoutConfig {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn with_link_distance(mut self, distance: f32) -> Self {
        self.link_distance = clamp_link_distance(distance);
        self
    }
}

pub fn clamp_link_distance(distance: f32) -> f32 {
    distance
        .max(*LINK_DISTANCE_RANGE.start())
        .min(*LINK_DISTANCE_RANGE.end())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSummary {
    pub function: String,
    pub count: usize,
    pub lines: Vec<u32>,
}

/// Read-only view of one node and the edges touching it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInspection {
    pub file: String,
    pub function: String,
    pub line: Option<u32>,
    pub is_fixture: bool,
    pub external: bool,
    pub calls: Vec<EdgeSummary>,
    pub called_by: Vec<EdgeSummary>,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    source: usize,
    target: usize,
    strength: f32,
    bias: f32,
}

/// Iterative link/charge/center layout over one [`GraphModel`].
///
/// Positions live on the model's nodes. Nothing here clamps physics
/// positions; only [`ForceSimulation::display_position`] does.
pub struct ForceSimulation {
    model: GraphModel,
    config: LayoutConfig,
    links: Vec<Link>,
    alpha: f32,
    alpha_target: f32,
    ticks: usize,
    jiggle_state: u32,
}

impl ForceSimulation {
    pub fn new(mut model: GraphModel, config: LayoutConfig) -> Self {
        seed_positions(model.nodes_mut(), config.center());

        let degrees = model.degrees();
        let links = model
            .edges()
            .iter()
            .filter(|edge| !edge.is_self_loop())
            .map(|edge| {
                let (s, t) = (edge.source_idx.0, edge.target_idx.0);
                let (ds, dt) = (degrees[s] as f32, degrees[t] as f32);
                Link {
                    source: s,
                    target: t,
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        tracing::debug!(
            "Starting force layout: {} nodes, {} edges",
            model.node_count(),
            model.edge_count()
        );

        Self {
            model,
            config,
            links,
            alpha: 1.0,
            alpha_target: 0.0,
            ticks: 0,
            jiggle_state: 0x9e37_79b9,
        }
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn into_model(self) -> GraphModel {
        self.model
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.alpha >= self.config.alpha_min
    }

    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.ticks += 1;
        if self.model.is_empty() {
            return;
        }

        self.apply_links();
        self.apply_charge();
        self.apply_center();

        let friction = 1.0 - self.config.velocity_decay;
        for node in self.model.nodes_mut() {
            match node.pinned {
                Some(pin) => {
                    node.position = pin;
                    node.velocity = Vec2::ZERO;
                }
                None => {
                    node.velocity = node.velocity * friction;
                    node.position += node.velocity;
                }
            }
        }
    }

    /// Tick until the layout settles or `max_ticks` is reached. Returns the
    /// number of ticks performed.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let start = self.ticks;
        while self.is_running() && self.ticks - start < max_ticks {
            self.tick();
        }
        self.ticks - start
    }

    fn jiggle(state: &mut u32) -> f32 {
        *state ^= *state << 13;
        *state ^= *state >> 17;
        *state ^= *state << 5;
        (*state as f32 / u32::MAX as f32 - 0.5) * 1e-6
    }

    fn apply_links(&mut self) {
        let alpha = self.alpha;
        let distance = self.config.link_distance;
        let nodes = self.model.nodes_mut();
        for link in &self.links {
            let (s, t) = (&nodes[link.source], &nodes[link.target]);
            let mut d = (t.position + t.velocity) - (s.position + s.velocity);
            if d.x == 0.0 {
                d.x = Self::jiggle(&mut self.jiggle_state);
            }
            if d.y == 0.0 {
                d.y = Self::jiggle(&mut self.jiggle_state);
            }
            let l = d.length();
            let d = d * ((l - distance) / l * alpha * link.strength);

            nodes[link.target].velocity = nodes[link.target].velocity - d * link.bias;
            nodes[link.source].velocity += d * (1.0 - link.bias);
        }
    }

    fn apply_charge(&mut self) {
        let positions: Vec<Vec2> = self.model.nodes().iter().map(|n| n.position).collect();
        let tree = QuadTree::build(&positions, self.config.charge_strength);
        let state = &mut self.jiggle_state;
        let mut jiggle = || Self::jiggle(state);
        for (i, node) in self.model.nodes_mut().iter_mut().enumerate() {
            node.velocity += tree.force_on(
                i,
                &positions,
                self.alpha,
                self.config.theta,
                self.config.distance_min,
                &mut jiggle,
            );
        }
    }

    fn apply_center(&mut self) {
        let nodes = self.model.nodes_mut();
        let sum = nodes.iter().fold(Vec2::ZERO, |acc, n| acc + n.position);
        let mean = sum * (1.0 / nodes.len() as f32);
        let shift = (mean - self.config.center()) * self.config.center_strength;
        for node in nodes {
            node.position = node.position - shift;
        }
    }

    pub fn position(&self, idx: NodeIndex) -> Option<Vec2> {
        self.model.node_weight(idx).map(|n| n.position)
    }

    /// Position clamped to the canvas margin, for drawing.
    pub fn display_position(&self, idx: NodeIndex) -> Option<Vec2> {
        let p = self.position(idx)?;
        let c = &self.config;
        let clamp = |v: f32, size: f32| v.min(size - c.margin).max(c.margin);
        Some(Vec2::new(clamp(p.x, c.width), clamp(p.y, c.height)))
    }

    pub fn display_positions(&self) -> Vec<Vec2> {
        self.model
            .node_indices()
            .filter_map(|idx| self.display_position(idx))
            .collect()
    }

    /// Pin the node where it is and re-heat the simulation.
    pub fn drag_start(&mut self, idx: NodeIndex) {
        let Some(node) = self.model.nodes_mut().get_mut(idx.0) else {
            return;
        };
        node.pinned = Some(node.position);
        self.alpha_target = self.config.drag_alpha_target;
        self.alpha = self.alpha.max(self.config.alpha_min);
    }

    pub fn drag_to(&mut self, idx: NodeIndex, position: Vec2) {
        if let Some(node) = self.model.nodes_mut().get_mut(idx.0) {
            node.pinned = Some(position);
            node.position = position;
        }
    }

    /// Let the simulation cool down and release the node back into it.
    pub fn drag_end(&mut self, idx: NodeIndex) {
        if let Some(node) = self.model.nodes_mut().get_mut(idx.0) {
            node.pinned = None;
        }
        self.alpha_target = 0.0;
    }

    pub fn is_dragging(&self) -> bool {
        self.model.nodes().iter().any(|n| n.pinned.is_some())
    }

    pub fn inspect(&self, idx: NodeIndex) -> Option<NodeInspection> {
        let node: &GraphNode = self.model.node_weight(idx)?;
        let mut inspection = NodeInspection {
            file: node.file().to_string(),
            function: node.function().to_string(),
            line: node.line,
            is_fixture: node.is_fixture,
            external: node.external,
            calls: Vec::new(),
            called_by: Vec::new(),
        };
        for edge in self.model.edges() {
            if edge.source_idx == idx {
                inspection.calls.push(EdgeSummary {
                    function: edge.target.clone(),
                    count: edge.count,
                    lines: edge.display_lines(),
                });
            }
            if edge.target_idx == idx {
                inspection.called_by.push(EdgeSummary {
                    function: edge.source.clone(),
                    count: edge.count,
                    lines: edge.display_lines(),
                });
            }
        }
        Some(inspection)
    }
}

/// Spread nodes on a phyllotaxis spiral around `center`.
fn seed_positions(nodes: &mut [GraphNode], center: Vec2) {
    let angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    for (i, node) in nodes.iter_mut().enumerate() {
        let radius = INITIAL_RADIUS * (0.5 + i as f32).sqrt();
        let theta = i as f32 * angle;
        node.position = center + Vec2::new(radius * theta.cos(), radius * theta.sin());
        node.velocity = Vec2::ZERO;
        node.pinned = None;
    }
}

/// Owns the single live simulation. Loading a new model drops the old one.
#[derive(Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
    simulation: Option<ForceSimulation>,
    generation: u64,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            simulation: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn simulation(&self) -> Option<&ForceSimulation> {
        self.simulation.as_ref()
    }

    pub fn simulation_mut(&mut self) -> Option<&mut ForceSimulation> {
        self.simulation.as_mut()
    }

    pub fn load(&mut self, model: GraphModel) -> u64 {
        self.simulation = Some(ForceSimulation::new(model, self.config.clone()));
        self.generation += 1;
        self.generation
    }

    pub fn clear(&mut self) {
        if self.simulation.take().is_some() {
            self.generation += 1;
        }
    }

    /// Restart the current layout from scratch with new constants.
    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
        if let Some(simulation) = self.simulation.take() {
            self.load(simulation.into_model());
        }
    }

    pub fn set_link_distance(&mut self, distance: f32) {
        let config = self.config.clone().with_link_distance(distance);
        self.set_config(config);
    }

    /// One step of the live simulation, if it is still running.
    pub fn tick(&mut self) -> bool {
        match self.simulation.as_mut() {
            Some(simulation) if simulation.is_running() => {
                simulation.tick();
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.simulation.as_ref().is_some_and(ForceSimulation::is_running)
    }
}

/// Runs a fresh simulation to convergence.
pub struct ForceLayouter {
    pub config: LayoutConfig,
    pub max_ticks: usize,
}

impl Default for ForceLayouter {
    fn default() -> Self {
        Self {
            config: LayoutConfig::default(),
            max_ticks: 300,
        }
    }
}

impl Layouter for ForceLayouter {
    fn execute(&self, model: &GraphModel) -> Vec<Vec2> {
        let mut simulation = ForceSimulation::new(model.clone(), self.config.clone());
        let ticks = simulation.run(self.max_ticks);
        if simulation.is_running() {
            tracing::warn!(
                "Layout still moving after {} ticks (alpha {:.4})",
                ticks,
                simulation.alpha()
            );
        }
        simulation.display_positions()
    }
}
