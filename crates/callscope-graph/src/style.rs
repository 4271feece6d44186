//! Colors and node styling for the call-graph view.
//!
//! Nodes are colored by the file that defines them, using a fixed
//! categorical palette that wraps around after ten files.

use crate::graph::GraphNode;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_tuple(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    /// `#rrggbb`, alpha omitted.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn darken(&self, factor: f32) -> Self {
        let scale = |c: u8| ((c as f32) * (1.0 - factor)) as u8;
        Self::rgba(scale(self.r), scale(self.g), scale(self.b), self.a)
    }
}

/// Categorical palette, one entry per distinct file.
pub const PALETTE: [Color; 10] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
];

pub const NODE_COLOR: Color = Color::rgb(0x69, 0xb3, 0xa2);
pub const FIXTURE_COLOR: Color = Color::rgb(0xe6, 0x55, 0x0d);
pub const HOVER_COLOR: Color = Color::rgb(0xff, 0xcc, 0x00);
pub const EDGE_COLOR: Color = Color::rgb(0x99, 0x99, 0x99);
pub const LABEL_COLOR: Color = Color::rgb(0x33, 0x33, 0x33);
pub const NODE_STROKE: Color = Color::rgb(0xff, 0xff, 0xff);

pub const NODE_RADIUS: f32 = 10.0;
pub const FIXTURE_RADIUS: f32 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub fill: Color,
    pub stroke: Color,
    pub radius: f32,
}

impl NodeStyle {
    pub fn hovered(self) -> Self {
        Self {
            fill: HOVER_COLOR,
            ..self
        }
    }
}

/// Palette color for `file` given the ordered list of distinct files.
pub fn color_for(file: &str, files: &[String]) -> Color {
    files
        .iter()
        .position(|f| f == file)
        .map_or(NODE_COLOR, |idx| PALETTE[idx % PALETTE.len()])
}

/// File-to-color mapping for one view, fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct ColorAssigner {
    files: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColorAssigner {
    pub fn from_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut assigner = Self::default();
        for file in files {
            let file = file.as_ref();
            if !assigner.index.contains_key(file) {
                assigner.index.insert(file.to_string(), assigner.files.len());
                assigner.files.push(file.to_string());
            }
        }
        assigner
    }

    /// Distinct files in first-seen node order.
    pub fn from_nodes(nodes: &[GraphNode]) -> Self {
        Self::from_files(nodes.iter().map(GraphNode::file))
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn color_for(&self, file: &str) -> Color {
        self.index
            .get(file)
            .map_or(NODE_COLOR, |idx| PALETTE[idx % PALETTE.len()])
    }

    pub fn node_style(&self, node: &GraphNode) -> NodeStyle {
        if node.is_fixture {
            NodeStyle {
                fill: FIXTURE_COLOR,
                stroke: NODE_STROKE,
                radius: FIXTURE_RADIUS,
            }
        } else {
            NodeStyle {
                fill: self.color_for(node.file()),
                stroke: NODE_STROKE,
                radius: NODE_RADIUS,
            }
        }
    }
}
