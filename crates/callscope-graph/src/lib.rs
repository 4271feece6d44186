pub mod aggregate;
pub mod filter;
pub mod graph;
pub mod hit_tester;
pub mod layout;
pub mod quadtree;
pub mod style;
pub mod tree;
pub mod viewport;

pub use aggregate::{AggregatedEdge, Direction, EdgeAggregator};
pub use filter::{FunctionListing, TreeFilter, file_name};
pub use graph::{EdgeIndex, GraphEdge, GraphModel, GraphNode, NodeIndex, Vec2};
pub use hit_tester::{HitResult, HitTester, Tooltip, node_radius};
pub use layout::{
    EdgeSummary, ForceLayouter, ForceSimulation, LINK_DISTANCE_RANGE, LayoutConfig, LayoutEngine,
    Layouter, NodeInspection, clamp_link_distance,
};
pub use quadtree::QuadTree;
pub use style::{
    Color, ColorAssigner, EDGE_COLOR, FIXTURE_COLOR, FIXTURE_RADIUS, HOVER_COLOR, LABEL_COLOR,
    NODE_COLOR, NODE_RADIUS, NODE_STROKE, NodeStyle, PALETTE, color_for,
};
pub use tree::{TreeBuilder, TreeNode};
pub use viewport::Viewport;
