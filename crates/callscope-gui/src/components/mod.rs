pub mod detail_panel;
pub mod graph_canvas;
pub mod notifications;
pub mod sidebar;
pub mod tooltip;
