use crate::theme::{empty_state, spacing, to_egui_color};
use callscope_events::{Event, EventBus, TooltipInfo};
use callscope_graph::{
    ColorAssigner, EDGE_COLOR, ForceSimulation, GraphEdge, HitResult, HitTester, LABEL_COLOR,
    LINK_DISTANCE_RANGE, LayoutEngine, NodeIndex, Vec2, Viewport, node_radius,
};
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke};

const ARROW_LENGTH: f32 = 8.0;
const ARROW_WIDTH: f32 = 4.0;
const SCROLL_ZOOM_SPEED: f32 = 0.002;

/// What the canvas wants the app to do after a frame.
#[derive(Debug, Default)]
pub struct GraphCanvasOutput {
    pub hover: Option<(TooltipInfo, Pos2)>,
}

/// Force-directed call graph view with pan, zoom and node dragging.
pub struct GraphCanvas {
    viewport: Viewport,
    dragging: Option<NodeIndex>,
    link_distance: f32,
    shown_generation: u64,
    size: Option<egui::Vec2>,
}

impl GraphCanvas {
    pub fn new(link_distance: f32) -> Self {
        Self {
            viewport: Viewport::default(),
            dragging: None,
            link_distance,
            shown_generation: 0,
            size: None,
        }
    }

    /// Size of the drawing area in the last frame, used to size new layouts.
    pub fn canvas_size(&self) -> Option<egui::Vec2> {
        self.size
    }

    pub fn set_link_distance(&mut self, distance: f32) {
        self.link_distance = distance;
    }

    pub fn toolbar(&mut self, ui: &mut egui::Ui, bus: &EventBus) {
        ui.horizontal(|ui| {
            ui.label("Link distance");
            let slider = egui::Slider::new(&mut self.link_distance, LINK_DISTANCE_RANGE)
                .step_by(1.0)
                .suffix(" px");
            if ui.add(slider).changed() {
                bus.publish(Event::LinkDistanceChanged {
                    distance: self.link_distance,
                });
            }
            ui.add_space(spacing::ITEM_SPACING);
            if ui.button("Reset view").clicked() {
                self.viewport.reset();
            }
            ui.weak(format!("{:.0}%", self.viewport.scale * 100.0));
        });
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        engine: &mut LayoutEngine,
        colors: &ColorAssigner,
        bus: &EventBus,
    ) -> GraphCanvasOutput {
        let mut output = GraphCanvasOutput::default();
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        self.size = Some(rect.size());
        painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);

        if engine.generation() != self.shown_generation {
            self.shown_generation = engine.generation();
            self.viewport.reset();
            self.dragging = None;
        }

        let Some(simulation) = engine.simulation_mut() else {
            let mut child = ui.new_child(egui::UiBuilder::new().max_rect(rect));
            empty_state(
                &mut child,
                "No function selected",
                "Select a function to see who it calls and who calls it",
            );
            return output;
        };
        if simulation.model().is_empty() {
            return output;
        }

        let origin = rect.min;
        self.handle_zoom(ui, &response, origin);

        let tester = HitTester::with_tolerance(HitTester::default().tolerance / self.viewport.scale);
        let pointer = response
            .interact_pointer_pos()
            .or_else(|| response.hover_pos());
        let hit = match pointer {
            Some(pos) => tester.hit(simulation, self.to_graph(origin, pos)),
            None => HitResult::None,
        };

        if response.drag_started()
            && let HitResult::Node(idx) = hit
        {
            simulation.drag_start(idx);
            self.dragging = Some(idx);
        }
        if response.dragged() {
            match (self.dragging, pointer) {
                (Some(idx), Some(pos)) => simulation.drag_to(idx, self.to_graph(origin, pos)),
                _ => {
                    let delta = response.drag_delta();
                    self.viewport.pan_by(Vec2::new(delta.x, delta.y));
                }
            }
        }
        if response.drag_stopped()
            && let Some(idx) = self.dragging.take()
        {
            simulation.drag_end(idx);
        }

        if response.clicked()
            && let HitResult::Node(idx) = hit
        {
            bus.publish(Event::NodeInspected {
                function: Some(simulation.model()[idx].function().to_string()),
            });
        }

        let hovered = self.dragging.map_or(hit, HitResult::Node);
        self.paint(ui, &painter, simulation, colors, origin, hovered);

        if self.dragging.is_none()
            && let Some(pos) = response.hover_pos()
            && let Some(info) = tester.tooltip(simulation, hit)
        {
            output.hover = Some((info, pos));
        }
        output
    }

    fn handle_zoom(&mut self, ui: &egui::Ui, response: &egui::Response, origin: Pos2) {
        let Some(pointer) = response.hover_pos() else {
            return;
        };
        let (pinch, scroll) = ui.input(|i| (i.zoom_delta(), i.smooth_scroll_delta.y));
        let factor = pinch * scroll_zoom_factor(scroll);
        if (factor - 1.0).abs() > f32::EPSILON {
            self.viewport
                .zoom_at(Vec2::new(pointer.x - origin.x, pointer.y - origin.y), factor);
        }
    }

    fn to_screen(&self, origin: Pos2, p: Vec2) -> Pos2 {
        let s = self.viewport.graph_to_screen(p);
        origin + egui::vec2(s.x, s.y)
    }

    fn to_graph(&self, origin: Pos2, pos: Pos2) -> Vec2 {
        self.viewport
            .screen_to_graph(Vec2::new(pos.x - origin.x, pos.y - origin.y))
    }

    fn paint(
        &self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        simulation: &ForceSimulation,
        colors: &ColorAssigner,
        origin: Pos2,
        hovered: HitResult,
    ) {
        let model = simulation.model();
        let scale = self.viewport.scale;
        let screen: Vec<Pos2> = simulation
            .display_positions()
            .into_iter()
            .map(|p| self.to_screen(origin, p))
            .collect();
        let label_color = if ui.visuals().dark_mode {
            ui.visuals().text_color()
        } else {
            to_egui_color(LABEL_COLOR)
        };

        for (idx, edge) in model.edge_indices().zip(model.edges()) {
            let (Some(&from), Some(&to)) =
                (screen.get(edge.source_idx.0), screen.get(edge.target_idx.0))
            else {
                continue;
            };
            let color = if hovered == HitResult::Edge(idx) {
                to_egui_color(EDGE_COLOR.darken(0.4))
            } else {
                to_egui_color(EDGE_COLOR)
            };
            let target_radius = node_radius(&model[edge.target_idx]) * scale;
            paint_edge(painter, edge, from, to, target_radius, color, label_color);
        }

        for idx in model.node_indices() {
            let Some(&center) = screen.get(idx.0) else {
                continue;
            };
            let node = &model[idx];
            let mut style = colors.node_style(node);
            if hovered == HitResult::Node(idx) {
                style = style.hovered();
            }
            let radius = style.radius * scale;
            painter.circle_filled(center, radius, to_egui_color(style.fill));
            painter.circle_stroke(center, radius, Stroke::new(1.5, to_egui_color(style.stroke)));
            painter.text(
                center - egui::vec2(0.0, radius + 4.0),
                Align2::CENTER_BOTTOM,
                node.function(),
                FontId::proportional(12.0),
                label_color,
            );
        }
    }
}

fn paint_edge(
    painter: &egui::Painter,
    edge: &GraphEdge,
    from: Pos2,
    to: Pos2,
    target_radius: f32,
    color: Color32,
    label_color: Color32,
) {
    let width = edge_width(edge.count);
    if edge.is_self_loop() {
        let loop_radius = target_radius * 0.9;
        let center = from + egui::vec2(target_radius, -target_radius);
        painter.circle_stroke(center, loop_radius, Stroke::new(width, color));
        painter.text(
            center + egui::vec2(loop_radius, -loop_radius),
            Align2::LEFT_BOTTOM,
            format!("×{}", edge.count),
            FontId::proportional(10.0),
            label_color,
        );
        return;
    }

    let Some([tip, left, right]) = arrow_head(from, to, target_radius) else {
        return;
    };
    painter.line_segment([from, tip], Stroke::new(width, color));
    painter.add(Shape::convex_polygon(vec![tip, left, right], color, Stroke::NONE));
    if edge.count > 1 {
        painter.text(
            from + (tip - from) * 0.5,
            Align2::CENTER_CENTER,
            format!("×{}", edge.count),
            FontId::proportional(10.0),
            label_color,
        );
    }
}

fn edge_width(count: usize) -> f32 {
    1.0 + 0.5 * count.min(5) as f32
}

/// Tip and base corners of an arrow ending on the target's rim, or `None`
/// when the endpoints overlap.
fn arrow_head(from: Pos2, to: Pos2, target_radius: f32) -> Option<[Pos2; 3]> {
    let delta = to - from;
    let length = delta.length();
    if length <= target_radius || length < f32::EPSILON {
        return None;
    }
    let dir = delta / length;
    let tip = to - dir * target_radius;
    let base = tip - dir * ARROW_LENGTH;
    let normal = egui::vec2(-dir.y, dir.x) * ARROW_WIDTH;
    Some([tip, base + normal, base - normal])
}

fn scroll_zoom_factor(scroll: f32) -> f32 {
    (scroll * SCROLL_ZOOM_SPEED).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_head_stops_at_target_rim() {
        let [tip, left, right] =
            arrow_head(Pos2::new(0.0, 0.0), Pos2::new(100.0, 0.0), 10.0).unwrap();
        assert_eq!(tip, Pos2::new(90.0, 0.0));
        assert_eq!(left, Pos2::new(82.0, 4.0));
        assert_eq!(right, Pos2::new(82.0, -4.0));
    }

    #[test]
    fn test_arrow_head_skips_overlapping_nodes() {
        assert!(arrow_head(Pos2::new(0.0, 0.0), Pos2::new(5.0, 0.0), 10.0).is_none());
        assert!(arrow_head(Pos2::new(3.0, 3.0), Pos2::new(3.0, 3.0), 0.0).is_none());
    }

    #[test]
    fn test_scroll_zoom_factor() {
        assert_eq!(scroll_zoom_factor(0.0), 1.0);
        assert!(scroll_zoom_factor(50.0) > 1.0);
        assert!(scroll_zoom_factor(-50.0) < 1.0);
    }

    #[test]
    fn test_screen_graph_conversion_round_trips() {
        let mut canvas = GraphCanvas::new(100.0);
        canvas.viewport.zoom_at(Vec2::new(40.0, 30.0), 2.0);
        canvas.viewport.pan_by(Vec2::new(15.0, -5.0));
        let origin = Pos2::new(200.0, 50.0);

        let p = Vec2::new(123.0, 77.0);
        let back = canvas.to_graph(origin, canvas.to_screen(origin, p));
        assert!(back.distance(p) < 1e-3);
    }

    #[test]
    fn test_edge_width_is_capped() {
        assert_eq!(edge_width(1), 1.5);
        assert_eq!(edge_width(5), 3.5);
        assert_eq!(edge_width(50), 3.5);
    }
}
