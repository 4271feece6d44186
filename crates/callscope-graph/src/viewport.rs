use crate::graph::Vec2;
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 5.0;

/// Pan/zoom transform: `screen = translate + graph * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn graph_to_screen(&self, p: Vec2) -> Vec2 {
        self.translate + p * self.scale
    }

    pub fn screen_to_graph(&self, p: Vec2) -> Vec2 {
        (p - self.translate) * (1.0 / self.scale)
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.translate += delta;
    }

    /// Multiply the scale by `factor`, keeping the graph point under
    /// `anchor` (screen space) fixed. The scale is clamped to
    /// [`MIN_SCALE`, `MAX_SCALE`].
    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let fixed = self.screen_to_graph(anchor);
        self.scale = (self.scale * factor).max(MIN_SCALE).min(MAX_SCALE);
        self.translate = anchor - fixed * self.scale;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_round_trip() {
        let mut viewport = Viewport::default();
        viewport.pan_by(Vec2::new(40.0, -10.0));
        viewport.zoom_at(Vec2::new(100.0, 100.0), 2.0);
        let p = Vec2::new(12.5, 80.0);
        assert!(close(viewport.screen_to_graph(viewport.graph_to_screen(p)), p));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut viewport = Viewport::default();
        let anchor = Vec2::new(300.0, 200.0);
        let before = viewport.screen_to_graph(anchor);
        viewport.zoom_at(anchor, 1.5);
        assert!(close(viewport.screen_to_graph(anchor), before));
    }

    #[test]
    fn test_scale_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(Vec2::ZERO, 100.0);
        assert_eq!(viewport.scale, MAX_SCALE);
        viewport.zoom_at(Vec2::ZERO, 0.0001);
        assert_eq!(viewport.scale, MIN_SCALE);
        viewport.zoom_at(Vec2::ZERO, f32::NAN);
        assert_eq!(viewport.scale, MIN_SCALE);
    }
}
