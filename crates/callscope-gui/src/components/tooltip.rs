use callscope_events::TooltipInfo;
use eframe::egui;

/// Hover card next to the pointer for graph nodes and edges.
#[derive(Default)]
pub struct TooltipManager {
    pub info: Option<TooltipInfo>,
    pub position: Option<egui::Pos2>,
}

impl TooltipManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, info: TooltipInfo, pos: egui::Pos2) {
        self.info = Some(info);
        self.position = Some(pos);
    }

    pub fn hide(&mut self) {
        self.info = None;
        self.position = None;
    }

    pub fn ui(&self, ctx: &egui::Context) {
        if let (Some(info), Some(pos)) = (&self.info, self.position) {
            egui::Area::new(egui::Id::new("graph_tooltip"))
                .fixed_pos(pos + egui::vec2(14.0, 14.0))
                .order(egui::Order::Tooltip)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(egui::RichText::new(&info.title).strong());
                        ui.separator();
                        ui.label(info.description.as_str());
                    });
                });
        }
    }
}
