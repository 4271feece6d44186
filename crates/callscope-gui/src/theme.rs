//! Shared styling helpers: spacing, corner radii, badges, cards and boxes.

use crate::settings::ThemeMode;
use eframe::egui::{self, Color32, CornerRadius};

pub mod spacing {
    pub const PANEL_PADDING_I8: i8 = 12;
    pub const ITEM_SPACING: f32 = 8.0;
    pub const SECTION_SPACING: f32 = 16.0;
}

pub mod radius {
    use eframe::egui::CornerRadius;

    pub const MEDIUM: CornerRadius = CornerRadius::same(4);
    pub const LARGE: CornerRadius = CornerRadius::same(8);
    pub const PILL: CornerRadius = CornerRadius::same(255);
}

pub fn apply(ctx: &egui::Context, mode: ThemeMode) {
    let visuals = match mode {
        ThemeMode::Light => egui::Visuals::light(),
        ThemeMode::Dark => egui::Visuals::dark(),
    };
    ctx.set_visuals(visuals);
}

pub fn to_egui_color(color: callscope_graph::Color) -> Color32 {
    let (r, g, b, a) = color.to_tuple();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

pub fn labeled_separator(ui: &mut egui::Ui, label: &str) {
    ui.horizontal(|ui| {
        ui.separator();
        ui.label(
            egui::RichText::new(label)
                .small()
                .color(ui.visuals().weak_text_color()),
        );
        ui.separator();
    });
}

pub fn badge(ui: &mut egui::Ui, text: &str, color: Color32) {
    let frame = egui::Frame::default()
        .fill(color)
        .corner_radius(radius::PILL)
        .inner_margin(egui::Margin::symmetric(6, 2));

    frame.show(ui, |ui| {
        ui.label(
            egui::RichText::new(text)
                .small()
                .color(ui.visuals().strong_text_color()),
        );
    });
}

pub fn card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    let frame = egui::Frame::default()
        .fill(ui.visuals().window_fill)
        .corner_radius(radius::LARGE)
        .inner_margin(egui::Margin::same(spacing::PANEL_PADDING_I8))
        .stroke(ui.visuals().window_stroke);

    frame.show(ui, |ui| {
        add_contents(ui);
    });
}

fn message_box(ui: &mut egui::Ui, message: &str, fg: Color32, corner: CornerRadius) {
    let frame = egui::Frame::default()
        .fill(fg.gamma_multiply(0.15))
        .corner_radius(corner)
        .inner_margin(egui::Margin::same(8));

    frame.show(ui, |ui| {
        ui.label(egui::RichText::new(message).color(fg));
    });
}

pub fn info_box(ui: &mut egui::Ui, message: &str) {
    let fg = ui.visuals().selection.bg_fill;
    message_box(ui, message, fg, radius::MEDIUM);
}

pub fn error_box(ui: &mut egui::Ui, message: &str) {
    let fg = ui.visuals().error_fg_color;
    message_box(ui, message, fg, radius::MEDIUM);
}

pub fn empty_state(ui: &mut egui::Ui, title: &str, message: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(spacing::SECTION_SPACING * 2.0);
        ui.label(egui::RichText::new(title).strong().size(18.0));
        ui.add_space(spacing::ITEM_SPACING);
        ui.label(egui::RichText::new(message).color(ui.visuals().weak_text_color()));
        ui.add_space(spacing::SECTION_SPACING);
    });
}
