use eframe::egui;
use egui_notify::{Anchor, Toast, Toasts};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Toasts for load results and analyzer failures.
pub struct NotificationManager {
    toasts: Toasts,
    recent: Vec<(String, Instant)>,
    dedup_window: Duration,
}

impl NotificationManager {
    pub fn new() -> Self {
        let toasts = Toasts::new()
            .with_anchor(Anchor::TopRight)
            .with_margin(egui::vec2(8.0, 8.0));

        Self {
            toasts,
            recent: Vec::new(),
            dedup_window: Duration::from_secs(2),
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        let message = message.into();
        if self.is_duplicate(&message) {
            return;
        }
        self.recent.push((message.clone(), Instant::now()));

        let mut toast = match level {
            NotificationLevel::Info => Toast::info(&message),
            NotificationLevel::Error => Toast::error(&message),
        };
        match level {
            NotificationLevel::Info => {
                toast.duration(Some(Duration::from_secs(3)));
            }
            NotificationLevel::Error => {
                toast.duration(Some(Duration::from_secs(8))).closable(true);
            }
        }
        self.toasts.add(toast);
    }

    /// Same message within the dedup window.
    fn is_duplicate(&mut self, message: &str) -> bool {
        let now = Instant::now();
        self.recent
            .retain(|(_, at)| now.duration_since(*at) < Duration::from_secs(60));
        self.recent
            .iter()
            .any(|(msg, at)| msg == message && now.duration_since(*at) < self.dedup_window)
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, message);
    }

    pub fn render(&mut self, ctx: &egui::Context) {
        self.toasts.show(ctx);
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}
