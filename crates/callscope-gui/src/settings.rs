use callscope_graph::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub theme: ThemeMode,
    pub show_tooltips: bool,
    pub window_width: f32,
    pub window_height: f32,
    pub auto_open_last_file: bool,
    pub last_opened_file: Option<PathBuf>,
    pub layout: LayoutConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Light,
            show_tooltips: true,
            window_width: 1280.0,
            window_height: 800.0,
            auto_open_last_file: true,
            last_opened_file: None,
            layout: LayoutConfig::default(),
        }
    }
}

impl AppSettings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("callscope").join("settings.json"))
    }

    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Settings at `path`, or defaults when the file is missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        tracing::info!("Loading settings from {:?}", path);
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::error!("Failed to parse settings: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Some(path) = Self::default_path()
            && let Err(e) = self.save_to(&path)
        {
            tracing::error!("Failed to save settings to {:?}: {}", path, e);
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = AppSettings::default();
        settings.theme = ThemeMode::Dark;
        settings.layout.link_distance = 220.0;
        settings.last_opened_file = Some(PathBuf::from("/tmp/graph.json"));
        settings.save_to(&path).unwrap();

        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_or_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"show_tooltips": false, "layout": {"link_distance": 80}}"#)
            .unwrap();

        let settings = AppSettings::load_from(&path);
        assert!(!settings.show_tooltips);
        assert_eq!(settings.layout.link_distance, 80.0);
        assert_eq!(settings.layout.charge_strength, -300.0);
        assert_eq!(settings.window_width, 1280.0);
    }
}
