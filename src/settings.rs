//! Persistent user settings.

use dirs_next as dirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::aggregation::TimeFrame;
use crate::body::BodyView;

fn default_language() -> String {
    "en".into()
}

fn default_true() -> bool {
    true
}

/// Configuration stored as JSON in the platform config directory.
///
/// Every field falls back to its default when missing, so files written by
/// older versions keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Folder holding one markdown note per exercise.
    #[serde(default)]
    pub exercise_folder: Option<PathBuf>,
    /// Optional `tag,muscleGroup[,language]` table replacing the built-in one.
    #[serde(default)]
    pub tag_map_csv: Option<PathBuf>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub time_frame: TimeFrame,
    #[serde(default)]
    pub view: BodyView,
    #[serde(default = "default_true")]
    pub auto_load_last: bool,
    #[serde(default)]
    pub last_file: Option<String>,
}

impl Settings {
    const FILE: &'static str = "muscle_heat_map_settings.json";

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(Self::FILE))
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load() -> Self {
        if let Some(path) = Self::path() {
            if let Ok(data) = std::fs::read_to_string(&path) {
                match serde_json::from_str(&data) {
                    Ok(cfg) => return cfg,
                    Err(e) => log::warn!("Ignoring invalid settings at {}: {e}", path.display()),
                }
            }
        }
        Self::default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(data) = serde_json::to_string_pretty(self) {
                if let Err(e) = std::fs::write(&path, data) {
                    log::error!("Failed to save settings to {}: {e}", path.display());
                }
            }
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exercise_folder: None,
            tag_map_csv: None,
            language: default_language(),
            time_frame: TimeFrame::Week,
            view: BodyView::Front,
            auto_load_last: true,
            last_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn settings_roundtrip() {
        let mut s = Settings::default();
        s.exercise_folder = Some("/tmp/exercises".into());
        s.tag_map_csv = Some("/tmp/tags.csv".into());
        s.language = "it".into();
        s.time_frame = TimeFrame::Year;
        s.view = BodyView::Back;
        s.auto_load_last = false;
        s.last_file = Some("/tmp/workouts.csv".into());

        let json = serde_json::to_string(&s).unwrap();
        let loaded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, loaded);
        assert!(json.contains("\"time_frame\":\"year\""));
        assert!(json.contains("\"view\":\"back\""));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let loaded: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded, Settings::default());
        assert_eq!(loaded.language, "en");
        assert!(loaded.auto_load_last);
    }

    #[test]
    fn settings_persist_in_config_dir() {
        use std::env;
        use std::fs;

        let _guard = ENV_MUTEX.lock().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let prev_config = env::var_os("XDG_CONFIG_HOME");
        unsafe {
            env::set_var("XDG_CONFIG_HOME", dir.path());
        }

        let mut s = Settings::default();
        s.view = BodyView::Back;
        s.save();
        let loaded = Settings::load();
        assert_eq!(loaded.view, BodyView::Back);

        let path = Settings::path().unwrap();
        fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load(), Settings::default());

        if let Some(val) = prev_config {
            unsafe {
                env::set_var("XDG_CONFIG_HOME", val);
            }
        } else {
            unsafe {
                env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }
}
