use std::fs;
use std::path::Path;

use console_engine::write_atomically;
use console_logging::{console_error, console_info, console_warn};
use serde::{Deserialize, Serialize};

pub const PREFERENCES_FILENAME: &str = ".research-console.prefs.ron";

/// Operator inputs remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub download_dir: Option<String>,
    pub companies: Option<String>,
}

/// Missing or unreadable preferences are not fatal; the console starts
/// with defaults instead.
pub fn load_preferences(path: &Path) -> Preferences {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Preferences::default();
        }
        Err(err) => {
            console_warn!("Failed to read preferences from {:?}: {}", path, err);
            return Preferences::default();
        }
    };

    match ron::from_str(&content) {
        Ok(prefs) => {
            console_info!("Loaded preferences from {:?}", path);
            prefs
        }
        Err(err) => {
            console_warn!("Failed to parse preferences from {:?}: {}", path, err);
            Preferences::default()
        }
    }
}

pub fn save_preferences(path: &Path, prefs: &Preferences) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(prefs, pretty) {
        Ok(text) => text,
        Err(err) => {
            console_error!("Failed to serialize preferences: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomically(path, &content) {
        console_error!("Failed to write preferences to {:?}: {}", path, err);
    }
}
