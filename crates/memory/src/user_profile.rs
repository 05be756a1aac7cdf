//! Small persisted profile used for the startup greeting.

use crate::activity_log::MemoryError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default = "default_name")]
    pub user_name: String,
    #[serde(default)]
    pub location: Option<String>,
}

fn default_name() -> String {
    "there".to_string()
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            user_name: default_name(),
            location: None,
        }
    }
}

impl UserProfile {
    /// Loads the profile, writing a default file on first run.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            return Ok(serde_json::from_str(&content)?);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let profile = Self::default();
        std::fs::write(path, serde_json::to_string_pretty(&profile)?)?;
        Ok(profile)
    }
}
