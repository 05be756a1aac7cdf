use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

fn home() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_pin")]
    pub pin: String,
    #[serde(default = "default_dangerous")]
    pub dangerous: Vec<String>,
    #[serde(default = "default_admin")]
    pub admin: Vec<String>,
    /// How long one loop cycle waits on the keyboard, in seconds.
    #[serde(default = "default_keyboard_wait")]
    pub keyboard_wait_secs: u64,
    /// Grace period for draining an already-queued voice command.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// How long a confirmation prompt waits before counting as refusal.
    #[serde(default = "default_confirm_wait")]
    pub confirm_wait_secs: u64,
    #[serde(default = "default_app_map")]
    pub app_map: HashMap<String, String>,
    #[serde(default = "default_search_roots")]
    pub search_roots: Vec<PathBuf>,
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,
    #[serde(default = "default_organize_rules")]
    pub organize_rules: HashMap<String, String>,
    #[serde(default = "default_junk_extensions")]
    pub junk_extensions: Vec<String>,
}

fn default_data_dir() -> PathBuf {
    home().join(".local/share/veda")
}

fn default_pin() -> String {
    "1234".to_string()
}

fn default_dangerous() -> Vec<String> {
    ["shutdown", "restart", "sleep", "delete_file", "compress_folder", "run_automation"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_admin() -> Vec<String> {
    ["shutdown", "restart", "sleep", "delete_file"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_keyboard_wait() -> u64 {
    2
}

fn default_poll_interval() -> u64 {
    100
}

fn default_confirm_wait() -> u64 {
    30
}

fn default_app_map() -> HashMap<String, String> {
    [
        ("browser", "firefox"),
        ("editor", "code"),
        ("terminal", "kitty"),
        ("files", "nautilus"),
        ("music", "spotify"),
        ("calculator", "gnome-calculator"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_search_roots() -> Vec<PathBuf> {
    vec![
        home().join("Documents"),
        home().join("Downloads"),
        home().join("Desktop"),
    ]
}

fn default_downloads_dir() -> PathBuf {
    home().join("Downloads")
}

fn default_organize_rules() -> HashMap<String, String> {
    [
        (".pdf", "Documents"),
        (".doc", "Documents"),
        (".docx", "Documents"),
        (".txt", "Documents"),
        (".png", "Images"),
        (".jpg", "Images"),
        (".jpeg", "Images"),
        (".gif", "Images"),
        (".mp4", "Videos"),
        (".mkv", "Videos"),
        (".mp3", "Music"),
        (".wav", "Music"),
        (".zip", "Archives"),
        (".tar", "Archives"),
        (".gz", "Archives"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_junk_extensions() -> Vec<String> {
    [".tmp", ".crdownload", ".part", ".partial"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            pin: default_pin(),
            dangerous: default_dangerous(),
            admin: default_admin(),
            keyboard_wait_secs: default_keyboard_wait(),
            poll_interval_ms: default_poll_interval(),
            confirm_wait_secs: default_confirm_wait(),
            app_map: default_app_map(),
            search_roots: default_search_roots(),
            downloads_dir: default_downloads_dir(),
            organize_rules: default_organize_rules(),
            junk_extensions: default_junk_extensions(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> PathBuf {
        match std::env::var("VEDA_CONFIG") {
            Ok(path) => PathBuf::from(path),
            Err(_) => home().join(".config/veda/config.yaml"),
        }
    }

    /// Loads the YAML config, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn activity_log_path(&self) -> PathBuf {
        self.data_dir.join("activity_log.json")
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join("memory.json")
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.data_dir.join("notes")
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        home().join("Pictures")
    }

    pub fn automations_path(&self) -> PathBuf {
        self.data_dir.join("automations.yaml")
    }
}
