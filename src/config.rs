use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::analytics::StockThresholds;
use crate::error::Result;

pub const DEFAULT_DATA_ROOT: &str = "~/Documents/Billus";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
}

/// Contents of `settings.toml`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub data_root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase: Option<FirebaseConfig>,
    #[serde(default)]
    pub stock: StockThresholds,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_root: DEFAULT_DATA_ROOT.into(),
            firebase: None,
            stock: StockThresholds::default(),
        }
    }
}

impl AppSettings {
    pub fn root(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(&self.data_root))
    }

    /// Where the key-value store keeps its files.
    pub fn store_dir(&self) -> PathBuf {
        self.root().join("store")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("output")
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "billus", "billus") {
        return proj_dirs.config_dir().join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

/// `Ok(None)` when no settings file exists yet.
pub fn load_settings(path: &Path) -> Result<Option<AppSettings>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&content)?))
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(settings)?)?;
    tracing::info!(path = %path.display(), "settings saved");
    Ok(())
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_settings(&dir.path().join("settings.toml")).unwrap(), None);
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.toml");
        let settings = AppSettings {
            data_root: "/srv/billus".into(),
            firebase: Some(FirebaseConfig {
                api_key: "abc".into(),
                project_id: "demo".into(),
            }),
            stock: StockThresholds { low: 3, high: 80 },
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), Some(settings));
    }

    #[test]
    fn minimal_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "data_root = \"/tmp/b\"\n").unwrap();
        let settings = load_settings(&path).unwrap().unwrap();
        assert_eq!(settings.firebase, None);
        assert_eq!(settings.stock, StockThresholds::default());
        assert_eq!(settings.store_dir(), PathBuf::from("/tmp/b/store"));
    }

    #[test]
    fn broken_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "data_root = [").unwrap();
        assert!(matches!(load_settings(&path), Err(crate::error::Error::Config(_))));
    }

    #[test]
    fn plain_paths_are_not_expanded() {
        assert_eq!(expand_home_dir("/var/data"), "/var/data");
    }
}
