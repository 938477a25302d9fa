use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod migrate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_window")]
    pub default_window_before: i64,
    #[serde(default = "default_window")]
    pub default_window_after: i64,
    #[serde(default = "default_late_after")]
    pub late_after_minutes: i64,
    #[serde(default = "default_image_formats")]
    pub allowed_image_formats: Vec<String>,
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
    #[serde(default = "default_academic_year")]
    pub academic_year: String,
    #[serde(default = "default_semester")]
    pub semester: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_window() -> i64 {
    5
}
fn default_late_after() -> i64 {
    15
}
fn default_image_formats() -> Vec<String> {
    vec!["jpg".into(), "jpeg".into(), "png".into()]
}
fn default_max_image_bytes() -> u64 {
    10 * 1024 * 1024
}
fn default_academic_year() -> String {
    "2024/2025".to_string()
}
fn default_semester() -> String {
    "First".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            default_window_before: default_window(),
            default_window_after: default_window(),
            late_after_minutes: default_late_after(),
            allowed_image_formats: default_image_formats(),
            max_image_bytes: default_max_image_bytes(),
            academic_year: default_academic_year(),
            semester: default_semester(),
        }
    }
}

impl Config {
    /// `~/.rattendance`
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rattendance")
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rattendance.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rattendance.sqlite")
    }

    /// A relative `--db` name lives inside the config directory.
    pub fn resolve_db_path(name: &str) -> PathBuf {
        let p = Path::new(name);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            Self::config_dir().join(p)
        }
    }

    /// Load configuration from file, or return defaults if not found.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Initialize configuration and database files.
    ///
    /// A relative `custom_db` lands inside the config directory. With
    /// `is_test` the config file is left untouched.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => Self::resolve_db_path(&name),
            None => Self::database_file(),
        };

        if !is_test {
            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };
            let yaml = serde_yaml::to_string(&config).map_err(|_| AppError::ConfigSave)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: Config = serde_yaml::from_str("database: /tmp/x.sqlite\nlate_after_minutes: 20\n").unwrap();
        assert_eq!(cfg.database, "/tmp/x.sqlite");
        assert_eq!(cfg.late_after_minutes, 20);
        assert_eq!(cfg.default_window_before, 5);
        assert_eq!(cfg.default_window_after, 5);
        assert_eq!(cfg.max_image_bytes, 10_485_760);
        assert_eq!(cfg.allowed_image_formats, vec!["jpg", "jpeg", "png"]);
    }
}
