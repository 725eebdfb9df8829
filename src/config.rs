use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::{Plan, User};
use crate::theme::ThemeMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub user: UserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_saved_indicator_ms")]
    pub saved_indicator_ms: u64,
    #[serde(default = "default_snippet_len")]
    pub snippet_len: usize,
}

fn default_debounce_ms() -> u64 { 500 }
fn default_saved_indicator_ms() -> u64 { 2000 }
fn default_snippet_len() -> usize { 100 }

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            saved_indicator_ms: default_saved_indicator_ms(),
            snippet_len: default_snippet_len(),
        }
    }
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn saved_indicator(&self) -> Duration {
        Duration::from_millis(self.saved_indicator_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Inline key. Prefer `api_key_env` so the key stays out of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String { "gemini-2.5-flash".to_string() }
fn default_endpoint() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_api_key_env() -> String { "API_KEY".to_string() }
fn default_timeout_secs() -> u64 { 30 }

const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AiConfig {
    /// Inline key, then `$api_key_env`, then `$GEMINI_API_KEY`. Blank values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        let non_blank = |value: String| {
            let value = value.trim().to_string();
            (!value.is_empty()).then_some(value)
        };
        self.api_key
            .clone()
            .and_then(non_blank)
            .or_else(|| lookup(&self.api_key_env).and_then(non_blank))
            .or_else(|| lookup(FALLBACK_API_KEY_ENV).and_then(non_blank))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_name")]
    pub name: String,
    #[serde(default = "default_user_email")]
    pub email: String,
    #[serde(default)]
    pub plan: Plan,
}

fn default_user_name() -> String { User::default().name }
fn default_user_email() -> String { User::default().email }

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: default_user_name(),
            email: default_user_email(),
            plan: Plan::default(),
        }
    }
}

impl UserConfig {
    pub fn to_user(&self) -> User {
        User {
            name: self.name.clone(),
            email: self.email.clone(),
            plan: self.plan,
            ..User::default()
        }
    }

    pub fn update_from(&mut self, user: &User) {
        self.name = user.name.clone();
        self.email = user.email.clone();
        self.plan = user.plan;
    }
}

fn default_export_dir() -> String { "~/Downloads".to_string() }
fn default_share_base_url() -> String { "https://focusx.app".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            export_dir: default_export_dir(),
            share_base_url: default_share_base_url(),
            editor: EditorConfig::default(),
            ai: AiConfig::default(),
            user: UserConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => log::error!("Failed to parse config {}: {}", path.display(), e),
                },
                Err(e) => log::error!("Failed to read config {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    /// Load config, writing a default file first if none exists.
    /// An existing file is never overwritten here.
    pub fn load_or_create() -> Self {
        let config_path = Self::config_path();
        if !config_path.exists() {
            if let Err(e) = Self::default().save_to(&config_path) {
                log::warn!("Could not write default config: {}", e);
            }
        }
        Self::load_from(&config_path)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("focusx")
    }

    pub fn log_path() -> PathBuf {
        Self::config_dir().join("focusx.log")
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, toml_string)
    }

    pub fn export_path(&self) -> PathBuf {
        let path = shellexpand::tilde(&self.export_dir).to_string();
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").expect("empty config parses");
        assert_eq!(config.theme, ThemeMode::Light);
        assert_eq!(config.editor.debounce_ms, 500);
        assert_eq!(config.editor.saved_indicator_ms, 2000);
        assert_eq!(config.editor.snippet_len, 100);
        assert_eq!(config.ai.model, "gemini-2.5-flash");
        assert_eq!(config.user.name, "Alex");
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            "theme = \"dark\"\n[editor]\ndebounce_ms = 250\n[user]\nplan = \"Zenith\"\n",
        )
        .expect("parses");
        assert_eq!(config.theme, ThemeMode::Dark);
        assert_eq!(config.editor.debounce(), Duration::from_millis(250));
        assert_eq!(config.editor.saved_indicator_ms, 2000);
        assert_eq!(config.user.plan, Plan::Zenith);
        assert_eq!(config.user.email, "alex@example.com");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.theme = ThemeMode::Dark;
        config.user.name = "Sam".to_string();
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path);
        assert_eq!(loaded.theme, ThemeMode::Dark);
        assert_eq!(loaded.user.name, "Sam");
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = [not toml").expect("write");
        assert_eq!(Config::load_from(&path).theme, ThemeMode::Light);
    }

    #[test]
    fn test_api_key_resolution_order() {
        let mut ai = AiConfig::default();
        let env = |name: &str| match name {
            "API_KEY" => Some("from-env".to_string()),
            "GEMINI_API_KEY" => Some("fallback".to_string()),
            _ => None,
        };
        assert_eq!(ai.resolve_api_key_with(env).as_deref(), Some("from-env"));

        ai.api_key = Some("inline".to_string());
        assert_eq!(ai.resolve_api_key_with(env).as_deref(), Some("inline"));

        ai.api_key = Some("  ".to_string());
        ai.api_key_env = "OTHER".to_string();
        assert_eq!(ai.resolve_api_key_with(env).as_deref(), Some("fallback"));
        assert_eq!(ai.resolve_api_key_with(|_| None), None);
    }
}
