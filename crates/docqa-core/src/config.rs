//! Layered client configuration.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml` +
//! `APP_*` env vars (nested keys separated by `__`, e.g. `APP_API__BASE_URL`).
//! Also provides a helper to expand `~` and `${VAR}` in configured paths.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{RetrievalStrategy, VlmModel};
use crate::validate::MAX_UPLOAD_BYTES;

/// Minimum similarity (0–1) sent with every search so weak hits are dropped server-side.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.48;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub top_k: usize,
    pub min_similarity: f64,
    pub strategy: RetrievalStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaSettings {
    pub top_k: usize,
    pub default_model: VlmModel,
}

/// Timing of the synthetic upload-progress estimate (not a byte count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSettings {
    pub max_bytes: u64,
    pub tick_ms: u64,
    pub step: u8,
    pub cap: u8,
    pub reset_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSettings {
    pub dir: String,
}

impl DownloadSettings {
    pub fn resolved_dir(&self) -> PathBuf {
        expand_path(&self.dir)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    pub mock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub api: ApiSettings,
    pub search: SearchSettings,
    pub qa: QaSettings,
    pub upload: UploadSettings,
    pub render: RenderSettings,
    pub download: DownloadSettings,
    #[serde(default)]
    pub backend: BackendSettings,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api: ApiSettings { base_url: "http://localhost:8000/api".to_string(), timeout_secs: 30 },
            search: SearchSettings {
                top_k: 10,
                min_similarity: DEFAULT_MIN_SIMILARITY,
                strategy: RetrievalStrategy::Vector,
            },
            qa: QaSettings { top_k: 3, default_model: VlmModel::Gpt4o },
            upload: UploadSettings { max_bytes: MAX_UPLOAD_BYTES, tick_ms: 200, step: 10, cap: 90, reset_ms: 1000 },
            render: RenderSettings {
                keywords: ["孔径", "中心距", "材质", "消息队列"].map(String::from).to_vec(),
            },
            download: DownloadSettings { dir: "~/Downloads".to_string() },
            backend: BackendSettings::default(),
        }
    }
}

impl ClientSettings {
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("api.base_url must not be empty".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::InvalidConfig("api.timeout_secs must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.search.min_similarity) {
            return Err(Error::InvalidConfig(format!(
                "search.min_similarity must be within [0, 1], got {}",
                self.search.min_similarity
            )));
        }
        if self.upload.cap >= 100 || self.upload.step == 0 {
            return Err(Error::InvalidConfig("upload.cap must be below 100 and upload.step positive".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(ClientSettings::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Self::from_figment(figment)
    }

    /// Wrap an already-assembled figment, validating the typed view of it.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    pub fn settings(&self) -> Result<ClientSettings> {
        self.figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
