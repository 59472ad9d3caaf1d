//! Layered configuration and path helpers.
//!
//! Uses Figment to merge compiled-in defaults, `config.toml`,
//! `config.<env>.toml` and `CUEFIND_*` env vars (`__` separates nested keys).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::encoder::TranscriptEncoder;
use crate::rank::ScoringMode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data: DataSettings,
    pub search: SearchSettings,
    pub ranking: RankingSettings,
    pub encoder: EncoderSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    /// Root holding one sub-folder of cue files per channel.
    pub subtitles_dir: String,
    pub lang: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { subtitles_dir: "subtitles".to_string(), lang: "en".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub limit: usize,
    pub video_url_base: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { limit: 50, video_url_base: "https://www.youtube.com/watch".to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingSettings {
    pub scoring: ScoringMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub separator: char,
    pub skip_empty_cues: bool,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self { separator: '\n', skip_empty_cues: true }
    }
}

impl EncoderSettings {
    pub fn encoder(&self) -> crate::error::Result<TranscriptEncoder> {
        let encoder = TranscriptEncoder::new().separator(self.separator).skip_empty_cues(self.skip_empty_cues);
        encoder.validate()?;
        Ok(encoder)
    }
}

impl DataSettings {
    pub fn subtitles_root(&self) -> PathBuf { expand_path(&self.subtitles_dir) }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Ok(Self::from_figment(Self::figment_for(&env_name)))
    }

    fn figment_for(env_name: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment.merge(Env::prefixed("CUEFIND_").split("__"))
    }

    pub fn from_figment(figment: Figment) -> Self { Self { figment } }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))
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

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
