//! Configuration and reviewer factory.
//!
//! The presence of a resolvable credential here is what switches the
//! feedback generator onto the remote path; everything else falls back to
//! local synthesis.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use prepdrill_core::traits::FeedbackProvider;

use crate::gemini::GeminiReviewer;

/// Configuration for a single reviewer.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in
/// logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

/// Top-level prepdrill configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepdrillConfig {
    /// Reviewer configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Reviewer used for submissions.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Bound on the single remote review request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Where drafts are persisted.
    #[serde(default)]
    pub draft_dir: Option<PathBuf>,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_request_timeout() -> u64 {
    12
}

impl Default for PrepdrillConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            request_timeout_secs: default_request_timeout(),
            draft_dir: None,
        }
    }
}

impl PrepdrillConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a reviewer config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            model,
        } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `prepdrill.toml` in the current directory
/// 2. `~/.config/prepdrill/config.toml`
///
/// Environment variable override: `PREPDRILL_GEMINI_KEY`.
pub fn load_config() -> Result<PrepdrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<PrepdrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("prepdrill.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<PrepdrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => PrepdrillConfig::default(),
    };

    // Apply env var override
    if let Ok(key) = std::env::var("PREPDRILL_GEMINI_KEY") {
        config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let Some(ProviderConfig::Gemini { api_key, .. }) = config.providers.get_mut("gemini") {
            *api_key = key;
        }
    }

    // Resolve env vars in all reviewer configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("prepdrill"))
}

/// Create a reviewer instance from its configuration.
pub fn create_reviewer(config: &ProviderConfig) -> Result<Box<dyn FeedbackProvider>> {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            model,
        } => Ok(Box::new(GeminiReviewer::new(
            api_key,
            base_url.clone(),
            model.clone(),
        ))),
    }
}

/// The reviewer to use for submissions, or `None` when no credential is
/// configured — the generator then synthesizes every report locally.
pub fn configured_reviewer(config: &PrepdrillConfig) -> Result<Option<Arc<dyn FeedbackProvider>>> {
    let Some(provider_config) = config.providers.get(&config.default_provider) else {
        return Ok(None);
    };
    let ProviderConfig::Gemini { api_key, .. } = provider_config;
    if api_key.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(Arc::from(create_reviewer(provider_config)?)))
}
