use crate::error::{Result, RotaError};
use crate::secret::{
    default_identity, AgeSecretSource, MissingIdentitySecretSource, PlainSecretSource,
    SecretSource, UnsetSecretSource,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("rota.db")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// SecretConfig
// ---------------------------------------------------------------------------

/// Where the slash-command token comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecretConfig {
    /// Base64 `age` ciphertext, decrypted with `identity` (or the default SSH key).
    Age {
        ciphertext: String,
        #[serde(default)]
        identity: Option<PathBuf>,
    },
    Plain {
        token: String,
    },
    #[default]
    Unset,
}

impl SecretConfig {
    pub fn source(&self) -> Box<dyn SecretSource> {
        match self {
            SecretConfig::Age {
                ciphertext,
                identity,
            } => age_source(ciphertext, identity.clone().or_else(default_identity)),
            SecretConfig::Plain { token } => Box::new(PlainSecretSource(token.clone())),
            SecretConfig::Unset => Box::new(UnsetSecretSource),
        }
    }
}

fn age_source(ciphertext: &str, identity: Option<PathBuf>) -> Box<dyn SecretSource> {
    match identity {
        Some(identity) => Box::new(AgeSecretSource {
            ciphertext_b64: ciphertext.to_string(),
            identity,
        }),
        None => Box::new(MissingIdentitySecretSource),
    }
}

// ---------------------------------------------------------------------------
// SelectionConfig
// ---------------------------------------------------------------------------

/// The service that works out who is next and announces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_selection_name")]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

fn default_selection_name() -> String {
    "KnowledgeSharingNextUp".to_string()
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            name: default_selection_name(),
            url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub secret: SecretConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
}

impl Config {
    /// Load config from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::validate`], but fails on the first `Error`-level warning.
    pub fn check(&self) -> Result<()> {
        match self
            .validate()
            .into_iter()
            .find(|w| w.level == WarnLevel::Error)
        {
            Some(w) => Err(RotaError::ConfigInvalid(w.message)),
            None => Ok(()),
        }
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        match &self.secret {
            SecretConfig::Unset => warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no secret configured: every request will be rejected".to_string(),
            }),
            SecretConfig::Age {
                ciphertext,
                identity,
            } => {
                if ciphertext.trim().is_empty() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: "secret.ciphertext is empty".to_string(),
                    });
                }
                if identity.is_none() && default_identity().is_none() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: "secret.identity not set and no ~/.ssh key found".to_string(),
                    });
                }
            }
            SecretConfig::Plain { .. } => warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "secret is stored in plaintext".to_string(),
            }),
        }

        match &self.selection.url {
            None => warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "selection.url not set: `next` cannot reach {}",
                    self.selection.name
                ),
            }),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("selection.url '{url}' must be an http(s) URL"),
                })
            }
            Some(_) => {}
        }

        warnings
    }
}
