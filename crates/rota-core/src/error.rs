use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotaError {
    #[error("Token has not been set.")]
    TokenNotSet,

    #[error("Invalid request token")]
    InvalidToken,

    #[error("Could not parse date '{0}'; expected yyyy-mm-dd")]
    InvalidDate(String),

    #[error("rotation store error: {0}")]
    Store(String),

    #[error(
        "rotation database {} is locked by another process (is `rota serve` running?)",
        .0.display()
    )]
    StoreLocked(std::path::PathBuf),

    #[error("age binary not found: install age to decrypt the slash-command token")]
    AgeNotInstalled,

    #[error("encrypted token is not valid base64: {0}")]
    SecretDecode(String),

    #[error("token decryption failed: {0}")]
    SecretDecryptFailed(String),

    #[error("selection service rejected the trigger ({status}): {body}")]
    TriggerRejected { status: u16, body: String },

    #[error("selection service call failed: {0}")]
    TriggerFailed(String),

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

}

impl RotaError {
    /// Stable machine-readable kind, surfaced in collaborator diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            RotaError::TokenNotSet => "token_not_set",
            RotaError::InvalidToken => "invalid_token",
            RotaError::InvalidDate(_) => "invalid_date",
            RotaError::Store(_) => "store_error",
            RotaError::StoreLocked(_) => "store_locked",
            RotaError::AgeNotInstalled => "age_not_installed",
            RotaError::SecretDecode(_) => "secret_decode",
            RotaError::SecretDecryptFailed(_) => "secret_decrypt_failed",
            RotaError::TriggerRejected { .. } => "trigger_rejected",
            RotaError::TriggerFailed(_) => "trigger_failed",
            RotaError::ConfigInvalid(_) => "config_invalid",
            RotaError::Io(_) => "io",
            RotaError::Yaml(_) => "yaml",
        }
    }

    /// Pretty-printed JSON object describing this error, used as the
    /// diagnostic payload in slash-command replies.
    pub fn diagnostic(&self) -> String {
        let value = serde_json::json!({
            "message": self.to_string(),
            "code": self.code(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RotaError>;
