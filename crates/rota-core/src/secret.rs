//! Slash-command token provisioning.
//!
//! The shared token is stored encrypted (base64 of an `age` ciphertext) and
//! unwrapped once per process by the server. Decryption shells out to the
//! `age` binary.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use base64::Engine as _;

use crate::error::{Result, RotaError};

pub trait SecretSource: Send + Sync {
    fn unwrap_secret(&self) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

/// Decrypts a base64 `age` ciphertext with a local identity.
pub struct AgeSecretSource {
    pub ciphertext_b64: String,
    pub identity: PathBuf,
}

impl SecretSource for AgeSecretSource {
    fn unwrap_secret(&self) -> Result<String> {
        let ciphertext = base64::engine::general_purpose::STANDARD
            .decode(self.ciphertext_b64.trim())
            .map_err(|e| RotaError::SecretDecode(e.to_string()))?;
        let plaintext = age_decrypt(&ciphertext, &self.identity)?;
        Ok(plaintext.trim().to_string())
    }
}

/// Token held in configuration as plaintext. Local development only.
pub struct PlainSecretSource(pub String);

impl SecretSource for PlainSecretSource {
    fn unwrap_secret(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// No token configured; every request fails with [`RotaError::TokenNotSet`].
pub struct UnsetSecretSource;

impl SecretSource for UnsetSecretSource {
    fn unwrap_secret(&self) -> Result<String> {
        Err(RotaError::TokenNotSet)
    }
}

/// An `age` ciphertext is configured but there is no identity to decrypt it
/// with.
pub struct MissingIdentitySecretSource;

impl SecretSource for MissingIdentitySecretSource {
    fn unwrap_secret(&self) -> Result<String> {
        Err(RotaError::SecretDecryptFailed(
            "no identity available: set secret.identity or add ~/.ssh/id_ed25519".to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// AGE binary and identity resolution
// ---------------------------------------------------------------------------

fn age_bin() -> Result<PathBuf> {
    which::which("age").map_err(|_| RotaError::AgeNotInstalled)
}

/// Resolve the default identity path (private key for decryption).
/// Tries `~/.ssh/id_ed25519`, then `~/.ssh/id_rsa`.
pub fn default_identity() -> Option<PathBuf> {
    let home = home::home_dir()?;
    let candidates = [
        home.join(".ssh").join("id_ed25519"),
        home.join(".ssh").join("id_rsa"),
    ];
    candidates.into_iter().find(|p| p.exists())
}

fn age_decrypt(ciphertext: &[u8], identity: &Path) -> Result<String> {
    let age_bin = age_bin()?;

    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| RotaError::SecretDecryptFailed(e.to_string()))?;
    tmp.write_all(ciphertext)
        .map_err(|e| RotaError::SecretDecryptFailed(e.to_string()))?;

    let output = std::process::Command::new(&age_bin)
        .arg("--decrypt")
        .arg("--identity")
        .arg(identity)
        .arg(tmp.path())
        .output()
        .map_err(|e| RotaError::SecretDecryptFailed(e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RotaError::SecretDecryptFailed(stderr.trim().to_string()));
    }
    String::from_utf8(output.stdout).map_err(|e| RotaError::SecretDecryptFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_source_returns_token() {
        let src = PlainSecretSource("s3cret".into());
        assert_eq!(src.unwrap_secret().unwrap(), "s3cret");
    }

    #[test]
    fn unset_source_reports_token_not_set() {
        let err = UnsetSecretSource.unwrap_secret().unwrap_err();
        assert!(matches!(err, RotaError::TokenNotSet));
    }

    #[test]
    fn missing_identity_is_a_decrypt_failure() {
        let err = MissingIdentitySecretSource.unwrap_secret().unwrap_err();
        assert!(
            matches!(err, RotaError::SecretDecryptFailed(ref m) if m.contains("no identity")),
            "got {err:?}"
        );
    }

    #[test]
    fn age_source_rejects_invalid_base64_before_decrypting() {
        let src = AgeSecretSource {
            ciphertext_b64: "not base64 !!".into(),
            identity: PathBuf::from("/nonexistent/identity"),
        };
        let err = src.unwrap_secret().unwrap_err();
        assert!(matches!(err, RotaError::SecretDecode(_)), "got {err:?}");
    }

    #[test]
    fn age_source_fails_with_bad_identity() {
        let src = AgeSecretSource {
            ciphertext_b64: base64::engine::general_purpose::STANDARD.encode(b"garbage"),
            identity: PathBuf::from("/nonexistent/identity"),
        };
        let err = src.unwrap_secret().unwrap_err();
        assert!(
            matches!(
                err,
                RotaError::AgeNotInstalled | RotaError::SecretDecryptFailed(_)
            ),
            "got {err:?}"
        );
    }
}
