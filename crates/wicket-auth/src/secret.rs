//! Session-signing secret resolution.
//!
//! The secret is resolved once at startup, in order of precedence:
//!
//! 1. a hex value supplied through the environment
//! 2. a hex value persisted in the fallback file
//! 3. 32 freshly generated random bytes, written back to the fallback file
//!
//! Invalid values at any level are logged and skipped. Only a failing RNG is
//! fatal.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::{rngs::OsRng, RngCore};

use crate::SecretError;

/// Length in bytes of the session-signing key.
pub const SECRET_LEN: usize = 32;

/// The 32-byte symmetric key behind every session token.
///
/// Immutable once resolved; share it behind an `Arc`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretMaterial([u8; SECRET_LEN]);

impl SecretMaterial {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a hex string; `None` unless it decodes to exactly 32 bytes.
    pub fn from_hex(value: &str) -> Option<Self> {
        let bytes = hex::decode(value.trim()).ok()?;
        let key: [u8; SECRET_LEN] = bytes.try_into().ok()?;
        Some(Self(key))
    }

    /// Generate a key from the operating system RNG.
    pub fn generate() -> Result<Self, SecretError> {
        let mut key = [0u8; SECRET_LEN];
        OsRng.try_fill_bytes(&mut key).map_err(SecretError::Generate)?;
        Ok(Self(key))
    }

    /// Raw key bytes, for MAC keying.
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }

    fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretMaterial(<redacted>)")
    }
}

impl Drop for SecretMaterial {
    fn drop(&mut self) {
        self.0.fill(0);
    }
}

/// Where the session secret may come from.
#[derive(Debug, Clone)]
pub struct SecretStore {
    env_hex: Option<String>,
    file: PathBuf,
}

impl SecretStore {
    /// `env_hex` is the raw environment value (if any); `file` is the
    /// fallback location used both for reading and for persisting.
    pub fn new(env_hex: Option<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            env_hex,
            file: file.into(),
        }
    }

    /// Resolve the secret. Call once, before serving traffic.
    pub fn resolve(&self) -> Result<SecretMaterial, SecretError> {
        if let Some(value) = self.env_hex.as_deref().filter(|v| !v.trim().is_empty()) {
            match SecretMaterial::from_hex(value) {
                Some(secret) => {
                    log::info!("Session secret loaded from environment");
                    return Ok(secret);
                }
                None => log::warn!(
                    "Session secret in environment is not {SECRET_LEN} hex-encoded bytes, ignoring it"
                ),
            }
        }

        if let Some(secret) = self.load_file() {
            return Ok(secret);
        }

        let secret = SecretMaterial::generate()?;
        match self.persist(&secret) {
            Ok(()) => log::info!(
                "New session secret generated and saved to {}",
                self.file.display()
            ),
            Err(e) => log::warn!(
                "Failed to save session secret to {}: {e}; sessions will not survive a restart",
                self.file.display()
            ),
        }
        Ok(secret)
    }

    fn load_file(&self) -> Option<SecretMaterial> {
        let contents = match fs::read_to_string(&self.file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!(
                    "Failed to read session secret file {}: {e}",
                    self.file.display()
                );
                return None;
            }
        };

        let secret = SecretMaterial::from_hex(&contents);
        match &secret {
            Some(_) => log::info!("Session secret loaded from {}", self.file.display()),
            None => log::warn!(
                "Session secret file {} is malformed or has the wrong length, generating a new one",
                self.file.display()
            ),
        }
        secret
    }

    fn persist(&self, secret: &SecretMaterial) -> std::io::Result<()> {
        if let Some(parent) = self.file.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = open_owner_only(&self.file)?;

        // `mode` only applies on creation; tighten a file that already existed
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(secret.to_hex().as_bytes())?;
        file.sync_all()
    }
}

/// Open `path` for writing, creating it readable by the owner only.
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
