//! Credential lookup.
//!
//! Secrets are looked up by name through a [`CredentialProvider`]. The
//! default chain consults `.pulsepoint/secrets.yaml` first, then the
//! process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// A source of named secrets.
pub trait CredentialProvider: Send + Sync {
    /// Look up a secret. `Ok(None)` means this source does not have it.
    fn get(&self, name: &str) -> AppResult<Option<String>>;
}

/// Reads secrets from process environment variables.
#[derive(Debug, Default, Clone)]
pub struct EnvProvider;

impl CredentialProvider for EnvProvider {
    fn get(&self, name: &str) -> AppResult<Option<String>> {
        Ok(std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
    }
}

/// Reads secrets from a flat YAML map (`NAME: value`).
///
/// A missing file is not an error; it simply has no secrets.
#[derive(Debug, Clone)]
pub struct SecretsFileProvider {
    path: PathBuf,
}

impl SecretsFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Provider for `<workspace>/.pulsepoint/secrets.yaml`.
    pub fn for_workspace(workspace: &Path) -> Self {
        Self::new(workspace.join(".pulsepoint").join("secrets.yaml"))
    }

    fn read(&self) -> AppResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            AppError::Config(format!("Failed to read secrets file {:?}: {}", self.path, e))
        })?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse secrets file {:?}: {}", self.path, e))
        })
    }
}

impl CredentialProvider for SecretsFileProvider {
    fn get(&self, name: &str) -> AppResult<Option<String>> {
        Ok(self
            .read()?
            .remove(name)
            .filter(|v| !v.trim().is_empty()))
    }
}

/// Tries each provider in order and returns the first hit.
pub struct ChainedCredentialProvider {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainedCredentialProvider {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Secrets file first, then environment.
    pub fn default_for(workspace: &Path) -> Self {
        Self::new(vec![
            Box::new(SecretsFileProvider::for_workspace(workspace)),
            Box::new(EnvProvider),
        ])
    }
}

impl CredentialProvider for ChainedCredentialProvider {
    fn get(&self, name: &str) -> AppResult<Option<String>> {
        for provider in &self.providers {
            if let Some(value) = provider.get(name)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

/// In-memory credentials, used by tests and embedders that inject secrets.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialProvider for StaticCredentials {
    fn get(&self, name: &str) -> AppResult<Option<String>> {
        Ok(self.values.get(name).cloned())
    }
}

/// Look up a secret that must be present.
pub fn require(provider: &dyn CredentialProvider, name: &str) -> AppResult<String> {
    provider
        .get(name)?
        .ok_or_else(|| AppError::Config(format!("Required credential {} is not set", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_secrets_file_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        let provider = SecretsFileProvider::for_workspace(temp.path());
        assert!(provider.get("GROQ_API_KEY").unwrap().is_none());
    }

    #[test]
    fn test_secrets_file_lookup() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".pulsepoint");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("secrets.yaml"), "GROQ_API_KEY: gsk-file\n").unwrap();

        let provider = SecretsFileProvider::for_workspace(temp.path());
        assert_eq!(
            provider.get("GROQ_API_KEY").unwrap().as_deref(),
            Some("gsk-file")
        );
        assert!(provider.get("OTHER").unwrap().is_none());
    }

    #[test]
    fn test_secrets_file_malformed_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("secrets.yaml");
        std::fs::write(&path, "- not\n- a map\n").unwrap();

        let provider = SecretsFileProvider::new(&path);
        assert!(matches!(provider.get("X"), Err(AppError::Config(_))));
    }

    #[test]
    fn test_chain_prefers_first_hit() {
        let chain = ChainedCredentialProvider::new(vec![
            Box::new(StaticCredentials::default()),
            Box::new(StaticCredentials::default().with("KEY", "second")),
            Box::new(StaticCredentials::default().with("KEY", "third")),
        ]);
        assert_eq!(chain.get("KEY").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_require_missing_is_config_error() {
        let creds = StaticCredentials::default();
        match require(&creds, "GROQ_API_KEY") {
            Err(AppError::Config(msg)) => assert!(msg.contains("GROQ_API_KEY")),
            other => panic!("Expected config error, got {:?}", other),
        }
    }
}
