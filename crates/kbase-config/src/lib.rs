//! Configuration management for kbase
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (KBASE_* prefix, `__` between section and key)
//! 2. kbase.local.toml (gitignored, local overrides)
//! 3. kbase.toml (git-tracked, project config)
//! 4. ~/.config/kbase/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use kbase_rbac::Role;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Longest lifetime an object-store presigned URL may have (7 days).
pub const MAX_SIGNED_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Main kbase configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KbaseConfig {
    pub storage: StorageConfig,
    pub uploads: UploadsConfig,
    pub search: SearchConfig,
    pub access: AccessConfig,
}

/// Object-store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Bucket holding document content. Uploads and downloads are refused
    /// while unset.
    pub bucket: Option<String>,
    pub upload_url_ttl_secs: u64,
    pub download_url_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            upload_url_ttl_secs: 300,
            download_url_ttl_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub max_file_size_bytes: u64,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 50 * 1024 * 1024,
            allowed_mime_types: [
                "image/jpeg",
                "image/png",
                "image/gif",
                "image/webp",
                "application/pdf",
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "text/plain",
                "text/csv",
                "application/vnd.ms-excel",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                "application/zip",
                "application/x-zip-compressed",
                "application/x-zip",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl UploadsConfig {
    pub fn allows_mime_type(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|m| m == mime_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Rows returned by a listing with an empty query.
    pub listing_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { listing_limit: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Log every access decision, not only high-risk denials.
    pub audit: bool,
    /// Role assumed for profiles with no stored role.
    pub default_role: Role,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            audit: true,
            default_role: Role::Viewer,
        }
    }
}

impl KbaseConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Read a single TOML file, without layering or environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Create a development configuration
    pub fn development() -> Self {
        Self {
            storage: StorageConfig {
                bucket: Some("kbase-dev".to_string()),
                ..Default::default()
            },
            access: AccessConfig {
                audit: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Check cross-field constraints the type system does not express.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (name, ttl) in [
            ("storage.upload_url_ttl_secs", self.storage.upload_url_ttl_secs),
            ("storage.download_url_ttl_secs", self.storage.download_url_ttl_secs),
        ] {
            if ttl == 0 || ttl > MAX_SIGNED_URL_TTL_SECS {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 1 and {MAX_SIGNED_URL_TTL_SECS}, got {ttl}"
                )));
            }
        }

        if self.uploads.max_file_size_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "uploads.max_file_size_bytes must be positive".to_string(),
            ));
        }

        if self.storage.bucket.as_deref().is_some_and(|b| b.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "storage.bucket must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = KbaseConfig::default();
        assert_eq!(config.storage.upload_url_ttl_secs, 300);
        assert_eq!(config.storage.download_url_ttl_secs, 3600);
        assert_eq!(config.uploads.max_file_size_bytes, 52_428_800);
        assert_eq!(config.uploads.allowed_mime_types.len(), 14);
        assert_eq!(config.search.listing_limit, 100);
        assert_eq!(config.access.default_role, Role::Viewer);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_development_config() {
        let config = KbaseConfig::development();
        assert_eq!(config.storage.bucket.as_deref(), Some("kbase-dev"));
        assert!(!config.access.audit);
    }

    #[test]
    fn test_mime_allow_list() {
        let uploads = UploadsConfig::default();
        assert!(uploads.allows_mime_type("application/pdf"));
        assert!(!uploads.allows_mime_type("application/x-msdownload"));
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = KbaseConfig::default();
        config.storage.upload_url_ttl_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.contains("upload_url_ttl_secs")
        ));
    }

    #[test]
    fn test_validate_rejects_overlong_ttl() {
        let mut config = KbaseConfig::default();
        config.storage.download_url_ttl_secs = MAX_SIGNED_URL_TTL_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_bucket() {
        let mut config = KbaseConfig::default();
        config.storage.bucket = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("kbase.toml");
        std::fs::write(
            &path,
            r#"
[storage]
bucket = "documents"

[access]
default_role = "editor"
"#,
        )
        .expect("Failed to write config");

        let config = KbaseConfig::from_file(&path).expect("Failed to read config");
        assert_eq!(config.storage.bucket.as_deref(), Some("documents"));
        assert_eq!(config.access.default_role, Role::Editor);
        assert_eq!(config.storage.upload_url_ttl_secs, 300);
    }

    #[test]
    fn test_from_file_errors() {
        let temp_dir = tempdir().expect("Failed to create temp dir");

        let missing = KbaseConfig::from_file(temp_dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigError::ReadError { .. })));

        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "[access]\ndefault_role = \"owner\"\n").expect("Failed to write");
        assert!(matches!(
            KbaseConfig::from_file(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
