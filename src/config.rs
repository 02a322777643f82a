//! # Loader Configuration
//!
//! How the native module is found. Hosts normally use the defaults; a JSON
//! document can override them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default library stem
pub const DEFAULT_LIBRARY: &str = "fen_shim_jni";

/// Default resource directory holding the bundled library
pub const DEFAULT_RESOURCE_DIR: &str = "native";

/// Loader configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Library stem, without platform prefix or suffix
    #[serde(rename = "libraryName")]
    pub library_name: String,

    /// Try the platform search path before the bundled copy
    #[serde(rename = "searchPath")]
    pub search_path: bool,

    /// Directories holding `<platform-library-name>`. Relative entries are
    /// resolved against the executable's directory, then the working directory.
    #[serde(rename = "resourceDirs")]
    pub resource_dirs: Vec<PathBuf>,

    /// File name prefix for the extracted temporary copy
    #[serde(rename = "tempPrefix")]
    pub temp_prefix: String,

    /// Expected SHA-256 of the bundled library (hex)
    #[serde(rename = "expectedSha256")]
    pub expected_sha256: Option<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            library_name: DEFAULT_LIBRARY.to_string(),
            search_path: true,
            resource_dirs: vec![PathBuf::from(DEFAULT_RESOURCE_DIR)],
            temp_prefix: DEFAULT_LIBRARY.to_string(),
            expected_sha256: None,
        }
    }
}

impl LoaderConfig {
    /// Config for a differently named library, everything else default
    pub fn for_library(name: &str) -> Self {
        Self {
            library_name: name.to_string(),
            temp_prefix: name.to_string(),
            ..Self::default()
        }
    }

    /// Parse config from bytes (JSON)
    pub fn from_bytes(data: &[u8]) -> Result<Self, ConfigError> {
        if data.is_empty() {
            log::warn!("Empty loader config, using defaults");
            return Ok(Self::default());
        }

        Ok(serde_json::from_slice(data)?)
    }

    /// Read and parse a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&data)
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}
