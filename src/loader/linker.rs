//! # Linkers
//!
//! Turn a load target (a bare library name or a file path) into a
//! [`FenShim`]. [`DynamicLinker`] does it with the platform loader; tests
//! swap in their own [`Linker`] to drive the fallback chain.

use std::fmt;
use std::path::{Path, PathBuf};

use libloading::Library;

use super::LinkError;
use crate::ffi::{FenShim, Origin};

/// What to hand the platform loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Platform file name, resolved through the standard search path
    Name(String),
    /// Absolute path to a library file
    Path(PathBuf),
}

impl LinkTarget {
    /// Search-path target for a library stem (`fen_shim_jni` -> `libfen_shim_jni.so`)
    pub fn for_stem(stem: &str) -> Self {
        LinkTarget::Name(platform_file_name(stem))
    }

    pub fn origin(&self) -> Origin {
        match self {
            LinkTarget::Name(name) => Origin::SearchPath(name.clone()),
            LinkTarget::Path(path) => Origin::Extracted(path.clone()),
        }
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Name(name) => f.write_str(name),
            LinkTarget::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Opens a native module for a target
pub trait Linker: Send + Sync {
    fn link(&self, target: &LinkTarget) -> Result<FenShim, LinkError>;
}

/// Production linker backed by `libloading`
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicLinker;

impl Linker for DynamicLinker {
    fn link(&self, target: &LinkTarget) -> Result<FenShim, LinkError> {
        let library = unsafe {
            match target {
                LinkTarget::Name(name) => Library::new(name),
                LinkTarget::Path(path) => Library::new(path.as_os_str()),
            }
        }
        .map_err(|source| LinkError::Open {
            target: target.to_string(),
            source,
        })?;

        // The module's initializers ran inside `Library::new`; from here on we
        // trust the exported signatures.
        unsafe { FenShim::from_library(library, target.origin()) }
    }
}

/// Platform file name for a library stem
pub fn platform_file_name(stem: &str) -> String {
    format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        stem,
        std::env::consts::DLL_SUFFIX
    )
}

/// Bundled resource location for a library stem, relative to a resource root
pub fn bundled_path(root: &Path, stem: &str) -> PathBuf {
    root.join(platform_file_name(stem))
}
