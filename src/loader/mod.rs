//! # Native Library Loader
//!
//! Makes the native module available exactly once per loader.
//!
//! ## Resolution Order
//!
//! 1. The platform search path, by library name (`libfen_shim_jni.so`, ...)
//! 2. The bundled copy: embedded bytes or `native/<platform-library-name>`,
//!    copied to a unique temporary file and loaded from there
//!
//! If both fail the result is a [`LoadError`] carrying both causes. The
//! outcome is memoized, including failure: a loader never retries.
//!
//! ## Global Loader
//!
//! [`ensure_loaded`] uses a process-wide loader built from
//! [`LoaderConfig::default`] unless [`configure`] or [`install`] ran first.

pub mod bundle;
pub mod cleanup;
pub mod error;
pub mod linker;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::LoaderConfig;
use crate::error::ConfigError;
use crate::ffi::FenShim;

pub use bundle::Bundle;
pub use error::{FallbackError, LinkError, LoadError};
pub use linker::{DynamicLinker, LinkTarget, Linker};

/// Shared result of a load chain
pub type LoadResult = Result<Arc<FenShim>, Arc<LoadError>>;

/// Loads the native module at most once
pub struct NativeLoader<L: Linker = DynamicLinker> {
    config: LoaderConfig,
    bundle: Bundle,
    linker: L,
    state: OnceCell<LoadResult>,
    attempts: AtomicUsize,
}

impl NativeLoader<DynamicLinker> {
    /// Create a loader using the platform dynamic loader
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_linker(config, DynamicLinker)
    }
}

impl<L: Linker> NativeLoader<L> {
    /// Create a loader with a custom linker
    pub fn with_linker(config: LoaderConfig, linker: L) -> Self {
        let bundle = Bundle::Directories(config.resource_dirs.clone());
        Self {
            config,
            bundle,
            linker,
            state: OnceCell::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Replace the bundled-library source (e.g. with `include_bytes!` data)
    pub fn with_bundle(mut self, bundle: Bundle) -> Self {
        self.bundle = bundle;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn linker(&self) -> &L {
        &self.linker
    }

    /// Load the module if no load chain ran yet, and return the outcome.
    ///
    /// Concurrent callers block until the single chain finishes.
    pub fn ensure_loaded(&self) -> LoadResult {
        self.state.get_or_init(|| self.run_chain()).clone()
    }

    /// True once a load chain succeeded
    pub fn is_loaded(&self) -> bool {
        matches!(self.state.get(), Some(Ok(_)))
    }

    /// Number of load chains run so far (0 or 1)
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn run_chain(&self) -> LoadResult {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let stem = self.config.library_name.as_str();
        let span = tracing::debug_span!("load_native", library = stem);
        let _enter = span.enter();

        let primary = if self.config.search_path {
            match self.link_primary(stem) {
                Ok(shim) => return Ok(self.loaded(shim)),
                Err(e) => {
                    log::debug!("Search path lookup for {} failed: {}", stem, e);
                    e
                }
            }
        } else {
            LinkError::Rejected {
                target: linker::platform_file_name(stem),
                reason: "search path lookup disabled".to_string(),
            }
        };

        match self.link_fallback(stem) {
            Ok(shim) => Ok(self.loaded(shim)),
            Err(fallback) => {
                let err = LoadError {
                    library: stem.to_string(),
                    primary,
                    fallback,
                };
                log::error!("{}", err);
                Err(Arc::new(err))
            }
        }
    }

    fn link_primary(&self, stem: &str) -> Result<FenShim, LinkError> {
        self.linker.link(&LinkTarget::for_stem(stem))
    }

    fn link_fallback(&self, stem: &str) -> Result<FenShim, FallbackError> {
        let bytes = self.bundle.read(stem)?;
        bundle::verify(&bytes, self.config.expected_sha256.as_deref())?;

        let path = bundle::extract(&bytes, &self.config.temp_prefix)?;
        let target = LinkTarget::Path(path.to_path_buf());
        log::debug!("Extracted bundled library to {}", target);

        // On failure `path` drops here and the copy is removed right away.
        let shim = self.linker.link(&target).map_err(FallbackError::Link)?;
        cleanup::register(path);
        Ok(shim)
    }

    fn loaded(&self, shim: FenShim) -> Arc<FenShim> {
        log::info!("System load -> {}", shim.origin());
        if !shim.supports_audio() {
            log::info!("Native module has no audio entry points");
        }
        Arc::new(shim)
    }
}

// ============================================================================
// GLOBAL LOADER
// ============================================================================

static GLOBAL: OnceCell<NativeLoader> = OnceCell::new();

/// Install the process-wide loader. Fails once the global loader exists.
pub fn install(loader: NativeLoader) -> Result<(), ConfigError> {
    GLOBAL
        .set(loader)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

/// Install a process-wide loader built from `config`
pub fn configure(config: LoaderConfig) -> Result<(), ConfigError> {
    install(NativeLoader::new(config))
}

/// True once the process-wide loader exists and its load succeeded.
///
/// Does not create the global loader, so [`configure`] still works afterwards.
pub fn is_loaded() -> bool {
    GLOBAL.get().map_or(false, NativeLoader::is_loaded)
}

/// The process-wide loader, created with defaults on first use
pub fn global() -> &'static NativeLoader {
    GLOBAL.get_or_init(|| NativeLoader::new(LoaderConfig::default()))
}

/// Load the native module through the process-wide loader
pub fn ensure_loaded() -> LoadResult {
    global().ensure_loaded()
}
