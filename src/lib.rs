//! # fen_shim - Native Window/Audio Bindings
//!
//! Loads the `fen_shim_jni` native module and exposes its window, input,
//! timing and audio entry points.
//!
//! ## Modules
//!
//! - **Loader**: search path first, bundled copy second, loaded at most once
//! - **FFI**: symbol table and raw pass-through calls
//! - **Window**: owning window wrapper over the raw surface
//! - **Audio**: owning audio stream wrapper (later native revisions only)
//!
//! ## Usage
//!
//! ```no_run
//! let mut pixels = vec![0u32; 320 * 240];
//! let mut window = fen_shim::Window::new(320, 240, "demo", &mut pixels)?;
//! while window.pump().is_running() {
//!     if window.is_key_down(27) {
//!         break;
//!     }
//!     fen_shim::sleep(16)?;
//! }
//! # Ok::<(), fen_shim::ShimError>(())
//! ```

pub mod config;
pub mod error;
pub mod ffi;
pub mod loader;
pub mod util;
pub mod window;

#[cfg(feature = "audio")]
pub mod audio;

// Re-exports
pub use config::LoaderConfig;
pub use error::{ConfigError, ShimError, ShimResult};
pub use ffi::{AudioHandle, FenShim, LoopStatus, Origin, WindowHandle};
pub use loader::{configure, ensure_loaded, install, Bundle, LoadError, NativeLoader};
pub use window::Window;

#[cfg(feature = "audio")]
pub use audio::AudioStream;

use std::sync::Arc;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "fen_shim";

/// Explicit startup: install logging and load the native module.
///
/// Calling this is optional; every binding loads the module on first use.
pub fn initialize() -> Result<Arc<FenShim>, Arc<LoadError>> {
    init_logging();

    log::info!("{} v{} starting", NAME, VERSION);
    log::info!("Platform: {} {}", std::env::consts::OS, std::env::consts::ARCH);

    ensure_loaded()
}

/// Check if the process-wide module is loaded
pub fn is_initialized() -> bool {
    loader::is_loaded()
}

/// Sleep through the native timer
pub fn sleep(millis: i32) -> ShimResult<()> {
    ensure_loaded()?.sleep(millis);
    Ok(())
}

/// Native timestamp
pub fn time() -> ShimResult<i64> {
    Ok(ensure_loaded()?.time())
}

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .try_init();
}
