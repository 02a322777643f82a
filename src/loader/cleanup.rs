//! # Extracted File Cleanup
//!
//! Temporary copies of the bundled library stay on disk while the process
//! runs (the loader maps them). They are removed from an `atexit` hook.
//! Removal is best effort: on Windows a DLL that is still mapped cannot be
//! deleted, and the error is ignored.

use std::path::PathBuf;
use std::sync::Once;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tempfile::TempPath;

static PENDING: Lazy<Mutex<Vec<TempPath>>> = Lazy::new(|| Mutex::new(Vec::new()));
static HOOK: Once = Once::new();

/// Keep `path` alive until process exit, then delete it
pub fn register(path: TempPath) {
    HOOK.call_once(|| {
        let rc = unsafe { libc::atexit(purge_at_exit) };
        if rc != 0 {
            log::warn!("Could not register exit hook; extracted libraries will be left behind");
        }
    });

    log::debug!("Scheduled {} for removal at exit", path.display());
    PENDING.lock().push(path);
}

/// Paths currently scheduled for removal
pub fn pending() -> Vec<PathBuf> {
    PENDING.lock().iter().map(|p| p.to_path_buf()).collect()
}

/// Delete every registered file now. Returns how many were scheduled.
pub fn purge() -> usize {
    let paths: Vec<TempPath> = std::mem::take(&mut *PENDING.lock());
    let count = paths.len();
    for path in paths {
        let display = path.display().to_string();
        if let Err(e) = path.close() {
            log::debug!("Leaving {} behind: {}", display, e);
        }
    }
    count
}

extern "C" fn purge_at_exit() {
    // Never unwind across the C boundary.
    let _ = std::panic::catch_unwind(purge);
}
