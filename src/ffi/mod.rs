//! # Native Binding Surface
//!
//! Function pointer table resolved from the native module, and the raw
//! pass-through calls built on it.
//!
//! ## Safety
//!
//! Every call here goes straight into native code. Nothing validates handles,
//! buffer sizes or call ordering: that is either the native module's job or
//! the caller's. The safe wrappers live in [`crate::window`] and
//! [`crate::audio`].

pub mod types;

use std::ffi::{c_char, c_float, c_int, c_longlong, c_void, CStr};
use std::fmt;
use std::path::PathBuf;

use libloading::Library;

use crate::loader::LinkError;
pub use types::{AudioHandle, LoopStatus, WindowHandle};

// ============================================================================
// SYMBOLS
// ============================================================================

/// Exported symbol names
///
/// These are the plain C entry points of the `fen_shim.c` build, not the
/// `Java_demo_FenShim_*` exports of the JNI build. The module shipped under
/// the `fen_shim_jni` name must be built with this C surface. The `fen_audio_*`
/// entry points take the same arguments as the JNI audio functions, minus the
/// JNI environment; native builds without them still load, without audio.
pub mod symbol {
    pub const OPEN: &str = "fen_open";
    pub const LOOP: &str = "fen_loop";
    pub const CLOSE: &str = "fen_close";
    pub const KEY: &str = "fen_key";
    pub const SLEEP: &str = "fen_sleep";
    pub const TIME: &str = "fen_time";

    pub const AUDIO_OPEN: &str = "fen_audio_open";
    pub const AUDIO_AVAILABLE: &str = "fen_audio_available";
    pub const AUDIO_WRITE: &str = "fen_audio_write";
    pub const AUDIO_CLOSE: &str = "fen_audio_close";
}

pub type OpenFn =
    unsafe extern "C" fn(c_int, c_int, *const c_char, *mut u32) -> *mut c_void;
pub type LoopFn = unsafe extern "C" fn(*mut c_void) -> c_int;
pub type CloseFn = unsafe extern "C" fn(*mut c_void);
pub type KeyFn = unsafe extern "C" fn(*mut c_void, c_int) -> c_int;
pub type SleepFn = unsafe extern "C" fn(c_int);
pub type TimeFn = unsafe extern "C" fn() -> c_longlong;

pub type AudioOpenFn = unsafe extern "C" fn() -> *mut c_void;
pub type AudioAvailableFn = unsafe extern "C" fn(*mut c_void) -> c_int;
pub type AudioWriteFn = unsafe extern "C" fn(*mut c_void, *const c_float, c_int);
pub type AudioCloseFn = unsafe extern "C" fn(*mut c_void);

/// Window, input and timing entry points. All are required.
#[derive(Clone, Copy)]
pub struct Symbols {
    pub open: OpenFn,
    pub run_loop: LoopFn,
    pub close: CloseFn,
    pub key: KeyFn,
    pub sleep: SleepFn,
    pub time: TimeFn,
    /// Only exported by later revisions of the native module
    pub audio: Option<AudioSymbols>,
}

/// Audio entry points, resolved all-or-nothing
#[derive(Clone, Copy)]
pub struct AudioSymbols {
    pub open: AudioOpenFn,
    pub available: AudioAvailableFn,
    pub write: AudioWriteFn,
    pub close: AudioCloseFn,
}

impl Symbols {
    /// Resolve the full table from a loaded library.
    ///
    /// # Safety
    /// The library must export the `fen_*` symbols with the signatures above.
    pub unsafe fn resolve(library: &Library, target: &str) -> Result<Self, LinkError> {
        let audio = match AudioSymbols::resolve(library, target) {
            Ok(audio) => Some(audio),
            Err(e) => {
                log::debug!("Audio entry points unavailable: {}", e);
                None
            }
        };

        Ok(Self {
            open: required(library, target, symbol::OPEN)?,
            run_loop: required(library, target, symbol::LOOP)?,
            close: required(library, target, symbol::CLOSE)?,
            key: required(library, target, symbol::KEY)?,
            sleep: required(library, target, symbol::SLEEP)?,
            time: required(library, target, symbol::TIME)?,
            audio,
        })
    }
}

impl AudioSymbols {
    /// # Safety
    /// See [`Symbols::resolve`].
    pub unsafe fn resolve(library: &Library, target: &str) -> Result<Self, LinkError> {
        Ok(Self {
            open: required(library, target, symbol::AUDIO_OPEN)?,
            available: required(library, target, symbol::AUDIO_AVAILABLE)?,
            write: required(library, target, symbol::AUDIO_WRITE)?,
            close: required(library, target, symbol::AUDIO_CLOSE)?,
        })
    }
}

unsafe fn required<T: Copy>(
    library: &Library,
    target: &str,
    name: &'static str,
) -> Result<T, LinkError> {
    library
        .get::<T>(name.as_bytes())
        .map(|symbol| *symbol)
        .map_err(|source| LinkError::MissingSymbol {
            target: target.to_string(),
            symbol: name,
            source,
        })
}

// ============================================================================
// MODULE
// ============================================================================

/// Where a loaded module came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Found through the platform library search path
    SearchPath(String),
    /// Extracted from the bundled resource into a temporary file
    Extracted(PathBuf),
    /// Symbol table supplied directly by the host
    Static,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::SearchPath(name) => write!(f, "{} (search path)", name),
            Origin::Extracted(path) => write!(f, "{} (extracted)", path.display()),
            Origin::Static => write!(f, "<static symbols>"),
        }
    }
}

/// A loaded native module
///
/// Field order matters: the symbol table must not outlive the library it
/// points into, so the library is dropped last.
pub struct FenShim {
    symbols: Symbols,
    origin: Origin,
    _library: Option<Library>,
}

impl FenShim {
    /// Wrap a loaded library, resolving its symbol table.
    ///
    /// # Safety
    /// See [`Symbols::resolve`].
    pub unsafe fn from_library(library: Library, origin: Origin) -> Result<Self, LinkError> {
        let target = origin.to_string();
        let symbols = Symbols::resolve(&library, &target)?;
        Ok(Self {
            symbols,
            origin,
            _library: Some(library),
        })
    }

    /// Build a module from an explicit symbol table (statically linked hosts, tests)
    pub fn from_symbols(symbols: Symbols) -> Self {
        Self {
            symbols,
            origin: Origin::Static,
            _library: None,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn supports_audio(&self) -> bool {
        self.symbols.audio.is_some()
    }

    /// Forward to `fen_open`. A null handle means the native open failed.
    ///
    /// # Safety
    /// `pixels` must point to a buffer in the native pixel format, large
    /// enough for `width * height` pixels, and must stay valid until the
    /// returned handle is closed.
    pub unsafe fn open(
        &self,
        width: i32,
        height: i32,
        title: &CStr,
        pixels: *mut u32,
    ) -> WindowHandle {
        let raw = (self.symbols.open)(width, height, title.as_ptr(), pixels);
        WindowHandle::from_raw(raw as isize as i64)
    }

    /// Forward to `fen_loop`: one iteration of the native event loop.
    ///
    /// # Safety
    /// `handle` must be open.
    pub unsafe fn loop_once(&self, handle: WindowHandle) -> LoopStatus {
        LoopStatus((self.symbols.run_loop)(as_ptr(handle.as_raw())))
    }

    /// Forward to `fen_close`.
    ///
    /// # Safety
    /// `handle` must be open; it is invalid afterwards.
    pub unsafe fn close(&self, handle: WindowHandle) {
        (self.symbols.close)(as_ptr(handle.as_raw()))
    }

    /// Forward to `fen_key`: non-zero while `code` is held down.
    ///
    /// # Safety
    /// `handle` must be open.
    pub unsafe fn key(&self, handle: WindowHandle, code: i32) -> i32 {
        (self.symbols.key)(as_ptr(handle.as_raw()), code)
    }

    /// Forward to `fen_sleep`
    pub fn sleep(&self, millis: i32) {
        unsafe { (self.symbols.sleep)(millis) }
    }

    /// Forward to `fen_time`
    pub fn time(&self) -> i64 {
        unsafe { (self.symbols.time)() }
    }

    /// Raw audio surface, if the module exports it
    pub fn audio(&self) -> Option<AudioApi<'_>> {
        self.symbols.audio.as_ref().map(|symbols| AudioApi { symbols })
    }
}

impl fmt::Debug for FenShim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FenShim")
            .field("origin", &self.origin)
            .field("audio", &self.supports_audio())
            .finish()
    }
}

/// Raw audio pass-through calls
#[derive(Clone, Copy)]
pub struct AudioApi<'a> {
    symbols: &'a AudioSymbols,
}

impl AudioApi<'_> {
    /// Forward to `fen_audio_open`. A null handle means the open failed.
    pub fn open(&self) -> AudioHandle {
        let raw = unsafe { (self.symbols.open)() };
        AudioHandle::from_raw(raw as isize as i64)
    }

    /// Forward to `fen_audio_available`
    ///
    /// # Safety
    /// `handle` must be open.
    pub unsafe fn available(&self, handle: AudioHandle) -> i32 {
        (self.symbols.available)(as_ptr(handle.as_raw()))
    }

    /// Forward to `fen_audio_write`
    ///
    /// # Safety
    /// `handle` must be open and `samples` must hold at least `frames` frames.
    pub unsafe fn write(&self, handle: AudioHandle, samples: *const f32, frames: i32) {
        (self.symbols.write)(as_ptr(handle.as_raw()), samples, frames)
    }

    /// Forward to `fen_audio_close`
    ///
    /// # Safety
    /// `handle` must be open; it is invalid afterwards.
    pub unsafe fn close(&self, handle: AudioHandle) {
        (self.symbols.close)(as_ptr(handle.as_raw()))
    }
}

#[inline]
fn as_ptr(raw: i64) -> *mut c_void {
    raw as isize as *mut c_void
}
