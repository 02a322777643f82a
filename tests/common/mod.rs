//! # Test Doubles
//!
//! Stub native entry points and a scripted linker.
//!
//! Stubs record every call in a thread-local log, so tests running in
//! parallel never see each other's calls.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::ffi::{c_char, c_float, c_int, c_longlong, c_void, CStr};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use fen_shim::ffi::{AudioSymbols, Symbols};
use fen_shim::loader::{LinkError, LinkTarget, Linker};
use fen_shim::FenShim;

/// Address the stub hands out for windows
pub const WINDOW_ADDR: usize = 0x00fe_5000;
/// Address the stub hands out for audio streams
pub const AUDIO_ADDR: usize = 0x00a0_d000;
/// Width that makes the stub `fen_open` fail
pub const FAILING_WIDTH: i32 = 13;
/// Frames the stub reports as writable
pub const AUDIO_FREE_FRAMES: i32 = 4096;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open {
        width: i32,
        height: i32,
        title: String,
        pixels: usize,
    },
    Loop(i64),
    Close(i64),
    Key(i64, i32),
    Sleep(i32),
    Time,
    AudioOpen,
    AudioAvailable(i64),
    AudioWrite {
        handle: i64,
        frames: i32,
        sum: f32,
    },
    AudioClose(i64),
}

thread_local! {
    static CALLS: RefCell<Vec<Call>> = RefCell::new(Vec::new());
    static LOOP_STATUS: Cell<i32> = Cell::new(0);
    static CLOCK: Cell<i64> = Cell::new(0);
    static AUDIO_FAILS: Cell<bool> = Cell::new(false);
}

fn record(call: Call) {
    CALLS.with(|calls| calls.borrow_mut().push(call));
}

/// Drain the calls recorded on this thread
pub fn take_calls() -> Vec<Call> {
    CALLS.with(|calls| std::mem::take(&mut *calls.borrow_mut()))
}

pub fn set_loop_status(status: i32) {
    LOOP_STATUS.with(|s| s.set(status));
}

pub fn set_clock(value: i64) {
    CLOCK.with(|c| c.set(value));
}

pub fn set_audio_fails(fails: bool) {
    AUDIO_FAILS.with(|f| f.set(fails));
}

/// `fen_key` stub result for a key code
pub fn key_state(code: i32) -> i32 {
    code ^ 0x55
}

unsafe extern "C" fn stub_open(
    width: c_int,
    height: c_int,
    title: *const c_char,
    pixels: *mut u32,
) -> *mut c_void {
    record(Call::Open {
        width,
        height,
        title: CStr::from_ptr(title).to_string_lossy().into_owned(),
        pixels: pixels as usize,
    });
    if width == FAILING_WIDTH {
        return std::ptr::null_mut();
    }
    WINDOW_ADDR as *mut c_void
}

unsafe extern "C" fn stub_loop(handle: *mut c_void) -> c_int {
    record(Call::Loop(handle as usize as i64));
    LOOP_STATUS.with(|s| s.get())
}

unsafe extern "C" fn stub_close(handle: *mut c_void) {
    record(Call::Close(handle as usize as i64));
}

unsafe extern "C" fn stub_key(handle: *mut c_void, code: c_int) -> c_int {
    record(Call::Key(handle as usize as i64, code));
    key_state(code)
}

unsafe extern "C" fn stub_sleep(millis: c_int) {
    record(Call::Sleep(millis));
}

unsafe extern "C" fn stub_time() -> c_longlong {
    record(Call::Time);
    CLOCK.with(|c| c.get())
}

unsafe extern "C" fn stub_audio_open() -> *mut c_void {
    record(Call::AudioOpen);
    if AUDIO_FAILS.with(|f| f.get()) {
        return std::ptr::null_mut();
    }
    AUDIO_ADDR as *mut c_void
}

unsafe extern "C" fn stub_audio_available(handle: *mut c_void) -> c_int {
    record(Call::AudioAvailable(handle as usize as i64));
    AUDIO_FREE_FRAMES
}

unsafe extern "C" fn stub_audio_write(handle: *mut c_void, samples: *const c_float, frames: c_int) {
    let sum: f32 = std::slice::from_raw_parts(samples, frames as usize).iter().sum();
    record(Call::AudioWrite {
        handle: handle as usize as i64,
        frames,
        sum,
    });
}

unsafe extern "C" fn stub_audio_close(handle: *mut c_void) {
    record(Call::AudioClose(handle as usize as i64));
}

/// Stub symbol table
pub fn symbols(with_audio: bool) -> Symbols {
    Symbols {
        open: stub_open,
        run_loop: stub_loop,
        close: stub_close,
        key: stub_key,
        sleep: stub_sleep,
        time: stub_time,
        audio: with_audio.then_some(AudioSymbols {
            open: stub_audio_open,
            available: stub_audio_available,
            write: stub_audio_write,
            close: stub_audio_close,
        }),
    }
}

/// Module backed by the stubs
pub fn stub_shim(with_audio: bool) -> Arc<FenShim> {
    Arc::new(FenShim::from_symbols(symbols(with_audio)))
}

// ============================================================================
// SCRIPTED LINKER
// ============================================================================

/// Linker whose search-path and file-path outcomes are fixed up front.
///
/// Records every target it is asked for and the bytes of every file it opens.
#[derive(Default)]
pub struct ScriptedLinker {
    pub primary_ok: bool,
    pub fallback_ok: bool,
    pub delay: Duration,
    pub targets: Mutex<Vec<LinkTarget>>,
    pub opened_bytes: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedLinker {
    pub fn new(primary_ok: bool, fallback_ok: bool) -> Self {
        Self {
            primary_ok,
            fallback_ok,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn targets(&self) -> Vec<LinkTarget> {
        self.targets.lock().clone()
    }

    pub fn path_targets(&self) -> Vec<std::path::PathBuf> {
        self.targets()
            .into_iter()
            .filter_map(|t| match t {
                LinkTarget::Path(p) => Some(p),
                LinkTarget::Name(_) => None,
            })
            .collect()
    }
}

impl Linker for ScriptedLinker {
    fn link(&self, target: &LinkTarget) -> Result<FenShim, LinkError> {
        self.targets.lock().push(target.clone());
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let ok = match target {
            LinkTarget::Name(_) => self.primary_ok,
            LinkTarget::Path(path) => {
                let bytes = std::fs::read(path).map_err(|e| LinkError::Rejected {
                    target: target.to_string(),
                    reason: e.to_string(),
                })?;
                self.opened_bytes.lock().push(bytes);
                self.fallback_ok
            }
        };

        if ok {
            Ok(FenShim::from_symbols(symbols(true)))
        } else {
            Err(LinkError::Rejected {
                target: target.to_string(),
                reason: "scripted failure".to_string(),
            })
        }
    }
}
