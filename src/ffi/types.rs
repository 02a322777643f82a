//! # Native Handle Types
//!
//! Opaque handles passed to and from the native module.
//!
//! Window and audio handles are both raw `i64` values on the wire. They get
//! separate newtypes so one can never be handed to a call expecting the other.

/// Handle to a native window created by `fen_open`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct WindowHandle(i64);

impl WindowHandle {
    /// Sentinel returned by the native module when `fen_open` fails
    pub const NULL: WindowHandle = WindowHandle(0);

    pub fn from_raw(value: i64) -> Self {
        WindowHandle(value)
    }

    pub fn as_raw(self) -> i64 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<WindowHandle> for i64 {
    fn from(handle: WindowHandle) -> Self {
        handle.0
    }
}

/// Handle to a native audio stream created by `fen_audio_open`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct AudioHandle(i64);

impl AudioHandle {
    /// Sentinel returned by the native module when `fen_audio_open` fails
    pub const NULL: AudioHandle = AudioHandle(0);

    pub fn from_raw(value: i64) -> Self {
        AudioHandle(value)
    }

    pub fn as_raw(self) -> i64 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<AudioHandle> for i64 {
    fn from(handle: AudioHandle) -> Self {
        handle.0
    }
}

/// Status code returned by one iteration of `fen_loop`
///
/// The enumeration belongs to the native module. fenster reports `0` while
/// the window is alive and a negative value once it has been closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct LoopStatus(pub i32);

impl LoopStatus {
    /// Native code for "keep running"
    pub const RUNNING: LoopStatus = LoopStatus(0);

    pub fn is_running(self) -> bool {
        self.0 == Self::RUNNING.0
    }

    pub fn code(self) -> i32 {
        self.0
    }
}
