//! # Audio Output
//!
//! Owning wrapper around a native audio stream.
//!
//! Sample format and channel layout are defined by the native module. The
//! stream assumes interleaved `f32` frames of [`AudioStream::channels`]
//! samples each; fenster's output is mono, hence the default of one.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{ShimError, ShimResult};
use crate::ffi::{symbol, AudioHandle, FenShim};

/// An open native audio stream
///
/// `Send` but not `Sync`, like [`crate::Window`].
///
/// ```compile_fail
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<fen_shim::AudioStream>();
/// ```
pub struct AudioStream {
    shim: Arc<FenShim>,
    handle: AudioHandle,
    channels: usize,
    _not_sync: PhantomData<Cell<()>>,
}

impl AudioStream {
    /// Open a stream through the process-wide loader
    pub fn new() -> ShimResult<Self> {
        let shim = crate::loader::ensure_loaded()?;
        Self::open(shim)
    }

    /// Open a stream on a specific module
    pub fn open(shim: Arc<FenShim>) -> ShimResult<Self> {
        let audio = shim
            .audio()
            .ok_or(ShimError::Unsupported(symbol::AUDIO_OPEN))?;

        let handle = audio.open();
        if handle.is_null() {
            return Err(ShimError::OpenFailed("audio stream"));
        }

        log::debug!("Audio stream opened");

        Ok(Self {
            shim,
            handle,
            channels: 1,
            _not_sync: PhantomData,
        })
    }

    /// Set the number of interleaved samples per frame
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels.max(1);
        self
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn handle(&self) -> AudioHandle {
        self.handle
    }

    /// Frames the native buffer can accept without blocking
    pub fn available_frames(&self) -> i32 {
        match self.shim.audio() {
            Some(audio) => unsafe { audio.available(self.handle) },
            None => 0,
        }
    }

    /// Queue whole frames from `samples`. Returns the number of frames handed
    /// to the native module; a trailing partial frame is not written.
    pub fn write(&mut self, samples: &[f32]) -> usize {
        let frames = (samples.len() / self.channels).min(i32::MAX as usize);
        if frames == 0 {
            return 0;
        }

        if let Some(audio) = self.shim.audio() {
            unsafe { audio.write(self.handle, samples.as_ptr(), frames as i32) };
        }
        frames
    }

    /// Close the stream now
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for AudioStream {
    fn drop(&mut self) {
        if let Some(audio) = self.shim.audio() {
            unsafe { audio.close(self.handle) };
        }
        log::debug!("Audio stream closed");
    }
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStream")
            .field("handle", &self.handle)
            .field("channels", &self.channels)
            .finish()
    }
}
