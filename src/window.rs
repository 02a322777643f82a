//! # Window
//!
//! Owning wrapper around a native window handle.
//!
//! The pixel buffer is borrowed for the life of the window, because the
//! native side keeps drawing from it after `fen_open` returns. The title is
//! kept alive for the same reason. The handle is closed exactly once, either
//! by [`Window::close`] or on drop.

use std::cell::Cell;
use std::ffi::CString;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{ShimError, ShimResult};
use crate::ffi::{FenShim, LoopStatus, WindowHandle};

/// An open native window
///
/// `Send` but not `Sync`: calls on one handle must come from one thread at a
/// time.
///
/// ```compile_fail
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<fen_shim::Window<'static>>();
/// ```
pub struct Window<'buf> {
    shim: Arc<FenShim>,
    handle: WindowHandle,
    width: i32,
    height: i32,
    pixels: &'buf mut [u32],
    title: CString,
    _not_sync: PhantomData<Cell<()>>,
}

impl<'buf> Window<'buf> {
    /// Open a window through the process-wide loader
    pub fn new(width: i32, height: i32, title: &str, pixels: &'buf mut [u32]) -> ShimResult<Self> {
        let shim = crate::loader::ensure_loaded()?;
        Self::open(shim, width, height, title, pixels)
    }

    /// Open a window on a specific module
    pub fn open(
        shim: Arc<FenShim>,
        width: i32,
        height: i32,
        title: &str,
        pixels: &'buf mut [u32],
    ) -> ShimResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ShimError::InvalidDimensions { width, height });
        }

        let required = (width as usize)
            .checked_mul(height as usize)
            .ok_or(ShimError::InvalidDimensions { width, height })?;
        if pixels.len() < required {
            return Err(ShimError::BufferTooSmall {
                required,
                actual: pixels.len(),
            });
        }

        let title = CString::new(title).map_err(|_| ShimError::InvalidTitle)?;

        let handle = unsafe { shim.open(width, height, &title, pixels.as_mut_ptr()) };
        if handle.is_null() {
            return Err(ShimError::OpenFailed("window"));
        }

        log::debug!("Window {:?} opened ({}x{})", title, width, height);

        Ok(Self {
            shim,
            handle,
            width,
            height,
            pixels,
            title,
            _not_sync: PhantomData,
        })
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn shim(&self) -> &Arc<FenShim> {
        &self.shim
    }

    /// The pixel buffer the native side presents from
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        self.pixels
    }

    /// Run one iteration of the native event loop
    pub fn pump(&mut self) -> LoopStatus {
        unsafe { self.shim.loop_once(self.handle) }
    }

    /// Raw key state as reported by the native module
    pub fn key(&self, code: i32) -> i32 {
        unsafe { self.shim.key(self.handle, code) }
    }

    pub fn is_key_down(&self, code: i32) -> bool {
        self.key(code) != 0
    }

    /// Close the window now
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for Window<'_> {
    fn drop(&mut self) {
        unsafe { self.shim.close(self.handle) };
        log::debug!("Window {:?} closed", self.title);
    }
}

impl std::fmt::Debug for Window<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("handle", &self.handle)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
