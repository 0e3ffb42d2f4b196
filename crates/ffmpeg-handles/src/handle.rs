//! Single-owner storage for native FFmpeg pointers.
//!
//! Each native type names its own release primitive through [`Release`];
//! [`Owned`] holds one pointer of that type and runs the primitive exactly
//! once when dropped. The pointer is either null or a fully constructed
//! resource.

use std::fmt;

use crate::error::{FfmpegError, Result};
use ffmpeg_sys::*;

/// Native types with a null-tolerant free/close primitive.
pub(crate) trait Release {
    /// Reported by `FfmpegError::Allocation`.
    const NAME: &'static str;

    /// Frees `*ptr` and nulls it.
    ///
    /// # Safety
    /// `*ptr` must be null or a live resource exclusively owned by the caller.
    unsafe fn release(ptr: &mut *mut Self);
}

pub(crate) struct Owned<T: Release>(*mut T);

impl<T: Release> Owned<T> {
    /// Run a native allocator, mapping null to `Allocation`.
    pub(crate) fn alloc(allocate: impl FnOnce() -> *mut T) -> Result<Self> {
        #[cfg(any(test, feature = "fault-injection"))]
        if fault::take() {
            return Err(FfmpegError::Allocation(T::NAME));
        }

        let ptr = allocate();
        if ptr.is_null() {
            Err(FfmpegError::Allocation(T::NAME))
        } else {
            Ok(Self(ptr))
        }
    }

    pub(crate) fn as_ptr(&self) -> *mut T {
        self.0
    }

    /// The raw slot, for native calls that may free and null it on failure
    /// (`avformat_open_input`).
    pub(crate) fn slot(&mut self) -> &mut *mut T {
        &mut self.0
    }

    /// Swap in a freshly allocated resource and release the current one.
    /// On allocation failure the current resource is kept.
    pub(crate) fn replace(&mut self, allocate: impl FnOnce() -> *mut T) -> Result<()> {
        let fresh = Self::alloc(allocate)?;
        drop(std::mem::replace(self, fresh));
        Ok(())
    }
}

impl<T: Release> Drop for Owned<T> {
    fn drop(&mut self) {
        unsafe { T::release(&mut self.0) }
    }
}

impl<T: Release> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(T::NAME).field(&self.0).finish()
    }
}

unsafe impl<T: Release> Send for Owned<T> {}

impl Release for AVFormatContext {
    const NAME: &'static str = "AVFormatContext";

    unsafe fn release(ptr: &mut *mut Self) {
        // Also closes the AVIOContext opened for the input
        avformat_close_input(ptr)
    }
}

impl Release for AVPacket {
    const NAME: &'static str = "AVPacket";

    unsafe fn release(ptr: &mut *mut Self) {
        av_packet_free(ptr)
    }
}

impl Release for AVFrame {
    const NAME: &'static str = "AVFrame";

    unsafe fn release(ptr: &mut *mut Self) {
        av_frame_free(ptr)
    }
}

impl Release for AVCodecContext {
    const NAME: &'static str = "AVCodecContext";

    unsafe fn release(ptr: &mut *mut Self) {
        avcodec_free_context(ptr)
    }
}

impl Release for AVCodecParameters {
    const NAME: &'static str = "AVCodecParameters";

    unsafe fn release(ptr: &mut *mut Self) {
        avcodec_parameters_free(ptr)
    }
}

impl Release for AVFilterGraph {
    const NAME: &'static str = "AVFilterGraph";

    unsafe fn release(ptr: &mut *mut Self) {
        avfilter_graph_free(ptr)
    }
}

/// Allocation failure injection.
///
/// Armed failures are per thread and skip the native allocator entirely, so
/// nothing is left allocated.
#[cfg(any(test, feature = "fault-injection"))]
pub mod fault {
    use std::cell::Cell;

    thread_local! {
        static PENDING: Cell<usize> = const { Cell::new(0) };
    }

    /// Make the next `count` handle allocations on this thread fail.
    pub fn fail_next_allocations(count: usize) {
        PENDING.with(|p| p.set(count));
    }

    /// Disarm any failures that have not fired yet.
    pub fn reset() {
        PENDING.with(|p| p.set(0));
    }

    pub(crate) fn take() -> bool {
        PENDING.with(|p| match p.get() {
            0 => false,
            n => {
                p.set(n - 1);
                true
            }
        })
    }
}
