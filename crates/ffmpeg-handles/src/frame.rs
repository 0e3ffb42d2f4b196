//! Decoded frames.

use crate::error::Result;
use crate::handle::Owned;
use ffmpeg_sys::*;

/// RAII wrapper for AVFrame.
#[derive(Debug)]
pub struct Frame(Owned<AVFrame>);

impl Frame {
    pub fn new() -> Result<Self> {
        Owned::alloc(|| unsafe { av_frame_alloc() }).map(Self)
    }

    pub fn as_ptr(&self) -> *const AVFrame {
        self.0.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut AVFrame {
        self.0.as_ptr()
    }

    /// Unreference frame data, keeping the structure allocated.
    pub fn unref(&mut self) {
        unsafe { av_frame_unref(self.0.as_ptr()) }
    }

    pub fn nb_samples(&self) -> i32 {
        unsafe { (*self.0.as_ptr()).nb_samples }
    }

    /// Raw `AVSampleFormat` (audio) or `AVPixelFormat` (video) value.
    pub fn format(&self) -> i32 {
        unsafe { (*self.0.as_ptr()).format }
    }

    pub fn sample_rate(&self) -> i32 {
        unsafe { (*self.0.as_ptr()).sample_rate }
    }

    pub fn ch_layout(&self) -> &AVChannelLayout {
        unsafe { &(*self.0.as_ptr()).ch_layout }
    }

    pub fn pts(&self) -> Option<i64> {
        match unsafe { (*self.0.as_ptr()).pts } {
            i64::MIN => None,
            pts => Some(pts),
        }
    }
}
