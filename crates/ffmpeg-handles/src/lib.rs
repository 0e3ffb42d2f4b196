//! Owning handles for the FFmpeg resources an audio decode pipeline works
//! with.
//!
//! Five handle types cover the lifecycle of a decode: [`FormatContext`]
//! (opened, probed input), [`Packet`] and [`Frame`] (reusable buffers),
//! [`CodecContext`] (opened decoder) and [`FilterGraph`]. Each is released
//! deterministically when dropped, including when construction fails part
//! way through. Options handed to FFmpeg are checked after the native call,
//! and any the library did not consume are returned as
//! [`FfmpegError::UnrecognizedOption`].

mod codec;
mod dict;
mod error;
mod filter;
mod format;
mod frame;
mod handle;
mod logging;
mod packet;
mod settings;
pub mod telemetry;

#[cfg(test)]
mod testutil;

pub use codec::{CodecContext, CodecParameters};
pub use dict::{option_set, OptionSet};
pub use error::{check, error_string, FfmpegError, Result};
pub use filter::FilterGraph;
pub use format::{FormatContext, MediaType};
pub use frame::Frame;
pub use logging::{log_level, set_log_level, LogLevel};
pub use packet::{Packet, PacketUnref};
pub use settings::{load_settings, DecoderSettings, InputSettings};

#[cfg(any(test, feature = "fault-injection"))]
pub use handle::fault;

pub use ffmpeg_sys as sys;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize FFmpeg. Called automatically by the handle constructors that
/// need it.
pub fn init() {
    INIT.call_once(|| {
        #[cfg(feature = "network")]
        unsafe {
            ffmpeg_sys::avformat_network_init();
        }
        // Input devices (alsa, pulse, avfoundation, ...) only resolve by name
        // once registered.
        #[cfg(feature = "device")]
        unsafe {
            ffmpeg_sys::avdevice_register_all();
        }
    });
}
