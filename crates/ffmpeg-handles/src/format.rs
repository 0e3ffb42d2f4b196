//! Opened and probed input (file, URL or capture device).

use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt;
use std::ptr;

use crate::codec::CodecParameters;
use crate::dict::{to_cstring, Dictionary, OptionSet};
use crate::error::{check, error_string, FfmpegError, Result};
use crate::handle::Owned;
use crate::packet::{Packet, PacketUnref};
use crate::settings::InputSettings;
use ffmpeg_sys::*;
use tracing::{debug, instrument};

/// Kind of data carried by a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Audio,
    Video,
    Subtitle,
    Data,
    Attachment,
    Unknown,
}

impl MediaType {
    pub(crate) fn from_raw(raw: AVMediaType) -> Self {
        match raw {
            AVMediaType::AVMEDIA_TYPE_AUDIO => MediaType::Audio,
            AVMediaType::AVMEDIA_TYPE_VIDEO => MediaType::Video,
            AVMediaType::AVMEDIA_TYPE_SUBTITLE => MediaType::Subtitle,
            AVMediaType::AVMEDIA_TYPE_DATA => MediaType::Data,
            AVMediaType::AVMEDIA_TYPE_ATTACHMENT => MediaType::Attachment,
            _ => MediaType::Unknown,
        }
    }

    pub(crate) fn as_raw(self) -> AVMediaType {
        match self {
            MediaType::Audio => AVMediaType::AVMEDIA_TYPE_AUDIO,
            MediaType::Video => AVMediaType::AVMEDIA_TYPE_VIDEO,
            MediaType::Subtitle => AVMediaType::AVMEDIA_TYPE_SUBTITLE,
            MediaType::Data => AVMediaType::AVMEDIA_TYPE_DATA,
            MediaType::Attachment => AVMediaType::AVMEDIA_TYPE_ATTACHMENT,
            MediaType::Unknown => AVMediaType::AVMEDIA_TYPE_UNKNOWN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Subtitle => "subtitle",
            MediaType::Data => "data",
            MediaType::Attachment => "attachment",
            MediaType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opened input with its stream information already probed.
pub struct FormatContext {
    ctx: Owned<AVFormatContext>,
    source: String,
}

impl FormatContext {
    /// Open `source`, optionally through the input format or device named by
    /// `device` (empty to let FFmpeg probe), and read its stream information.
    ///
    /// Every entry in `options` must be consumed by `avformat_open_input`;
    /// leftovers fail with `UnrecognizedOption` even when the open itself
    /// succeeded.
    #[instrument(
        skip(source, options),
        fields(source = %redact_source(source), options = options.len())
    )]
    pub fn open(source: &str, device: &str, options: &OptionSet) -> Result<Self> {
        crate::init();

        let source_c = to_cstring(source, "source")?;
        let input_format = find_input_format(device)?;
        let mut dict = Dictionary::from_options(options)?;
        let mut ctx = Owned::<AVFormatContext>::alloc(|| unsafe { avformat_alloc_context() })?;

        // On failure the context is freed and the slot nulled by FFmpeg
        let ret = unsafe {
            avformat_open_input(
                ctx.slot(),
                source_c.as_ptr(),
                input_format,
                dict.as_mut_ptr(),
            )
        };

        dict.ensure_consumed("options")?;

        if ret < 0 {
            return Err(FfmpegError::Open {
                input: source.to_string(),
                detail: error_string(ret),
            });
        }

        let ret = unsafe { avformat_find_stream_info(ctx.as_ptr(), ptr::null_mut()) };
        if ret < 0 {
            return Err(FfmpegError::StreamInfo(error_string(ret)));
        }

        let input = Self {
            ctx,
            source: source.to_string(),
        };
        debug!(
            format = input.format_name(),
            streams = input.nb_streams(),
            duration = ?input.duration(),
            "Input opened"
        );
        Ok(input)
    }

    /// Open the input described by `settings`.
    pub fn open_with(settings: &InputSettings) -> Result<Self> {
        Self::open(
            &settings.source,
            settings.device.as_deref().unwrap_or(""),
            &settings.format_options,
        )
    }

    pub fn as_ptr(&self) -> *const AVFormatContext {
        self.ctx.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut AVFormatContext {
        self.ctx.as_ptr()
    }

    /// The source this context was opened from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Short name of the demuxer that was selected (e.g. `wav`).
    pub fn format_name(&self) -> String {
        unsafe {
            let iformat = (*self.ctx.as_ptr()).iformat;
            if iformat.is_null() || (*iformat).name.is_null() {
                return String::new();
            }
            CStr::from_ptr((*iformat).name)
                .to_string_lossy()
                .into_owned()
        }
    }

    pub fn nb_streams(&self) -> usize {
        unsafe { (*self.ctx.as_ptr()).nb_streams as usize }
    }

    /// Container duration in seconds, if known.
    pub fn duration(&self) -> Option<f64> {
        let duration = unsafe { (*self.ctx.as_ptr()).duration };
        // AV_NOPTS_VALUE is i64::MIN
        if duration < 0 {
            None
        } else {
            Some(duration as f64 / AV_TIME_BASE as f64)
        }
    }

    pub fn stream_media_type(&self, index: usize) -> Result<MediaType> {
        let stream = self.stream(index)?;
        Ok(MediaType::from_raw(unsafe { (*(*stream).codecpar).codec_type }))
    }

    /// Index of the stream FFmpeg considers the best of `kind`.
    pub fn find_best_stream(&self, kind: MediaType) -> Result<usize> {
        let idx = unsafe {
            av_find_best_stream(
                self.ctx.as_ptr(),
                kind.as_raw(),
                -1,
                -1,
                ptr::null_mut(),
                0,
            )
        };
        if idx < 0 {
            Err(FfmpegError::NoStream(kind.as_str()))
        } else {
            Ok(idx as usize)
        }
    }

    /// An owned copy of the codec parameters of stream `index`, suitable
    /// for [`CodecContext::open`](crate::CodecContext::open).
    pub fn codec_parameters(&self, index: usize) -> Result<CodecParameters> {
        let stream = self.stream(index)?;
        CodecParameters::copy_from(unsafe { (*stream).codecpar })
    }

    /// Read the next packet into `packet`.
    ///
    /// Returns a guard that releases the packet's buffers when dropped, or
    /// `None` at end of input.
    pub fn read_packet<'p>(&mut self, packet: &'p mut Packet) -> Result<Option<PacketUnref<'p>>> {
        let ret = unsafe { av_read_frame(self.ctx.as_ptr(), packet.as_mut_ptr()) };
        if ffmpeg_sys::is_eof(ret) {
            return Ok(None);
        }
        check(ret, "av_read_frame")?;
        Ok(Some(PacketUnref::acquire(packet)))
    }

    fn stream(&self, index: usize) -> Result<*mut AVStream> {
        let count = self.nb_streams();
        if index >= count {
            return Err(FfmpegError::StreamIndex { index, count });
        }
        Ok(unsafe { *(*self.ctx.as_ptr()).streams.add(index) })
    }
}

impl fmt::Debug for FormatContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatContext")
            .field("source", &self.source)
            .field("format", &self.format_name())
            .field("streams", &self.nb_streams())
            .finish()
    }
}

/// Resolve a demuxer or input device by name; empty means probe.
fn find_input_format(name: &str) -> Result<*const AVInputFormat> {
    if name.is_empty() {
        return Ok(ptr::null());
    }
    let name_c = to_cstring(name, "device")?;
    let format = unsafe { av_find_input_format(name_c.as_ptr()) };
    if format.is_null() {
        Err(FfmpegError::UnsupportedDevice(name.to_string()))
    } else {
        Ok(format)
    }
}

/// `source` with the `user:password@` part of a URL authority masked, for
/// logging.
fn redact_source(source: &str) -> Cow<'_, str> {
    let Some(scheme_end) = source.find("://") else {
        return Cow::Borrowed(source);
    };
    let start = scheme_end + 3;
    let end = source[start..]
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .map_or(source.len(), |i| start + i);
    match source[start..end].rfind('@') {
        Some(at) => Cow::Owned(format!("{}***{}", &source[..start], &source[start + at..])),
        None => Cow::Borrowed(source),
    }
}
