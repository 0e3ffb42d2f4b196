//! Decoder lookup and opened decoder contexts.

use std::ffi::CStr;
use std::fmt;

use crate::dict::{to_cstring, Dictionary, OptionSet};
use crate::error::{check, error_string, FfmpegError, Result};
use crate::format::MediaType;
use crate::handle::Owned;
use crate::settings::DecoderSettings;
use ffmpeg_sys::*;
use tracing::{debug, instrument};

/// Owned `AVCodecParameters`, usually copied out of an input stream with
/// [`FormatContext::codec_parameters`](crate::FormatContext::codec_parameters).
pub struct CodecParameters(Owned<AVCodecParameters>);

impl CodecParameters {
    pub fn new() -> Result<Self> {
        Owned::alloc(|| unsafe { avcodec_parameters_alloc() }).map(Self)
    }

    /// Audio parameters with `channels` channels in unspecified order, i.e.
    /// without an explicit channel layout.
    pub fn new_audio(codec_id: AVCodecID, sample_rate: i32, channels: i32) -> Result<Self> {
        let params = Self::new()?;
        unsafe {
            let par = params.0.as_ptr();
            (*par).codec_type = AVMediaType::AVMEDIA_TYPE_AUDIO;
            (*par).codec_id = codec_id;
            (*par).sample_rate = sample_rate;
            av_channel_layout_uninit(&mut (*par).ch_layout);
            (*par).ch_layout.order = AVChannelOrder::AV_CHANNEL_ORDER_UNSPEC;
            (*par).ch_layout.nb_channels = channels;
        }
        Ok(params)
    }

    pub(crate) fn copy_from(src: *const AVCodecParameters) -> Result<Self> {
        let params = Self::new()?;
        check(
            unsafe { avcodec_parameters_copy(params.0.as_ptr(), src) },
            "avcodec_parameters_copy",
        )?;
        Ok(params)
    }

    pub fn as_ptr(&self) -> *const AVCodecParameters {
        self.0.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut AVCodecParameters {
        self.0.as_ptr()
    }

    pub fn codec_id(&self) -> AVCodecID {
        unsafe { (*self.0.as_ptr()).codec_id }
    }

    pub fn media_type(&self) -> MediaType {
        MediaType::from_raw(unsafe { (*self.0.as_ptr()).codec_type })
    }

    pub fn sample_rate(&self) -> i32 {
        unsafe { (*self.0.as_ptr()).sample_rate }
    }

    pub fn ch_layout(&self) -> &AVChannelLayout {
        unsafe { &(*self.0.as_ptr()).ch_layout }
    }

    /// Whether the channel layout says which channel is which, rather than
    /// only how many there are.
    pub fn has_channel_layout(&self) -> bool {
        self.ch_layout().order != AVChannelOrder::AV_CHANNEL_ORDER_UNSPEC
    }
}

impl fmt::Debug for CodecParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecParameters")
            .field("codec", &codec_id_name(self.codec_id()))
            .field("media_type", &self.media_type())
            .field("sample_rate", &self.sample_rate())
            .field("channels", &self.ch_layout().nb_channels)
            .finish()
    }
}

/// An opened decoder bound to a stream's parameters.
pub struct CodecContext(Owned<AVCodecContext>);

impl CodecContext {
    /// Find a decoder (by `decoder` name, or by the codec id in `params`
    /// when the name is empty), bind it to `params` and open it with
    /// `options`.
    ///
    /// Every entry in `options` must be consumed by `avcodec_open2`. For
    /// audio parameters without an explicit channel layout, the default
    /// layout for the opened decoder's channel count is written back into
    /// `params`.
    #[instrument(
        skip(params, options),
        fields(codec = %codec_id_name(params.codec_id()), options = options.len())
    )]
    pub fn open(params: &mut CodecParameters, decoder: &str, options: &OptionSet) -> Result<Self> {
        crate::init();

        let codec = find_decoder(params.codec_id(), decoder)?;
        let ctx = Self(Owned::alloc(|| unsafe { avcodec_alloc_context3(codec) })?);

        let ret = unsafe { avcodec_parameters_to_context(ctx.0.as_ptr(), params.as_ptr()) };
        if ret < 0 {
            return Err(FfmpegError::Parameter(error_string(ret)));
        }

        let mut dict = Dictionary::from_options(options)?;
        let ret = unsafe { avcodec_open2(ctx.0.as_ptr(), codec, dict.as_mut_ptr()) };
        if ret < 0 {
            return Err(FfmpegError::CodecOpen {
                codec: codec_name(codec),
                detail: error_string(ret),
            });
        }
        dict.ensure_consumed("decoder options")?;

        if params.media_type() == MediaType::Audio && !params.has_channel_layout() {
            ctx.backfill_channel_layout(params)?;
        }

        debug!(
            decoder = %ctx.codec_name(),
            sample_rate = ctx.sample_rate(),
            channels = ctx.ch_layout().nb_channels,
            "Decoder opened"
        );
        Ok(ctx)
    }

    /// Open the decoder described by `settings`.
    pub fn open_with(params: &mut CodecParameters, settings: &DecoderSettings) -> Result<Self> {
        Self::open(
            params,
            settings.name.as_deref().unwrap_or(""),
            &settings.options,
        )
    }

    pub fn as_ptr(&self) -> *const AVCodecContext {
        self.0.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut AVCodecContext {
        self.0.as_ptr()
    }

    /// Name of the decoder in use.
    pub fn codec_name(&self) -> String {
        codec_name(unsafe { (*self.0.as_ptr()).codec })
    }

    pub fn sample_fmt(&self) -> AVSampleFormat {
        unsafe { (*self.0.as_ptr()).sample_fmt }
    }

    pub fn sample_rate(&self) -> i32 {
        unsafe { (*self.0.as_ptr()).sample_rate }
    }

    pub fn ch_layout(&self) -> &AVChannelLayout {
        unsafe { &(*self.0.as_ptr()).ch_layout }
    }

    pub fn time_base(&self) -> AVRational {
        unsafe { (*self.0.as_ptr()).time_base }
    }

    fn backfill_channel_layout(&self, params: &mut CodecParameters) -> Result<()> {
        let channels = self.ch_layout().nb_channels;
        if channels <= 0 {
            return Ok(());
        }

        let mut layout: AVChannelLayout = unsafe { std::mem::zeroed() };
        let ret = unsafe {
            av_channel_layout_default(&mut layout, channels);
            let ret = av_channel_layout_copy(&mut (*params.as_mut_ptr()).ch_layout, &layout);
            av_channel_layout_uninit(&mut layout);
            ret
        };
        check(ret, "av_channel_layout_copy")?;

        debug!(channels, "Derived default channel layout");
        Ok(())
    }
}

impl fmt::Debug for CodecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecContext")
            .field("decoder", &self.codec_name())
            .field("sample_rate", &self.sample_rate())
            .field("channels", &self.ch_layout().nb_channels)
            .finish()
    }
}

fn find_decoder(codec_id: AVCodecID, name: &str) -> Result<*const AVCodec> {
    let codec = if name.is_empty() {
        unsafe { avcodec_find_decoder(codec_id) }
    } else {
        let name_c = to_cstring(name, "decoder")?;
        unsafe { avcodec_find_decoder_by_name(name_c.as_ptr()) }
    };

    if !codec.is_null() {
        return Ok(codec);
    }
    Err(if name.is_empty() {
        FfmpegError::UnsupportedCodec {
            name: codec_id_name(codec_id),
            id: Some(codec_id as i32),
        }
    } else {
        FfmpegError::UnsupportedCodec {
            name: name.to_string(),
            id: None,
        }
    })
}

fn codec_name(codec: *const AVCodec) -> String {
    if codec.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr((*codec).name) }
        .to_string_lossy()
        .into_owned()
}

/// Symbolic name FFmpeg uses for `codec_id` (e.g. `pcm_s16le`).
fn codec_id_name(codec_id: AVCodecID) -> String {
    unsafe { CStr::from_ptr(avcodec_get_name(codec_id)) }
        .to_string_lossy()
        .into_owned()
}
