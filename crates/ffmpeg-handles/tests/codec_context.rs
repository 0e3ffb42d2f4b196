mod common;

use claims::{assert_err, assert_ok};
use common::open_fixture;
use ffmpeg_handles::sys::{av_channel_layout_from_mask, AVChannelOrder, AVCodecID};
use ffmpeg_handles::{
    option_set, CodecContext, CodecParameters, DecoderSettings, FfmpegError, MediaType, OptionSet,
};
use pretty_assertions::assert_eq;

#[test]
fn opens_default_decoder_for_stream() {
    let dir = tempfile::tempdir().unwrap();
    let input = open_fixture(dir.path(), 2);
    let stream = input.find_best_stream(MediaType::Audio).unwrap();
    let mut params = input.codec_parameters(stream).unwrap();

    let decoder = assert_ok!(CodecContext::open(&mut params, "", &OptionSet::new()));
    assert_eq!(decoder.codec_name(), "pcm_s16le");
    assert_eq!(decoder.sample_rate(), 8000);
    assert_eq!(decoder.ch_layout().nb_channels, 2);
    assert!(params.has_channel_layout());
}

#[test]
fn opens_decoder_by_name_with_options() {
    let dir = tempfile::tempdir().unwrap();
    let input = open_fixture(dir.path(), 1);
    let mut params = input.codec_parameters(0).unwrap();

    let settings = DecoderSettings {
        name: Some("pcm_s16le".into()),
        options: option_set([("threads", "1")]),
    };
    let decoder = assert_ok!(CodecContext::open_with(&mut params, &settings));
    assert_eq!(decoder.codec_name(), "pcm_s16le");
}

#[test]
fn unknown_decoder_name_is_reported() {
    let mut params = CodecParameters::new_audio(AVCodecID::AV_CODEC_ID_PCM_S16LE, 8000, 1).unwrap();

    let err = assert_err!(CodecContext::open(&mut params, "no_such_decoder", &OptionSet::new()));
    assert!(matches!(err, FfmpegError::UnsupportedCodec { id: None, .. }));
    assert!(err.to_string().contains("no_such_decoder"), "{err}");
}

#[test]
fn unknown_codec_id_reports_name_and_number() {
    let mut params = CodecParameters::new_audio(AVCodecID::AV_CODEC_ID_NONE, 8000, 1).unwrap();

    let err = assert_err!(CodecContext::open(&mut params, "", &OptionSet::new()));
    let message = err.to_string();
    assert!(message.contains("\"none\""), "{message}");
    assert!(message.contains("(0)"), "{message}");
}

#[test]
fn unrecognized_decoder_options_are_reported() {
    let mut params = CodecParameters::new_audio(AVCodecID::AV_CODEC_ID_PCM_S16LE, 8000, 1).unwrap();

    let err = assert_err!(CodecContext::open(
        &mut params,
        "",
        &option_set([("threads", "1"), ("wibble", "x"), ("frobnicate", "y")]),
    ));
    assert_eq!(
        err.to_string(),
        r#"Unexpected decoder options: "frobnicate", "wibble""#
    );
}

#[test]
fn missing_channel_layout_is_backfilled() {
    let mut params = CodecParameters::new_audio(AVCodecID::AV_CODEC_ID_PCM_S16LE, 44100, 2).unwrap();
    assert!(!params.has_channel_layout());

    let decoder = assert_ok!(CodecContext::open(&mut params, "", &OptionSet::new()));

    let layout = params.ch_layout();
    assert_eq!(layout.order, AVChannelOrder::AV_CHANNEL_ORDER_NATIVE);
    assert_eq!(layout.nb_channels, decoder.ch_layout().nb_channels);
    assert_ne!(unsafe { layout.u.mask }, 0);
}

#[test]
fn invalid_option_value_fails_the_open_before_leftovers_are_checked() {
    let mut params = CodecParameters::new_audio(AVCodecID::AV_CODEC_ID_PCM_S16LE, 8000, 1).unwrap();

    let err = assert_err!(CodecContext::open(
        &mut params,
        "",
        &option_set([("threads", "not_a_number"), ("wibble", "x")]),
    ));
    assert!(
        matches!(err, FfmpegError::CodecOpen { ref codec, .. } if codec == "pcm_s16le"),
        "{err}"
    );
    assert!(err.to_string().starts_with(r#"Failed to initialize CodecContext for "pcm_s16le""#));
}

#[test]
fn explicit_channel_layout_is_left_alone() {
    // FC + LFE: two channels, but not the default stereo layout
    const FRONT_CENTER_LFE: u64 = 0x4 | 0x8;

    let mut params = CodecParameters::new_audio(AVCodecID::AV_CODEC_ID_PCM_S16LE, 8000, 2).unwrap();
    let ret = unsafe {
        av_channel_layout_from_mask(&mut (*params.as_mut_ptr()).ch_layout, FRONT_CENTER_LFE)
    };
    assert_eq!(ret, 0);
    assert!(params.has_channel_layout());

    let decoder = assert_ok!(CodecContext::open(&mut params, "", &OptionSet::new()));

    let layout = params.ch_layout();
    assert_eq!(layout.order, AVChannelOrder::AV_CHANNEL_ORDER_NATIVE);
    assert_eq!(layout.nb_channels, 2);
    assert_eq!(unsafe { layout.u.mask }, FRONT_CENTER_LFE);
    assert_eq!(unsafe { decoder.ch_layout().u.mask }, FRONT_CENTER_LFE);
}
