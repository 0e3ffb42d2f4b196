//! Error types for FFmpeg handle construction.

use std::ffi::CStr;

use libc::c_char;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FfmpegError>;

/// Every way constructing or driving a handle can fail.
#[derive(Debug, Error)]
pub enum FfmpegError {
    /// A native allocator returned null.
    #[error("Failed to allocate {0}")]
    Allocation(&'static str),

    #[error("Failed to open the input \"{input}\" ({detail}).")]
    Open { input: String, detail: String },

    #[error("Failed to find stream information ({0}).")]
    StreamInfo(String),

    #[error("Unsupported device/format: \"{0}\"")]
    UnsupportedDevice(String),

    /// No decoder matched the requested name, or the codec id when no name
    /// was given.
    #[error("Unsupported codec: {}", describe_codec(.name, .id))]
    UnsupportedCodec { name: String, id: Option<i32> },

    #[error("Failed to set CodecContext parameter ({0}).")]
    Parameter(String),

    #[error("Failed to initialize CodecContext for \"{codec}\" ({detail}).")]
    CodecOpen { codec: String, detail: String },

    /// Options left in the dictionary after the native call consumed what it
    /// understood.
    #[error("Unexpected {what}: {}", quote_keys(.keys))]
    UnrecognizedOption { what: &'static str, keys: Vec<String> },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Filter configuration error: {0}")]
    FilterConfig(String),

    #[error("No {0} stream found in input")]
    NoStream(&'static str),

    #[error("Stream index {index} out of range ({count} streams)")]
    StreamIndex { index: usize, count: usize },

    /// Any other negative status from a native call.
    #[error("FFmpeg error {code} in {operation}: {detail}")]
    Ffmpeg {
        code: i32,
        operation: &'static str,
        detail: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl FfmpegError {
    /// Keys reported by an `UnrecognizedOption` error, empty for every other
    /// variant.
    pub fn unrecognized_keys(&self) -> &[String] {
        match self {
            FfmpegError::UnrecognizedOption { keys, .. } => keys,
            _ => &[],
        }
    }
}

fn describe_codec(name: &str, id: &Option<i32>) -> String {
    match id {
        Some(id) => format!("\"{}\", ({}).", name, id),
        None => format!("\"{}\".", name),
    }
}

/// `"a", "b", "c"`
pub(crate) fn quote_keys(keys: &[String]) -> String {
    keys.iter()
        .map(|k| format!("\"{}\"", k))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert FFmpeg error code to human-readable string.
pub fn error_string(code: i32) -> String {
    let mut buf = [0 as c_char; 256];
    unsafe {
        if ffmpeg_sys::av_strerror(code, buf.as_mut_ptr(), buf.len()) < 0 {
            return format!("unknown error {}", code);
        }
        CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
    }
}

/// Check FFmpeg return value and convert to Result.
#[inline]
pub fn check(code: i32, operation: &'static str) -> Result<i32> {
    if code < 0 {
        Err(FfmpegError::Ffmpeg {
            code,
            operation,
            detail: error_string(code),
        })
    } else {
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unrecognized_options_are_quoted_and_comma_separated() {
        let err = FfmpegError::UnrecognizedOption {
            what: "options",
            keys: vec!["foo".into(), "bar".into()],
        };
        assert_eq!(err.to_string(), r#"Unexpected options: "foo", "bar""#);
        assert_eq!(err.unrecognized_keys(), ["foo", "bar"]);
    }

    #[test]
    fn unsupported_codec_by_name() {
        let err = FfmpegError::UnsupportedCodec {
            name: "nope".into(),
            id: None,
        };
        assert_eq!(err.to_string(), r#"Unsupported codec: "nope"."#);
    }

    #[test]
    fn unsupported_codec_by_id_carries_both() {
        let err = FfmpegError::UnsupportedCodec {
            name: "none".into(),
            id: Some(0),
        };
        assert_eq!(err.to_string(), r#"Unsupported codec: "none", (0)."#);
    }

    #[test]
    fn open_stage_failures_carry_ffmpeg_detail() {
        let detail = error_string(-libc::EINVAL);

        let err = FfmpegError::Parameter(detail.clone());
        assert_eq!(err.to_string(), format!("Failed to set CodecContext parameter ({detail})."));
        let err = FfmpegError::StreamInfo(detail.clone());
        assert_eq!(err.to_string(), format!("Failed to find stream information ({detail})."));
        let err = FfmpegError::CodecOpen {
            codec: "pcm_s16le".into(),
            detail: detail.clone(),
        };
        assert_eq!(
            err.to_string(),
            format!(r#"Failed to initialize CodecContext for "pcm_s16le" ({detail})."#)
        );
    }

    #[test]
    fn check_passes_through_non_negative() {
        assert_eq!(check(3, "test").unwrap(), 3);
        let err = check(-libc::ENOENT, "avformat_open_input").unwrap_err();
        match err {
            FfmpegError::Ffmpeg { code, operation, .. } => {
                assert_eq!(code, -libc::ENOENT);
                assert_eq!(operation, "avformat_open_input");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn error_string_describes_errno() {
        assert!(!error_string(-libc::ENOENT).is_empty());
    }
}
