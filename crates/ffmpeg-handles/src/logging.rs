//! Verbosity of FFmpeg's own logging (printed to stderr by libavutil).

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    #[default]
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_raw(self) -> i32 {
        use ffmpeg_sys::*;
        // bindgen types the negative AV_LOG_QUIET as i32 and the rest as u32
        match self {
            LogLevel::Quiet => AV_LOG_QUIET as i32,
            LogLevel::Panic => AV_LOG_PANIC as i32,
            LogLevel::Fatal => AV_LOG_FATAL as i32,
            LogLevel::Error => AV_LOG_ERROR as i32,
            LogLevel::Warning => AV_LOG_WARNING as i32,
            LogLevel::Info => AV_LOG_INFO as i32,
            LogLevel::Verbose => AV_LOG_VERBOSE as i32,
            LogLevel::Debug => AV_LOG_DEBUG as i32,
            LogLevel::Trace => AV_LOG_TRACE as i32,
        }
    }

    fn from_raw(raw: i32) -> Self {
        [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Verbose,
            LogLevel::Info,
            LogLevel::Warning,
            LogLevel::Error,
            LogLevel::Fatal,
            LogLevel::Panic,
        ]
        .into_iter()
        .find(|level| raw >= level.as_raw())
        .unwrap_or(LogLevel::Quiet)
    }
}

/// Set the global libav* log level.
pub fn set_log_level(level: LogLevel) {
    unsafe { ffmpeg_sys::av_log_set_level(level.as_raw()) }
}

/// Current global libav* log level.
pub fn log_level() -> LogLevel {
    LogLevel::from_raw(unsafe { ffmpeg_sys::av_log_get_level() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn level_round_trips_through_ffmpeg() {
        let before = log_level();
        for level in [LogLevel::Quiet, LogLevel::Error, LogLevel::Debug, LogLevel::Trace] {
            set_log_level(level);
            assert_eq!(log_level(), level);
        }
        set_log_level(before);
    }

    #[test]
    fn levels_order_like_ffmpeg() {
        assert!(LogLevel::Quiet.as_raw() < LogLevel::Panic.as_raw());
        assert!(LogLevel::Error.as_raw() < LogLevel::Warning.as_raw());
        assert!(LogLevel::Debug.as_raw() < LogLevel::Trace.as_raw());
    }
}
