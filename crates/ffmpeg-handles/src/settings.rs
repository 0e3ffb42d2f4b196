//! Input and decoder settings, loadable from a config file plus environment.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::error;

use crate::dict::OptionSet;
use crate::error::Result;
use crate::logging::LogLevel;

/// Everything needed to open an input and its decoder.
#[derive(Debug, Clone, Deserialize)]
pub struct InputSettings {
    /// File path, URL or device-specific input name.
    pub source: String,
    /// Demuxer or input device to force; probed from `source` when absent.
    #[serde(default)]
    pub device: Option<String>,
    /// Passed to `avformat_open_input`. Network timeouts belong here.
    #[serde(default)]
    pub format_options: OptionSet,
    #[serde(default)]
    pub decoder: DecoderSettings,
    #[serde(default)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecoderSettings {
    /// Decoder to use instead of the default for the stream's codec.
    #[serde(default)]
    pub name: Option<String>,
    /// Passed to `avcodec_open2`.
    #[serde(default)]
    pub options: OptionSet,
}

/// Load settings from `path` (any format the `config` crate understands,
/// picked by extension) overlaid with `AVPROBE_*` environment variables,
/// e.g. `AVPROBE_DECODER__NAME=mp3float`.
pub fn load_settings(path: Option<&Path>) -> Result<InputSettings> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("AVPROBE")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<InputSettings>()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FfmpegError;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn loads_full_settings_from_toml() {
        let file = write_config(
            r#"
            source = "http://example.com/stream.mp3"
            log_level = "error"

            [format_options]
            timeout = "5000000"
            reconnect = "1"

            [decoder]
            name = "mp3float"

            [decoder.options]
            threads = "1"
            "#,
        );

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.source, "http://example.com/stream.mp3");
        assert_eq!(settings.device, None);
        assert_eq!(settings.log_level, LogLevel::Error);
        assert_eq!(
            settings.format_options.keys().collect::<Vec<_>>(),
            ["reconnect", "timeout"]
        );
        assert_eq!(settings.decoder.name.as_deref(), Some("mp3float"));
        assert_eq!(settings.decoder.options["threads"], "1");
    }

    #[test]
    #[serial]
    fn optional_sections_default() {
        let file = write_config(r#"source = "in.wav""#);

        let settings = load_settings(Some(file.path())).unwrap();
        assert!(settings.format_options.is_empty());
        assert!(settings.decoder.name.is_none());
        assert!(settings.decoder.options.is_empty());
        assert_eq!(settings.log_level, LogLevel::Warning);
    }

    #[test]
    #[serial]
    fn missing_source_is_a_config_error() {
        let file = write_config(r#"device = "alsa""#);

        let err = load_settings(Some(file.path())).unwrap_err();
        assert!(matches!(err, FfmpegError::Config(_)));
    }
}
