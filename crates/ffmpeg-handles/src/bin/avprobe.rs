use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use ffmpeg_handles::telemetry::{get_subscriber, init_subscriber};
use ffmpeg_handles::{
    load_settings, set_log_level, CodecContext, DecoderSettings, FormatContext, InputSettings,
    LogLevel, MediaType, OptionSet, Packet,
};
use tracing::info;

/// Open a media input and its audio decoder, then print what was found.
#[derive(Debug, Parser)]
#[command(name = "avprobe", version)]
struct Cli {
    /// File, URL or device input. Overrides `source` from the config file.
    source: Option<String>,

    /// Input format or device to force (e.g. `wav`, `alsa`)
    #[arg(short = 'f', long)]
    device: Option<String>,

    /// Settings file (toml, yaml or json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Format option passed to the demuxer, repeatable
    #[arg(short = 'o', long = "option", value_parser = parse_key_value)]
    options: Vec<(String, String)>,

    /// Decoder to use instead of the stream's default
    #[arg(long)]
    decoder: Option<String>,

    /// Decoder option, repeatable
    #[arg(short = 'd', long = "decoder-option", value_parser = parse_key_value)]
    decoder_options: Vec<(String, String)>,

    /// Read every packet of the selected stream and report the count
    #[arg(long)]
    count_packets: bool,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {:?}", s))
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let subscriber = get_subscriber("avprobe".into(), "info".into(), std::io::stderr);
    init_subscriber(subscriber);

    let cli = Cli::parse();

    let mut settings = match (&cli.config, cli.source) {
        (Some(path), source) => {
            let mut settings = load_settings(Some(path.as_path()))
                .wrap_err("Failed to load configuration")?;
            if let Some(source) = source {
                settings.source = source;
            }
            settings
        }
        (None, Some(source)) => InputSettings {
            source,
            device: None,
            format_options: OptionSet::new(),
            decoder: DecoderSettings::default(),
            log_level: LogLevel::default(),
        },
        (None, None) => return Err(eyre!("either a source or --config is required")),
    };
    if cli.device.is_some() {
        settings.device = cli.device;
    }
    if cli.decoder.is_some() {
        settings.decoder.name = cli.decoder;
    }
    settings.format_options.extend(cli.options);
    settings.decoder.options.extend(cli.decoder_options);

    set_log_level(settings.log_level);

    let mut input = FormatContext::open_with(&settings)?;
    println!("input:    {}", input.source());
    println!("format:   {}", input.format_name());
    match input.duration() {
        Some(seconds) => println!("duration: {:.3}s", seconds),
        None => println!("duration: unknown"),
    }
    for index in 0..input.nb_streams() {
        println!("stream {}: {}", index, input.stream_media_type(index)?);
    }

    let stream = input.find_best_stream(MediaType::Audio)?;
    let mut params = input.codec_parameters(stream)?;
    let decoder = CodecContext::open_with(&mut params, &settings.decoder)?;
    println!(
        "audio:    stream {} decoded by {} at {} Hz, {} channels",
        stream,
        decoder.codec_name(),
        decoder.sample_rate(),
        decoder.ch_layout().nb_channels
    );

    if cli.count_packets {
        let mut packet = Packet::new()?;
        let (mut packets, mut bytes) = (0usize, 0usize);
        while let Some(read) = input.read_packet(&mut packet)? {
            if read.stream_index() as usize == stream {
                packets += 1;
                bytes += read.size();
            }
        }
        info!(packets, bytes, "Finished reading input");
        println!("packets:  {} ({} bytes)", packets, bytes);
    }

    Ok(())
}
