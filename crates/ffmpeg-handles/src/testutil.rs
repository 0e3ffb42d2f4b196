use std::path::{Path, PathBuf};

/// Write a 16-bit PCM WAV file of a sawtooth, `frames` samples per channel.
pub(crate) fn write_wav(
    dir: &Path,
    name: &str,
    channels: u16,
    sample_rate: u32,
    frames: u32,
) -> PathBuf {
    let block_align = channels * 2;
    let data_len = frames * block_align as u32;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..frames * channels as u32 {
        let sample = ((i % 64) as i16 - 32) * 512;
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
