#![allow(dead_code)]

use std::path::Path;

#[path = "../../src/testutil.rs"]
mod wav;

pub(crate) use wav::write_wav;

pub fn open_fixture(dir: &Path, channels: u16) -> ffmpeg_handles::FormatContext {
    let path = write_wav(dir, "fixture.wav", channels, 8000, 4000);
    ffmpeg_handles::FormatContext::open(
        path.to_str().unwrap(),
        "",
        &ffmpeg_handles::OptionSet::new(),
    )
    .unwrap()
}
