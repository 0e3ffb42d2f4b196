//! Raw FFI bindings to the FFmpeg libraries, generated at build time.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]
#![allow(clippy::all)]

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

// The error macros below are function-like or casted in the C
// headers, so bindgen cannot translate them.

const fn mktag(a: u8, b: u8, c: u8, d: u8) -> i32 {
    (a as i32) | ((b as i32) << 8) | ((c as i32) << 16) | ((d as i32) << 24)
}

const fn fferrtag(a: u8, b: u8, c: u8, d: u8) -> i32 {
    -mktag(a, b, c, d)
}

/// `AVERROR(e)`: negate a POSIX errno.
pub const fn AVERROR(e: i32) -> i32 {
    -e
}

pub const AVERROR_EOF: i32 = fferrtag(b'E', b'O', b'F', b' ');

#[inline]
pub fn is_eagain(code: i32) -> bool {
    code == AVERROR(libc::EAGAIN)
}

#[inline]
pub fn is_eof(code: i32) -> bool {
    code == AVERROR_EOF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_tag_matches_ffmpeg() {
        // FFERRTAG('E','O','F',' ') as printed by libavutil
        assert_eq!(AVERROR_EOF, -541478725);
        assert!(is_eof(AVERROR_EOF));
        assert!(!is_eagain(AVERROR_EOF));
    }

    #[test]
    fn eagain_is_negated_errno() {
        assert!(is_eagain(-libc::EAGAIN));
        assert!(!is_eof(-libc::EAGAIN));
    }
}
