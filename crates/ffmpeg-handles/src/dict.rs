//! Option sets and the native `AVDictionary` they are passed through.
//!
//! FFmpeg's open calls remove every entry they understand from the
//! dictionary they are handed. Whatever is still in it afterwards was not
//! recognized, and is reported back to the caller as an error.

use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::ptr;

use crate::error::{check, FfmpegError, Result};
use ffmpeg_sys::*;
use tracing::warn;

/// Caller-supplied `name -> value` options, iterated in key order.
pub type OptionSet = BTreeMap<String, String>;

/// Build an [`OptionSet`] from any sequence of string pairs.
pub fn option_set<I, K, V>(pairs: I) -> OptionSet
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// RAII wrapper for AVDictionary.
pub(crate) struct Dictionary(*mut AVDictionary);

impl Dictionary {
    pub(crate) fn new() -> Self {
        Self(ptr::null_mut())
    }

    pub(crate) fn from_options(options: &OptionSet) -> Result<Self> {
        let mut dict = Self::new();
        for (key, value) in options {
            dict.set(key, value)?;
        }
        Ok(dict)
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut *mut AVDictionary {
        &mut self.0
    }

    pub(crate) fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key_c = to_cstring(key, "option name")?;
        let value_c = to_cstring(value, "option value")?;
        check(
            unsafe { av_dict_set(&mut self.0, key_c.as_ptr(), value_c.as_ptr(), 0) },
            "av_dict_set",
        )?;
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        unsafe { av_dict_count(self.0) as usize }
    }

    /// Remaining keys, in dictionary order.
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut entry: *const AVDictionaryEntry = ptr::null();
        loop {
            entry = unsafe {
                av_dict_get(self.0, c"".as_ptr(), entry, AV_DICT_IGNORE_SUFFIX as i32)
            } as *const AVDictionaryEntry;
            if entry.is_null() {
                break;
            }
            keys.push(unsafe { CStr::from_ptr((*entry).key) }.to_string_lossy().into_owned());
        }
        keys
    }

    /// Fail with `UnrecognizedOption` if the native call left anything behind.
    pub(crate) fn ensure_consumed(&self, what: &'static str) -> Result<()> {
        let keys = self.keys();
        if keys.is_empty() {
            return Ok(());
        }
        warn!(?keys, what, "rejecting unrecognized options");
        Err(FfmpegError::UnrecognizedOption { what, keys })
    }
}

impl Drop for Dictionary {
    fn drop(&mut self) {
        unsafe { av_dict_free(&mut self.0) }
    }
}

pub(crate) fn to_cstring(value: &str, what: &str) -> Result<CString> {
    CString::new(value).map_err(|_| {
        FfmpegError::InvalidParameter(format!("{} {:?} contains a NUL byte", what, value))
    })
}
