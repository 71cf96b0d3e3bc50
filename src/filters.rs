//! Stream filters.
//!
//! Only `/FlateDecode` (zlib-wrapped deflate) is decoded. Every other
//! filter name collapses the payload to empty bytes, so a caller can tell
//! "decoded nothing" apart from a decoded empty stream only by looking at
//! the dictionary — the same contract the raw format forces anyway.

use std::io::Read;

use flate2::read::ZlibDecoder;
use log::warn;

/// Stream filters this crate can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// zlib/deflate compression
    FlateDecode,
}

impl Filter {
    /// Map a `/Filter` name token to a supported filter.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        if name == b"/FlateDecode".as_slice() {
            Some(Filter::FlateDecode)
        } else {
            None
        }
    }
}

/// Apply one filter by name. Unsupported names yield empty bytes.
pub(crate) fn decode(name: &[u8], data: &[u8]) -> Vec<u8> {
    match Filter::from_name(name) {
        Some(Filter::FlateDecode) => flate_decode(data),
        None => {
            warn!(
                "unsupported stream filter {}",
                String::from_utf8_lossy(name)
            );
            Vec::new()
        }
    }
}

/// Inflate zlib-wrapped data, keeping whatever was produced when the
/// stream is truncated or corrupt.
pub fn flate_decode(data: &[u8]) -> Vec<u8> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    if let Err(err) = decoder.read_to_end(&mut out) {
        warn!("flate stream failed to inflate after {} bytes: {err}", out.len());
    }
    out
}
