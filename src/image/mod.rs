//! Image payload encoding.
//!
//! The host platform hands generation actions an opaque image handle:
//! a byte stream with terminal end/error semantics. This module drains
//! such a stream into one contiguous buffer and base64-encodes it for
//! embedding in a generation request.

use crate::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::io::Read;

/// Read buffer size for draining image streams.
const CHUNK_SIZE: usize = 8192;

/// Drains a byte stream and base64-encodes its contents.
///
/// Chunks are accumulated in arrival order; the result is exactly the
/// encoding of all bytes received. The stream must reach normal EOF;
/// an I/O error before completion fails with [`Error::ImageRead`].
pub fn encode_image(mut reader: impl Read) -> Result<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {},
            Err(e) => return Err(Error::ImageRead(e.to_string())),
        }
    }
    Ok(STANDARD.encode(&buffer))
}
