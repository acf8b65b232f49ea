//! Gzip snapshot encoding.

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::io::{self, Read, Write};

pub fn compress(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

pub fn decompress(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

/// Decompress a snapshot holding UTF-8 text. Invalid UTF-8 is reported as
/// [`io::ErrorKind::InvalidData`].
pub fn decompress_text(bytes: &[u8]) -> io::Result<String> {
    let mut out = String::new();
    GzDecoder::new(bytes).read_to_string(&mut out)?;
    Ok(out)
}
