//! MD5 content fingerprinting.
//!
//! The digests produced here exist to tell binary-identical files apart from
//! modified ones. MD5 is acceptable for that and nothing more; none of these
//! functions are a security boundary.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// Chunk size for streaming reads. Bounds memory, nothing else.
pub const STREAM_BUFFER_LEN: usize = 1024;

/// Streams `reader` to exhaustion and returns its MD5 digest.
///
/// An absent reader is not an error at this layer: `None` in, `Ok(None)` out.
/// A read failure mid-stream surfaces as [`Error::Io`]; a partial digest is
/// never returned.
pub fn md5_reader<R: Read>(reader: Option<&mut R>) -> Result<Option<md5::Digest>> {
    let Some(reader) = reader else {
        return Ok(None);
    };
    Ok(Some(digest_stream(reader)?))
}

/// MD5 of the file at `path`, read in [`STREAM_BUFFER_LEN`] chunks.
///
/// `None` in, `Ok(None)` out. Open and read failures become
/// [`Error::Storage`] carrying the absolute path.
pub fn md5_path(path: Option<&Path>) -> Result<Option<md5::Digest>> {
    let Some(path) = path else {
        return Ok(None);
    };
    digest_file(path).map(Some)
}

/// MD5 of the UTF-8 bytes of `value`, computed in one shot.
///
/// Unlike the stream and file entry points the input is required; the
/// signature rules out an absent value instead of soft-ignoring it.
pub fn md5_text(value: &str) -> md5::Digest {
    md5::compute(value.as_bytes())
}

/// Lowercase hex rendering of `bytes`: two digits per byte, high nibble
/// first, `2 * len` characters. Total; the empty slice maps to `""`.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Hex fingerprint of the file at `path`. What the update workflow calls.
pub fn fingerprint(path: &Path) -> Result<String> {
    digest_file(path).map(|digest| encode_hex(&digest.0))
}

/// Hex variant of [`md5_reader`].
pub fn md5_hex_reader<R: Read>(reader: Option<&mut R>) -> Result<Option<String>> {
    Ok(md5_reader(reader)?.map(|digest| encode_hex(&digest.0)))
}

/// Hex variant of [`md5_path`].
pub fn md5_hex_path(path: Option<&Path>) -> Result<Option<String>> {
    Ok(md5_path(path)?.map(|digest| encode_hex(&digest.0)))
}

/// Hex variant of [`md5_text`].
pub fn md5_hex_text(value: &str) -> String {
    encode_hex(&md5_text(value).0)
}

fn digest_file(path: &Path) -> Result<md5::Digest> {
    File::open(path)
        .and_then(|mut file| digest_stream(&mut file))
        .map_err(|source| Error::storage(path, source))
}

fn digest_stream<R: Read>(reader: &mut R) -> io::Result<md5::Digest> {
    let mut context = md5::Context::new();
    let mut buffer = [0u8; STREAM_BUFFER_LEN];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        context.consume(&buffer[..read]);
    }
    Ok(context.compute())
}
