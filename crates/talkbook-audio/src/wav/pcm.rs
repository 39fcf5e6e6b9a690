//! PCM payload extraction, hashing and comparison.

use std::io::{self, Cursor, Read};

use super::header::PcmDataInfo;

const COMPARE_BUFFER: usize = 8192;

/// Returns the payload of an in-memory WAV file.
///
/// Returns `None` if the buffer is not a readable RIFF/WAVE PCM file.
pub fn extract_pcm_data(wav_data: &[u8]) -> Option<&[u8]> {
    let mut cursor = Cursor::new(wav_data);
    let info = PcmDataInfo::parse_header(&mut cursor).ok()?;
    let start = usize::try_from(cursor.position()).ok()?;
    wav_data.get(start..start + info.data_length as usize)
}

/// Computes the BLAKE3 hash of a WAV file's payload.
///
/// # Returns
/// Lowercase hex digest of the PCM data, or None if the buffer is not a WAV file
pub fn compute_pcm_hash(wav_data: &[u8]) -> Option<String> {
    extract_pcm_data(wav_data).map(|pcm| blake3::hash(pcm).to_hex().to_string())
}

/// Hashes the next `len` bytes of `reader` with BLAKE3.
pub fn hash_pcm_stream<R: Read + ?Sized>(reader: &mut R, len: u64) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; COMPARE_BUFFER];
    let mut remaining = len;
    while remaining > 0 {
        let want = remaining.min(buf.len() as u64) as usize;
        reader.read_exact(&mut buf[..want])?;
        hasher.update(&buf[..want]);
        remaining -= want as u64;
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Compares `byte_count` bytes from the current position of two streams.
///
/// Returns `Ok(false)` if the bytes differ or either stream ends early.
pub fn compare_stream_data<A, B>(a: &mut A, b: &mut B, byte_count: u64) -> io::Result<bool>
where
    A: Read + ?Sized,
    B: Read + ?Sized,
{
    let mut buf_a = [0u8; COMPARE_BUFFER];
    let mut buf_b = [0u8; COMPARE_BUFFER];
    let mut remaining = byte_count;

    while remaining > 0 {
        let want = remaining.min(COMPARE_BUFFER as u64) as usize;
        if !fill(a, &mut buf_a[..want])? || !fill(b, &mut buf_b[..want])? {
            return Ok(false);
        }
        if buf_a[..want] != buf_b[..want] {
            return Ok(false);
        }
        remaining -= want as u64;
    }

    Ok(true)
}

/// Fills `buf` completely; returns false on a short stream.
fn fill<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}
