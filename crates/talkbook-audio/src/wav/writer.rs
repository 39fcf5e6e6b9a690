//! One-shot WAV writing.

use std::io::Write;

use super::header::{PcmDataInfo, MAX_DATA_LENGTH};
use crate::error::{AudioError, AudioResult};
use crate::pcm::PcmFormat;

/// Writes a complete canonical WAV file to a writer.
///
/// # Arguments
/// * `writer` - Output writer
/// * `format` - PCM format of `pcm_data`
/// * `pcm_data` - Raw PCM payload
pub fn write_wav<W: Write + ?Sized>(
    writer: &mut W,
    format: &PcmFormat,
    pcm_data: &[u8],
) -> AudioResult<()> {
    let length = pcm_data.len() as u64;
    if length > MAX_DATA_LENGTH {
        return Err(AudioError::PayloadTooLarge { length });
    }

    let info = PcmDataInfo::new(*format, length as u32);
    info.write_header(writer)?;
    writer.write_all(pcm_data)?;
    if info.needs_pad_byte() {
        writer.write_all(&[0])?;
    }

    Ok(())
}

/// Writes a WAV file to a byte vector.
pub fn write_wav_to_vec(format: &PcmFormat, pcm_data: &[u8]) -> AudioResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(44 + pcm_data.len() + 1);
    write_wav(&mut buffer, format, pcm_data)?;
    Ok(buffer)
}
