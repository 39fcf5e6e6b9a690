//! Streaming WAV writer with a provisional, patched-on-close header.

use std::io::{self, Read, Seek, Write};
use std::time::Duration;

use super::header::{PcmDataInfo, MAX_DATA_LENGTH};
use crate::error::{AudioError, AudioResult};
use crate::pcm::PcmFormat;

const COPY_BUFFER: usize = 64 * 1024;

/// Writes a WAV file whose final length is not known up front.
///
/// A header with a zero `data` length is written on creation. Payload is
/// appended afterwards, and [`WavStreamWriter::finalize`] writes the pad byte
/// and patches the length fields. A writer dropped without `finalize` patches
/// its header best-effort.
#[derive(Debug)]
pub struct WavStreamWriter<W: Write + Seek> {
    inner: Option<W>,
    format: PcmFormat,
    header_start: u64,
    data_length: u64,
}

impl<W: Write + Seek> WavStreamWriter<W> {
    /// Writes a provisional header at the current position of `inner`.
    pub fn new(mut inner: W, format: PcmFormat) -> AudioResult<Self> {
        let header_start = inner.stream_position()?;
        PcmDataInfo::new(format, 0).write_header(&mut inner)?;
        Ok(Self {
            inner: Some(inner),
            format,
            header_start,
            data_length: 0,
        })
    }

    /// PCM format of the file.
    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Payload bytes written so far.
    pub fn data_length(&self) -> u64 {
        self.data_length
    }

    /// Duration of the payload written so far.
    pub fn duration(&self) -> Duration {
        self.format.duration_for_bytes(self.data_length)
    }

    /// Appends raw PCM bytes.
    pub fn write_pcm(&mut self, pcm: &[u8]) -> AudioResult<()> {
        self.reserve(pcm.len() as u64)?;
        let inner = self.inner_mut()?;
        inner.write_all(pcm)?;
        self.data_length += pcm.len() as u64;
        Ok(())
    }

    /// Appends everything `reader` yields; returns the bytes copied.
    pub fn append_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> AudioResult<u64> {
        let mut buf = vec![0u8; COPY_BUFFER];
        let mut copied = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.write_pcm(&buf[..n])?;
            copied += n as u64;
        }
        Ok(copied)
    }

    /// Writes the pad byte, patches the header and returns the inner writer.
    pub fn finalize(mut self) -> AudioResult<W> {
        let mut inner = self.inner.take().ok_or_else(closed)?;
        finish(&mut inner, self.format, self.header_start, self.data_length)?;
        Ok(inner)
    }

    fn reserve(&self, additional: u64) -> AudioResult<()> {
        let length = self.data_length + additional;
        if length > MAX_DATA_LENGTH {
            return Err(AudioError::PayloadTooLarge { length });
        }
        Ok(())
    }

    fn inner_mut(&mut self) -> io::Result<&mut W> {
        self.inner.as_mut().ok_or_else(closed)
    }
}

impl<W: Write + Seek> Drop for WavStreamWriter<W> {
    fn drop(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            if let Err(e) = finish(&mut inner, self.format, self.header_start, self.data_length) {
                tracing::warn!(error = %e, "failed to patch WAV header on drop");
            }
        }
    }
}

fn finish<W: Write + Seek>(
    inner: &mut W,
    format: PcmFormat,
    header_start: u64,
    data_length: u64,
) -> io::Result<()> {
    let info = PcmDataInfo::new(format, data_length as u32);
    if info.needs_pad_byte() {
        inner.write_all(&[0])?;
    }
    info.patch_lengths(inner, header_start)?;
    inner.flush()
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "WAV stream writer already finalized")
}
