//! RIFF/WAVE header parsing and generation.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{AudioError, AudioResult};
use crate::pcm::PcmFormat;

/// Length of the canonical header written by this crate.
pub const CANONICAL_HEADER_LEN: u32 = 44;

/// Size of the PCM `fmt ` chunk body.
pub const PCM_FMT_CHUNK_SIZE: u32 = 16;

/// `WAVE_FORMAT_PCM` format tag.
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Largest payload whose RIFF size still fits in 32 bits (pad byte included).
pub const MAX_DATA_LENGTH: u64 = u32::MAX as u64 - 37;

const RIFF: &[u8; 4] = b"RIFF";
const WAVE: &[u8; 4] = b"WAVE";
const FMT: &[u8; 4] = b"fmt ";
const DATA: &[u8; 4] = b"data";

/// Format and payload length of a RIFF/WAVE PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmDataInfo {
    /// PCM format of the payload.
    pub format: PcmFormat,
    /// Payload bytes, excluding the header and any pad byte.
    pub data_length: u32,
}

impl PcmDataInfo {
    /// Creates header info for `data_length` payload bytes.
    pub fn new(format: PcmFormat, data_length: u32) -> Self {
        Self {
            format,
            data_length,
        }
    }

    /// Returns true if the payload needs a trailing pad byte.
    pub fn needs_pad_byte(&self) -> bool {
        self.data_length % 2 == 1
    }

    /// Value of the RIFF chunk size field (file length minus 8).
    pub fn riff_chunk_size(&self) -> u32 {
        let pad = u32::from(self.needs_pad_byte());
        (4 + 8 + PCM_FMT_CHUNK_SIZE + 8)
            .saturating_add(self.data_length)
            .saturating_add(pad)
    }

    /// Length of a canonical file holding this payload.
    pub fn total_file_length(&self) -> u64 {
        CANONICAL_HEADER_LEN as u64 + self.data_length as u64 + u64::from(self.needs_pad_byte())
    }

    /// Reads a RIFF/WAVE header and leaves `reader` at the first payload byte.
    ///
    /// Unknown chunks are skipped by their declared size, and a `data` chunk
    /// that precedes `fmt ` is located again once the format is known.
    ///
    /// # Errors
    /// - [`AudioError::MalformedHeader`] for wrong magic bytes, a non-PCM
    ///   format tag, unsupported parameters or a missing `data` chunk.
    /// - [`AudioError::TruncatedStream`] if the stream ends inside the header
    ///   or before the declared payload length.
    pub fn parse_header<R: Read + Seek>(reader: &mut R) -> AudioResult<Self> {
        let start = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;
        let available = end.saturating_sub(start);

        let mut riff = [0u8; 12];
        let got = read_up_to(reader, &mut riff)?;
        let magic_len = got.min(4);
        if riff[..magic_len] != RIFF[..magic_len] {
            return Err(AudioError::malformed("stream does not start with RIFF"));
        }
        if got < riff.len() {
            return Err(AudioError::TruncatedStream {
                expected: riff.len() as u64,
                available,
            });
        }
        if &riff[8..12] != WAVE {
            return Err(AudioError::malformed("RIFF form type is not WAVE"));
        }

        let mut pos = riff.len() as u64;
        let mut format: Option<PcmFormat> = None;
        let mut early_data: Option<(u64, u64)> = None;

        loop {
            let mut chunk_header = [0u8; 8];
            let got = read_up_to(reader, &mut chunk_header)?;
            if got == 0 {
                let missing = if format.is_none() { "fmt " } else { "data" };
                return Err(AudioError::malformed(format!("missing {} chunk", missing.trim())));
            }
            if got < chunk_header.len() {
                return Err(AudioError::TruncatedStream {
                    expected: pos + chunk_header.len() as u64,
                    available,
                });
            }
            pos += chunk_header.len() as u64;

            let size = LittleEndian::read_u32(&chunk_header[4..8]) as u64;
            let body_end = pos + size;
            let id = &chunk_header[0..4];

            if id == DATA {
                if body_end > available {
                    return Err(AudioError::TruncatedStream {
                        expected: body_end,
                        available,
                    });
                }
                if let Some(format) = format {
                    return Ok(Self::new(format, size as u32));
                }
                early_data = Some((pos, size));
            } else if id == FMT {
                if size < PCM_FMT_CHUNK_SIZE as u64 {
                    return Err(AudioError::malformed(format!(
                        "fmt chunk is {} bytes, expected at least {}",
                        size, PCM_FMT_CHUNK_SIZE
                    )));
                }
                if body_end > available {
                    return Err(AudioError::TruncatedStream {
                        expected: body_end,
                        available,
                    });
                }
                let mut body = [0u8; PCM_FMT_CHUNK_SIZE as usize];
                reader.read_exact(&mut body)?;
                let parsed = parse_fmt_body(&body)?;

                if let Some((data_pos, data_size)) = early_data {
                    reader.seek(SeekFrom::Start(start + data_pos))?;
                    return Ok(Self::new(parsed, data_size as u32));
                }
                format = Some(parsed);
            } else {
                tracing::debug!(
                    chunk = %String::from_utf8_lossy(id),
                    size,
                    "skipping unknown RIFF chunk"
                );
            }

            if body_end > available {
                return Err(AudioError::TruncatedStream {
                    expected: body_end,
                    available,
                });
            }
            // Chunks are word aligned.
            pos = body_end + (size & 1);
            reader.seek(SeekFrom::Start(start + pos))?;
        }
    }

    /// Writes the 44-byte canonical header and returns its length.
    ///
    /// `data_length` may be provisional; see [`PcmDataInfo::patch_lengths`].
    pub fn write_header<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<u32> {
        let format = &self.format;

        // RIFF header
        writer.write_all(RIFF)?;
        writer.write_u32::<LittleEndian>(self.riff_chunk_size())?;
        writer.write_all(WAVE)?;

        // fmt chunk
        writer.write_all(FMT)?;
        writer.write_u32::<LittleEndian>(PCM_FMT_CHUNK_SIZE)?;
        writer.write_u16::<LittleEndian>(WAVE_FORMAT_PCM)?;
        writer.write_u16::<LittleEndian>(format.channels())?;
        writer.write_u32::<LittleEndian>(format.sample_rate())?;
        writer.write_u32::<LittleEndian>(header_field(format.byte_rate(), "byte rate")?)?;
        writer.write_u16::<LittleEndian>(header_field(format.block_align(), "block align")?)?;
        writer.write_u16::<LittleEndian>(format.bit_depth())?;

        // data chunk
        writer.write_all(DATA)?;
        writer.write_u32::<LittleEndian>(self.data_length)?;

        Ok(CANONICAL_HEADER_LEN)
    }

    /// Rewrites the RIFF and `data` size fields of a canonical header that
    /// starts at `header_start`, then returns the writer to where it was.
    pub fn patch_lengths<W: Write + Seek + ?Sized>(
        &self,
        writer: &mut W,
        header_start: u64,
    ) -> io::Result<()> {
        let resume = writer.stream_position()?;
        writer.seek(SeekFrom::Start(header_start + 4))?;
        writer.write_u32::<LittleEndian>(self.riff_chunk_size())?;
        writer.seek(SeekFrom::Start(header_start + CANONICAL_HEADER_LEN as u64 - 4))?;
        writer.write_u32::<LittleEndian>(self.data_length)?;
        writer.seek(SeekFrom::Start(resume))?;
        Ok(())
    }
}

fn parse_fmt_body(body: &[u8]) -> AudioResult<PcmFormat> {
    let format_tag = LittleEndian::read_u16(&body[0..2]);
    if format_tag != WAVE_FORMAT_PCM {
        return Err(AudioError::malformed(format!(
            "format tag {:#06x} is not PCM",
            format_tag
        )));
    }
    let channels = LittleEndian::read_u16(&body[2..4]);
    let sample_rate = LittleEndian::read_u32(&body[4..8]);
    let byte_rate = LittleEndian::read_u32(&body[8..12]);
    let block_align = LittleEndian::read_u16(&body[12..14]);
    let bit_depth = LittleEndian::read_u16(&body[14..16]);

    let format = PcmFormat::new(channels, sample_rate, bit_depth)
        .map_err(|e| AudioError::malformed(e.to_string()))?;

    if block_align as u32 != format.block_align() {
        return Err(AudioError::malformed(format!(
            "block align {} does not match {}",
            block_align, format
        )));
    }
    if byte_rate as u64 != format.byte_rate() {
        return Err(AudioError::malformed(format!(
            "byte rate {} does not match {}",
            byte_rate, format
        )));
    }
    Ok(format)
}

/// Narrows a format value to its header field width.
fn header_field<T, U>(value: T, name: &str) -> io::Result<U>
where
    T: Copy + std::fmt::Display,
    U: TryFrom<T>,
{
    U::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} {} does not fit the WAV header", name, value),
        )
    })
}

/// Reads until `buf` is full or the stream ends; returns the bytes read.
fn read_up_to<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
