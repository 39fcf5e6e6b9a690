//! Managed audio data: a PCM format plus an ordered list of immutable
//! byte segments.
//!
//! Edits never rewrite provider bytes. Appending, inserting, replacing and
//! removing audio only rearrange segment boundaries and add new providers,
//! so cloning an [`AudioMediaData`] is cheap and clones share storage.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;
use std::time::Duration;

use crate::data_provider::DataProvider;
use crate::error::{AudioError, AudioResult};
use crate::pcm::PcmFormat;
use crate::time::TimeTolerance;
use crate::wav::{compare_stream_data, PcmDataInfo};

#[derive(Debug, Clone)]
struct Segment {
    provider: DataProvider,
    start: u64,
    len: u64,
}

impl Segment {
    fn whole(provider: DataProvider) -> Self {
        let len = provider.len();
        Self {
            provider,
            start: 0,
            len,
        }
    }
}

/// PCM audio owned by the toolkit.
///
/// All payload shares one [`PcmFormat`], fixed at construction. The duration
/// is always the exact `duration_for_bytes` of the total payload length.
#[derive(Debug, Clone)]
pub struct AudioMediaData {
    format: PcmFormat,
    segments: Vec<Segment>,
    pcm_length: u64,
    tolerance: TimeTolerance,
}

impl AudioMediaData {
    /// Creates empty audio data with a fixed format.
    pub fn new(format: PcmFormat) -> Self {
        Self {
            format,
            segments: Vec::new(),
            pcm_length: 0,
            tolerance: TimeTolerance::default(),
        }
    }

    /// Sets the tolerance used to check declared durations.
    pub fn with_tolerance(mut self, tolerance: TimeTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Creates audio data from an in-memory PCM payload.
    pub fn from_pcm_bytes(format: PcmFormat, pcm: Vec<u8>) -> AudioResult<Self> {
        let mut data = Self::new(format);
        data.check_aligned(pcm.len() as u64)?;
        data.push_provider(DataProvider::from_bytes(pcm));
        Ok(data)
    }

    /// Decodes a WAV stream and copies its payload into memory.
    pub fn from_wav_reader<R: Read + Seek>(reader: &mut R) -> AudioResult<Self> {
        let info = PcmDataInfo::parse_header(reader)?;
        let mut pcm = vec![0u8; info.data_length as usize];
        reader.read_exact(&mut pcm)?;
        Self::from_pcm_bytes(info.format, pcm)
    }

    /// References the payload of a WAV file on disk without copying it.
    pub fn from_wav_file(path: impl AsRef<Path>) -> AudioResult<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let info = PcmDataInfo::parse_header(&mut reader)?;
        let offset = reader.stream_position()?;

        let mut data = Self::new(info.format);
        data.check_aligned(info.data_length as u64)?;
        data.push_provider(DataProvider::from_file_range(
            path,
            offset,
            info.data_length as u64,
        )?);
        tracing::debug!(
            path = %path.display(),
            format = %info.format,
            bytes = info.data_length,
            "loaded file-backed audio"
        );
        Ok(data)
    }

    /// PCM format shared by all payload.
    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Tolerance used to check declared durations.
    pub fn tolerance(&self) -> TimeTolerance {
        self.tolerance
    }

    /// Total payload bytes.
    pub fn pcm_length(&self) -> u64 {
        self.pcm_length
    }

    /// Total duration, derived from the payload length.
    pub fn duration(&self) -> Duration {
        self.format.duration_for_bytes(self.pcm_length)
    }

    /// Returns true if there is no payload.
    pub fn is_empty(&self) -> bool {
        self.pcm_length == 0
    }

    /// Number of provider segments the payload is stored in.
    pub fn provider_count(&self) -> usize {
        self.segments.len()
    }

    /// Data providers backing the payload, in playback order.
    pub fn providers(&self) -> impl Iterator<Item = &DataProvider> {
        self.segments.iter().map(|s| &s.provider)
    }

    /// Opens a reader over `clip_begin..clip_end` (defaults: start and end).
    ///
    /// # Errors
    /// [`AudioError::Range`] if `clip_begin > clip_end` or either bound
    /// exceeds the total duration.
    pub fn open_audio_data(
        &self,
        clip_begin: Option<Duration>,
        clip_end: Option<Duration>,
    ) -> AudioResult<AudioDataReader> {
        let begin = clip_begin.unwrap_or(Duration::ZERO);
        let end = clip_end.unwrap_or_else(|| self.duration());
        let (from, to) = self.byte_range(begin, end)?;
        Ok(self.reader_for(from, to))
    }

    /// Opens a reader over the whole payload.
    pub fn open_pcm(&self) -> AudioDataReader {
        self.reader_for(0, self.pcm_length)
    }

    /// Reads the whole payload into memory.
    pub fn read_all(&self) -> AudioResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.pcm_length as usize);
        self.open_pcm().read_to_end(&mut out)?;
        Ok(out)
    }

    /// Appends `pcm`, whose length must match `duration`.
    pub fn append_audio_data(&mut self, pcm: &[u8], duration: Duration) -> AudioResult<()> {
        self.check_payload(pcm.len() as u64, duration)?;
        self.push_provider(DataProvider::from_bytes(pcm.to_vec()));
        Ok(())
    }

    /// Reads exactly the bytes for `duration` from `reader` and appends them.
    ///
    /// # Errors
    /// [`AudioError::TruncatedStream`] if the reader ends early.
    pub fn append_audio_data_from<R: Read + ?Sized>(
        &mut self,
        reader: &mut R,
        duration: Duration,
    ) -> AudioResult<()> {
        let expected = self.format.bytes_for_duration(duration);
        let mut pcm = Vec::with_capacity(expected as usize);
        reader.take(expected).read_to_end(&mut pcm)?;
        if (pcm.len() as u64) < expected {
            return Err(AudioError::TruncatedStream {
                expected,
                available: pcm.len() as u64,
            });
        }
        self.push_provider(DataProvider::from_bytes(pcm));
        Ok(())
    }

    /// Appends the payload of `other`, sharing its storage.
    ///
    /// # Errors
    /// [`AudioError::FormatMismatch`] if the formats differ.
    pub fn append_media_data(&mut self, other: &AudioMediaData) -> AudioResult<()> {
        self.check_format(&other.format)?;
        for segment in &other.segments {
            self.segments.push(segment.clone());
        }
        self.pcm_length += other.pcm_length;
        Ok(())
    }

    /// Appends `duration` of silence.
    pub fn append_silence(&mut self, duration: Duration) {
        let silence = self.format.silence(duration);
        self.push_provider(DataProvider::from_bytes(silence));
    }

    /// Inserts `pcm` at time `at`; its length must match `duration`.
    pub fn insert_audio_data(
        &mut self,
        pcm: &[u8],
        at: Duration,
        duration: Duration,
    ) -> AudioResult<()> {
        let (offset, _) = self.byte_range(at, at)?;
        self.check_payload(pcm.len() as u64, duration)?;
        self.splice(offset, offset, pcm);
        Ok(())
    }

    /// Replaces `at..at + duration` with `pcm`, which must last `duration`.
    pub fn replace_audio_data(
        &mut self,
        pcm: &[u8],
        at: Duration,
        duration: Duration,
    ) -> AudioResult<()> {
        let end = at
            .checked_add(duration)
            .ok_or_else(|| AudioError::range(at, Duration::MAX, self.duration()))?;
        let (from, to) = self.byte_range(at, end)?;
        self.check_payload(pcm.len() as u64, duration)?;
        self.splice(from, to, pcm);
        Ok(())
    }

    /// Removes `begin..end`.
    pub fn remove_audio_data(&mut self, begin: Duration, end: Duration) -> AudioResult<()> {
        let (from, to) = self.byte_range(begin, end)?;
        self.splice(from, to, &[]);
        Ok(())
    }

    /// Returns a new value holding `begin..end`, sharing storage with `self`.
    pub fn sub_range(&self, begin: Duration, end: Duration) -> AudioResult<AudioMediaData> {
        let (from, to) = self.byte_range(begin, end)?;
        let mut sub = self.clone();
        sub.splice(to, sub.pcm_length, &[]);
        sub.splice(0, from, &[]);
        Ok(sub)
    }

    /// Splits at `at`: `self` keeps the head and the tail is returned.
    pub fn split(&mut self, at: Duration) -> AudioResult<AudioMediaData> {
        let tail = self.sub_range(at, self.duration())?;
        let (from, _) = self.byte_range(at, at)?;
        self.splice(from, self.pcm_length, &[]);
        Ok(tail)
    }

    /// Returns true if formats are compatible and payload bytes are identical.
    pub fn value_equals(&self, other: &AudioMediaData) -> AudioResult<bool> {
        if !self.format.is_compatible_with(&other.format) || self.pcm_length != other.pcm_length {
            return Ok(false);
        }
        Ok(compare_stream_data(
            &mut self.open_pcm(),
            &mut other.open_pcm(),
            self.pcm_length,
        )?)
    }

    fn check_format(&self, format: &PcmFormat) -> AudioResult<()> {
        if !self.format.is_compatible_with(format) {
            return Err(AudioError::FormatMismatch {
                expected: self.format,
                found: *format,
            });
        }
        Ok(())
    }

    fn check_aligned(&self, len: u64) -> AudioResult<()> {
        if !self.format.is_block_aligned(len) {
            return Err(AudioError::invalid_format(format!(
                "{} payload bytes is not a whole number of {}-byte frames",
                len,
                self.format.block_align()
            )));
        }
        Ok(())
    }

    fn check_payload(&self, len: u64, declared: Duration) -> AudioResult<()> {
        self.check_aligned(len)?;
        if !self.tolerance.matches_bytes(&self.format, declared, len) {
            return Err(AudioError::DurationMismatch {
                declared,
                actual: self.format.duration_for_bytes(len),
            });
        }
        Ok(())
    }

    /// Maps a time range to a frame-aligned byte range.
    fn byte_range(&self, begin: Duration, end: Duration) -> AudioResult<(u64, u64)> {
        let total = self.duration();
        if begin > end || end > total {
            return Err(AudioError::range(begin, end, total));
        }
        let from = self.format.bytes_for_duration(begin).min(self.pcm_length);
        let to = self.format.bytes_for_duration(end).min(self.pcm_length);
        Ok((from, to))
    }

    fn push_provider(&mut self, provider: DataProvider) {
        if provider.is_empty() {
            return;
        }
        self.pcm_length += provider.len();
        self.segments.push(Segment::whole(provider));
    }

    /// Ensures a segment boundary at `offset` and returns the index of the
    /// segment that starts there.
    fn boundary(&mut self, offset: u64) -> usize {
        let mut pos = 0;
        for i in 0..self.segments.len() {
            if pos == offset {
                return i;
            }
            let len = self.segments[i].len;
            if offset < pos + len {
                let head = offset - pos;
                let segment = &mut self.segments[i];
                let tail = Segment {
                    provider: segment.provider.clone(),
                    start: segment.start + head,
                    len: segment.len - head,
                };
                segment.len = head;
                self.segments.insert(i + 1, tail);
                return i + 1;
            }
            pos += len;
        }
        self.segments.len()
    }

    /// Replaces bytes `from..to` with `pcm`.
    fn splice(&mut self, from: u64, to: u64, pcm: &[u8]) {
        let first = self.boundary(from);
        let last = self.boundary(to);
        let removed: u64 = self.segments.drain(first..last).map(|s| s.len).sum();
        self.pcm_length -= removed;
        if !pcm.is_empty() {
            let provider = DataProvider::from_bytes(pcm.to_vec());
            self.pcm_length += provider.len();
            self.segments.insert(first, Segment::whole(provider));
        }
    }

    fn reader_for(&self, from: u64, to: u64) -> AudioDataReader {
        let mut pieces = VecDeque::new();
        let mut pos = 0;
        for segment in &self.segments {
            let seg_end = pos + segment.len;
            let lo = from.max(pos);
            let hi = to.min(seg_end);
            if lo < hi {
                pieces.push_back(Segment {
                    provider: segment.provider.clone(),
                    start: segment.start + (lo - pos),
                    len: hi - lo,
                });
            }
            pos = seg_end;
        }
        AudioDataReader {
            pieces,
            current: None,
            remaining: to - from,
        }
    }
}

/// Sequential reader over a byte range of an [`AudioMediaData`].
pub struct AudioDataReader {
    pieces: VecDeque<Segment>,
    current: Option<Box<dyn Read + Send>>,
    remaining: u64,
}

impl AudioDataReader {
    /// Bytes not yet read.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl std::fmt::Debug for AudioDataReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDataReader")
            .field("pieces", &self.pieces.len())
            .field("remaining", &self.remaining)
            .finish()
    }
}

impl Read for AudioDataReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.current.is_none() {
                match self.pieces.pop_front() {
                    Some(piece) => {
                        self.current = Some(piece.provider.open_range(piece.start, piece.len)?)
                    }
                    None => return Ok(0),
                }
            }
            if let Some(reader) = self.current.as_mut() {
                let n = reader.read(buf)?;
                if n == 0 {
                    self.current = None;
                    continue;
                }
                self.remaining -= n as u64;
                return Ok(n);
            }
        }
    }
}
