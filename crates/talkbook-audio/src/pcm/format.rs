//! PCM stream format parameters and time/byte conversions.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::{AudioError, AudioResult};

/// Bit depths this crate can read and write.
pub const SUPPORTED_BIT_DEPTHS: [u16; 2] = [8, 16];

/// Largest byte rate accepted. Nanosecond durations round-trip exactly to
/// frame-aligned byte counts up to this rate.
pub const MAX_BYTE_RATE: u64 = 1_000_000_000;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// PCM format of a stream: channel count, sample rate and bit depth.
///
/// Values are validated on construction and immutable afterwards, so
/// `block_align()` and `byte_rate()` are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PcmFormat {
    channels: u16,
    sample_rate: u32,
    bit_depth: u16,
}

impl PcmFormat {
    /// Creates a validated PCM format.
    ///
    /// # Errors
    /// [`AudioError::InvalidFormat`] when `channels` or `sample_rate` is zero,
    /// `bit_depth` is not 8 or 16, the frame size does not fit the 16-bit
    /// `block_align` header field, or the byte rate exceeds [`MAX_BYTE_RATE`].
    pub fn new(channels: u16, sample_rate: u32, bit_depth: u16) -> AudioResult<Self> {
        if channels == 0 {
            return Err(AudioError::invalid_format("channel count must be at least 1"));
        }
        if sample_rate == 0 {
            return Err(AudioError::invalid_format("sample rate must be positive"));
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&bit_depth) {
            return Err(AudioError::invalid_format(format!(
                "bit depth {} is not supported (expected 8 or 16)",
                bit_depth
            )));
        }
        let format = Self {
            channels,
            sample_rate,
            bit_depth,
        };
        if format.block_align() > u16::MAX as u32 {
            return Err(AudioError::invalid_format(format!(
                "{} channels of {}-bit samples make a {}-byte frame, above the {}-byte limit",
                channels,
                bit_depth,
                format.block_align(),
                u16::MAX
            )));
        }
        if format.byte_rate() > MAX_BYTE_RATE {
            return Err(AudioError::invalid_format(format!(
                "byte rate {} exceeds {} bytes per second",
                format.byte_rate(),
                MAX_BYTE_RATE
            )));
        }
        Ok(format)
    }

    /// Creates a 16-bit mono format.
    ///
    /// `sample_rate` is clamped to the range [`PcmFormat::new`] accepts.
    pub fn mono(sample_rate: u32) -> Self {
        Self::clamped(1, sample_rate)
    }

    /// Creates a 16-bit stereo format.
    ///
    /// `sample_rate` is clamped to the range [`PcmFormat::new`] accepts.
    pub fn stereo(sample_rate: u32) -> Self {
        Self::clamped(2, sample_rate)
    }

    fn clamped(channels: u16, sample_rate: u32) -> Self {
        let max_rate = (MAX_BYTE_RATE / (channels as u64 * 2)) as u32;
        Self {
            channels,
            sample_rate: sample_rate.clamp(1, max_rate),
            bit_depth: 16,
        }
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample frames per second.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bits per sample (per channel).
    pub fn bit_depth(&self) -> u16 {
        self.bit_depth
    }

    /// Bytes per sample frame (all channels).
    pub fn block_align(&self) -> u32 {
        self.channels as u32 * (self.bit_depth / 8) as u32
    }

    /// Bytes per second.
    pub fn byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.block_align() as u64
    }

    /// Returns true if `n` is a whole number of sample frames.
    pub fn is_block_aligned(&self, n: u64) -> bool {
        n % self.block_align() as u64 == 0
    }

    /// Byte count for `duration`, rounded to the nearest byte and then down
    /// to a whole sample frame.
    ///
    /// Saturates at the largest frame-aligned `u64` for absurd durations.
    pub fn bytes_for_duration(&self, duration: Duration) -> u64 {
        let align = self.block_align() as u64;
        let byte_rate = self.byte_rate() as u128;
        let bytes = duration
            .as_nanos()
            .checked_mul(byte_rate)
            .map(|scaled| (scaled + NANOS_PER_SEC / 2) / NANOS_PER_SEC)
            .and_then(|bytes| u64::try_from(bytes).ok())
            .unwrap_or(u64::MAX);
        bytes - bytes % align
    }

    /// Duration of `n` payload bytes, rounded to the nearest nanosecond.
    ///
    /// For frame-aligned `n`, `bytes_for_duration(duration_for_bytes(n)) == n`
    /// for every format `new` accepts.
    pub fn duration_for_bytes(&self, n: u64) -> Duration {
        let byte_rate = self.byte_rate() as u128;
        let nanos = (n as u128 * NANOS_PER_SEC + byte_rate / 2) / byte_rate;
        let secs = (nanos / NANOS_PER_SEC) as u64;
        let sub_nanos = (nanos % NANOS_PER_SEC) as u32;
        Duration::new(secs, sub_nanos)
    }

    /// Duration of a single sample frame.
    pub fn frame_duration(&self) -> Duration {
        self.duration_for_bytes(self.block_align() as u64)
    }

    /// Returns true if audio in `other` can be concatenated with audio in `self`.
    pub fn is_compatible_with(&self, other: &PcmFormat) -> bool {
        self == other
    }

    /// Silent payload lasting `duration`.
    ///
    /// 8-bit PCM is unsigned, so its silence is `0x80` rather than zero.
    pub fn silence(&self, duration: Duration) -> Vec<u8> {
        let len = self.bytes_for_duration(duration) as usize;
        let fill = if self.bit_depth == 8 { 0x80 } else { 0x00 };
        vec![fill; len]
    }
}

impl fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {}-bit, {} ch",
            self.sample_rate, self.bit_depth, self.channels
        )
    }
}
