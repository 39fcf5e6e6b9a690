//! Talkbook Managed Audio
//!
//! This crate implements the audio layer of the Talkbook toolkit:
//! PCM format descriptions, the RIFF/WAVE codec and managed audio data.
//!
//! # Overview
//!
//! Managed audio is raw PCM owned by the toolkit. Every piece of it carries a
//! [`PcmFormat`], and all time/byte conversions go through that format so
//! that durations and byte counts never drift apart.
//!
//! - **PCM formats** - channel count, sample rate and bit depth, with exact
//!   time/byte conversions
//! - **RIFF/WAVE codec** - canonical 44-byte header writer and a strict
//!   header parser
//! - **Managed audio data** - an editable PCM payload made of shared,
//!   immutable segments
//!
//! # Determinism
//!
//! The WAV writer produces byte-identical output for identical input, so
//! published files can be compared by their BLAKE3 payload hashes.
//!
//! # Example
//!
//! ```ignore
//! use talkbook_audio::{AudioMediaData, PcmFormat};
//! use std::time::Duration;
//!
//! let format = PcmFormat::mono(22050);
//! let mut audio = AudioMediaData::new(format);
//! audio.append_silence(Duration::from_millis(600));
//! assert_eq!(audio.pcm_length(), 26460);
//! ```
//!
//! # Crate Structure
//!
//! - [`pcm`] - PCM format description and conversions
//! - [`wav`] - RIFF/WAVE header codec and stream writer
//! - [`data_provider`] - Immutable byte sources
//! - [`media_data`] - Managed audio data
//! - [`time`] - Time tolerance and clock values

pub mod data_provider;
pub mod error;
pub mod media_data;
pub mod pcm;
pub mod time;
pub mod wav;

// Re-export main types at crate root
pub use data_provider::DataProvider;
pub use error::{AudioError, AudioResult};
pub use media_data::{AudioDataReader, AudioMediaData};
pub use pcm::PcmFormat;
pub use time::TimeTolerance;
pub use wav::{PcmDataInfo, WavStreamWriter};
