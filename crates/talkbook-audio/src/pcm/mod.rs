//! PCM format description and time/byte arithmetic.

mod format;

pub use format::{PcmFormat, MAX_BYTE_RATE, SUPPORTED_BIT_DEPTHS};
