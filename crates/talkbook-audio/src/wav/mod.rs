//! RIFF/WAVE codec for canonical PCM files.
//!
//! This module parses and writes the 44-byte canonical header, streams
//! payload into files whose length is patched after the fact, and hashes or
//! compares payload bytes independently of the header.

mod header;
mod pcm;
mod stream;
mod writer;


// Re-export public API
pub use header::{
    PcmDataInfo, CANONICAL_HEADER_LEN, MAX_DATA_LENGTH, PCM_FMT_CHUNK_SIZE, WAVE_FORMAT_PCM,
};
pub use pcm::{compare_stream_data, compute_pcm_hash, extract_pcm_data, hash_pcm_stream};
pub use stream::WavStreamWriter;
pub use writer::{write_wav, write_wav_to_vec};
