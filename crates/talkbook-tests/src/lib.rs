//! Talkbook End-to-End Test Infrastructure
//!
//! This crate holds the cross-crate tests for the publish pipeline:
//!
//! - Conversion laws between payload bytes and durations
//! - RIFF/WAVE codec behavior, checked against `hound`
//! - Concatenation, rollover and skip behavior of the publish visitor
//! - **Determinism**: re-publishing an unchanged book yields byte-identical files
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p talkbook-tests
//! ```

pub mod determinism;
pub mod fixtures;

pub use determinism::{snapshot_dir, DirectorySnapshot};
pub use fixtures::{tone_pcm, BookFixture};
