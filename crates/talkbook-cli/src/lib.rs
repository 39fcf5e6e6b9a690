//! Talkbook CLI library.
//!
//! This crate provides the commands behind the `talkbook` binary: publishing
//! a project's managed audio, and inspecting or comparing WAV files.

pub mod commands;
pub mod logging;
