//! Talkbook Audio Publishing
//!
//! Publishing walks a presentation's content tree, concatenates the managed
//! audio found on a source channel into numbered WAV files, and sets an
//! external audio reference (file URI plus clip begin/end) on a destination
//! channel of every published node.
//!
//! # Overview
//!
//! - Files roll over when a node matches a configured trigger, or when the
//!   PCM format of the next clip differs from the open file's format.
//! - Clip times are offsets into the output file, not into the source audio.
//! - Output files are opened only when audio is about to be written.
//!
//! # Example
//!
//! ```ignore
//! use talkbook_model::load_project;
//! use talkbook_publish::{publish_presentation, PublishConfig};
//!
//! let mut presentation = load_project("book/project.json")?;
//! let config = PublishConfig {
//!     new_file_on: vec!["level1".to_string()],
//!     ..PublishConfig::default()
//! };
//! let report = publish_presentation(&mut presentation, &config, "book/audio")?;
//! println!("{} files", report.files.len());
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod session;
pub mod visitor;

// Re-export main types at crate root
pub use config::PublishConfig;
pub use error::{PublishError, PublishResult};
pub use report::{ClipReport, PublishReport};
pub use session::{AppendedClip, PublishSession, PublishedFile};
pub use visitor::{publish_presentation, publish_tree, PublishedClip, Traversal};
