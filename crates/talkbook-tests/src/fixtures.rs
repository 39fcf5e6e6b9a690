//! Test fixture utilities for building books and WAV files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use talkbook_audio::wav::write_wav_to_vec;
use talkbook_audio::{AudioMediaData, PcmFormat};
use talkbook_model::{ManagedAudioMedia, Presentation, TreeNode};
use tempfile::TempDir;

/// Deterministic pseudo-random PCM lasting `duration`.
///
/// The same `seed` always yields the same bytes, so fixtures built from it
/// can be compared across runs.
pub fn tone_pcm(format: &PcmFormat, duration: Duration, seed: u64) -> Vec<u8> {
    let len = format.bytes_for_duration(duration) as usize;
    let mut rng = Pcg32::seed_from_u64(seed);
    (0..len).map(|_| rng.gen::<u8>()).collect()
}

/// Managed audio holding [`tone_pcm`] bytes.
pub fn tone_audio(format: PcmFormat, millis: u64, seed: u64) -> ManagedAudioMedia {
    let pcm = tone_pcm(&format, Duration::from_millis(millis), seed);
    let data = AudioMediaData::from_pcm_bytes(format, pcm).expect("tone is frame aligned");
    ManagedAudioMedia::new(data)
}

/// A temporary book directory with WAV sources and a project document.
pub struct BookFixture {
    pub root: TempDir,
}

impl BookFixture {
    /// Create a new empty book directory.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the book directory.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Directory published files are written to.
    pub fn out_dir(&self) -> PathBuf {
        self.path().join("published")
    }

    /// Writes a WAV file with tone payload and returns its path.
    pub fn add_wav(&self, name: &str, format: PcmFormat, millis: u64, seed: u64) -> PathBuf {
        let pcm = tone_pcm(&format, Duration::from_millis(millis), seed);
        let path = self.path().join(name);
        fs::write(&path, write_wav_to_vec(&format, &pcm).expect("Failed to encode WAV"))
            .expect("Failed to write WAV file");
        path
    }

    /// Writes a project document and returns its path.
    pub fn add_project(&self, name: &str, document: &serde_json::Value) -> PathBuf {
        let path = self.path().join(name);
        fs::write(
            &path,
            serde_json::to_string_pretty(document).expect("Failed to serialize project"),
        )
        .expect("Failed to write project file");
        path
    }

    /// In-memory presentation rooted at this directory.
    pub fn presentation(&self, root: TreeNode) -> Presentation {
        Presentation::for_directory(self.path())
            .expect("Failed to build presentation")
            .with_default_channels()
            .with_root(root)
    }

    /// Writes a small two-chapter book and returns the project path.
    ///
    /// Chapter one holds two 16-bit mono paragraphs of 600 ms and 400 ms;
    /// chapter two holds one 250 ms paragraph and a sidebar.
    pub fn add_sample_book(&self) -> PathBuf {
        let format = PcmFormat::mono(22050);
        self.add_wav("p1.wav", format, 600, 1);
        self.add_wav("p2.wav", format, 400, 2);
        self.add_wav("p3.wav", format, 250, 3);
        self.add_wav("side.wav", format, 300, 4);

        let audio = |src: &str| serde_json::json!({ "audio": { "kind": "managed_audio", "src": src } });
        let document = serde_json::json!({
            "language": "en",
            "root": {
                "name": "book",
                "children": [
                    {
                        "name": "level1",
                        "media": { "text": { "kind": "text", "text": "Chapter one" } },
                        "children": [
                            { "name": "p", "media": audio("p1.wav") },
                            { "name": "p", "media": audio("p2.wav") }
                        ]
                    },
                    {
                        "name": "level1",
                        "children": [
                            { "name": "p", "media": audio("p3.wav") },
                            { "name": "sidebar", "media": audio("side.wav") }
                        ]
                    }
                ]
            }
        });
        self.add_project("book.json", &document)
    }
}

impl Default for BookFixture {
    fn default() -> Self {
        Self::new()
    }
}
