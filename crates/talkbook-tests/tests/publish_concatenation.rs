//! Publish visitor tests over in-memory presentations.
//!
//! Tests verify:
//! - Consecutive clips are laid out back to back in one file
//! - A format change opens a new file without a structural trigger
//! - Skipped subtrees contribute no audio and receive no references
//! - Channel misconfiguration fails before any file is written
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p talkbook-tests --test publish_concatenation
//! ```

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use pretty_assertions::assert_eq;
use talkbook_audio::wav::hash_pcm_stream;
use talkbook_audio::{PcmDataInfo, PcmFormat};
use talkbook_model::{Channel, MediaKind, TreeNode};
use talkbook_publish::{publish_presentation, PublishConfig, PublishError};
use talkbook_tests::fixtures::tone_audio;
use talkbook_tests::{tone_pcm, BookFixture};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn chapter_config() -> PublishConfig {
    PublishConfig {
        new_file_on: vec!["level1".to_string()],
        skip: vec!["sidebar".to_string()],
        ..PublishConfig::default()
    }
}

// ============================================================================
// Concatenation
// ============================================================================

#[test]
fn test_clips_are_contiguous() {
    let fixture = BookFixture::new();
    let format = PcmFormat::mono(22050);
    let root = TreeNode::named("book").with_child(
        TreeNode::named("level1")
            .with_child(TreeNode::named("p").with_media("audio", tone_audio(format, 600, 1)))
            .with_child(TreeNode::named("p").with_media("audio", tone_audio(format, 400, 2))),
    );
    let mut presentation = fixture.presentation(root);

    let report = publish_presentation(&mut presentation, &chapter_config(), fixture.out_dir()).unwrap();

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].duration, ms(1000));
    assert_eq!(report.files[0].data_length, 44_100);

    let chapter = &presentation.root().children()[0];
    let a = chapter.children()[0].external_audio("audio.published").unwrap();
    let b = chapter.children()[1].external_audio("audio.published").unwrap();
    assert_eq!((a.clip_begin(), a.clip_end()), (ms(0), ms(600)));
    assert_eq!((b.clip_begin(), b.clip_end()), (ms(600), ms(1000)));
    assert_eq!(a.src(), "published/aud0.wav");
    assert_eq!(a.src(), b.src());
}

#[test]
fn test_file_payload_is_concatenated_source_audio() {
    let fixture = BookFixture::new();
    let format = PcmFormat::mono(22050);
    let root = TreeNode::named("book")
        .with_child(TreeNode::named("p").with_media("audio", tone_audio(format, 600, 1)))
        .with_child(TreeNode::named("p").with_media("audio", tone_audio(format, 400, 2)));
    let mut presentation = fixture.presentation(root);

    let report =
        publish_presentation(&mut presentation, &PublishConfig::default(), fixture.out_dir()).unwrap();

    let mut expected = tone_pcm(&format, ms(600), 1);
    expected.extend(tone_pcm(&format, ms(400), 2));

    let mut reader = BufReader::new(File::open(fixture.out_dir().join("aud0.wav")).unwrap());
    let info = PcmDataInfo::parse_header(&mut reader).unwrap();
    assert_eq!(info.format, format);
    assert_eq!(info.data_length as usize, expected.len());
    let hash = hash_pcm_stream(&mut reader, info.data_length as u64).unwrap();
    assert_eq!(hash, blake3::hash(&expected).to_hex().to_string());
    assert_eq!(report.files[0].blake3, hash);
}

#[test]
fn test_triggers_split_chapters() {
    let fixture = BookFixture::new();
    let project = fixture.add_sample_book();
    let mut presentation = talkbook_model::load_project(&project).unwrap();

    let report = publish_presentation(&mut presentation, &chapter_config(), fixture.out_dir()).unwrap();

    let names: Vec<&str> = report.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["aud0.wav", "aud1.wav"]);
    assert_eq!(report.files[0].duration, ms(1000));
    assert_eq!(report.files[1].duration, ms(250));
    assert_eq!(report.clips_in("aud1.wav").count(), 1);
    assert_eq!(report.clips[2].clip.clip_begin, ms(0));
}

// ============================================================================
// Format-Change Rollover
// ============================================================================

#[test]
fn test_format_change_opens_new_file() {
    let fixture = BookFixture::new();
    let root = TreeNode::named("book")
        .with_child(TreeNode::named("p").with_media("audio", tone_audio(PcmFormat::mono(22050), 300, 1)))
        .with_child(TreeNode::named("p").with_media("audio", tone_audio(PcmFormat::stereo(44100), 200, 2)));
    let mut presentation = fixture.presentation(root);

    let report =
        publish_presentation(&mut presentation, &PublishConfig::default(), fixture.out_dir()).unwrap();

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.files[0].format, PcmFormat::mono(22050));
    assert_eq!(report.files[1].format, PcmFormat::stereo(44100));

    let a = presentation.root().children()[0].external_audio("audio.published").unwrap();
    let b = presentation.root().children()[1].external_audio("audio.published").unwrap();
    assert_eq!((a.clip_begin(), a.clip_end()), (ms(0), ms(300)));
    assert_eq!((b.clip_begin(), b.clip_end()), (ms(0), ms(200)));
    assert_ne!(a.src(), b.src());
}

#[test]
fn test_format_change_back_opens_third_file() {
    let fixture = BookFixture::new();
    let mono = PcmFormat::mono(22050);
    let root = TreeNode::named("book")
        .with_child(TreeNode::new().with_media("audio", tone_audio(mono, 100, 1)))
        .with_child(TreeNode::new().with_media("audio", tone_audio(PcmFormat::mono(11025), 100, 2)))
        .with_child(TreeNode::new().with_media("audio", tone_audio(mono, 100, 3)));
    let mut presentation = fixture.presentation(root);

    let report =
        publish_presentation(&mut presentation, &PublishConfig::default(), fixture.out_dir()).unwrap();
    assert_eq!(report.files.len(), 3);
    assert!(report.clips.iter().all(|c| c.clip.clip_begin == Duration::ZERO));
}

// ============================================================================
// Skip Semantics
// ============================================================================

#[test]
fn test_skipped_subtree_is_untouched() {
    let fixture = BookFixture::new();
    let format = PcmFormat::mono(22050);
    let root = TreeNode::named("book")
        .with_child(TreeNode::named("p").with_media("audio", tone_audio(format, 200, 1)))
        .with_child(
            TreeNode::named("sidebar")
                .with_media("audio", tone_audio(format, 500, 2))
                .with_child(TreeNode::named("p").with_media("audio", tone_audio(format, 500, 3))),
        )
        .with_child(TreeNode::named("p").with_media("audio", tone_audio(format, 100, 4)));
    let mut presentation = fixture.presentation(root);

    let report = publish_presentation(&mut presentation, &chapter_config(), fixture.out_dir()).unwrap();

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].duration, ms(300));
    assert_eq!(report.skipped_nodes, 1);
    // The sidebar's child is never reached.
    assert_eq!(report.visited_nodes, 4);

    let sidebar = &presentation.root().children()[1];
    assert!(sidebar.media("audio.published").is_none());
    assert!(sidebar.children()[0].media("audio.published").is_none());
    assert!(sidebar.managed_audio("audio").is_some());

    let last = presentation.root().children()[2].external_audio("audio.published").unwrap();
    assert_eq!((last.clip_begin(), last.clip_end()), (ms(200), ms(300)));
}

#[test]
fn test_skipped_root_publishes_nothing() {
    let fixture = BookFixture::new();
    let root = TreeNode::named("sidebar")
        .with_child(TreeNode::new().with_media("audio", tone_audio(PcmFormat::mono(8000), 50, 1)));
    let mut presentation = fixture.presentation(root);

    let report = publish_presentation(&mut presentation, &chapter_config(), fixture.out_dir()).unwrap();
    assert!(report.files.is_empty());
    assert_eq!(report.visited_nodes, 1);
    assert!(!fixture.out_dir().join("aud0.wav").exists());
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[test]
fn test_destination_channel_must_accept_external_audio() {
    let fixture = BookFixture::new();
    let root = TreeNode::new().with_media("audio", tone_audio(PcmFormat::mono(8000), 50, 1));
    let mut presentation = fixture.presentation(root);
    presentation
        .channels_mut()
        .add(Channel::new("notes", [MediaKind::Text]))
        .unwrap();
    let config = PublishConfig {
        destination_channel: "notes".to_string(),
        ..PublishConfig::default()
    };

    let err = publish_presentation(&mut presentation, &config, fixture.out_dir()).unwrap_err();
    assert!(matches!(err, PublishError::Factory { .. }), "got {:?}", err);
    assert_eq!(err.code(), "PUBLISH_001");
    assert!(!fixture.out_dir().join("aud0.wav").exists());
}

#[test]
fn test_unknown_source_channel() {
    let fixture = BookFixture::new();
    let mut presentation = fixture.presentation(TreeNode::new());
    let config = PublishConfig {
        source_channel: "narration".to_string(),
        ..PublishConfig::default()
    };

    let err = publish_presentation(&mut presentation, &config, fixture.out_dir()).unwrap_err();
    assert!(matches!(err, PublishError::UnknownChannel { ref name } if name == "narration"));
}

#[test]
fn test_custom_pattern_and_first_index() {
    let fixture = BookFixture::new();
    let format = PcmFormat::mono(8000);
    let root = TreeNode::named("book")
        .with_child(TreeNode::named("level1").with_media("audio", tone_audio(format, 50, 1)))
        .with_child(TreeNode::named("level1").with_media("audio", tone_audio(format, 50, 2)));
    let mut presentation = fixture.presentation(root);
    let config = PublishConfig {
        file_name_pattern: "chapter_{N}.wav".to_string(),
        first_file_index: 1,
        ..chapter_config()
    };

    let report = publish_presentation(&mut presentation, &config, fixture.out_dir()).unwrap();
    let names: Vec<&str> = report.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["chapter_1.wav", "chapter_2.wav"]);
}
