//! End-to-End Determinism Tests for Talkbook
//!
//! Tests verify:
//! - Publishing an unchanged book twice into an emptied directory yields
//!   byte-identical files and identical clip metadata
//! - Re-publishing over the previous run's output replaces it
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p talkbook-tests --test e2e_determinism
//! ```

use std::fs;

use pretty_assertions::assert_eq;
use talkbook_model::load_project;
use talkbook_publish::{publish_presentation, PublishConfig, PublishReport};
use talkbook_tests::{snapshot_dir, BookFixture};

fn config() -> PublishConfig {
    PublishConfig::from_json(r#"{ "new_file_on": ["level1"], "skip": ["sidebar"] }"#).unwrap()
}

fn publish_once(fixture: &BookFixture, project: &std::path::Path) -> PublishReport {
    let mut presentation = load_project(project).unwrap();
    publish_presentation(&mut presentation, &config(), fixture.out_dir()).unwrap()
}

#[test]
fn test_republish_is_byte_identical() {
    let fixture = BookFixture::new();
    let project = fixture.add_sample_book();

    let first_report = publish_once(&fixture, &project);
    let first = snapshot_dir(&fixture.out_dir()).unwrap();
    assert_eq!(first.files.len(), 2);

    fs::remove_dir_all(fixture.out_dir()).unwrap();
    let second_report = publish_once(&fixture, &project);
    let second = snapshot_dir(&fixture.out_dir()).unwrap();

    assert!(
        first.differences(&second).is_empty(),
        "files differ: {:?}",
        first.differences(&second)
    );
    assert_eq!(first_report, second_report);
    assert_eq!(
        first_report.to_json_pretty().unwrap(),
        second_report.to_json_pretty().unwrap()
    );
}

#[test]
fn test_republish_in_place_overwrites() {
    let fixture = BookFixture::new();
    let project = fixture.add_sample_book();

    let first_report = publish_once(&fixture, &project);
    let first = snapshot_dir(&fixture.out_dir()).unwrap();
    let second_report = publish_once(&fixture, &project);
    let second = snapshot_dir(&fixture.out_dir()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_report.clips, second_report.clips);
}

#[test]
fn test_report_hashes_match_files_on_disk() {
    let fixture = BookFixture::new();
    let project = fixture.add_sample_book();
    let report = publish_once(&fixture, &project);

    for file in &report.files {
        let bytes = fs::read(fixture.out_dir().join(&file.name)).unwrap();
        assert_eq!(
            talkbook_audio::wav::compute_pcm_hash(&bytes).as_deref(),
            Some(file.blake3.as_str())
        );
        assert_eq!(
            bytes.len() as u64,
            talkbook_audio::PcmDataInfo::new(file.format, file.data_length as u32).total_file_length()
        );
    }
}

#[test]
fn test_clip_metadata_is_stable_across_loads() {
    let fixture = BookFixture::new();
    let project = fixture.add_sample_book();

    let mut a = load_project(&project).unwrap();
    let mut b = load_project(&project).unwrap();
    publish_presentation(&mut a, &config(), fixture.out_dir()).unwrap();
    publish_presentation(&mut b, &config(), fixture.out_dir()).unwrap();

    let clips = |p: &talkbook_model::Presentation| {
        p.root()
            .iter()
            .filter_map(|(path, node)| {
                node.external_audio("audio.published")
                    .map(|c| (path.to_string(), c.src().to_string(), c.clip_begin(), c.clip_end()))
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(clips(&a), clips(&b));
    assert_eq!(clips(&a).len(), 3);
}
