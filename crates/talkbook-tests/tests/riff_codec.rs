//! RIFF/WAVE codec tests across the audio crate's public API.
//!
//! Tests verify:
//! - Header round-trip for known formats and payload lengths
//! - Rejection of non-RIFF and truncated streams
//! - Files written by the streaming writer are readable by `hound`
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p talkbook-tests --test riff_codec
//! ```

use std::io::{Cursor, Seek, SeekFrom, Write};
use std::time::Duration;

use pretty_assertions::assert_eq;
use talkbook_audio::wav::{compute_pcm_hash, write_wav_to_vec};
use talkbook_audio::{AudioError, AudioMediaData, PcmDataInfo, PcmFormat, WavStreamWriter};
use talkbook_tests::tone_pcm;

fn formats() -> Vec<PcmFormat> {
    vec![
        PcmFormat::new(1, 22050, 16).unwrap(),
        PcmFormat::new(1, 44100, 16).unwrap(),
        PcmFormat::new(2, 22050, 8).unwrap(),
        PcmFormat::new(1, 11025, 8).unwrap(),
    ]
}

// ============================================================================
// Header Round-Trip
// ============================================================================

#[test]
fn test_header_round_trip() {
    for format in formats() {
        for data_length in [0u32, 1, 2, 4410, 44_100, 1_000_001] {
            let info = PcmDataInfo::new(format, data_length);
            let mut header = Vec::new();
            info.write_header(&mut header).unwrap();
            assert_eq!(header.len(), 44);

            // parse_header checks the payload is present, so pad the stream out.
            header.resize(info.total_file_length() as usize, 0);
            let parsed = PcmDataInfo::parse_header(&mut Cursor::new(header)).unwrap();
            assert_eq!(parsed.format, format);
            assert_eq!(parsed.data_length, data_length);
        }
    }
}

#[test]
fn test_odd_payload_is_padded() {
    let format = PcmFormat::new(1, 8000, 8).unwrap();
    let wav = write_wav_to_vec(&format, &[1, 2, 3]).unwrap();
    assert_eq!(wav.len(), 44 + 3 + 1);

    let info = PcmDataInfo::parse_header(&mut Cursor::new(&wav)).unwrap();
    assert_eq!(info.data_length, 3);
    assert_eq!(info.riff_chunk_size() as usize, wav.len() - 8);
}

// ============================================================================
// Malformed Input
// ============================================================================

#[test]
fn test_rejects_non_riff_stream() {
    for bytes in [&b"RIFX\x24\x00\x00\x00WAVE"[..], b"ID3\x04", b"OggS\x00\x02"] {
        let err = PcmDataInfo::parse_header(&mut Cursor::new(bytes)).unwrap_err();
        assert!(
            matches!(err, AudioError::MalformedHeader { .. }),
            "expected malformed header for {:?}, got {:?}",
            bytes,
            err
        );
    }
}

#[test]
fn test_rejects_truncated_payload() {
    let format = PcmFormat::mono(22050);
    let mut wav = write_wav_to_vec(&format, &vec![0u8; 1000]).unwrap();
    wav.truncate(44 + 500);

    let err = PcmDataInfo::parse_header(&mut Cursor::new(wav)).unwrap_err();
    assert!(matches!(err, AudioError::TruncatedStream { .. }), "got {:?}", err);
    assert_eq!(err.code(), "AUDIO_003");
}

#[test]
fn test_truncated_file_cannot_become_media_data() {
    let format = PcmFormat::mono(8000);
    let mut wav = write_wav_to_vec(&format, &[7u8; 64]).unwrap();
    wav.truncate(60);
    assert!(AudioMediaData::from_wav_reader(&mut Cursor::new(wav)).is_err());
}

// ============================================================================
// Interop
// ============================================================================

#[test]
fn test_stream_writer_output_is_readable_by_hound() {
    let format = PcmFormat::mono(22050);
    let first = tone_pcm(&format, Duration::from_millis(600), 1);
    let second = tone_pcm(&format, Duration::from_millis(400), 2);

    let mut writer = WavStreamWriter::new(Cursor::new(Vec::new()), format).unwrap();
    writer.write_pcm(&first).unwrap();
    writer.append_from(&mut Cursor::new(&second)).unwrap();
    assert_eq!(writer.duration(), Duration::from_secs(1));
    let wav = writer.finalize().unwrap().into_inner();

    let reader = hound::WavReader::new(Cursor::new(&wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 22050);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.duration(), 22050);

    let mut expected = first.clone();
    expected.extend_from_slice(&second);
    assert_eq!(
        compute_pcm_hash(&wav).unwrap(),
        blake3::hash(&expected).to_hex().to_string()
    );
}

#[test]
fn test_reads_files_written_by_hound() {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..441i16 {
            writer.write_sample(i).unwrap();
            writer.write_sample(-i).unwrap();
        }
        writer.finalize().unwrap();
    }

    cursor.seek(SeekFrom::Start(0)).unwrap();
    let audio = AudioMediaData::from_wav_reader(&mut cursor).unwrap();
    assert_eq!(audio.format(), PcmFormat::stereo(44100));
    assert_eq!(audio.duration(), Duration::from_millis(10));
    let pcm = audio.read_all().unwrap();
    assert_eq!(&pcm[4..8], &[1, 0, 0xff, 0xff]);
}

#[test]
fn test_stream_writer_at_offset_patches_its_own_header() {
    let format = PcmFormat::new(1, 8000, 8).unwrap();
    let mut cursor = Cursor::new(Vec::new());
    cursor.write_all(b"prefix--").unwrap();

    let mut writer = WavStreamWriter::new(cursor, format).unwrap();
    writer.write_pcm(&[0x80; 5]).unwrap();
    let bytes = writer.finalize().unwrap().into_inner();

    let mut reader = Cursor::new(&bytes);
    reader.seek(SeekFrom::Start(8)).unwrap();
    let info = PcmDataInfo::parse_header(&mut reader).unwrap();
    assert_eq!(info.data_length, 5);
    assert_eq!(bytes.len(), 8 + 44 + 5 + 1);
}
