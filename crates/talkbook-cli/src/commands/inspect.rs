//! Inspect command implementation
//!
//! Prints the header fields, duration and payload hash of a WAV file.

use anyhow::Result;
use colored::Colorize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::ExitCode;

use talkbook_audio::time::{as_millis_f64, to_clock_value};
use talkbook_audio::wav::hash_pcm_stream;
use talkbook_audio::PcmDataInfo;

use super::json_output::{error_codes, InspectOutput, InspectResult, JsonError};

/// Run the inspect command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(input: &str, json_output: bool) -> Result<ExitCode> {
    if json_output {
        let output = match inspect(input) {
            Ok(result) => InspectOutput::success(result),
            Err(e) => InspectOutput::failure(vec![e.with_file(input)]),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(if output.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    }

    let result = inspect(input)
        .map_err(|e| anyhow::anyhow!("Failed to inspect {}: {} [{}]", input, e.message, e.code))?;
    print_human(&result);
    Ok(ExitCode::SUCCESS)
}

/// Reads and hashes a WAV file.
pub fn inspect(input: &str) -> std::result::Result<InspectResult, JsonError> {
    let path = Path::new(input);
    let file_size = std::fs::metadata(path)
        .map_err(|e| JsonError::new(error_codes::FILE_READ, e.to_string()))?
        .len();
    let file = File::open(path).map_err(|e| JsonError::new(error_codes::FILE_READ, e.to_string()))?;
    let mut reader = BufReader::new(file);

    let info = PcmDataInfo::parse_header(&mut reader)
        .map_err(|e| JsonError::new(e.code(), e.to_string()))?;
    let pcm_hash = hash_pcm_stream(&mut reader, info.data_length as u64)
        .map_err(|e| JsonError::new(error_codes::FILE_READ, e.to_string()))?;

    let duration = info.format.duration_for_bytes(info.data_length as u64);
    Ok(InspectResult {
        file: input.to_string(),
        format: info.format,
        block_align: info.format.block_align(),
        byte_rate: info.format.byte_rate(),
        data_length: info.data_length,
        duration_ms: as_millis_f64(duration),
        duration: to_clock_value(duration),
        file_size,
        canonical_size: info.total_file_length(),
        pcm_hash,
    })
}

fn print_human(result: &InspectResult) {
    println!("{} {}", "Inspecting:".cyan().bold(), result.file);
    println!("  {} {}", "Format:".dimmed(), result.format);
    println!(
        "  {} {} bytes/frame, {} bytes/s",
        "Rates:".dimmed(),
        result.block_align,
        result.byte_rate
    );
    println!("  {} {} bytes", "Payload:".dimmed(), result.data_length);
    println!(
        "  {} {} ({:.3} ms)",
        "Duration:".dimmed(),
        result.duration,
        result.duration_ms
    );
    println!("  {} {}", "PCM hash:".dimmed(), &result.pcm_hash[..16]);
    if result.file_size != result.canonical_size {
        println!(
            "  {} file is {} bytes, canonical layout would be {} bytes",
            "Note:".yellow(),
            result.file_size,
            result.canonical_size
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talkbook_audio::wav::write_wav_to_vec;
    use talkbook_audio::PcmFormat;

    #[test]
    fn test_inspect_reports_header_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        let format = PcmFormat::mono(22050);
        std::fs::write(&path, write_wav_to_vec(&format, &vec![0u8; 26460]).unwrap()).unwrap();

        let result = inspect(path.to_str().unwrap()).unwrap();
        assert_eq!(result.format, format);
        assert_eq!(result.data_length, 26460);
        assert_eq!(result.duration, "0:00:00.600");
        assert_eq!(result.file_size, result.canonical_size);
        assert_eq!(result.pcm_hash.len(), 64);
    }

    #[test]
    fn test_inspect_rejects_non_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        std::fs::write(&path, b"OggS and then some more bytes here").unwrap();

        let err = inspect(path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.code, "AUDIO_002");
    }

    #[test]
    fn test_inspect_missing_file() {
        let err = inspect("/definitely/not/here.wav").unwrap_err();
        assert_eq!(err.code, error_codes::FILE_READ);
    }
}
