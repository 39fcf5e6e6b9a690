//! Compare command implementation
//!
//! Compares the PCM formats and payload bytes of two WAV files. Header
//! layout differences (extra chunks, chunk order) are ignored.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

use talkbook_audio::wav::compare_stream_data;
use talkbook_audio::PcmDataInfo;

use super::json_output::{CompareOutput, CompareResult, JsonError};

/// Run the compare command
///
/// # Returns
/// Exit code: 0 if the files hold identical audio, 1 if they differ or on error
pub fn run(path_a: &str, path_b: &str, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(path_a, path_b)
    } else {
        run_human(path_a, path_b)
    }
}

fn run_human(path_a: &str, path_b: &str) -> Result<ExitCode> {
    println!("{}", "Comparing files:".cyan().bold());
    println!("  {} {}", "A:".dimmed(), path_a);
    println!("  {} {}", "B:".dimmed(), path_b);

    let result = compare(path_a, path_b)?;
    println!("  {} {}", "Format A:".dimmed(), result.format_a);
    println!("  {} {}", "Format B:".dimmed(), result.format_b);
    println!(
        "  {} {} / {} bytes",
        "Payload:".dimmed(),
        result.data_length_a,
        result.data_length_b
    );

    if result.identical {
        println!("\n{}", "Audio is identical".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        let reason = if !result.formats_compatible {
            "formats differ"
        } else if result.data_length_a != result.data_length_b {
            "payload lengths differ"
        } else {
            "payload bytes differ"
        };
        println!("\n{} ({})", "Audio differs".red().bold(), reason);
        Ok(ExitCode::from(1))
    }
}

fn run_json(path_a: &str, path_b: &str) -> Result<ExitCode> {
    let (output, code) = match compare(path_a, path_b) {
        Ok(result) => {
            let code = if result.identical {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            };
            (CompareOutput::success(result), code)
        }
        Err(e) => {
            let error = JsonError::new(error_code(&e), format!("{:#}", e));
            (CompareOutput::failure(vec![error]), ExitCode::from(1))
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}

/// Compares two WAV files by format and payload.
pub fn compare(path_a: &str, path_b: &str) -> Result<CompareResult> {
    let (info_a, mut reader_a) = open(path_a)?;
    let (info_b, mut reader_b) = open(path_b)?;

    let formats_compatible = info_a.format.is_compatible_with(&info_b.format);
    let identical = formats_compatible
        && info_a.data_length == info_b.data_length
        && compare_stream_data(&mut reader_a, &mut reader_b, info_a.data_length as u64)
            .context("Failed to read payload")?;

    Ok(CompareResult {
        a: path_a.to_string(),
        b: path_b.to_string(),
        format_a: info_a.format,
        format_b: info_b.format,
        formats_compatible,
        data_length_a: info_a.data_length,
        data_length_b: info_b.data_length,
        identical,
    })
}

fn open(path: &str) -> Result<(PcmDataInfo, BufReader<File>)> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
    let mut reader = BufReader::new(file);
    let info = PcmDataInfo::parse_header(&mut reader)
        .with_context(|| format!("Failed to parse WAV header of {}", path))?;
    Ok((info, reader))
}

fn error_code(err: &anyhow::Error) -> String {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<talkbook_audio::AudioError>())
        .map(|e| e.code().to_string())
        .unwrap_or_else(|| super::json_output::error_codes::FILE_READ.to_string())
}
