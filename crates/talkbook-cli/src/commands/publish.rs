//! Publish command implementation
//!
//! Loads a project document, concatenates the managed audio of its source
//! channel into WAV files and reports the clip references that were set.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use talkbook_audio::time::to_clock_value;
use talkbook_model::load_project;
use talkbook_publish::{publish_presentation, PublishConfig, PublishError, PublishReport};

use super::json_output::{error_codes, JsonError, PublishOutput};

/// Options for the publish command, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Project document (JSON)
    pub project: String,
    /// Output directory; defaults to the project's directory
    pub out: Option<String>,
    /// Publish configuration file (JSON)
    pub config: Option<String>,
    /// Output file name pattern override
    pub pattern: Option<String>,
    /// Source channel override
    pub source_channel: Option<String>,
    /// Destination channel override
    pub destination_channel: Option<String>,
    /// Additional node names starting a new file
    pub new_file_on: Vec<String>,
    /// Additional node names whose subtrees are skipped
    pub skip: Vec<String>,
    /// Where to write the report JSON
    pub report: Option<String>,
    /// Print a JSON envelope instead of colored output
    pub json: bool,
}

/// Run the publish command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(options: &PublishOptions) -> Result<ExitCode> {
    if options.json {
        return run_json(options);
    }

    println!("{} {}", "Publishing:".cyan().bold(), options.project);
    let report = match publish(options) {
        Ok(report) => report,
        Err(e) => anyhow::bail!("{} [{}]", e.message, e.code),
    };
    print_human(&report);

    if let Some(path) = &options.report {
        println!("  {} {}", "Report:".dimmed(), path);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_json(options: &PublishOptions) -> Result<ExitCode> {
    let output = match publish(options) {
        Ok(report) => PublishOutput::success(report),
        Err(e) => PublishOutput::failure(vec![e]),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Loads, publishes and optionally writes the report.
pub fn publish(options: &PublishOptions) -> std::result::Result<PublishReport, JsonError> {
    let config = build_config(options).map_err(publish_error)?;

    let mut presentation = load_project(&options.project)
        .map_err(|e| JsonError::new(e.code(), e.to_string()).with_file(&options.project))?;

    let out_dir = match &options.out {
        Some(out) => Path::new(out).to_path_buf(),
        None => presentation
            .base_uri()
            .to_file_path()
            .map_err(|_| {
                JsonError::new(
                    error_codes::FILE_WRITE,
                    format!("project base {} is not a local directory", presentation.base_uri()),
                )
            })?,
    };

    let report = publish_presentation(&mut presentation, &config, &out_dir).map_err(publish_error)?;

    if let Some(path) = &options.report {
        write_report(&report, path)
            .map_err(|e| JsonError::new(error_codes::FILE_WRITE, format!("{:#}", e)).with_file(path))?;
    }
    Ok(report)
}

/// Merges the configuration file with command-line overrides.
pub fn build_config(options: &PublishOptions) -> std::result::Result<PublishConfig, PublishError> {
    let mut config = match &options.config {
        Some(path) => PublishConfig::from_json_file(path)?,
        None => PublishConfig::default(),
    };

    if let Some(pattern) = &options.pattern {
        config.file_name_pattern = pattern.clone();
    }
    if let Some(channel) = &options.source_channel {
        config.source_channel = channel.clone();
    }
    if let Some(channel) = &options.destination_channel {
        config.destination_channel = channel.clone();
    }
    for name in &options.new_file_on {
        if !config.new_file_on.contains(name) {
            config.new_file_on.push(name.clone());
        }
    }
    for name in &options.skip {
        if !config.skip.contains(name) {
            config.skip.push(name.clone());
        }
    }

    config.validate()?;
    Ok(config)
}

fn write_report(report: &PublishReport, path: &str) -> Result<()> {
    let json = report.to_json_pretty().context("Failed to serialize report")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
    Ok(())
}

fn publish_error(e: PublishError) -> JsonError {
    JsonError::new(e.code(), e.to_string())
}

fn print_human(report: &PublishReport) {
    println!(
        "  {} {} -> {}",
        "Channels:".dimmed(),
        report.source_channel,
        report.destination_channel
    );
    println!(
        "  {} {} visited, {} skipped",
        "Nodes:".dimmed(),
        report.visited_nodes,
        report.skipped_nodes
    );

    if report.files.is_empty() {
        println!("\n{}", "No managed audio found".yellow());
        return;
    }

    for file in &report.files {
        println!(
            "  {} {} ({}, {}, {} clips)",
            "File:".dimmed(),
            file.src,
            file.format,
            to_clock_value(file.duration),
            report.clips_in(&file.name).count()
        );
    }
    println!(
        "\n{} {} clips in {} files, {}",
        "Published".green().bold(),
        report.clips.len(),
        report.files.len(),
        to_clock_value(report.total_duration())
    );
}
