//! Talkbook CLI - publish managed audio of talking-book projects
//!
//! This binary concatenates the managed audio of a project into WAV files
//! and provides helpers to inspect and compare WAV files.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use talkbook_cli::commands;
use talkbook_cli::commands::publish::PublishOptions;

/// Talkbook - managed audio publishing for talking books
#[derive(Parser)]
#[command(name = "talkbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Concatenate managed audio into WAV files and set clip references
    Publish {
        /// Path to the project document (JSON)
        #[arg(short, long)]
        project: String,

        /// Output directory (default: the project's directory)
        #[arg(short, long)]
        out: Option<String>,

        /// Path to a publish configuration file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Output file name pattern, containing `{N}` once
        #[arg(long)]
        pattern: Option<String>,

        /// Channel to read managed audio from
        #[arg(long)]
        source_channel: Option<String>,

        /// Channel to write clip references to
        #[arg(long)]
        destination_channel: Option<String>,

        /// Node name that starts a new output file (repeatable)
        #[arg(long = "new-file-on")]
        new_file_on: Vec<String>,

        /// Node name whose subtree is not published (repeatable)
        #[arg(long)]
        skip: Vec<String>,

        /// Write the publish report to this file
        #[arg(long)]
        report: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the header fields and payload hash of a WAV file
    Inspect {
        /// Path to the WAV file
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Compare the format and audio payload of two WAV files
    Compare {
        /// Path to the first file (reference)
        #[arg(short, long)]
        a: String,

        /// Path to the second file (comparison target)
        #[arg(short, long)]
        b: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    talkbook_cli::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Publish {
            project,
            out,
            config,
            pattern,
            source_channel,
            destination_channel,
            new_file_on,
            skip,
            report,
            json,
        } => commands::publish::run(&PublishOptions {
            project,
            out,
            config,
            pattern,
            source_channel,
            destination_channel,
            new_file_on,
            skip,
            report,
            json,
        }),
        Commands::Inspect { input, json } => commands::inspect::run(&input, json),
        Commands::Compare { a, b, json } => commands::compare::run(&a, &b, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
