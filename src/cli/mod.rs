//! CLI module for the bindings generator
//!
//! This module provides the command-line interface over the generator backend.
//!
//! ## Commands
//!
//! - `generate <interface.json>` - Emit the binding source for one interface
//! - `classify <interface.json>` - Print the host storage type of every IDL type the interface uses
//! - `overloads <interface.json>` - Print effective overload buckets and distinguishing indices as JSON
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::version::VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The interface description could not be read or parsed.
    pub const INPUT: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an input error (exit code 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::INPUT)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// WebIDL to script-engine bindings generator
#[derive(Parser, Debug)]
#[command(name = "webidl-bindgen")]
#[command(version = VERSION)]
#[command(about = "WebIDL to script-engine bindings generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the binding source for an interface
    Generate {
        /// Interface description (JSON)
        #[arg(value_name = "INTERFACE")]
        input: PathBuf,
        /// Write the generated source here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Root that interface module paths are made relative to (repeatable)
        #[arg(long = "search-path", value_name = "DIR")]
        search_paths: Vec<PathBuf>,
        /// Path of the runtime support module as seen from generated code
        #[arg(long, value_name = "PATH")]
        runtime_path: Option<String>,
        /// Skip parsing and pretty-printing the output
        #[arg(long)]
        no_format: bool,
    },

    /// Print the host storage type of every IDL type the interface uses
    Classify {
        /// Interface description (JSON)
        #[arg(value_name = "INTERFACE")]
        input: PathBuf,
    },

    /// Print effective overload buckets and distinguishing indices
    Overloads {
        /// Interface description (JSON)
        #[arg(value_name = "INTERFACE")]
        input: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Generate {
            input,
            output,
            search_paths,
            runtime_path,
            no_format,
        } => {
            let options = commands::GenerateOptions {
                output,
                search_paths,
                runtime_path,
                format_output: !no_format,
            };
            commands::generate(&input, &options)
        }
        Command::Classify { input } => commands::classify_types(&input),
        Command::Overloads { input } => commands::print_overloads(&input),
    }
}

// ============================================================================
// Tests
// ============================================================================
