use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an extension session against a simulated host.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    ContentEditor,
    Dashboard,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Extension category the host reports when no --context file is given.
    #[arg(long, value_enum, default_value = "content-editor")]
    pub category: CategoryArg,
    /// JSON file with the full context the host hands out.
    #[arg(long, value_name = "FILE", conflicts_with = "category")]
    pub context: Option<PathBuf>,
    /// JSON file with the host's initial content model.
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,
    /// JSON Schema file the host validates models against.
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
    /// JSON value the extension writes to the form.
    #[arg(long, value_name = "JSON")]
    pub set: Option<String>,
    /// Height the extension requests (default: measured body height).
    #[arg(long, allow_negative_numbers = true)]
    pub height: Option<f64>,
    /// Body height the extension measures.
    #[arg(long, default_value_t = 480)]
    pub body_height: u32,
    /// Start the session with the form read-only.
    #[arg(long)]
    pub read_only: bool,
    /// Handshake timeout (e.g. 5s, 500ms, off).
    #[arg(long, default_value = "5s")]
    pub connection_timeout: String,
    /// Default request timeout (e.g. 5s, 500ms, off).
    #[arg(long, default_value = "off")]
    pub timeout: String,
    /// Log channel traffic at debug level.
    #[arg(long)]
    pub debug: bool,
    /// Host never accepts the handshake.
    #[arg(long)]
    pub refuse_connection: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
