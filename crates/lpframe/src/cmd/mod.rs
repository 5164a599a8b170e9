use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use lpframe_codec::{Framer, PrefixEncoding};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod inspect;
pub mod pack;
pub mod unpack;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame input lines into a length-prefixed file.
    Pack(PackArgs),
    /// Read a whole framed file and print every payload.
    Unpack(UnpackArgs),
    /// Walk a framed file frame by frame, reporting offsets and sizes.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Length prefix encoding, as selected on the command line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PrefixArg {
    /// 4-byte little-endian length.
    #[default]
    Fixed,
    /// Base-128 varint length.
    Varint,
}

impl From<PrefixArg> for PrefixEncoding {
    fn from(arg: PrefixArg) -> Self {
        match arg {
            PrefixArg::Fixed => PrefixEncoding::Fixed32,
            PrefixArg::Varint => PrefixEncoding::Varint,
        }
    }
}

pub fn run(command: Command, framer: Framer, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Pack(args) => pack::run(args, framer, format),
        Command::Unpack(args) => unpack::run(args, framer, format),
        Command::Inspect(args) => inspect::run(args, framer, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// File to write the framed stream to.
    pub output: PathBuf,
    /// Read lines from this file instead of stdin.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// Append to OUTPUT instead of truncating it.
    #[arg(long)]
    pub append: bool,
    /// Drop empty lines instead of writing empty frames.
    #[arg(long)]
    pub skip_empty: bool,
}

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Framed file to read.
    pub input: PathBuf,
    /// Require payloads to be valid UTF-8.
    #[arg(long)]
    pub utf8: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Framed file to inspect.
    pub input: PathBuf,
    /// Stop after N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
