mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use lpframe_codec::Framer;

use crate::cmd::{Command, PrefixArg};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "lpframe", version, about = "Length-prefixed framing CLI")]
struct Cli {
    /// Length prefix encoding of the stream.
    #[arg(
        long,
        value_name = "ENCODING",
        env = "LPFRAME_PREFIX",
        default_value = "fixed",
        global = true
    )]
    prefix: PrefixArg,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let framer = Framer::new(cli.prefix.into());
    let result = cmd::run(cli.command, framer, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
