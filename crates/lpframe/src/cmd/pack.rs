use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;

use lpframe_codec::{FrameWriter, Framer};

use crate::cmd::PackArgs;
use crate::exit::{io_error, write_error, CliResult, SUCCESS};
use crate::output::{print_summary, OutputFormat, Summary};

pub fn run(args: PackArgs, framer: Framer, format: OutputFormat) -> CliResult<i32> {
    let lines = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            read_lines(BufReader::new(file))
        }
        None => read_lines(io::stdin().lock()),
    }
    .map_err(|err| io_error("failed reading input", err))?;

    let messages: Vec<String> = lines
        .into_iter()
        .filter(|line| !(args.skip_empty && line.is_empty()))
        .collect();

    let file = open_output(&args.output, args.append).map_err(|err| {
        io_error(&format!("failed opening {}", args.output.display()), err)
    })?;
    let mut writer = FrameWriter::with_framer(BufWriter::new(file), framer);
    let bytes = writer.write_all_messages(&messages).map_err(|err| {
        write_error(&format!("failed writing {}", args.output.display()), err)
    })?;

    tracing::info!(
        frames = messages.len(),
        bytes,
        prefix = %framer.prefix(),
        path = %args.output.display(),
        "packed frames"
    );

    let path = args.output.display().to_string();
    print_summary(
        &Summary {
            path: &path,
            prefix: framer.prefix().as_str(),
            frames: messages.len(),
            bytes: bytes as u64,
            error: None,
        },
        format,
    );

    Ok(SUCCESS)
}

fn read_lines<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    reader.lines().collect()
}

fn open_output(path: &Path, append: bool) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
}
