use std::fs::File;
use std::io::{BufReader, Read};

use lpframe_codec::{FrameError, FrameReader, Framer};

use crate::cmd::InspectArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frames, print_summary, FrameRecord, OutputFormat, Summary};

/// Frames read before a framing error, plus the error itself.
struct Walk {
    records: Vec<FrameRecord>,
    bytes: u64,
    error: Option<FrameError>,
}

pub fn run(args: InspectArgs, framer: Framer, format: OutputFormat) -> CliResult<i32> {
    if args.count == Some(0) {
        return Err(CliError::new(USAGE, "--count must be greater than zero"));
    }

    let file = File::open(&args.input)
        .map_err(|err| io_error(&format!("failed opening {}", args.input.display()), err))?;
    let walk = walk(BufReader::new(file), framer, args.count);

    print_frames(&walk.records, format);

    let path = args.input.display().to_string();
    print_summary(
        &Summary {
            path: &path,
            prefix: framer.prefix().as_str(),
            frames: walk.records.len(),
            bytes: walk.bytes,
            error: walk.error.as_ref().map(|err| err.to_string()),
        },
        format,
    );

    match walk.error {
        Some(err) => Err(frame_error(
            &format!("{} is not a valid {} stream", path, framer.prefix()),
            err,
        )),
        None => Ok(SUCCESS),
    }
}

fn walk<R: Read>(inner: R, framer: Framer, limit: Option<usize>) -> Walk {
    let mut reader = FrameReader::with_framer(inner, framer);
    let mut records = Vec::new();

    while limit.is_none_or(|limit| records.len() < limit) {
        let offset = reader.bytes_read();
        match reader.read_frame() {
            Ok(Some(frame)) => {
                records.push(FrameRecord::new(
                    records.len(),
                    offset,
                    frame.prefix_len,
                    &frame.payload,
                ));
            }
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(offset, frame = records.len(), error = %err, "framing error");
                return Walk {
                    records,
                    bytes: offset,
                    error: Some(err),
                };
            }
        }
    }

    Walk {
        records,
        bytes: reader.bytes_read(),
        error: None,
    }
}
