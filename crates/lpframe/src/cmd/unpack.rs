use std::fs::File;
use std::io::BufReader;

use bytes::Bytes;
use lpframe_codec::{raw_payload, BoxError, Framer};

use crate::cmd::UnpackArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_frames, FrameRecord, OutputFormat};

pub fn run(args: UnpackArgs, framer: Framer, format: OutputFormat) -> CliResult<i32> {
    let file = File::open(&args.input)
        .map_err(|err| io_error(&format!("failed opening {}", args.input.display()), err))?;
    let mut reader = BufReader::new(file);

    let collection = if args.utf8 {
        framer.read_collection(&mut reader, require_utf8)
    } else {
        framer.read_collection(&mut reader, raw_payload)
    }
    .map_err(|err| frame_error(&format!("failed reading {}", args.input.display()), err))?;

    let mut offset = 0u64;
    let records: Vec<FrameRecord> = collection
        .iter()
        .enumerate()
        .map(|(index, payload)| {
            let record = FrameRecord::new(
                index,
                offset,
                framer.prefix().encoded_len(payload.len()),
                payload,
            );
            offset += framer.frame_size(payload) as u64;
            record
        })
        .collect();

    tracing::debug!(frames = records.len(), bytes = offset, "unpacked frames");
    print_frames(&records, format);

    Ok(SUCCESS)
}

fn require_utf8(payload: Bytes) -> Result<Bytes, BoxError> {
    std::str::from_utf8(&payload)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_utf8_passes_text_through() {
        let payload = require_utf8(Bytes::from_static(b"Foo")).unwrap();
        assert_eq!(payload.as_ref(), b"Foo");
        assert!(require_utf8(Bytes::from_static(&[0xc3, 0x28])).is_err());
    }
}
