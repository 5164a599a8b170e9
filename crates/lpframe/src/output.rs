use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

const PREVIEW_LIMIT: usize = 64;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One frame as reported by `unpack` and `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub index: usize,
    pub offset: u64,
    pub prefix_len: usize,
    pub payload_size: usize,
    pub payload: String,
    #[serde(skip)]
    pub raw: Vec<u8>,
}

impl FrameRecord {
    pub fn new(index: usize, offset: u64, prefix_len: usize, payload: &[u8]) -> Self {
        Self {
            index,
            offset,
            prefix_len,
            payload_size: payload.len(),
            payload: payload_preview(payload),
            raw: payload.to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub path: &'a str,
    pub prefix: &'a str,
    pub frames: usize,
    pub bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn print_frames(frames: &[FrameRecord], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for frame in frames {
                println!(
                    "{}",
                    serde_json::to_string(frame).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            if frames.is_empty() {
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "OFFSET", "PREFIX", "SIZE", "PAYLOAD"]);
            for frame in frames {
                table.add_row(vec![
                    frame.index.to_string(),
                    frame.offset.to_string(),
                    frame.prefix_len.to_string(),
                    frame.payload_size.to_string(),
                    frame.payload.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for frame in frames {
                println!(
                    "frame={} offset={} prefix={} size={} payload={}",
                    frame.index, frame.offset, frame.prefix_len, frame.payload_size, frame.payload
                );
            }
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout().lock();
            for frame in frames {
                let _ = out.write_all(&frame.raw);
                let _ = out.write_all(b"\n");
            }
            let _ = out.flush();
        }
    }
}

pub fn print_summary(summary: &Summary<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PATH", "PREFIX", "FRAMES", "BYTES", "ERROR"])
                .add_row(vec![
                    summary.path.to_string(),
                    summary.prefix.to_string(),
                    summary.frames.to_string(),
                    summary.bytes.to_string(),
                    summary.error.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            let mut line = format!(
                "path={} prefix={} frames={} bytes={}",
                summary.path, summary.prefix, summary.frames, summary.bytes
            );
            if let Some(err) = &summary.error {
                line.push_str(&format!(" error={err}"));
            }
            if matches!(format, OutputFormat::Raw) {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if text.chars().count() <= PREVIEW_LIMIT => text.to_string(),
        Ok(text) => {
            let head: String = text.chars().take(PREVIEW_LIMIT).collect();
            format!("{head}…")
        }
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
