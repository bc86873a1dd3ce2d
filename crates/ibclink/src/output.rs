use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ibclink_channel::PortInfo;
use ibclink_exchange::PresetTable;
use ibclink_frame::{encode, ControlFrame};
use serde::Serialize;

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

#[derive(Debug, Serialize)]
pub struct FrameOutput<'a> {
    pub direction: &'a str,
    pub attn: u8,
    pub ttl: u8,
    pub data_length: u8,
    pub packet_id: u8,
    pub header: String,
    pub payload: String,
    pub payload_size: usize,
    pub declared_length_matches: bool,
    pub encoded: String,
}

impl<'a> FrameOutput<'a> {
    pub fn new(direction: &'a str, frame: &ControlFrame) -> Self {
        Self {
            direction,
            attn: frame.attn,
            ttl: frame.ttl,
            data_length: frame.data_length,
            packet_id: frame.packet_id,
            header: format!("0x{:04X}", frame.header_word()),
            payload: hex::encode_upper(&frame.payload),
            payload_size: frame.payload.len(),
            declared_length_matches: frame.declared_length_matches(),
            encoded: hex::encode_upper(encode(frame)),
        }
    }
}

pub fn print_frame(direction: &str, frame: &ControlFrame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput::new(direction, frame);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let out = FrameOutput::new(direction, frame);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "DIRECTION", "ATTN", "TTL", "DLEN", "PACKET_ID", "HEADER", "PAYLOAD",
                ])
                .add_row(vec![
                    out.direction.to_string(),
                    format!("0x{:X}", out.attn),
                    format!("0x{:X}", out.ttl),
                    out.data_length.to_string(),
                    format!("0x{:02X}", out.packet_id),
                    out.header,
                    payload_cell(&out.payload, out.payload_size),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{direction}: {frame}");
        }
        OutputFormat::Raw => {
            print_raw(&encode(frame));
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

#[derive(Serialize)]
struct PresetOutput<'a> {
    index: usize,
    name: &'a str,
    frame: FrameOutput<'a>,
}

pub fn print_presets(presets: &PresetTable, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            let out: Vec<PresetOutput<'_>> = presets
                .iter()
                .enumerate()
                .map(|(index, preset)| PresetOutput {
                    index,
                    name: preset.name,
                    frame: FrameOutput::new("request", &preset.frame),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "NAME", "ENCODED"]);
            for (index, preset) in presets.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    preset.name.to_string(),
                    hex::encode_upper(encode(&preset.frame)),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (index, preset) in presets.iter().enumerate() {
                println!("{index}: {} - {}", preset.name, preset.frame);
            }
        }
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            println!(
                "{}",
                serde_json::to_string(ports).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "PORT", "DESCRIPTION"]);
            for (index, port) in ports.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    port.name.clone(),
                    port.description.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if ports.is_empty() {
                println!("No serial ports available.");
            }
            for (index, port) in ports.iter().enumerate() {
                println!("{index}: {} - {}", port.name, port.description);
            }
        }
    }
}

fn payload_cell(payload_hex: &str, size: usize) -> String {
    if size == 0 {
        "-".to_string()
    } else {
        format!("{payload_hex} ({size} B)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_output_fields() {
        let frame = ControlFrame::new(0xF, 2, 4, 4, vec![0, 0, 0, 5]);
        let out = FrameOutput::new("request", &frame);
        assert_eq!(out.header, "0xF284");
        assert_eq!(out.payload, "00000005");
        assert_eq!(out.encoded, "F28400000005");
        assert!(out.declared_length_matches);
    }

    #[test]
    fn frame_output_serializes() {
        let frame = ControlFrame::new(0x3, 1, 7, 0x11, vec![0xAB]);
        let json = serde_json::to_value(FrameOutput::new("reply", &frame)).unwrap();
        assert_eq!(json["direction"], "reply");
        assert_eq!(json["data_length"], 7);
        assert_eq!(json["payload_size"], 1);
        assert_eq!(json["declared_length_matches"], false);
    }

    #[test]
    fn empty_payload_cell() {
        assert_eq!(payload_cell("", 0), "-");
        assert_eq!(payload_cell("00", 1), "00 (1 B)");
    }
}
