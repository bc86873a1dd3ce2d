use std::io::{self, BufRead, Write};

use ibclink_channel::ByteChannel;
use ibclink_exchange::{ExchangeConfig, Exchanger, PresetTable};
use ibclink_frame::ControlFrame;
use tracing::warn;

use crate::cmd::MenuArgs;
use crate::exit::{io_error, CliResult, SUCCESS};
use crate::parse::parse_hex_u8;

pub fn run(args: MenuArgs) -> CliResult<i32> {
    let mut port = args.link.open()?;
    let menu = Menu::new(PresetTable::default(), args.link.exchange_config());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    menu.run(&mut input, &mut output, &mut port)
        .map_err(|err| io_error("menu I/O failed", err))?;

    Ok(SUCCESS)
}

/// What the operator picked at the main prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Preset(usize),
    Custom,
    Quit,
}

pub fn parse_choice(input: &str, presets: usize) -> Result<MenuChoice, &'static str> {
    match input.trim() {
        "q" | "Q" => Ok(MenuChoice::Quit),
        "c" | "C" => Ok(MenuChoice::Custom),
        other => match other.parse::<usize>() {
            Ok(index) if index < presets => Ok(MenuChoice::Preset(index)),
            Ok(_) => Err("Invalid option. Please choose a valid number."),
            Err(_) => Err("Invalid input. Please enter a number."),
        },
    }
}

enum Prompt<T> {
    Value(T),
    Invalid(String),
    Closed,
}

/// Interactive selector over a preset table.
///
/// Exchange failures are reported on the output and the loop continues;
/// only I/O errors on the terminal itself end it.
pub struct Menu {
    presets: PresetTable,
    config: ExchangeConfig,
}

impl Menu {
    pub fn new(presets: PresetTable, config: ExchangeConfig) -> Self {
        Self { presets, config }
    }

    pub fn run<R, W, C>(&self, input: &mut R, output: &mut W, channel: &mut C) -> io::Result<()>
    where
        R: BufRead,
        W: Write,
        C: ByteChannel + ?Sized,
    {
        loop {
            self.print_options(output)?;
            let Some(line) = prompt(input, output, "Enter your choice: ")? else {
                return Ok(());
            };

            match parse_choice(&line, self.presets.len()) {
                Ok(MenuChoice::Quit) => return Ok(()),
                Ok(MenuChoice::Custom) => match read_custom_frame(input, output)? {
                    Prompt::Value(frame) => self.send(output, channel, &frame)?,
                    Prompt::Invalid(message) => writeln!(output, "{message}")?,
                    Prompt::Closed => return Ok(()),
                },
                Ok(MenuChoice::Preset(index)) => {
                    if let Some(preset) = self.presets.get(index) {
                        self.send(output, channel, &preset.frame)?;
                    }
                }
                Err(message) => writeln!(output, "{message}")?,
            }
        }
    }

    fn print_options<W: Write>(&self, output: &mut W) -> io::Result<()> {
        writeln!(output, "Select an option:")?;
        for (index, preset) in self.presets.iter().enumerate() {
            writeln!(output, "{index}: {} - {}", preset.name, preset.frame)?;
        }
        writeln!(output, "c: Send Custom Packet")?;
        writeln!(output, "q: Quit")
    }

    fn send<W, C>(&self, output: &mut W, channel: &mut C, frame: &ControlFrame) -> io::Result<()>
    where
        W: Write,
        C: ByteChannel + ?Sized,
    {
        writeln!(output, "Sent: {frame}")?;
        let mut exchanger = Exchanger::with_config(channel, self.config);
        match exchanger.exchange(frame) {
            Ok(reply) => writeln!(output, "Received: {reply}"),
            Err(err) => {
                warn!(error = %err, "exchange failed");
                writeln!(output, "Error communicating with the device: {err}")
            }
        }
    }
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<Option<String>> {
    write!(output, "{message}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_hex<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<Prompt<u8>> {
    Ok(match prompt(input, output, message)? {
        Some(line) => match parse_hex_u8(&line) {
            Ok(value) => Prompt::Value(value),
            Err(message) => Prompt::Invalid(message),
        },
        None => Prompt::Closed,
    })
}

/// Prompt for each header field and then `data_length` payload bytes, all in hex.
fn read_custom_frame<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Prompt<ControlFrame>> {
    let mut fields = [0u8; 4];
    let labels = [
        "Enter ATTN (0-15): ",
        "Enter TTL (0-3): ",
        "Enter data length (0-7): ",
        "Enter packet ID (0-31): ",
    ];
    for (slot, label) in fields.iter_mut().zip(labels) {
        match prompt_hex(input, output, label)? {
            Prompt::Value(value) => *slot = value,
            Prompt::Invalid(message) => return Ok(Prompt::Invalid(message)),
            Prompt::Closed => return Ok(Prompt::Closed),
        }
    }
    let [attn, ttl, data_length, packet_id] = fields;

    let mut payload = Vec::with_capacity(usize::from(data_length));
    for index in 0..data_length {
        let label = format!("Enter data byte {} (00-FF): ", index + 1);
        match prompt_hex(input, output, &label)? {
            Prompt::Value(value) => payload.push(value),
            Prompt::Invalid(message) => return Ok(Prompt::Invalid(message)),
            Prompt::Closed => return Ok(Prompt::Closed),
        }
    }

    Ok(Prompt::Value(ControlFrame::new(
        attn,
        ttl,
        data_length,
        packet_id,
        payload,
    )))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use bytes::Bytes;
    use ibclink_channel::ChannelError;
    use ibclink_frame::EncodeMode;

    use super::*;

    #[derive(Default)]
    struct ScriptedChannel {
        written: Vec<u8>,
        replies: VecDeque<Vec<u8>>,
    }

    impl ByteChannel for ScriptedChannel {
        fn write(&mut self, bytes: &[u8]) -> ibclink_channel::Result<usize> {
            self.written.extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn read(&mut self, n: usize) -> ibclink_channel::Result<Bytes> {
            match self.replies.pop_front() {
                Some(reply) if reply.len() >= n => Ok(Bytes::from(reply).slice(..n)),
                Some(reply) => Err(ChannelError::Timeout {
                    expected: n,
                    received: reply.len(),
                    timeout: None,
                }),
                None => Err(ChannelError::Timeout {
                    expected: n,
                    received: 0,
                    timeout: None,
                }),
            }
        }
    }

    fn reply() -> Vec<u8> {
        vec![0xF2, 0x84, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0]
    }

    fn run_script(script: &str, channel: &mut ScriptedChannel) -> String {
        run_script_with(script, channel, ExchangeConfig::default())
    }

    fn run_script_with(
        script: &str,
        channel: &mut ScriptedChannel,
        config: ExchangeConfig,
    ) -> String {
        let menu = Menu::new(PresetTable::default(), config);
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        menu.run(&mut input, &mut output, channel).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn parse_choice_variants() {
        assert_eq!(parse_choice("q", 10), Ok(MenuChoice::Quit));
        assert_eq!(parse_choice(" c ", 10), Ok(MenuChoice::Custom));
        assert_eq!(parse_choice("9", 10), Ok(MenuChoice::Preset(9)));
        assert!(parse_choice("10", 10).is_err());
        assert!(parse_choice("x", 10).is_err());
    }

    #[test]
    fn preset_selection_sends_and_prints_reply() {
        let mut channel = ScriptedChannel {
            replies: VecDeque::from([reply()]),
            ..ScriptedChannel::default()
        };
        let out = run_script("0\nq\n", &mut channel);

        assert_eq!(channel.written, vec![0xF2, 0x84, 0, 0, 0, 5]);
        assert!(out.contains("0: Set regA=5 - ControlFrame("));
        assert!(out.contains("Sent: ControlFrame(attn=0xF, ttl=0x2"));
        assert!(out.contains("Received: ControlFrame(attn=0xF"));
    }

    #[test]
    fn custom_frame_prompts_in_hex() {
        let mut channel = ScriptedChannel {
            replies: VecDeque::from([reply()]),
            ..ScriptedChannel::default()
        };
        let out = run_script("c\nF\n3\n1\nF\n00\nq\n", &mut channel);

        assert_eq!(channel.written, vec![0xF3, 0x2F, 0x00]);
        assert!(out.contains("Enter data byte 1 (00-FF): "));
    }

    #[test]
    fn invalid_entries_keep_the_loop_running() {
        let mut channel = ScriptedChannel::default();
        let out = run_script("42\nabc\nc\nzz\nq\n", &mut channel);

        assert!(out.contains("Invalid option. Please choose a valid number."));
        assert!(out.contains("Invalid input. Please enter a number."));
        assert!(out.contains("invalid hex byte"));
        assert!(channel.written.is_empty());
    }

    #[test]
    fn timeout_is_reported_and_menu_continues() {
        let mut channel = ScriptedChannel {
            replies: VecDeque::from([vec![0xF2], reply()]),
            ..ScriptedChannel::default()
        };
        let out = run_script("0\n1\nq\n", &mut channel);

        assert!(out.contains("Error communicating with the device: reply timed out"));
        assert!(out.contains("Received: "));
        assert_eq!(channel.written.len(), 12);
    }

    #[test]
    fn strict_mode_reports_out_of_range_custom_field() {
        let mut channel = ScriptedChannel::default();
        let config = ExchangeConfig {
            encode_mode: EncodeMode::Strict,
            ..ExchangeConfig::default()
        };
        let out = run_script_with("c\n1F\n0\n0\n0\nq\n", &mut channel, config);

        assert!(out.contains("request encoding failed"));
        assert!(channel.written.is_empty());
    }

    #[test]
    fn end_of_input_quits() {
        let mut channel = ScriptedChannel::default();
        let out = run_script("", &mut channel);
        assert!(out.ends_with("Enter your choice: "));
    }
}
