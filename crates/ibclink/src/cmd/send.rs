use ibclink_exchange::{Exchanger, PresetTable};
use ibclink_frame::ControlFrame;
use tracing::info;

use crate::cmd::{frame_from_parts, SendArgs};
use crate::exit::{exchange_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let request = resolve_request(&args, &PresetTable::default())?;
    let mut port = args.link.open()?;
    let mut exchanger = Exchanger::with_config(&mut port, args.link.exchange_config());

    if args.no_reply {
        let written = exchanger
            .send_frame(&request)
            .map_err(|err| exchange_error("send failed", err))?;
        info!(bytes = written, "request sent, no reply requested");
        print_frame("request", &request, format);
        return Ok(SUCCESS);
    }

    let reply = exchanger
        .exchange(&request)
        .map_err(|err| exchange_error("exchange failed", err))?;
    info!(
        packet_id = reply.packet_id,
        payload_size = reply.payload.len(),
        "reply received"
    );
    print_frame("reply", &reply, format);

    Ok(SUCCESS)
}

fn resolve_request(args: &SendArgs, presets: &PresetTable) -> CliResult<ControlFrame> {
    if let Some(key) = &args.preset {
        return presets
            .find(key)
            .map(|preset| preset.frame.clone())
            .ok_or_else(|| CliError::usage(format!("unknown preset: {key}")));
    }

    match (args.attn, args.ttl, args.packet_id) {
        (Some(attn), Some(ttl), Some(packet_id)) => frame_from_parts(
            attn,
            ttl,
            args.data_length,
            packet_id,
            args.payload.as_deref(),
        ),
        _ => Err(CliError::usage(
            "either --preset or --attn, --ttl and --packet-id are required",
        )),
    }
}
