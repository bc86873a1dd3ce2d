use ibclink_frame::{decode, encode_strict};

use crate::cmd::{frame_from_parts, DecodeArgs, EncodeArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};
use crate::parse::parse_hex_bytes;

pub fn run_encode(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = frame_from_parts(
        args.attn,
        args.ttl,
        args.data_length,
        args.packet_id,
        args.payload.as_deref(),
    )?;
    if args.strict {
        encode_strict(&frame).map_err(|err| frame_error("encode failed", err))?;
    }
    print_frame("request", &frame, format);
    Ok(SUCCESS)
}

pub fn run_decode(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex_bytes(&args.hex).map_err(CliError::usage)?;
    let frame = decode(&bytes).map_err(|err| frame_error("decode failed", err))?;
    print_frame("decoded", &frame, format);
    Ok(SUCCESS)
}
