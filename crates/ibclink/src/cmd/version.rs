use ibclink_exchange::DEFAULT_REPLY_SIZE;
use ibclink_frame::HEADER_SIZE;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("ibclink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: ibclink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("IBCLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("IBCLINK_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("header_size: {HEADER_SIZE}");
    println!("default_reply_size: {DEFAULT_REPLY_SIZE}");
    println!("features: serial={}, cli=true", cfg!(feature = "serial"));

    Ok(SUCCESS)
}
