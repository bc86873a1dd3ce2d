use ibclink_channel::list_ports;
use tracing::debug;

use crate::cmd::PortsArgs;
use crate::exit::{channel_error, CliResult, SUCCESS};
use crate::output::{print_ports, OutputFormat};

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let ports = list_ports().map_err(|err| channel_error("port enumeration failed", err))?;
    debug!(count = ports.len(), "listing serial ports");
    print_ports(&ports, format);
    Ok(SUCCESS)
}
