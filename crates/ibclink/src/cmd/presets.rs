use ibclink_exchange::PresetTable;

use crate::cmd::PresetsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_presets, OutputFormat};

pub fn run(_args: PresetsArgs, format: OutputFormat) -> CliResult<i32> {
    print_presets(&PresetTable::default(), format);
    Ok(SUCCESS)
}
