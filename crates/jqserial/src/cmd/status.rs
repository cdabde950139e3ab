use jqserial_device::PlayStatus;
use serde::Serialize;

use crate::cmd::{StatusArgs, Target};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_record, schema_id, OutputFormat};

#[derive(Serialize)]
struct StatusOutput {
    schema_id: String,
    status: PlayStatus,
    code: u8,
    busy: bool,
}

pub fn run(args: StatusArgs, target: &Target, format: OutputFormat) -> CliResult<i32> {
    let mut device = target.open_with(|config| {
        if let Some(checks) = args.checks {
            config.status_checks = checks;
        }
    })?;
    let status = device
        .status()
        .map_err(|err| device_error("status", err))?;

    let out = StatusOutput {
        schema_id: schema_id("status"),
        status,
        code: status.as_byte(),
        busy: status.is_playing(),
    };
    print_record(
        &out,
        &[
            ("status", status.to_string()),
            ("busy", out.busy.to_string()),
        ],
        format,
    );
    Ok(SUCCESS)
}
