use jqserial_device::Sources;
use serde::Serialize;

use crate::cmd::Target;
use crate::exit::{device_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_record, schema_id, OutputFormat};

#[derive(Serialize)]
struct ResetOutput {
    schema_id: String,
    answered: bool,
    sources: Sources,
}

pub fn run(target: &Target, format: OutputFormat) -> CliResult<i32> {
    let mut device = target.open()?;
    let sources = device.reset().map_err(|err| device_error("reset", err))?;

    let out = ResetOutput {
        schema_id: schema_id("reset"),
        answered: !sources.is_empty(),
        sources,
    };
    print_record(
        &out,
        &[
            ("answered", out.answered.to_string()),
            ("sources", sources.to_string()),
        ],
        format,
    );

    if out.answered {
        Ok(SUCCESS)
    } else {
        eprintln!("error: module did not answer after reset");
        Ok(FAILURE)
    }
}
