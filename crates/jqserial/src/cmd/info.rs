use jqserial_device::{PlayStatus, Source, Sources};
use serde::Serialize;

use crate::cmd::{Device, Target};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{clock_time, print_record, schema_id, OutputFormat};

#[derive(Serialize)]
struct InfoOutput {
    schema_id: String,
    port: String,
    status: PlayStatus,
    sources: Sources,
    source: Option<Source>,
    file_count: u16,
    current_index: u16,
    current_name: String,
    folder_file_count: u16,
    folder_first_index: u16,
    length_seconds: u32,
    position_seconds: u32,
}

pub fn run(target: &Target, format: OutputFormat) -> CliResult<i32> {
    let mut device = target.open()?;
    let out = collect(&mut device, target).map_err(|err| device_error("info", err))?;

    let source = out
        .source
        .map(|source| source.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    print_record(
        &out,
        &[
            ("status", out.status.to_string()),
            ("sources", out.sources.to_string()),
            ("source", source),
            ("files", out.file_count.to_string()),
            ("current", out.current_index.to_string()),
            ("name", out.current_name.clone()),
            ("folder files", out.folder_file_count.to_string()),
            ("folder first", out.folder_first_index.to_string()),
            ("length", clock_time(out.length_seconds)),
            ("position", clock_time(out.position_seconds)),
        ],
        format,
    );
    Ok(SUCCESS)
}

fn collect(device: &mut Device, target: &Target) -> jqserial_device::Result<InfoOutput> {
    Ok(InfoOutput {
        schema_id: schema_id("device-info"),
        port: target.port.clone().unwrap_or_default(),
        status: device.status()?,
        sources: device.available_sources()?,
        source: device.source()?,
        file_count: device.count_files()?,
        current_index: device.current_file_index()?,
        current_name: device.current_file_name()?,
        folder_file_count: device.count_files_in_folder()?,
        folder_first_index: device.first_file_in_folder_index()?,
        length_seconds: device.current_file_length()?,
        position_seconds: device.current_file_position()?,
    })
}
