use jqserial_transport::list_ports;
use serde::Serialize;

use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_rows, schema_id, OutputFormat};

#[derive(Serialize)]
struct PortOutput {
    name: String,
    kind: &'static str,
    description: Option<String>,
}

#[derive(Serialize)]
struct PortsOutput {
    schema_id: String,
    ports: Vec<PortOutput>,
}

pub fn run(format: OutputFormat) -> CliResult<i32> {
    let ports = list_ports().map_err(|err| transport_error("list ports", err))?;

    let out = PortsOutput {
        schema_id: schema_id("ports"),
        ports: ports
            .into_iter()
            .map(|port| PortOutput {
                name: port.name,
                kind: port.kind,
                description: port.description,
            })
            .collect(),
    };
    let rows = out
        .ports
        .iter()
        .map(|port| {
            vec![
                port.name.clone(),
                port.kind.to_string(),
                port.description.clone().unwrap_or_default(),
            ]
        })
        .collect();

    print_rows(&out, &["NAME", "TYPE", "DESCRIPTION"], rows, format);
    Ok(SUCCESS)
}
