use jqserial_device::command::{self, Command, ResponseShape};
use serde::Serialize;

use crate::cmd::{RawArgs, Target};
use crate::exit::{device_error, CliError, CliResult, SUCCESS};
use crate::output::{hex, print_record, schema_id, OutputFormat};

#[derive(Serialize)]
struct RawOutput {
    schema_id: String,
    command: String,
    code: u8,
    request: String,
    declared_len: u8,
    payload: String,
    overflow: usize,
}

pub fn run(args: RawArgs, target: &Target, format: OutputFormat) -> CliResult<i32> {
    let (code, known) = resolve_command(&args.command)?;
    let payload = args
        .bytes
        .iter()
        .map(|text| parse_byte(text))
        .collect::<CliResult<Vec<u8>>>()?;

    let mut device = target.open()?;
    let capacity = args.response.unwrap_or_else(|| match known {
        Some(cmd) => match cmd.response {
            ResponseShape::Text => device.config().file_name_capacity,
            shape => shape.capacity().unwrap_or(0),
        },
        None => 0,
    });

    let name = known.map_or_else(|| format!("0x{code:02X}"), |cmd| cmd.name.to_string());
    let response = device
        .send_raw(code, &payload, capacity)
        .map_err(|err| device_error(&name, err))?;

    let out = RawOutput {
        schema_id: schema_id("raw-exchange"),
        command: name,
        code,
        request: hex(device.engine().last_request()),
        declared_len: response.declared_len,
        payload: hex(&response.payload),
        overflow: response.overflow,
    };
    print_record(
        &out,
        &[
            ("payload", out.payload.clone()),
            ("request", out.request.clone()),
            ("declared length", out.declared_len.to_string()),
            ("overflow", out.overflow.to_string()),
        ],
        format,
    );
    Ok(SUCCESS)
}

/// A command name from the table, or a numeric byte.
fn resolve_command(text: &str) -> CliResult<(u8, Option<Command>)> {
    if let Some(cmd) = command::by_name(text) {
        return Ok((cmd.code, Some(cmd)));
    }
    let code = parse_byte(text)
        .map_err(|_| CliError::usage(format!("unknown command '{text}'")))?;
    Ok((code, command::by_code(code)))
}

/// Decimal, or hex with a `0x` prefix.
fn parse_byte(text: &str) -> CliResult<u8> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => text.parse::<u8>(),
    };
    parsed.map_err(|_| CliError::usage(format!("'{text}' is not a byte (0-255 or 0x00-0xFF)")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_byte_accepts_decimal_and_hex() {
        assert_eq!(parse_byte("25").expect("decimal"), 25);
        assert_eq!(parse_byte("0x19").expect("hex"), 0x19);
        assert_eq!(parse_byte("0XfF").expect("hex"), 0xFF);
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("0x").is_err());
    }

    #[test]
    fn resolve_by_name_or_byte() {
        let (code, known) = resolve_command("set-volume").expect("known name");
        assert_eq!(code, 0x13);
        assert_eq!(known.map(|cmd| cmd.name), Some("set-volume"));

        let (code, known) = resolve_command("reset").expect("alias");
        assert_eq!(code, 0x04);
        assert!(known.is_some());

        let (code, known) = resolve_command("0x7F").expect("unknown byte");
        assert_eq!(code, 0x7F);
        assert!(known.is_none());

        let err = resolve_command("louder").expect_err("not a command");
        assert_eq!(err.code, crate::exit::USAGE);
    }
}
