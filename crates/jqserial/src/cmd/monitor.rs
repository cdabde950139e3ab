use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jqserial_device::PlayStatus;
use serde::Serialize;

use crate::cmd::{MonitorArgs, Target};
use crate::exit::{device_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{now_unix_seconds, print_record, schema_id, OutputFormat};

#[derive(Serialize)]
struct Reading {
    schema_id: String,
    status: PlayStatus,
    timestamp: String,
}

pub fn run(args: MonitorArgs, target: &Target, format: OutputFormat) -> CliResult<i32> {
    let mut device = target.open()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    let mut previous: Option<PlayStatus> = None;

    while running.load(Ordering::SeqCst) {
        let status = device
            .status()
            .map_err(|err| device_error("status", err))?;

        if !args.changes || previous != Some(status) {
            let out = Reading {
                schema_id: schema_id("status-reading"),
                status,
                timestamp: now_unix_seconds(),
            };
            print_record(
                &out,
                &[
                    ("status", status.to_string()),
                    ("timestamp", out.timestamp.clone()),
                ],
                format,
            );
            printed = printed.saturating_add(1);
        }
        previous = Some(status);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(args.interval));
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
