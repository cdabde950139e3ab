use jqserial_device::Result as DeviceResult;
use tracing::info;

use crate::cmd::{AbLoopArgs, Device, PlayArgs, PlaylistArgs, Target};
use crate::exit::{device_error, CliError, CliResult, SUCCESS};

/// Open the module, run one operation, and report success.
pub fn simple(
    target: &Target,
    name: &str,
    op: impl FnOnce(&mut Device) -> DeviceResult<()>,
) -> CliResult<i32> {
    let mut device = target.open()?;
    op(&mut device).map_err(|err| device_error(name, err))?;
    info!(command = name, "sent");
    Ok(SUCCESS)
}

pub fn play(args: PlayArgs, target: &Target) -> CliResult<i32> {
    match (args.index, args.folder, args.file) {
        (Some(index), _, _) => simple(target, "play", |dev| dev.play_file_by_index(index)),
        (None, Some(folder), Some(file)) => simple(target, "play", |dev| {
            dev.play_file_in_folder(folder, file)
        }),
        (None, Some(folder), None) => simple(target, "play", |dev| dev.play_in_folder(folder)),
        (None, None, _) => simple(target, "play", Device::play),
    }
}

pub fn ab_loop(args: AbLoopArgs, target: &Target) -> CliResult<i32> {
    match (args.clear, args.start, args.end) {
        (true, _, _) => simple(target, "ab-loop", Device::ab_loop_clear),
        (false, Some(start), Some(end)) => {
            if end <= start {
                return Err(CliError::usage(format!(
                    "ab-loop: end ({end}s) must be after start ({start}s)"
                )));
            }
            simple(target, "ab-loop", |dev| dev.ab_loop_play(start, end))
        }
        _ => Err(CliError::usage("ab-loop: give START and END, or --clear")),
    }
}

pub fn playlist(args: PlaylistArgs, target: &Target) -> CliResult<i32> {
    if args.names {
        return simple(target, "playlist", |dev| {
            dev.play_sequence_by_name(&args.entries)
        });
    }
    let numbers = parse_numbers(&args.entries)?;
    simple(target, "playlist", |dev| dev.play_sequence_by_number(&numbers))
}

fn parse_numbers(entries: &[String]) -> CliResult<Vec<u8>> {
    entries
        .iter()
        .map(|entry| {
            entry.trim().parse::<u8>().map_err(|_| {
                CliError::usage(format!("playlist: '{entry}' is not a file number (0-99)"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_numbers_parse() {
        let entries = vec!["1".to_string(), " 12".to_string()];
        assert_eq!(parse_numbers(&entries).expect("numbers"), vec![1, 12]);

        let err = parse_numbers(&["x1".to_string()]).expect_err("not a number");
        assert_eq!(err.code, crate::exit::USAGE);
    }
}
