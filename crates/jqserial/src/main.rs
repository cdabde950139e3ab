mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use jqserial_transport::DEFAULT_BAUD_RATE;

use crate::cmd::{Command, Target};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "jqserial", version, about = "JQ8400 MP3 module control over serial")]
struct Cli {
    /// Serial port the module is attached to.
    #[arg(long, short = 'p', env = "JQSERIAL_PORT", global = true)]
    port: Option<String>,

    /// Line speed.
    #[arg(long, env = "JQSERIAL_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    baud: u32,

    /// JSON file with timing and retry settings.
    #[arg(long, value_name = "FILE", env = "JQSERIAL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let target = Target {
        port: cli.port,
        baud: cli.baud,
        config: cli.config,
    };
    let result = cmd::run(cli.command, &target, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use jqserial_device::{Equalizer, Source};

    use super::*;
    use crate::cmd::{PlayArgs, VolumeSetting};

    #[test]
    fn parses_global_port_after_subcommand() {
        let cli = Cli::try_parse_from(["jqserial", "status", "--port", "/dev/ttyUSB0"])
            .expect("status args should parse");
        assert_eq!(cli.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(cli.baud, 9600);
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn play_index_conflicts_with_folder() {
        let err = Cli::try_parse_from(["jqserial", "play", "--index", "3", "--folder", "1"])
            .expect_err("conflicting args should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn play_file_requires_folder() {
        let err = Cli::try_parse_from(["jqserial", "play", "--file", "3"])
            .expect_err("file without folder should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from(["jqserial", "play", "--folder", "2", "--file", "7"])
            .expect("folder and file should parse");
        match cli.command {
            Command::Play(PlayArgs { folder, file, .. }) => {
                assert_eq!(folder, Some(2));
                assert_eq!(file, Some(7));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_settings_values() {
        let cli = Cli::try_parse_from(["jqserial", "eq", "rock"]).expect("eq should parse");
        assert!(matches!(cli.command, Command::Eq(ref args) if args.mode == Equalizer::Rock));

        let cli =
            Cli::try_parse_from(["jqserial", "source", "builtin"]).expect("source should parse");
        assert!(matches!(cli.command, Command::Source(ref args) if args.source == Source::Flash));

        let cli = Cli::try_parse_from(["jqserial", "volume", "up"]).expect("volume should parse");
        assert!(matches!(
            cli.command,
            Command::Volume(ref args) if args.level == VolumeSetting::Up
        ));

        let cli = Cli::try_parse_from(["jqserial", "volume", "12"]).expect("volume should parse");
        assert!(matches!(
            cli.command,
            Command::Volume(ref args) if args.level == VolumeSetting::Level(12)
        ));

        assert!(Cli::try_parse_from(["jqserial", "eq", "loud"]).is_err());
    }

    #[test]
    fn parses_raw_command() {
        let cli = Cli::try_parse_from(["jqserial", "raw", "set-volume", "0x19", "--response", "0"])
            .expect("raw args should parse");
        match cli.command {
            Command::Raw(args) => {
                assert_eq!(args.command, "set-volume");
                assert_eq!(args.bytes, vec!["0x19".to_string()]);
                assert_eq!(args.response, Some(0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
