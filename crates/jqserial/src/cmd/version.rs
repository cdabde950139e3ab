use jqserial_transport::DEFAULT_BAUD_RATE;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

const UNKNOWN: &str = "unknown";

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("jqserial {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    let fields = [
        ("name", "jqserial"),
        ("target", option_env!("JQSERIAL_BUILD_TARGET").unwrap_or(UNKNOWN)),
        ("rustc", option_env!("JQSERIAL_RUSTC_VERSION").unwrap_or(UNKNOWN)),
        ("git_hash", option_env!("JQSERIAL_GIT_HASH").unwrap_or(UNKNOWN)),
    ];
    for (name, value) in fields {
        println!("{name}: {value}");
    }
    println!("default_baud: {DEFAULT_BAUD_RATE}");
    println!(
        "features: serial={}, mock={}, cli=true",
        cfg!(feature = "serial"),
        cfg!(feature = "mock")
    );

    Ok(SUCCESS)
}
