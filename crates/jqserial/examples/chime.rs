//! Play a short sequence of files on a JQ8400 and wait for it to finish.
//!
//! Run with:
//!   cargo run --example chime -- /dev/ttyUSB0 1 2 3

use std::thread;
use std::time::Duration;

use jqserial::device::{Jq8400, LoopMode};
use jqserial::transport::DEFAULT_BAUD_RATE;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let port = args.next().ok_or("usage: chime <PORT> [FILE...]")?;
    let files = args
        .map(|arg| arg.parse::<u8>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut player = Jq8400::open(&port, DEFAULT_BAUD_RATE)?;
    let sources = player.reset()?;
    if sources.is_empty() {
        return Err("module did not answer".into());
    }
    eprintln!("Sources: {sources}");

    player.set_loop_mode(LoopMode::OneStop)?;
    player.set_volume(18)?;
    if files.is_empty() {
        player.play_file_by_index(1)?;
    } else {
        player.play_sequence_by_number(&files)?;
    }

    while player.is_busy()? {
        eprintln!(
            "Playing {} ({}s of {}s)",
            player.current_file_name()?,
            player.current_file_position()?,
            player.current_file_length()?
        );
        thread::sleep(Duration::from_secs(1));
    }
    eprintln!("Done");
    Ok(())
}
