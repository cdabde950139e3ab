//! Drive the dispatcher against a scripted module, no hardware needed.
//!
//! Run with:
//!   cargo run --example scripted-device --features mock

use jqserial::device::{Jq8400, PlayStatus};
use jqserial::frame::{Frame, FrameError};
use jqserial::transport::mock::{MockClock, MockTransport};
use jqserial::transport::Clock;

/// Frame a reply the way the module does.
fn reply(command: u8, payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    Frame::new(command, payload.to_vec())
        .to_bytes()
        .map(|bytes| bytes.to_vec())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let clock = MockClock::new();
    let mut transport = MockTransport::new(clock.clone());
    transport.always_reply(0x01, reply(0x01, &[0x01])?);
    transport.reply_to(0x09, reply(0x09, &[0b010])?);
    transport.reply_to(0x0C, reply(0x0C, &[0x00, 0x2A])?);

    let mut player = Jq8400::new(transport, clock.clone());
    println!("sources: {}", player.reset()?);
    println!("files: {}", player.count_files()?);
    player.set_volume(25)?;
    println!("volume: {}", player.volume());

    let status = player.status()?;
    assert_eq!(status, PlayStatus::Playing);
    println!("status: {status} at {} virtual ms", clock.now_ms());

    for frame in player.transport().sent_frames() {
        let hex: Vec<String> = frame.iter().map(|b| format!("{b:02X}")).collect();
        println!("> {}", hex.join(" "));
    }
    Ok(())
}
