use crate::cmd::playback::simple;
use crate::cmd::{EqArgs, LoopModeArgs, SourceArgs, Target, VolumeArgs, VolumeSetting};
use crate::exit::CliResult;

pub fn volume(args: VolumeArgs, target: &Target) -> CliResult<i32> {
    match args.level {
        VolumeSetting::Up => simple(target, "volume", |dev| dev.volume_up()),
        VolumeSetting::Down => simple(target, "volume", |dev| dev.volume_down()),
        VolumeSetting::Level(level) => simple(target, "volume", |dev| dev.set_volume(level)),
    }
}

pub fn equalizer(args: EqArgs, target: &Target) -> CliResult<i32> {
    simple(target, "eq", |dev| dev.set_equalizer(args.mode))
}

pub fn loop_mode(args: LoopModeArgs, target: &Target) -> CliResult<i32> {
    simple(target, "loop-mode", |dev| dev.set_loop_mode(args.mode))
}

pub fn source(args: SourceArgs, target: &Target) -> CliResult<i32> {
    simple(target, "source", |dev| dev.set_source(args.source))
}
