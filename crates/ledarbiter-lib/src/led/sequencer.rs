//! Blink sequencer — program encoding and run/hold control.
//!
//! The sequencer blinks the targeted outputs on its own once a program is
//! loaded and running, so no software timer is involved in flashing.

use serde::Serialize;

use crate::arbiter::ZoneTarget;
use crate::channel::{ChannelId, ChannelWriter, WriteStatus};
use crate::protocol;
use crate::request::FlashMode;

/// Whether the loaded program is currently running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ProgramState {
    #[default]
    Off,
    Run,
}

/// Convert a hold time to sequencer steps, saturating at [`protocol::MAX_STEPS`].
pub fn quantize(ms: u32) -> u8 {
    let steps = (protocol::SECONDS_PER_STEP * f64::from(ms) / 1000.0).round();
    steps.clamp(0.0, f64::from(protocol::MAX_STEPS)) as u8
}

/// Trigger mask for a zone target. `Unknown` pulses everything.
pub fn trigger_for(target: ZoneTarget) -> u16 {
    match target {
        ZoneTarget::Sides => protocol::TRIGGER_SIDES,
        ZoneTarget::Middle => protocol::TRIGGER_MIDDLE,
        ZoneTarget::All | ZoneTarget::Unknown => protocol::TRIGGER_ALL,
    }
}

/// Encode the blink program for `target` with the given hold times.
///
/// The result is the hex text written to the program-load channel, without
/// the trailing newline.
pub fn encode_program(target: ZoneTarget, on_ms: u32, off_ms: u32) -> String {
    let ramp_up = protocol::RAMP_UP_SMOOTH & 0b1111_1110;
    let ramp_down = protocol::RAMP_DOWN_SMOOTH | 0b0000_0001;
    let on = quantize(on_ms);
    let off = quantize(off_ms);
    let trigger = trigger_for(target) & 0x1FF;

    protocol::PROGRAM_TEMPLATE
        .replace("{ramp_up}", &format!("{ramp_up:02x}"))
        .replace("{on}", &format!("{on:02x}"))
        .replace("{ramp_down}", &format!("{ramp_down:02x}"))
        .replace("{off}", &format!("{off:02x}"))
        .replace("{trigger}", &format!("{trigger:03x}"))
}

/// Run/hold bookkeeping for the sequencer.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    state: ProgramState,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Apply the program for one arbitration pass.
    ///
    /// `Timed`: load a fresh program when `rewrite` is set (a loaded program
    /// starts held), then start it unless it is already running.
    /// `None`: hold and disable all three sequencers, whichever zone is active.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_program(
        &mut self,
        writer: &impl ChannelWriter,
        status: &mut WriteStatus,
        target: ZoneTarget,
        flash_mode: FlashMode,
        on_ms: u32,
        off_ms: u32,
        rewrite: bool,
    ) {
        match flash_mode {
            FlashMode::Timed => {
                if rewrite {
                    self.state = ProgramState::Off;
                    let program = encode_program(target, on_ms, off_ms);
                    log::debug!("loading sequencer program {program}");
                    status.record(writer.write_text(ChannelId::ProgramLoad, &program));
                }
                if self.state != ProgramState::Run {
                    let sequencer = protocol::PROGRAM_SEQUENCER;
                    status.record(writer.write_text(
                        ChannelId::ProgramMode { sequencer },
                        protocol::MODE_RELOAD,
                    ));
                    status.record(
                        writer.write_text(ChannelId::ProgramRun { sequencer }, protocol::RUN_RUN),
                    );
                    self.state = ProgramState::Run;
                }
            }
            FlashMode::None => {
                for sequencer in 1..=protocol::ZONE_COUNT {
                    status.record(
                        writer.write_text(ChannelId::ProgramRun { sequencer }, protocol::RUN_HOLD),
                    );
                }
                for sequencer in 1..=protocol::ZONE_COUNT {
                    status.record(writer.write_text(
                        ChannelId::ProgramMode { sequencer },
                        protocol::MODE_DISABLED,
                    ));
                }
                self.state = ProgramState::Off;
            }
        }
    }
}
