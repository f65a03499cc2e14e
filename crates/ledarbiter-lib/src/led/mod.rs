//! LED bank control — zone colors, blink sequencer, color parsing.

mod color;
pub mod driver;
pub mod sequencer;

pub use color::{Rgb, format_color, parse_color};
pub use driver::{CurrentLimits, apply_zone_color};
pub use sequencer::{ProgramState, Sequencer, encode_program, quantize};
