//! Hardware constants for the three-zone RGB indicator bank and its AS3665
//! blink sequencer.
//!
//! ## Sequencer program layout
//!
//! The program is loaded as one line of hex digits. Word by word:
//!
//! ```text
//! 00 0e0e 9d00 9c0e 9c8f 9d80 UUff 9dc0 NNff 9d80 DDff 9dc0 FFff 9d80 a004 c000 0000 0TTT
//! ```
//!
//! - `0e0e`: start the PWM, 16 clock cycles per step, ramp up, 14 ramp cycles
//! - `9d00` / `9c0e` / `9c8f`: clear the MUX table, MUX start 14, MUX end 15
//! - `9d80` / `9dc0`: step the MUX pointer up / down
//! - `UU`: ramp-up code (low bit clear), `DD`: ramp-down code (low bit set)
//! - `NN`, `FF`: on and off hold lengths in sequencer steps (0..=63)
//! - `a004`: infinite loop over 4 steps, `c000`: end, `0000`: goto start
//! - `TTT`: 9-bit trigger mask selecting the pulsed driver outputs

// ── Bank geometry ──

/// Number of physical zones. Fixed by the hardware.
pub const ZONE_COUNT: u8 = 3;

/// Color sub-channel letters as they appear in control paths, in write order.
pub const COLOR_NAMES: [char; 3] = ['R', 'G', 'B'];

// ── Sequencer program ──

/// Blink program, one line of hex. `{ramp_up}`, `{on}`, `{ramp_down}` and
/// `{off}` take two hex digits each, `{trigger}` takes three.
pub const PROGRAM_TEMPLATE: &str = "000e0e9d009c0e9c8f9d80{ramp_up}ff9dc0{on}ff9d80{ramp_down}ff9dc0{off}ff9d80a004c00000000{trigger}";

/// Smooth ramp-up code. The low bit is forced to 0 when encoded.
pub const RAMP_UP_SMOOTH: u8 = 2;

/// Smooth ramp-down code. The low bit is forced to 1 when encoded.
pub const RAMP_DOWN_SMOOTH: u8 = 3;

/// Sequencer steps per second of hold time.
pub const SECONDS_PER_STEP: f64 = 13.0;

/// Largest hold length the 6-bit step field can carry.
pub const MAX_STEPS: u8 = 63;

/// Trigger mask pulsing all nine driver outputs.
pub const TRIGGER_ALL: u16 = 511;

/// Trigger mask pulsing zones 2 and 3.
pub const TRIGGER_SIDES: u16 = 438;

/// Trigger mask pulsing zone 1.
pub const TRIGGER_MIDDLE: u16 = 73;

// ── Sequencer control strings ──

/// Mode written to stop a sequencer.
pub const MODE_DISABLED: &str = "disabled";

/// Mode written to (re)start a loaded program.
pub const MODE_RELOAD: &str = "reload";

/// Run command that freezes a sequencer.
pub const RUN_HOLD: &str = "hold";

/// Run command that starts a sequencer.
pub const RUN_RUN: &str = "run";

/// Sequencer that owns the loaded blink program.
pub const PROGRAM_SEQUENCER: u8 = 1;

// ── Drive current ──

/// Default current cap while a notification (or nothing) is shown.
pub const DEFAULT_CURRENT_MAX_NOTIFICATIONS: u8 = 200;

/// Default current cap while the charging indicator is shown.
pub const DEFAULT_CURRENT_MAX_CHARGING: u8 = 32;

/// Fallback error code when the OS reports none (`-EIO`).
pub const FALLBACK_ERROR_CODE: i32 = -5;
