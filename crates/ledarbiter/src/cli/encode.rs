//! `encode` subcommand — print the blink program for a target and hold times.

use super::{EncodeOutput, ZoneTarget, kv, kv_width, led, print_json};

pub(super) fn cmd_encode(target: ZoneTarget, on_ms: u32, off_ms: u32, json: bool) {
    let program = led::encode_program(target, on_ms, off_ms);
    let on_steps = led::quantize(on_ms);
    let off_steps = led::quantize(off_ms);

    if json {
        print_json(&EncodeOutput {
            target: target.to_string(),
            on_steps,
            off_steps,
            program,
        });
        return;
    }

    let w = kv_width(&["Target:", "On:", "Off:", "Program:"], &[]);
    kv("Target:", target, w);
    kv("On:", format_args!("{on_ms} ms ({on_steps} steps)"), w);
    kv("Off:", format_args!("{off_ms} ms ({off_steps} steps)"), w);
    kv("Program:", program, w);
}
