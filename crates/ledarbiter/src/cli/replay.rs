//! `replay` subcommand — apply a script of requests through one controller.
//!
//! Script format (TOML):
//!
//! ```toml
//! [[step]]
//! requester = "battery"
//! color = "green"
//!
//! [[step]]
//! requester = "notification"
//! color = "#FF0000"
//! on_ms = 500
//! off_ms = 500
//!
//! [[step]]
//! requester = "notification"
//! color = "blue"
//! flash = 2          # raw host flash code; only 1 blinks
//! on_ms = 300
//! off_ms = 700
//! ```

use std::path::Path;

use ledarbiter_lib::FlashMode;
use serde::{Deserialize, Serialize};

use super::{
    LightRequest, LightsError, Options, Requester, Result, Session, StepOutput, build_request,
    led, print_json,
};

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default, rename = "step")]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    requester: Requester,
    color: String,
    /// Raw host flash code. When set, the delays are passed through as given.
    flash: Option<i32>,
    on_ms: Option<u32>,
    off_ms: Option<u32>,
}

impl Step {
    fn request(&self) -> Result<LightRequest> {
        let Some(code) = self.flash else {
            return build_request(&self.color, self.on_ms, self.off_ms);
        };
        Ok(LightRequest {
            color: led::parse_color(&self.color)?,
            flash_mode: FlashMode::from_raw(code),
            flash_on_ms: self.on_ms.unwrap_or(0),
            flash_off_ms: self.off_ms.unwrap_or(0),
        })
    }
}

#[derive(Serialize)]
struct ReplayOutput {
    steps: Vec<StepOutput>,
    failed_steps: Vec<usize>,
}

fn parse_script(contents: &str) -> Result<Script> {
    toml::from_str(contents).map_err(|e| LightsError::Request(format!("invalid script: {e}")))
}

pub(super) fn cmd_replay(file: &Path, config_path: Option<&Path>, opts: &Options) -> Result<()> {
    let contents = std::fs::read_to_string(file)?;
    let script = parse_script(&contents)?;

    // Reject the whole script before touching the bank
    let requests = script
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            step.request()
                .map(|r| (step.requester, r))
                .map_err(|e| LightsError::Request(format!("step {}: {e}", i + 1)))
        })
        .collect::<Result<Vec<_>>>()?;

    let config = super::load_valid_config(config_path)?;
    let session = Session::open(&config, opts.dry_run);

    let mut steps = Vec::with_capacity(requests.len());
    let mut failed_steps = Vec::new();
    let mut first_error = None;
    for (i, (which, request)) in requests.into_iter().enumerate() {
        let n = i + 1;
        if let Err(e) = session.controller.set_request(which, request) {
            log::error!("step {n}: {e}");
            failed_steps.push(n);
            first_error.get_or_insert(e);
        }
        let output = StepOutput::capture(&session, which, &request);
        if !opts.json {
            if n > 1 {
                println!();
            }
            println!("Step {n}:");
            output.print();
        }
        steps.push(output);
    }

    if opts.json {
        print_json(&ReplayOutput {
            steps,
            failed_steps,
        });
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
