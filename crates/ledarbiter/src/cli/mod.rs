//! CLI subcommands — light requests, script replay, program encoding, config.

mod config_cmd;
mod encode;
mod replay;
mod request;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Subcommand, ValueEnum};
use serde::Serialize;

pub(super) use ledarbiter_lib::channel::{ChannelWriter, RecordingWriter, SysfsWriter};
pub(super) use ledarbiter_lib::config::Config;
pub(super) use ledarbiter_lib::error::Result;
pub(super) use ledarbiter_lib::led;
pub(super) use ledarbiter_lib::{LightController, LightRequest, LightsError, Requester, ZoneTarget};

const PADDING: usize = 2;

/// Options shared by every subcommand.
pub struct Options {
    pub json: bool,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
}

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// Print `value` as pretty JSON on stdout.
pub(super) fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("serializing output: {e}"),
    }
}

/// Load the config from `custom_path` if given, else the platform default.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    match custom_path {
        Some(path) => {
            let (config, warnings) = Config::load_from(path);
            for w in &warnings {
                log::warn!("{w}");
            }
            config
        }
        None => Config::load(),
    }
}

/// Load and validate the config; invalid configs are refused before any write.
pub(super) fn load_valid_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = load_config(custom_path);
    if let Err(errors) = config.validate() {
        let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(LightsError::Config(joined.join("; ")));
    }
    Ok(config)
}

/// A controller plus, for dry runs, the recorder standing in for sysfs.
pub(super) struct Session {
    pub controller: LightController<Arc<dyn ChannelWriter>>,
    recorder: Option<Arc<RecordingWriter>>,
}

impl Session {
    pub fn open(config: &Config, dry_run: bool) -> Self {
        let recorder = dry_run.then(|| Arc::new(RecordingWriter::new()));
        let writer: Arc<dyn ChannelWriter> = match &recorder {
            Some(r) => r.clone(),
            None => Arc::new(SysfsWriter::from_config(config)),
        };
        Session {
            controller: LightController::from_config(writer, config),
            recorder,
        }
    }

    /// Writes recorded since the last call; `None` outside dry runs.
    pub fn take_writes(&self) -> Option<Vec<WriteJson>> {
        self.recorder.as_ref().map(|r| {
            r.take()
                .into_iter()
                .map(|(channel, value)| WriteJson {
                    channel: channel.to_string(),
                    value: value.to_string(),
                })
                .collect()
        })
    }
}

/// Build a request from CLI-style arguments. Both delays or neither.
pub(super) fn build_request(
    color: &str,
    on_ms: Option<u32>,
    off_ms: Option<u32>,
) -> Result<LightRequest> {
    let color = led::parse_color(color)?;
    match (on_ms, off_ms) {
        (Some(on), Some(off)) => Ok(LightRequest::timed(color, on, off)),
        (None, None) => Ok(LightRequest::solid(color)),
        _ => Err(LightsError::Request(
            "on and off times must be given together".into(),
        )),
    }
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct WriteJson {
    pub channel: String,
    pub value: String,
}

#[derive(Serialize)]
pub(super) struct StepOutput {
    pub requester: String,
    pub color: String,
    pub flash: String,
    pub state: String,
    pub target: String,
    pub program: String,
    pub writes: Option<Vec<WriteJson>>,
}

impl StepOutput {
    /// Capture the controller's state after a request from `which`.
    pub fn capture(session: &Session, which: Requester, request: &LightRequest) -> Self {
        let snap = session.controller.snapshot();
        let flash = if request.flash_mode == ledarbiter_lib::FlashMode::Timed {
            format!("{}/{} ms", request.flash_on_ms, request.flash_off_ms)
        } else {
            "none".to_string()
        };
        StepOutput {
            requester: which.to_string(),
            color: led::format_color(request.color),
            flash,
            state: snap.state().to_string(),
            target: snap.target().to_string(),
            program: format!("{:?}", snap.program_state()).to_lowercase(),
            writes: session.take_writes(),
        }
    }

    pub fn print(&self) {
        let w = kv_width(
            &["Requester:", "Color:", "Flash:", "State:", "Target:", "Program:"],
            &[],
        );
        kv("Requester:", &self.requester, w);
        kv("Color:", &self.color, w);
        kv("Flash:", &self.flash, w);
        kv("State:", &self.state, w);
        kv("Target:", &self.target, w);
        kv("Program:", &self.program, w);
        if let Some(writes) = &self.writes {
            println!("Writes:");
            for write in writes {
                println!("  {:<24}{}", write.channel, write.value);
            }
        }
    }
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
    pub problems: Vec<String>,
}

#[derive(Serialize)]
pub(super) struct EncodeOutput {
    pub target: String,
    pub on_steps: u8,
    pub off_steps: u8,
    pub program: String,
}

/// Zone target accepted by `encode`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TargetArg {
    All,
    Sides,
    Middle,
}

impl From<TargetArg> for ZoneTarget {
    fn from(t: TargetArg) -> Self {
        match t {
            TargetArg::All => ZoneTarget::All,
            TargetArg::Sides => ZoneTarget::Sides,
            TargetArg::Middle => ZoneTarget::Middle,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Submit a notification light request
    Notify {
        /// Color as #RRGGBB or a name (red, green, off, ...)
        color: String,
        /// Flash on time in milliseconds
        #[arg(long, requires = "off")]
        on: Option<u32>,
        /// Flash off time in milliseconds
        #[arg(long, requires = "on")]
        off: Option<u32>,
    },

    /// Submit a charging light request
    Battery {
        /// Color as #RRGGBB or a name (red, green, off, ...)
        color: String,
        /// Flash on time in milliseconds
        #[arg(long, requires = "off")]
        on: Option<u32>,
        /// Flash off time in milliseconds
        #[arg(long, requires = "on")]
        off: Option<u32>,
    },

    /// Apply a TOML script of requests in order through one controller
    Replay {
        /// Path to the script (a list of [[step]] tables)
        file: PathBuf,
    },

    /// Print the blink program for a target and hold times (no hardware required)
    Encode {
        /// Zones the program pulses
        #[arg(long, value_enum, default_value_t = TargetArg::All)]
        target: TargetArg,
        /// On time in milliseconds
        #[arg(long)]
        on: u32,
        /// Off time in milliseconds
        #[arg(long)]
        off: u32,
    },

    /// Show current configuration and its path
    Config,
}

pub fn run(cmd: Command, opts: &Options) -> Result<()> {
    let config_path = opts.config.as_deref();
    match cmd {
        Command::Notify { color, on, off } => request::cmd_request(
            Requester::Notification,
            &color,
            on,
            off,
            config_path,
            opts,
        ),
        Command::Battery { color, on, off } => {
            request::cmd_request(Requester::Battery, &color, on, off, config_path, opts)
        }
        Command::Replay { file } => replay::cmd_replay(&file, config_path, opts),
        Command::Encode { target, on, off } => {
            encode::cmd_encode(target.into(), on, off, opts.json);
            Ok(())
        }
        Command::Config => config_cmd::cmd_config(opts.json, config_path),
    }
}
