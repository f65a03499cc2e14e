//! Channel writing — trait + sysfs backend + in-memory recorder.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::config::Config;
use crate::protocol;

// ── Channel identifiers ──

/// Color sub-channel of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Color {
    Red,
    Green,
    Blue,
}

impl Color {
    /// All colors in write order.
    pub const ALL: [Color; 3] = [Color::Red, Color::Green, Color::Blue];

    /// Letter used in control paths (`R`, `G`, `B`).
    pub fn letter(self) -> char {
        protocol::COLOR_NAMES[self as usize]
    }
}

/// One logical control channel of the LED bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChannelId {
    /// Brightness of one color of one zone (1-based zone).
    Brightness { zone: u8, color: Color },
    /// Drive current of one color of one zone.
    Current { zone: u8, color: Color },
    /// Program memory of the blink sequencer.
    ProgramLoad,
    /// Mode switch of one sequencer (1-based).
    ProgramMode { sequencer: u8 },
    /// Run/hold switch of one sequencer (1-based).
    ProgramRun { sequencer: u8 },
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Brightness { zone, color } => {
                write!(f, "LED{zone}_{}/brightness", color.letter())
            }
            ChannelId::Current { zone, color } => {
                write!(f, "LED{zone}_{}/current", color.letter())
            }
            ChannelId::ProgramLoad => write!(f, "sequencer/load"),
            ChannelId::ProgramMode { sequencer } => write!(f, "sequencer{sequencer}/mode"),
            ChannelId::ProgramRun { sequencer } => write!(f, "sequencer{sequencer}/run"),
        }
    }
}

// ── Error type ──

/// A single failed channel write.
///
/// `code` is the negated OS error number, so several failures can be folded
/// into one status with bitwise OR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteError {
    pub channel: ChannelId,
    pub code: i32,
}

impl WriteError {
    /// Build from an I/O error, falling back to `-EIO` when no OS code exists.
    pub fn from_io(channel: ChannelId, e: &std::io::Error) -> Self {
        WriteError {
            channel,
            code: e
                .raw_os_error()
                .map(|n| -n)
                .unwrap_or(protocol::FALLBACK_ERROR_CODE),
        }
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "write to {} failed (code {})", self.channel, self.code)
    }
}

impl std::error::Error for WriteError {}

pub type Result<T> = std::result::Result<T, WriteError>;

// ── Best-effort status ──

/// Failures collected over a series of best-effort writes.
///
/// A failed write is logged and remembered; the caller keeps going.
#[derive(Debug, Default)]
pub struct WriteStatus {
    failures: Vec<WriteError>,
}

impl WriteStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one write.
    pub fn record(&mut self, result: Result<()>) {
        if let Err(e) = result {
            log::warn!("{e}");
            self.failures.push(e);
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[WriteError] {
        &self.failures
    }

    /// Bitwise OR of all failure codes; 0 when everything succeeded.
    pub fn code(&self) -> i32 {
        self.failures.iter().fold(0, |acc, e| acc | e.code)
    }

    pub fn into_result(self) -> crate::error::Result<()> {
        match crate::error::LightsError::from_failures(&self.failures) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ── Trait ──

/// Blocking writer for the bank's control channels.
///
/// Each call performs exactly one formatted write (`"{value}\n"`).
pub trait ChannelWriter {
    fn write_value(&self, channel: ChannelId, value: i32) -> Result<()>;
    fn write_text(&self, channel: ChannelId, text: &str) -> Result<()>;
}

impl<W: ChannelWriter + ?Sized> ChannelWriter for &W {
    fn write_value(&self, channel: ChannelId, value: i32) -> Result<()> {
        (**self).write_value(channel, value)
    }

    fn write_text(&self, channel: ChannelId, text: &str) -> Result<()> {
        (**self).write_text(channel, text)
    }
}

impl<W: ChannelWriter + ?Sized> ChannelWriter for Arc<W> {
    fn write_value(&self, channel: ChannelId, value: i32) -> Result<()> {
        (**self).write_value(channel, value)
    }

    fn write_text(&self, channel: ChannelId, text: &str) -> Result<()> {
        (**self).write_text(channel, text)
    }
}

// ── Sysfs backend ──

/// Writes channels as files (typically under `/sys/class/leds`).
///
/// Paths are resolved from the templates in [`Config`].
#[derive(Debug, Clone)]
pub struct SysfsWriter {
    brightness_path: String,
    current_path: String,
    sequencer_load_path: String,
    sequencer_mode_path: String,
    sequencer_run_path: String,
}

impl SysfsWriter {
    pub fn from_config(config: &Config) -> Self {
        SysfsWriter {
            brightness_path: config.brightness_path.clone(),
            current_path: config.current_path.clone(),
            sequencer_load_path: config.sequencer_load_path.clone(),
            sequencer_mode_path: config.sequencer_mode_path.clone(),
            sequencer_run_path: config.sequencer_run_path.clone(),
        }
    }

    /// Resolve the file backing a channel.
    pub fn path_for(&self, channel: ChannelId) -> PathBuf {
        let zone_path = |template: &str, zone: u8, color: Color| {
            template
                .replace("{zone}", &zone.to_string())
                .replace("{color}", &color.letter().to_string())
        };
        let seq_path =
            |template: &str, sequencer: u8| template.replace("{sequencer}", &sequencer.to_string());

        PathBuf::from(match channel {
            ChannelId::Brightness { zone, color } => zone_path(&self.brightness_path, zone, color),
            ChannelId::Current { zone, color } => zone_path(&self.current_path, zone, color),
            ChannelId::ProgramLoad => self.sequencer_load_path.clone(),
            ChannelId::ProgramMode { sequencer } => seq_path(&self.sequencer_mode_path, sequencer),
            ChannelId::ProgramRun { sequencer } => seq_path(&self.sequencer_run_path, sequencer),
        })
    }

    fn write_line(&self, channel: ChannelId, line: &str) -> Result<()> {
        let path = self.path_for(channel);
        log::trace!("{channel} <- {line}");
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| {
                log::error!("failed to open {}: {e}", path.display());
                WriteError::from_io(channel, &e)
            })?;
        file.write_all(format!("{line}\n").as_bytes())
            .map_err(|e| WriteError::from_io(channel, &e))
    }
}

impl ChannelWriter for SysfsWriter {
    fn write_value(&self, channel: ChannelId, value: i32) -> Result<()> {
        self.write_line(channel, &value.to_string())
    }

    fn write_text(&self, channel: ChannelId, text: &str) -> Result<()> {
        self.write_line(channel, text)
    }
}

// ── In-memory recorder ──

/// A recorded write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Written {
    Value(i32),
    Text(String),
}

impl fmt::Display for Written {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Written::Value(v) => write!(f, "{v}"),
            Written::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Records writes in memory instead of touching hardware.
///
/// Used for dry runs and tests. Failures can be injected per channel; a
/// failed write is not recorded.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    writes: Mutex<Vec<(ChannelId, Written)>>,
    failing: Mutex<Vec<(ChannelId, i32)>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `channel` fail with `code`.
    pub fn fail_channel(&self, channel: ChannelId, code: i32) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.push((channel, code));
        }
    }

    /// Snapshot of all successful writes, oldest first.
    pub fn writes(&self) -> Vec<(ChannelId, Written)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Drain the recorded writes.
    pub fn take(&self) -> Vec<(ChannelId, Written)> {
        self.writes
            .lock()
            .map(|mut w| std::mem::take(&mut *w))
            .unwrap_or_default()
    }

    /// Last value written to `channel`, if any.
    pub fn last(&self, channel: ChannelId) -> Option<Written> {
        self.writes()
            .into_iter()
            .rev()
            .find(|(c, _)| *c == channel)
            .map(|(_, w)| w)
    }

    fn record(&self, channel: ChannelId, written: Written) -> Result<()> {
        let injected = self
            .failing
            .lock()
            .ok()
            .and_then(|f| f.iter().find(|(c, _)| *c == channel).map(|(_, code)| *code));
        if let Some(code) = injected {
            return Err(WriteError { channel, code });
        }
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((channel, written));
        }
        Ok(())
    }
}

impl ChannelWriter for RecordingWriter {
    fn write_value(&self, channel: ChannelId, value: i32) -> Result<()> {
        self.record(channel, Written::Value(value))
    }

    fn write_text(&self, channel: ChannelId, text: &str) -> Result<()> {
        self.record(channel, Written::Text(text.to_string()))
    }
}
