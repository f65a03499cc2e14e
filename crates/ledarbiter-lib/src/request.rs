//! Light requests as submitted by the notification and battery requesters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::led::Rgb;

/// Which requester a [`LightRequest`] comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requester {
    Notification,
    Battery,
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requester::Notification => write!(f, "notification"),
            Requester::Battery => write!(f, "battery"),
        }
    }
}

/// Flash behavior of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    /// Steady light (or off).
    #[default]
    None,
    /// Blink with the request's on/off timings.
    Timed,
}

impl FlashMode {
    /// Map a host framework flash code. Only `1` means timed; any other code
    /// (including hardware-assisted modes) degrades to steady.
    pub fn from_raw(code: i32) -> Self {
        match code {
            1 => FlashMode::Timed,
            _ => FlashMode::None,
        }
    }
}

/// One requester's desired light.
///
/// `color` is packed `0xAARRGGBB`; the high byte is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightRequest {
    pub color: u32,
    #[serde(default)]
    pub flash_mode: FlashMode,
    #[serde(default)]
    pub flash_on_ms: u32,
    #[serde(default)]
    pub flash_off_ms: u32,
}

impl LightRequest {
    /// A steady request.
    pub fn solid(color: u32) -> Self {
        LightRequest {
            color,
            ..Default::default()
        }
    }

    /// A blinking request.
    pub fn timed(color: u32, on_ms: u32, off_ms: u32) -> Self {
        LightRequest {
            color,
            flash_mode: FlashMode::Timed,
            flash_on_ms: on_ms,
            flash_off_ms: off_ms,
        }
    }

    /// Lit means any of the low 24 color bits is set, whatever the flash mode.
    pub fn is_lit(&self) -> bool {
        self.rgb24() != 0
    }

    /// The color with the reserved high byte stripped.
    pub fn rgb24(&self) -> u32 {
        self.color & 0x00FF_FFFF
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::from_packed(self.color)
    }
}
