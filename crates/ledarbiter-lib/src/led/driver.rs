//! Per-zone color writes — brightness plus capped drive current.

use serde::{Deserialize, Serialize};

use crate::arbiter::LogicalState;
use crate::channel::{ChannelId, ChannelWriter, Color, WriteStatus};
use crate::protocol;

use super::color::Rgb;

/// Drive current caps per visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentLimits {
    pub notifications: u8,
    pub charging: u8,
}

impl Default for CurrentLimits {
    fn default() -> Self {
        CurrentLimits {
            notifications: protocol::DEFAULT_CURRENT_MAX_NOTIFICATIONS,
            charging: protocol::DEFAULT_CURRENT_MAX_CHARGING,
        }
    }
}

impl CurrentLimits {
    /// The charging cap applies only while the battery state is visible.
    pub fn for_state(&self, state: LogicalState) -> u8 {
        match state {
            LogicalState::Battery => self.charging,
            LogicalState::Off | LogicalState::Notifications => self.notifications,
        }
    }
}

/// Write one zone's color.
///
/// Brightness is written for every channel; the current (`min(level, max_current)`)
/// only when `update_current` is set. Writes run R, G, B with brightness
/// before current per channel, and a failure never skips the rest.
pub fn apply_zone_color(
    writer: &impl ChannelWriter,
    status: &mut WriteStatus,
    zone: u8,
    rgb: Rgb,
    update_current: bool,
    max_current: u8,
) {
    for (color, level) in Color::ALL.into_iter().zip(rgb.channels()) {
        status.record(writer.write_value(ChannelId::Brightness { zone, color }, i32::from(level)));
        if update_current {
            status.record(writer.write_value(
                ChannelId::Current { zone, color },
                i32::from(level.min(max_current)),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{RecordingWriter, Written};

    #[test]
    fn limits_follow_state() {
        let limits = CurrentLimits {
            notifications: 100,
            charging: 10,
        };
        assert_eq!(limits.for_state(LogicalState::Battery), 10);
        assert_eq!(limits.for_state(LogicalState::Notifications), 100);
        assert_eq!(limits.for_state(LogicalState::Off), 100);
    }

    #[test]
    fn default_charging_cap_is_lower() {
        let limits = CurrentLimits::default();
        assert!(limits.charging < limits.notifications);
    }

    #[test]
    fn writes_brightness_and_capped_current() {
        let w = RecordingWriter::new();
        let mut status = WriteStatus::new();
        apply_zone_color(&w, &mut status, 2, Rgb::new(255, 20, 0), true, 50);
        assert!(status.is_ok());

        let writes = w.writes();
        assert_eq!(writes.len(), 6);
        assert_eq!(
            writes[0],
            (
                ChannelId::Brightness {
                    zone: 2,
                    color: Color::Red
                },
                Written::Value(255)
            )
        );
        assert_eq!(
            writes[1],
            (
                ChannelId::Current {
                    zone: 2,
                    color: Color::Red
                },
                Written::Value(50)
            )
        );
        // below the cap the level passes through
        assert_eq!(
            writes[3],
            (
                ChannelId::Current {
                    zone: 2,
                    color: Color::Green
                },
                Written::Value(20)
            )
        );
    }

    #[test]
    fn keep_current_writes_brightness_only() {
        let w = RecordingWriter::new();
        let mut status = WriteStatus::new();
        apply_zone_color(&w, &mut status, 1, Rgb::new(1, 2, 3), false, 50);
        let writes = w.writes();
        assert_eq!(writes.len(), 3);
        assert!(
            writes
                .iter()
                .all(|(c, _)| matches!(c, ChannelId::Brightness { zone: 1, .. }))
        );
    }

    #[test]
    fn failure_does_not_stop_remaining_writes() {
        let w = RecordingWriter::new();
        w.fail_channel(
            ChannelId::Brightness {
                zone: 3,
                color: Color::Red,
            },
            -5,
        );
        let mut status = WriteStatus::new();
        apply_zone_color(&w, &mut status, 3, Rgb::new(9, 9, 9), true, 200);
        assert_eq!(status.failures().len(), 1);
        assert_eq!(status.code(), -5);
        assert_eq!(w.writes().len(), 5);
    }
}
