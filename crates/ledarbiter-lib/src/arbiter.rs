//! Arbitration state machine — decides what the shared LED bank shows.
//!
//! The [`Arbiter`] owns the latest notification and battery requests plus the
//! caches used to skip redundant hardware writes. Each [`Arbiter::apply`]
//! resolves the visible [`LogicalState`], picks the [`ZoneTarget`], computes a
//! [`Diff`] against the retained keys and then drives the zone colors and the
//! blink sequencer. It holds no lock itself; see
//! [`LightController`](crate::controller::LightController).

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::channel::{ChannelWriter, WriteStatus};
use crate::error::Result;
use crate::led::{self, CurrentLimits, Rgb, Sequencer};
use crate::protocol;
use crate::request::{FlashMode, LightRequest, Requester};

/// Which requester is visible on the bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LogicalState {
    #[default]
    Off,
    Notifications,
    Battery,
}

impl LogicalState {
    /// Notification wins whenever it is lit; battery shows only on its own.
    pub fn resolve(notification_lit: bool, battery_lit: bool) -> Self {
        if notification_lit {
            LogicalState::Notifications
        } else if battery_lit {
            LogicalState::Battery
        } else {
            LogicalState::Off
        }
    }
}

impl fmt::Display for LogicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalState::Off => write!(f, "off"),
            LogicalState::Notifications => write!(f, "notifications"),
            LogicalState::Battery => write!(f, "battery"),
        }
    }
}

/// Zones addressed by a pass's color and program writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ZoneTarget {
    /// Nothing applied yet.
    #[default]
    Unknown,
    /// Zones 1, 2 and 3.
    All,
    /// Zones 2 and 3.
    Sides,
    /// Zone 1.
    Middle,
}

impl ZoneTarget {
    pub fn zones(self) -> RangeInclusive<u8> {
        match self {
            ZoneTarget::Unknown | ZoneTarget::All => 1..=protocol::ZONE_COUNT,
            ZoneTarget::Sides => 2..=protocol::ZONE_COUNT,
            ZoneTarget::Middle => 1..=1,
        }
    }
}

impl fmt::Display for ZoneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneTarget::Unknown => write!(f, "unknown"),
            ZoneTarget::All => write!(f, "all"),
            ZoneTarget::Sides => write!(f, "sides"),
            ZoneTarget::Middle => write!(f, "middle"),
        }
    }
}

/// How an unchanged color interacts with the program rewrite decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// An unchanged color forces a program reload (and keeps the current
    /// writes). The RGB cache is left alone when the target changes.
    #[default]
    Source,
    /// Color and program are deduplicated independently; a pass whose diff
    /// is empty issues no writes at all.
    Strict,
}

/// How the two requesters share the bank when both are lit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankPolicy {
    /// The battery keeps zone 1 while a notification shows on zones 2 and 3.
    /// Flashing runs on the blink sequencer.
    #[default]
    Split,
    /// The visible request drives all zones steadily, with the drive current
    /// equal to the brightness. No caching, no sequencer.
    Shared,
}

/// The two ways a lit battery request shares the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryBranch {
    /// Battery was already visible and still shows alone: the pass drives
    /// zone 1 only.
    HoldMiddle,
    /// Entering or staying in a mixed state: zone 1 shows the battery color,
    /// the pass drives zones 2 and 3.
    PreviewSides,
}

/// What changed since the last applied pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diff {
    pub target_changed: bool,
    pub color_changed: bool,
    pub program_changed: bool,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        !(self.target_changed || self.color_changed || self.program_changed)
    }
}

/// Program identity used by [`DedupPolicy::Strict`]: mode plus the delays
/// that matter for it.
type ProgramKey = (FlashMode, u32, u32);

/// Everything the arbiter remembers between passes.
#[derive(Debug, Clone, Default)]
pub struct ArbiterState {
    notification: LightRequest,
    battery: LightRequest,
    state: LogicalState,
    target: ZoneTarget,
    applied_rgb: Option<u32>,
    delays: Option<(u32, u32)>,
    applied_program: Option<ProgramKey>,
    sequencer: Sequencer,
}

impl ArbiterState {
    pub fn notification(&self) -> &LightRequest {
        &self.notification
    }

    pub fn battery(&self) -> &LightRequest {
        &self.battery
    }

    pub fn state(&self) -> LogicalState {
        self.state
    }

    pub fn target(&self) -> ZoneTarget {
        self.target
    }

    /// Last applied `0x00RRGGBB`, if any.
    pub fn applied_rgb(&self) -> Option<u32> {
        self.applied_rgb
    }

    /// Retained `(on_ms, off_ms)` pair, if any.
    pub fn delays(&self) -> Option<(u32, u32)> {
        self.delays
    }

    pub fn program_state(&self) -> led::ProgramState {
        self.sequencer.state()
    }

    /// Forget every dedup key so the next pass rewrites everything.
    fn invalidate(&mut self) {
        self.target = ZoneTarget::Unknown;
        self.applied_rgb = None;
        self.delays = None;
        self.applied_program = None;
    }
}

/// Timing resolved for one pass.
#[derive(Debug, Clone, Copy)]
struct Timing {
    on_ms: u32,
    off_ms: u32,
    /// The acting request asked for `Timed`.
    requested_timed: bool,
    /// Mode actually applied (zero delays disable flashing).
    mode: FlashMode,
}

impl Timing {
    fn delays(&self) -> (u32, u32) {
        (self.on_ms, self.off_ms)
    }

    fn program_key(&self) -> ProgramKey {
        match self.mode {
            FlashMode::Timed => (FlashMode::Timed, self.on_ms, self.off_ms),
            FlashMode::None => (FlashMode::None, 0, 0),
        }
    }
}

/// The arbitration engine.
#[derive(Debug, Clone, Default)]
pub struct Arbiter {
    store: ArbiterState,
    limits: CurrentLimits,
    dedup: DedupPolicy,
    policy: BankPolicy,
}

impl Arbiter {
    pub fn new(limits: CurrentLimits, dedup: DedupPolicy) -> Self {
        Arbiter {
            store: ArbiterState::default(),
            limits,
            dedup,
            policy: BankPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BankPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &ArbiterState {
        &self.store
    }

    /// Replace `which` request and re-arbitrate.
    ///
    /// Every planned write is attempted; failures are logged and folded into
    /// the returned [`LightsError::Write`](crate::LightsError::Write). After
    /// a failed pass all dedup keys are dropped so the next pass rewrites.
    pub fn apply(
        &mut self,
        writer: &impl ChannelWriter,
        which: Requester,
        request: LightRequest,
    ) -> Result<()> {
        match which {
            Requester::Notification => self.store.notification = request,
            Requester::Battery => self.store.battery = request,
        }

        let mut status = WriteStatus::new();
        self.recompute(writer, &mut status);
        if !status.is_ok() {
            self.store.invalidate();
        }
        status.into_result()
    }

    fn recompute(&mut self, writer: &impl ChannelWriter, status: &mut WriteStatus) {
        let previous = self.store.state;
        let notification_lit = self.store.notification.is_lit();
        let battery_lit = self.store.battery.is_lit();
        let resolved = LogicalState::resolve(notification_lit, battery_lit);
        self.store.state = resolved;

        if self.policy == BankPolicy::Shared {
            self.shared_pass(writer, status, previous);
            return;
        }

        if resolved == LogicalState::Off && previous == LogicalState::Off {
            log::debug!("bank already dark, nothing to apply");
            return;
        }

        let acting = if notification_lit {
            self.store.notification
        } else {
            self.store.battery
        };

        let branch = battery_lit.then(|| match (previous, notification_lit) {
            (LogicalState::Battery, false) => BatteryBranch::HoldMiddle,
            _ => BatteryBranch::PreviewSides,
        });
        let target = match branch {
            Some(BatteryBranch::HoldMiddle) => ZoneTarget::Middle,
            Some(BatteryBranch::PreviewSides) => ZoneTarget::Sides,
            None => ZoneTarget::All,
        };

        let timing = self.timing_for(&acting);
        let diff = self.diff(target, acting.rgb24(), &timing);
        log::debug!(
            "arbitrate: {previous} -> {resolved}, target {target}, {branch:?}, {diff:?}, delays {}/{}",
            timing.on_ms,
            timing.off_ms
        );

        if self.dedup == DedupPolicy::Strict && diff.is_empty() {
            log::debug!("no dedup key changed, skipping writes");
            return;
        }

        match branch {
            Some(BatteryBranch::HoldMiddle) => self.battery_hold_middle(writer, status),
            Some(BatteryBranch::PreviewSides) => self.battery_preview_sides(writer, status),
            None => {}
        }

        self.commit(&diff, target, acting.rgb24(), &timing);

        let max_current = self.limits.for_state(resolved);
        let rgb = acting.rgb();
        for zone in target.zones() {
            led::apply_zone_color(writer, status, zone, rgb, diff.color_changed, max_current);
        }

        self.store.sequencer.apply_program(
            writer,
            status,
            target,
            timing.mode,
            timing.on_ms,
            timing.off_ms,
            diff.program_changed,
        );
    }

    /// Battery already visible on its own: darken the sides explicitly and
    /// hold their program.
    fn battery_hold_middle(&mut self, writer: &impl ChannelWriter, status: &mut WriteStatus) {
        let max_current = self.limits.for_state(LogicalState::Battery);
        for zone in ZoneTarget::Sides.zones() {
            led::apply_zone_color(writer, status, zone, Rgb::OFF, true, max_current);
        }
        self.store.sequencer.apply_program(
            writer,
            status,
            ZoneTarget::Middle,
            FlashMode::None,
            0,
            0,
            false,
        );
    }

    /// Mixed state: show the battery color on zone 1, capped
    /// as if the battery state were visible, without changing the stored
    /// state.
    fn battery_preview_sides(&mut self, writer: &impl ChannelWriter, status: &mut WriteStatus) {
        let max_current = self.limits.for_state(LogicalState::Battery);
        led::apply_zone_color(writer, status, 1, self.store.battery.rgb(), true, max_current);
    }

    /// Shared-bank pass: the visible request, or darkness, on every zone.
    /// Every pass writes; nothing is deduplicated.
    fn shared_pass(
        &mut self,
        writer: &impl ChannelWriter,
        status: &mut WriteStatus,
        previous: LogicalState,
    ) {
        let acting = if self.store.notification.is_lit() {
            self.store.notification
        } else {
            self.store.battery
        };
        log::debug!(
            "shared bank: {previous} -> {}, color {:06x}",
            self.store.state,
            acting.rgb24()
        );
        let rgb = acting.rgb();
        for zone in ZoneTarget::All.zones() {
            led::apply_zone_color(writer, status, zone, rgb, true, u8::MAX);
        }
        self.store.target = ZoneTarget::All;
        self.store.applied_rgb = Some(acting.rgb24());
    }

    fn timing_for(&self, acting: &LightRequest) -> Timing {
        let requested_timed = acting.flash_mode == FlashMode::Timed;
        let (on_ms, off_ms) = if requested_timed {
            (acting.flash_on_ms, acting.flash_off_ms)
        } else {
            self.store
                .delays
                .unwrap_or((acting.flash_on_ms, acting.flash_off_ms))
        };
        let mode = if on_ms == 0 || off_ms == 0 {
            FlashMode::None
        } else {
            acting.flash_mode
        };
        Timing {
            on_ms,
            off_ms,
            requested_timed,
            mode,
        }
    }

    /// Compare this pass against the retained keys. Pure.
    fn diff(&self, target: ZoneTarget, rgb: u32, timing: &Timing) -> Diff {
        let target_changed = self.store.target != target;
        let rgb_unchanged = self.store.applied_rgb == Some(rgb);

        match self.dedup {
            DedupPolicy::Source => {
                let delays_changed = self.store.delays != Some(timing.delays());
                if target_changed {
                    Diff {
                        target_changed,
                        color_changed: true,
                        program_changed: true,
                    }
                } else if rgb_unchanged {
                    // An unchanged color reloads the program. Kept as found
                    // in the field; see DESIGN.md.
                    Diff {
                        target_changed,
                        color_changed: false,
                        program_changed: true,
                    }
                } else {
                    Diff {
                        target_changed,
                        color_changed: true,
                        program_changed: delays_changed,
                    }
                }
            }
            DedupPolicy::Strict => Diff {
                target_changed,
                color_changed: target_changed || !rgb_unchanged,
                program_changed: target_changed
                    || self.store.applied_program != Some(timing.program_key()),
            },
        }
    }

    /// Update the retained keys after a diff has been taken.
    fn commit(&mut self, diff: &Diff, target: ZoneTarget, rgb: u32, timing: &Timing) {
        if timing.requested_timed && self.store.delays != Some(timing.delays()) {
            self.store.delays = Some(timing.delays());
        }
        if diff.target_changed {
            self.store.target = target;
        }
        let refresh_rgb = match self.dedup {
            DedupPolicy::Source => diff.color_changed && !diff.target_changed,
            DedupPolicy::Strict => diff.color_changed,
        };
        if refresh_rgb {
            self.store.applied_rgb = Some(rgb);
        }
        self.store.applied_program = Some(timing.program_key());
    }
}
