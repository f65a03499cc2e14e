//! Light controller — the single locked authority over the LED bank.
//!
//! Both requesters funnel into one [`LightController`]. The mutex covers the
//! arbiter's state *and* the writer, so one pass's state update and all of
//! its channel writes are serialized against every other caller. Writes are
//! blocking; a slow channel stalls every requester behind the lock.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::arbiter::{Arbiter, ArbiterState, DedupPolicy};
use crate::channel::ChannelWriter;
use crate::config::Config;
use crate::error::Result;
use crate::led::CurrentLimits;
use crate::request::{LightRequest, Requester};

struct Inner<W> {
    arbiter: Arbiter,
    writer: W,
}

/// Shared entry point for the notification and battery requesters.
pub struct LightController<W: ChannelWriter> {
    inner: Mutex<Inner<W>>,
}

impl<W: ChannelWriter> LightController<W> {
    pub fn new(writer: W, limits: CurrentLimits, dedup: DedupPolicy) -> Self {
        Self::with_arbiter(writer, Arbiter::new(limits, dedup))
    }

    /// Build with the current caps, dedup and bank policies from `config`.
    pub fn from_config(writer: W, config: &Config) -> Self {
        let arbiter =
            Arbiter::new(config.current_limits(), config.dedup).with_policy(config.policy);
        Self::with_arbiter(writer, arbiter)
    }

    fn with_arbiter(writer: W, arbiter: Arbiter) -> Self {
        LightController {
            inner: Mutex::new(Inner { arbiter, writer }),
        }
    }

    pub fn set_notification_request(&self, request: LightRequest) -> Result<()> {
        self.set_request(Requester::Notification, request)
    }

    pub fn set_battery_request(&self, request: LightRequest) -> Result<()> {
        self.set_request(Requester::Battery, request)
    }

    /// Store `request` for `which` and re-arbitrate under the lock.
    pub fn set_request(&self, which: Requester, request: LightRequest) -> Result<()> {
        let mut guard = self.lock();
        let Inner { arbiter, writer } = &mut *guard;
        arbiter.apply(&*writer, which, request)
    }

    /// Copy of the arbiter's current state.
    pub fn snapshot(&self) -> ArbiterState {
        self.lock().arbiter.store().clone()
    }

    /// The arbiter's state is plain data that stays consistent between
    /// writes, so a panic in another holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, Inner<W>> {
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::warn!("light controller lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::{LogicalState, ZoneTarget};
    use crate::channel::{ChannelId, Color, RecordingWriter, Written};
    use std::sync::Arc;

    fn controller(writer: Arc<RecordingWriter>) -> LightController<Arc<RecordingWriter>> {
        LightController::new(writer, CurrentLimits::default(), DedupPolicy::Source)
    }

    #[test]
    fn notification_then_battery() {
        let w = Arc::new(RecordingWriter::new());
        let ctl = controller(Arc::clone(&w));
        ctl.set_notification_request(LightRequest::solid(0x00FF_0000))
            .unwrap();
        ctl.set_battery_request(LightRequest::solid(0x0000_FF00))
            .unwrap();

        let snap = ctl.snapshot();
        assert_eq!(snap.state(), LogicalState::Notifications);
        assert_eq!(snap.target(), ZoneTarget::Sides);
        assert_eq!(snap.battery().color, 0x0000_FF00);
        assert_eq!(
            w.last(ChannelId::Brightness {
                zone: 1,
                color: Color::Green
            }),
            Some(Written::Value(255))
        );
    }

    #[test]
    fn from_config_uses_caps() {
        let w = Arc::new(RecordingWriter::new());
        let config = Config {
            current_max_notifications: 77,
            ..Config::default()
        };
        let ctl = LightController::from_config(Arc::clone(&w), &config);
        ctl.set_notification_request(LightRequest::solid(0x00FF_FFFF))
            .unwrap();
        assert_eq!(
            w.last(ChannelId::Current {
                zone: 2,
                color: Color::Blue
            }),
            Some(Written::Value(77))
        );
    }

    #[test]
    fn from_config_uses_bank_policy() {
        let w = Arc::new(RecordingWriter::new());
        let config = Config {
            policy: crate::arbiter::BankPolicy::Shared,
            ..Config::default()
        };
        let ctl = LightController::from_config(Arc::clone(&w), &config);
        ctl.set_battery_request(LightRequest::solid(0x0000_FF00))
            .unwrap();
        ctl.set_notification_request(LightRequest::solid(0x00FF_0000))
            .unwrap();
        assert_eq!(ctl.snapshot().target(), ZoneTarget::All);
        assert_eq!(
            w.last(ChannelId::Brightness {
                zone: 1,
                color: Color::Red
            }),
            Some(Written::Value(255))
        );
    }

    #[test]
    fn error_is_returned_to_caller() {
        let w = Arc::new(RecordingWriter::new());
        w.fail_channel(ChannelId::ProgramRun { sequencer: 1 }, -13);
        let ctl = controller(Arc::clone(&w));
        let err = ctl
            .set_notification_request(LightRequest::solid(0x00FF_0000))
            .unwrap_err();
        assert!(matches!(err, crate::LightsError::Write { code: -13, .. }));
    }

    #[test]
    fn concurrent_requesters_are_serialized() {
        let w = Arc::new(RecordingWriter::new());
        let ctl = Arc::new(controller(Arc::clone(&w)));

        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let ctl = Arc::clone(&ctl);
                std::thread::spawn(move || {
                    let req = LightRequest::timed(0x0000_0100 * (i + 1), 500, 500);
                    if i % 2 == 0 {
                        ctl.set_notification_request(req)
                    } else {
                        ctl.set_battery_request(req)
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }

        // every pass writes zone brightness in whole R/G/B triples
        let writes = w.writes();
        let brightness: Vec<_> = writes
            .iter()
            .filter_map(|(c, _)| match c {
                ChannelId::Brightness { zone, color } => Some((*zone, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(brightness.len() % 3, 0);
        for triple in brightness.chunks(3) {
            assert_eq!(triple[0].1, Color::Red);
            assert_eq!(triple[1], (triple[0].0, Color::Green));
            assert_eq!(triple[2], (triple[0].0, Color::Blue));
        }
        assert_eq!(ctl.snapshot().state(), LogicalState::Notifications);
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let w = Arc::new(RecordingWriter::new());
        let ctl = Arc::new(controller(Arc::clone(&w)));
        let poisoner = Arc::clone(&ctl);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("poison the lock");
        })
        .join();

        ctl.set_notification_request(LightRequest::solid(0x00FF_0000))
            .unwrap();
        assert_eq!(ctl.snapshot().state(), LogicalState::Notifications);
    }
}
