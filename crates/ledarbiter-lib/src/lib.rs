//! ledarbiter — arbitration between notification and charging indicators on a
//! three-zone RGB LED bank with a hardware blink sequencer.

pub mod arbiter;
pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod led;
pub mod protocol;
pub mod request;

pub use arbiter::{Arbiter, ArbiterState, BankPolicy, DedupPolicy, LogicalState, ZoneTarget};
pub use channel::{ChannelId, ChannelWriter, SysfsWriter};
pub use controller::LightController;
pub use error::LightsError;
pub use request::{FlashMode, LightRequest, Requester};
