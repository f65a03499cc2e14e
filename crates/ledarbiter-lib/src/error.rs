//! Unified error type for the ledarbiter-lib crate.
//!
//! [`LightsError`] carries the aggregate outcome of one arbitration pass
//! (`Write`) plus the configuration, color and request errors raised around
//! it. `From` impls allow `?` to propagate across module boundaries.

use std::fmt;

use crate::channel::{ChannelId, WriteError};

/// Unified error type for ledarbiter-lib operations.
#[derive(Debug)]
pub enum LightsError {
    /// One or more channel writes failed during a pass.
    ///
    /// `code` is the bitwise OR of every failed write's (negative) code;
    /// `failed` lists the channels in the order they failed.
    Write { code: i32, failed: Vec<ChannelId> },
    /// Standard I/O error (config persistence, script files).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Color parsing error.
    Color(String),
    /// Malformed light request (e.g. from a replay script).
    Request(String),
}

impl LightsError {
    /// Fold a list of write failures into one error, or `None` if empty.
    pub fn from_failures(failures: &[WriteError]) -> Option<Self> {
        if failures.is_empty() {
            return None;
        }
        Some(LightsError::Write {
            code: failures.iter().fold(0, |acc, e| acc | e.code),
            failed: failures.iter().map(|e| e.channel).collect(),
        })
    }
}

impl fmt::Display for LightsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightsError::Write { code, failed } => write!(
                f,
                "{} channel write{} failed (status {code})",
                failed.len(),
                if failed.len() == 1 { "" } else { "s" }
            ),
            LightsError::Io(e) => write!(f, "I/O error: {e}"),
            LightsError::Config(e) => write!(f, "Config error: {e}"),
            LightsError::Color(e) => write!(f, "Color error: {e}"),
            LightsError::Request(e) => write!(f, "Request error: {e}"),
        }
    }
}

impl std::error::Error for LightsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LightsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WriteError> for LightsError {
    fn from(e: WriteError) -> Self {
        LightsError::Write {
            code: e.code,
            failed: vec![e.channel],
        }
    }
}

impl From<std::io::Error> for LightsError {
    fn from(e: std::io::Error) -> Self {
        LightsError::Io(e)
    }
}

/// Crate-level Result alias using [`LightsError`].
pub type Result<T> = std::result::Result<T, LightsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Color;

    fn brightness(zone: u8) -> ChannelId {
        ChannelId::Brightness {
            zone,
            color: Color::Red,
        }
    }

    #[test]
    fn from_failures_empty_is_none() {
        assert!(LightsError::from_failures(&[]).is_none());
    }

    #[test]
    fn from_failures_ors_codes() {
        let failures = [
            WriteError {
                channel: brightness(1),
                code: -2,
            },
            WriteError {
                channel: ChannelId::ProgramLoad,
                code: -13,
            },
        ];
        let err = LightsError::from_failures(&failures).unwrap();
        match err {
            LightsError::Write { code, failed } => {
                assert_eq!(code, -2 | -13);
                assert_eq!(failed, vec![brightness(1), ChannelId::ProgramLoad]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn from_write_error() {
        let e: LightsError = WriteError {
            channel: ChannelId::ProgramLoad,
            code: -5,
        }
        .into();
        assert!(matches!(e, LightsError::Write { code: -5, .. }));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: LightsError = io_err.into();
        assert!(matches!(e, LightsError::Io(_)));
    }

    #[test]
    fn display_write_single_and_plural() {
        let one = LightsError::Write {
            code: -5,
            failed: vec![ChannelId::ProgramLoad],
        };
        assert_eq!(one.to_string(), "1 channel write failed (status -5)");
        let two = LightsError::Write {
            code: -1,
            failed: vec![ChannelId::ProgramLoad, brightness(2)],
        };
        assert_eq!(two.to_string(), "2 channel writes failed (status -1)");
    }

    #[test]
    fn display_config_error() {
        let e = LightsError::Config("bad template".into());
        assert_eq!(e.to_string(), "Config error: bad template");
    }

    #[test]
    fn source_chains_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e = LightsError::Io(io_err);
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("denied"));
    }

    #[test]
    fn source_none_for_string_variants() {
        let e = LightsError::Color("test".into());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn question_mark_propagation_write_to_lights() {
        fn inner() -> crate::channel::Result<()> {
            Err(WriteError {
                channel: ChannelId::ProgramLoad,
                code: -19,
            })
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, LightsError::Write { code: -19, .. }));
    }
}
