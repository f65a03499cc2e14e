//! `notify` / `battery` subcommands — submit one request through a fresh controller.

use std::path::Path;

use super::{Options, Requester, Result, Session, StepOutput, build_request, print_json};

pub(super) fn cmd_request(
    which: Requester,
    color: &str,
    on_ms: Option<u32>,
    off_ms: Option<u32>,
    config_path: Option<&Path>,
    opts: &Options,
) -> Result<()> {
    let request = build_request(color, on_ms, off_ms)?;
    let config = super::load_valid_config(config_path)?;
    let session = Session::open(&config, opts.dry_run);

    log::info!("{which} request: {request:?}");
    let result = session.controller.set_request(which, request);
    let output = StepOutput::capture(&session, which, &request);
    if opts.json {
        print_json(&output);
    } else {
        output.print();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dry_run_opts() -> Options {
        Options {
            json: false,
            dry_run: true,
            config: None,
        }
    }

    #[test]
    fn dry_run_notify_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let result = cmd_request(
            Requester::Notification,
            "red",
            Some(500),
            Some(500),
            Some(&path),
            &dry_run_opts(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn bad_color_is_rejected() {
        let result = cmd_request(
            Requester::Battery,
            "not-a-color",
            None,
            None,
            None,
            &dry_run_opts(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "brightness_path = \"/tmp/no-placeholders\"\n").unwrap();
        let result = cmd_request(
            Requester::Battery,
            "green",
            None,
            None,
            Some(&path),
            &dry_run_opts(),
        );
        assert!(matches!(result, Err(super::super::LightsError::Config(_))));
    }
}
