//! `config` subcommand — show current configuration and file paths.

use std::path::Path;

use super::{Config, ConfigOutput, Result, kv, kv_indent, kv_width, print_json};

pub(super) fn cmd_config(json: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(custom_path);
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());
    let problems: Vec<String> = match config.validate() {
        Ok(()) => vec![],
        Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
    };

    if json {
        print_json(&ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
            problems,
        });
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:"],
        &[
            "brightness_path:",
            "current_path:",
            "sequencer_load_path:",
            "sequencer_mode_path:",
            "sequencer_run_path:",
            "current_max_notifications:",
            "current_max_charging:",
            "dedup:",
            "policy:",
        ],
    );

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent("brightness_path:", &config.brightness_path, w);
    kv_indent("current_path:", &config.current_path, w);
    kv_indent("sequencer_load_path:", &config.sequencer_load_path, w);
    kv_indent("sequencer_mode_path:", &config.sequencer_mode_path, w);
    kv_indent("sequencer_run_path:", &config.sequencer_run_path, w);
    kv_indent(
        "current_max_notifications:",
        config.current_max_notifications,
        w,
    );
    kv_indent("current_max_charging:", config.current_max_charging, w);
    kv_indent("dedup:", format!("{:?}", config.dedup).to_lowercase(), w);
    kv_indent("policy:", format!("{:?}", config.policy).to_lowercase(), w);

    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  {p}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmd_config_succeeds() {
        // Never fails, even without a config file.
        assert!(cmd_config(false, None).is_ok());
    }

    #[test]
    fn cmd_config_json_succeeds() {
        assert!(cmd_config(true, None).is_ok());
    }

    #[test]
    fn cmd_config_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "current_max_charging = 250\n").unwrap();
        // invalid caps are reported, not fatal
        assert!(cmd_config(false, Some(&path)).is_ok());
    }
}
