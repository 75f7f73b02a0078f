//! # Configuration
//!
//! This module reads the static INI configuration that tells `envlink` where
//! the two external tools live and which r10k source is the control
//! repository.
//!
//! ## Format
//!
//! ```ini
//! [PUPPET]
//! puppet = /opt/puppetlabs/bin/puppet
//!
//! [R10K]
//! r10k = /opt/puppetlabs/puppet/bin/r10k
//! control_repo_name = control
//! # optional
//! baseline_environment = production
//! command_timeout = 30
//! ```
//!
//! The file lives at `$PUP_CUSTOM_DIR/config/config.ini` by default (see
//! [`crate::defaults`]). Parsing is done with `rust-ini`; every missing or
//! malformed value is reported as [`Error::Configuration`] with a hint.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::{Ini, Properties};

use crate::defaults::{DEFAULT_BASELINE_ENVIRONMENT, DEFAULT_COMMAND_TIMEOUT};
use crate::error::{Error, Result};

const PUPPET_SECTION: &str = "PUPPET";
const R10K_SECTION: &str = "R10K";

/// Settings consumed by a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Path to the `puppet` binary, used to query the environment root.
    pub puppet: PathBuf,
    /// Path to the `r10k` binary, used to list sources and environments.
    pub r10k: PathBuf,
    /// Key of the r10k source that is authoritative for environment existence.
    pub control_repo_name: String,
    /// Environment used as the fallback link target and bootstrap seed.
    pub baseline_environment: String,
    /// Upper bound on each external command.
    pub command_timeout: Duration,
}

impl Settings {
    /// Settings with the required values and defaults for the rest.
    pub fn new(puppet: PathBuf, r10k: PathBuf, control_repo_name: impl Into<String>) -> Self {
        Self {
            puppet,
            r10k,
            control_repo_name: control_repo_name.into(),
            baseline_environment: DEFAULT_BASELINE_ENVIRONMENT.to_string(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

/// Parse settings from INI text.
pub fn parse(content: &str) -> Result<Settings> {
    let ini = Ini::load_from_str(content).map_err(|e| Error::Ini(ini::Error::Parse(e)))?;

    let puppet_section = section(&ini, PUPPET_SECTION)?;
    let r10k_section = section(&ini, R10K_SECTION)?;

    let puppet = PathBuf::from(required(puppet_section, PUPPET_SECTION, "puppet")?);
    let r10k = PathBuf::from(required(r10k_section, R10K_SECTION, "r10k")?);
    let control_repo_name = required(r10k_section, R10K_SECTION, "control_repo_name")?;

    let mut settings = Settings::new(puppet, r10k, control_repo_name);

    if let Some(baseline) = optional(r10k_section, "baseline_environment") {
        settings.baseline_environment = baseline.to_string();
    }

    if let Some(raw) = optional(r10k_section, "command_timeout") {
        settings.command_timeout = parse_timeout(raw)?;
    }

    Ok(settings)
}

/// Load settings from an INI file on disk.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::Configuration {
        message: format!("cannot read '{}': {}", path.display(), e),
        hint: Some("Pass --config, set ENVLINK_CONFIG, or set PUP_CUSTOM_DIR".to_string()),
    })?;
    parse(&content)
}

fn section<'a>(ini: &'a Ini, name: &str) -> Result<&'a Properties> {
    ini.section(Some(name)).ok_or_else(|| Error::Configuration {
        message: format!("missing section [{}]", name),
        hint: Some(format!("Add a [{}] section to the configuration file", name)),
    })
}

fn required(props: &Properties, section: &str, key: &str) -> Result<String> {
    optional(props, key)
        .map(str::to_string)
        .ok_or_else(|| Error::Configuration {
            message: format!("missing key '{}' in section [{}]", key, section),
            hint: Some(format!("Add '{} = ...' under [{}]", key, section)),
        })
}

fn optional<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::Configuration {
            message: format!("invalid command_timeout '{}'", raw),
            hint: Some("Use a positive number of seconds".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
[PUPPET]
puppet = /opt/puppetlabs/bin/puppet

[R10K]
r10k = /opt/puppetlabs/puppet/bin/r10k
control_repo_name = control
"#;

    #[test]
    fn test_parse_minimal_config() {
        let settings = parse(MINIMAL).unwrap();
        assert_eq!(settings.puppet, PathBuf::from("/opt/puppetlabs/bin/puppet"));
        assert_eq!(settings.r10k, PathBuf::from("/opt/puppetlabs/puppet/bin/r10k"));
        assert_eq!(settings.control_repo_name, "control");
        assert_eq!(settings.baseline_environment, "production");
        assert_eq!(settings.command_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_parse_optional_keys() {
        let content = format!("{}baseline_environment = main\ncommand_timeout = 5\n", MINIMAL);
        let settings = parse(&content).unwrap();
        assert_eq!(settings.baseline_environment, "main");
        assert_eq!(settings.command_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_control_repo_name() {
        let content = "[PUPPET]\npuppet = /bin/puppet\n[R10K]\nr10k = /bin/r10k\n";
        let err = parse(content).unwrap_err();
        let display = err.to_string();
        assert!(display.contains("control_repo_name"));
        assert!(display.contains("[R10K]"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn test_missing_puppet_section() {
        let content = "[R10K]\nr10k = /bin/r10k\ncontrol_repo_name = control\n";
        let err = parse(content).unwrap_err();
        assert!(err.to_string().contains("missing section [PUPPET]"));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let content = "[PUPPET]\npuppet =\n[R10K]\nr10k = /bin/r10k\ncontrol_repo_name = c\n";
        let err = parse(content).unwrap_err();
        assert!(err.to_string().contains("missing key 'puppet'"));
    }

    #[test]
    fn test_invalid_timeout() {
        for bad in ["0", "-3", "soon"] {
            let content = format!("{}command_timeout = {}\n", MINIMAL, bad);
            let err = parse(&content).unwrap_err();
            assert!(matches!(err, Error::Configuration { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_from_file_missing() {
        let temp = TempDir::new().unwrap();
        let err = from_file(temp.path().join("config.ini")).unwrap_err();
        let display = err.to_string();
        assert!(display.contains("cannot read"));
        assert!(display.contains("PUP_CUSTOM_DIR"));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, MINIMAL).unwrap();
        assert_eq!(from_file(&path).unwrap(), parse(MINIMAL).unwrap());
    }
}
