// src/config.rs

use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use serde_with::{serde_as, DurationMilliSeconds};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use log::debug;

// === Application Info ===
pub const APP_NAME: &'static str = "window_watcher";
pub const CONFIG_FILENAME: &'static str = "config.json";

// === Resolver Settings ===
pub const DEFAULT_MAC_STRATEGY: &'static str = "jxa";
// Upper bound for the macOS space query; a hung tool must not stall the caller.
pub const DESKTOP_PROBE_TIMEOUT: Duration = Duration::from_secs(1);
// Upper bound for osascript window lookups.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(5);
// How often a bounded child process is checked for exit.
pub const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(20);

// === Windows Virtual Desktops ===
pub const VIRTUAL_DESKTOPS_KEY: &'static str =
    r"Software\Microsoft\Windows\CurrentVersion\Explorer\VirtualDesktops";
pub const CURRENT_DESKTOP_VALUE: &'static str = "CurrentVirtualDesktop";
pub const DESKTOP_IDS_VALUE: &'static str = "VirtualDesktopIDs";
pub const DESKTOP_NAME_VALUE: &'static str = "Name";

// === macOS Space Query ===
pub const YABAI_PROGRAM: &'static str = "yabai";
pub const YABAI_SPACE_ARGS: [&'static str; 4] = ["-m", "query", "--spaces", "--space"];

/// Bounds for every external process a resolution may spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub desktop_probe: Duration,
    pub script: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts { desktop_probe: DESKTOP_PROBE_TIMEOUT, script: SCRIPT_TIMEOUT }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mac_strategy: String,
    pub timeouts: Timeouts,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig { mac_strategy: DEFAULT_MAC_STRATEGY.to_string(), timeouts: Timeouts::default() }
    }
}

// On-disk shape; every field optional so partial files work.
#[serde_as]
#[derive(Deserialize, Default, Debug)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    strategy_macos: Option<String>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(rename = "desktop_probe_timeout_ms")]
    desktop_probe_timeout: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(rename = "script_timeout_ms")]
    script_timeout: Option<Duration>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILENAME);
        path
    })
}

impl AppConfig {
    /// Loads `explicit` if given (it must exist), otherwise the default location
    /// if present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults.");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let file = File::open(path)
            .map_err(|source| AppError::Io { path: path.to_path_buf(), source })?;
        let parsed: ConfigFile = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded config from {:?}: {:?}", path, parsed);

        let defaults = Self::default();
        Ok(AppConfig {
            mac_strategy: parsed.strategy_macos.unwrap_or(defaults.mac_strategy),
            timeouts: Timeouts {
                desktop_probe: parsed
                    .desktop_probe_timeout
                    .unwrap_or(defaults.timeouts.desktop_probe),
                script: parsed.script_timeout.unwrap_or(defaults.timeouts.script),
            },
        })
    }
}
