// src/types.rs
use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Stands in for any field that could not be obtained.
pub const UNKNOWN: &str = "unknown";

// --- Enums for Control Flow ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFamily {
    Linux,
    Windows,
    Macos,
    Unsupported,
}

impl PlatformFamily {
    /// Family of the host this binary was built for.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => PlatformFamily::Linux,
            "windows" => PlatformFamily::Windows,
            "macos" => PlatformFamily::Macos,
            _ => PlatformFamily::Unsupported,
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformFamily::Linux => write!(f, "linux"),
            PlatformFamily::Windows => write!(f, "windows"),
            PlatformFamily::Macos => write!(f, "macos"),
            PlatformFamily::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Automation mechanism backing the macOS window lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacStrategy {
    /// JavaScript for Automation. Also reports browser URL and incognito state.
    Jxa,
    AppleScript,
}

impl MacStrategy {
    /// Validates an optional strategy name; `None` is a configuration error.
    pub fn require(name: Option<&str>) -> Result<Self, AppError> {
        match name {
            Some(name) => name.parse(),
            None => Err(AppError::MissingMacStrategy),
        }
    }
}

impl FromStr for MacStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jxa" => Ok(MacStrategy::Jxa),
            "applescript" => Ok(MacStrategy::AppleScript),
            other => Err(AppError::InvalidMacStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for MacStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacStrategy::Jxa => write!(f, "jxa"),
            MacStrategy::AppleScript => write!(f, "applescript"),
        }
    }
}

// --- Structs for Data Representation ---

/// Output of a window resolver, before the desktop label is merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowFields {
    pub application: String,
    pub title: String,
    pub url: Option<String>,
    pub incognito: Option<bool>,
}

impl WindowFields {
    pub fn new(application: String, title: String) -> Self {
        WindowFields { application, title, url: None, incognito: None }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN.to_string(), UNKNOWN.to_string())
    }
}

/// Snapshot of the active window. Every core field is always populated, either
/// with real data or with [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowRecord {
    #[serde(rename = "app")]
    application: String,
    title: String,
    desktop: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    incognito: Option<bool>,
}

impl WindowRecord {
    pub fn new(window: WindowFields, desktop: DesktopInfo) -> Self {
        WindowRecord {
            application: window.application,
            title: window.title,
            desktop: desktop.desktop,
            url: window.url,
            incognito: window.incognito,
        }
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn desktop(&self) -> &str {
        &self.desktop
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn incognito(&self) -> Option<bool> {
        self.incognito
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesktopInfo {
    pub desktop: String,
}

impl DesktopInfo {
    pub fn named(name: impl Into<String>) -> Self {
        DesktopInfo { desktop: name.into() }
    }

    /// `"Desktop {number}"`, with `number` already 1-based.
    pub fn positional(number: u64) -> Self {
        DesktopInfo { desktop: format!("Desktop {}", number) }
    }

    pub fn unknown() -> Self {
        Self::named(UNKNOWN)
    }
}

/// What the CLI prints: a timestamped record, shaped like a tracker heartbeat.
#[derive(Debug, Serialize)]
pub struct Event<'a> {
    pub timestamp: DateTime<Utc>,
    pub data: &'a WindowRecord,
}

// Missing and blank values both collapse to the sentinel.
pub fn or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => UNKNOWN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_host_os_names_to_families() {
        assert_eq!(PlatformFamily::from_os("linux"), PlatformFamily::Linux);
        assert_eq!(PlatformFamily::from_os("windows"), PlatformFamily::Windows);
        assert_eq!(PlatformFamily::from_os("macos"), PlatformFamily::Macos);
        assert_eq!(PlatformFamily::from_os("freebsd"), PlatformFamily::Unsupported);
    }

    #[test]
    fn strategy_names_are_validated() {
        assert_eq!("jxa".parse::<MacStrategy>().unwrap(), MacStrategy::Jxa);
        assert_eq!(MacStrategy::require(Some("applescript")).unwrap(), MacStrategy::AppleScript);
        assert!(matches!(
            "JXA".parse::<MacStrategy>(),
            Err(AppError::InvalidMacStrategy(name)) if name == "JXA"
        ));
        assert!(matches!(MacStrategy::require(None), Err(AppError::MissingMacStrategy)));
    }

    #[test]
    fn blank_values_become_unknown() {
        assert_eq!(or_unknown(None), UNKNOWN);
        assert_eq!(or_unknown(Some(String::new())), UNKNOWN);
        assert_eq!(or_unknown(Some("   ".into())), UNKNOWN);
        assert_eq!(or_unknown(Some("Firefox".into())), "Firefox");
    }

    #[test]
    fn record_serializes_with_tracker_keys() {
        let record = WindowRecord::new(
            WindowFields::new("Code".into(), "main.rs".into()),
            DesktopInfo::named("Development"),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"app": "Code", "title": "main.rs", "desktop": "Development"})
        );
    }

    #[test]
    fn record_keeps_browser_metadata() {
        let mut window = WindowFields::new("Safari".into(), "Docs".into());
        window.url = Some("https://example.com".into());
        window.incognito = Some(false);
        let record = WindowRecord::new(window, DesktopInfo::positional(2));

        assert_eq!(record.url(), Some("https://example.com"));
        assert_eq!(record.incognito(), Some(false));
        assert_eq!(record.desktop(), "Desktop 2");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["incognito"], serde_json::json!(false));
    }
}
