// src/detection/macos_detector.rs

use super::desktop;
use crate::probe::{MacProbe, MacWindowInfo, ProbeError, ProbeResult};
use crate::types::{or_unknown, MacStrategy, WindowFields, WindowRecord, UNKNOWN};
use log::{debug, warn};

pub fn resolve_window<P: MacProbe + ?Sized>(probe: &P, strategy: MacStrategy) -> WindowFields {
    let info = match probe.front_window(strategy) {
        Ok(info) => info,
        Err(e) => {
            warn!("Frontmost window lookup via {} failed: {}", strategy, e);
            return WindowFields::unknown();
        }
    };
    debug!("Frontmost window via {}: {:?}", strategy, info);

    // Unlike Linux and Windows, a blank title is reported as-is; only a missing one
    // becomes the sentinel.
    let title = info.title.unwrap_or_else(|| UNKNOWN.to_string());
    let mut fields = WindowFields::new(or_unknown(info.app), title);
    if strategy == MacStrategy::Jxa {
        fields.url = info.url.filter(|url| !url.is_empty());
        fields.incognito = info.incognito;
    }
    fields
}

pub fn resolve_record<P: MacProbe + ?Sized>(probe: &P, strategy: MacStrategy) -> WindowRecord {
    WindowRecord::new(resolve_window(probe, strategy), desktop::macos_desktop(probe))
}

/// JXA prints one JSON object: `{"app", "title", "url", "incognito"}`.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub(crate) fn parse_jxa_output(raw: &str) -> ProbeResult<MacWindowInfo> {
    serde_json::from_str(raw.trim())
        .map_err(|e| ProbeError::Malformed(format!("JXA output: {}", e)))
}

/// AppleScript prints the app name, a newline, then the title (possibly empty).
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub(crate) fn parse_applescript_output(raw: &str) -> ProbeResult<MacWindowInfo> {
    let raw = raw.strip_suffix('\n').unwrap_or(raw);
    let mut lines = raw.splitn(2, '\n');
    let app = lines.next().filter(|app| !app.is_empty()).ok_or_else(|| {
        ProbeError::Malformed("AppleScript output has no application name".to_string())
    })?;
    Ok(MacWindowInfo {
        app: Some(app.to_string()),
        title: lines.next().map(str::to_string),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    struct FakeOsa {
        window: ProbeResult<MacWindowInfo>,
        space: ProbeResult<String>,
        last_strategy: Cell<Option<MacStrategy>>,
    }

    impl FakeOsa {
        fn new(window: ProbeResult<MacWindowInfo>) -> Self {
            FakeOsa {
                window,
                space: Err(ProbeError::Unavailable("yabai not found".into())),
                last_strategy: Cell::new(None),
            }
        }
    }

    impl MacProbe for FakeOsa {
        fn front_window(&self, strategy: MacStrategy) -> ProbeResult<MacWindowInfo> {
            self.last_strategy.set(Some(strategy));
            self.window.clone()
        }
        fn query_space(&self) -> ProbeResult<String> {
            self.space.clone()
        }
    }

    fn safari(title: &str) -> MacWindowInfo {
        MacWindowInfo {
            app: Some("Safari".into()),
            title: Some(title.into()),
            url: Some("https://example.com".into()),
            incognito: Some(false),
        }
    }

    #[test]
    fn jxa_blank_title_is_passed_through() {
        let record = resolve_record(&FakeOsa::new(Ok(safari(""))), MacStrategy::Jxa);
        assert_eq!(record.application(), "Safari");
        assert_eq!(record.title(), "");
        assert_eq!(record.url(), Some("https://example.com"));
        assert_eq!(record.incognito(), Some(false));
        assert_eq!(record.desktop(), "Desktop 1");
    }

    #[test]
    fn applescript_drops_browser_metadata() {
        let probe = FakeOsa::new(Ok(safari("Example Domain")));
        let fields = resolve_window(&probe, MacStrategy::AppleScript);
        assert_eq!(probe.last_strategy.get(), Some(MacStrategy::AppleScript));
        assert_eq!(fields.title, "Example Domain");
        assert_eq!(fields.url, None);
        assert_eq!(fields.incognito, None);
    }

    #[test]
    fn missing_fields_become_unknown() {
        let fields = resolve_window(&FakeOsa::new(Ok(MacWindowInfo::default())), MacStrategy::Jxa);
        assert_eq!(fields, WindowFields::unknown());
    }

    #[test]
    fn script_failure_is_unknown_and_desktop_still_resolved() {
        let mut probe = FakeOsa::new(Err(ProbeError::Timeout(Duration::from_secs(5))));
        probe.space = Ok(r#"{"index": 2, "label": "code"}"#.into());
        let record = resolve_record(&probe, MacStrategy::Jxa);
        assert_eq!(record.application(), UNKNOWN);
        assert_eq!(record.title(), UNKNOWN);
        assert_eq!(record.desktop(), "code");
    }

    #[test]
    fn parses_jxa_json() {
        let info = parse_jxa_output(
            "{\"app\":\"Google Chrome\",\"title\":\"Inbox\",\
             \"url\":\"https://mail.example.com\",\"incognito\":true}\n",
        )
        .unwrap();
        assert_eq!(info.app.as_deref(), Some("Google Chrome"));
        assert_eq!(info.incognito, Some(true));

        let finder = r#"{"app":"Finder","title":null,"url":null,"incognito":null}"#;
        let info = parse_jxa_output(finder).unwrap();
        assert_eq!(info.title, None);
        assert!(matches!(parse_jxa_output("execution error"), Err(ProbeError::Malformed(_))));
    }

    #[test]
    fn parses_applescript_lines() {
        let info = parse_applescript_output("Terminal\nbash - 80x24\n").unwrap();
        assert_eq!(info.app.as_deref(), Some("Terminal"));
        assert_eq!(info.title.as_deref(), Some("bash - 80x24"));

        let info = parse_applescript_output("Finder\n\n").unwrap();
        assert_eq!(info.title.as_deref(), Some(""));

        let info = parse_applescript_output("loginwindow").unwrap();
        assert_eq!(info.title, None);
        assert!(parse_applescript_output("\n").is_err());
    }
}
