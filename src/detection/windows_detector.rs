// src/detection/windows_detector.rs

use super::{desktop, field_or_log};
use crate::probe::WindowsProbe;
use crate::types::{or_unknown, WindowFields, WindowRecord};
use log::{debug, warn};

pub fn resolve_window<P: WindowsProbe + ?Sized>(probe: &P) -> WindowFields {
    let handle = match probe.active_window() {
        Ok(Some(handle)) => handle,
        Ok(None) => {
            debug!("No foreground window.");
            return WindowFields::unknown();
        }
        Err(e) => {
            warn!("Could not query foreground window: {}", e);
            return WindowFields::unknown();
        }
    };
    debug!("Foreground window: {:?}", handle);

    // Any primary failure (elevated or protected process, usually) goes to enumeration.
    let app = match probe.app_name(handle) {
        Ok(app) => app,
        Err(e) => {
            debug!("App name lookup failed for {:?}: {}. Trying process enumeration.", handle, e);
            field_or_log(probe.app_name_fallback(handle), "enumerated app name")
        }
    };
    let title = field_or_log(probe.window_title(handle), "window title");

    WindowFields::new(or_unknown(app), or_unknown(title))
}

pub fn resolve_record<P: WindowsProbe + ?Sized>(probe: &P) -> WindowRecord {
    WindowRecord::new(resolve_window(probe), desktop::windows_desktop(probe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeError, ProbeResult, WindowHandle};
    use crate::types::UNKNOWN;
    use std::cell::Cell;

    struct FakeWin32 {
        active: ProbeResult<Option<WindowHandle>>,
        primary: ProbeResult<Option<String>>,
        fallback: ProbeResult<Option<String>>,
        title: ProbeResult<Option<String>>,
        fallback_calls: Cell<u32>,
    }

    impl FakeWin32 {
        fn new(
            primary: ProbeResult<Option<String>>,
            fallback: ProbeResult<Option<String>>,
        ) -> Self {
            FakeWin32 {
                active: Ok(Some(WindowHandle(0x1_0042))),
                primary,
                fallback,
                title: Ok(Some("Untitled - Notepad".to_string())),
                fallback_calls: Cell::new(0),
            }
        }
    }

    impl WindowsProbe for FakeWin32 {
        fn active_window(&self) -> ProbeResult<Option<WindowHandle>> {
            self.active.clone()
        }
        fn app_name(&self, _: WindowHandle) -> ProbeResult<Option<String>> {
            self.primary.clone()
        }
        fn app_name_fallback(&self, _: WindowHandle) -> ProbeResult<Option<String>> {
            self.fallback_calls.set(self.fallback_calls.get() + 1);
            self.fallback.clone()
        }
        fn window_title(&self, _: WindowHandle) -> ProbeResult<Option<String>> {
            self.title.clone()
        }
        fn current_desktop_id(&self) -> ProbeResult<Option<String>> {
            Ok(None)
        }
        fn desktop_ids(&self) -> ProbeResult<Vec<String>> {
            Ok(Vec::new())
        }
        fn desktop_name(&self, _: &str) -> ProbeResult<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn primary_lookup_skips_enumeration() {
        let probe = FakeWin32::new(Ok(Some("Code.exe".into())), Ok(Some("wrong.exe".into())));
        let record = resolve_record(&probe);
        assert_eq!(record.application(), "Code.exe");
        assert_eq!(record.title(), "Untitled - Notepad");
        assert_eq!(record.desktop(), "Desktop 1");
        assert_eq!(probe.fallback_calls.get(), 0);
    }

    #[test]
    fn failed_primary_lookup_uses_enumeration() {
        let probe = FakeWin32::new(
            Err(ProbeError::PermissionDenied("OpenProcess".into())),
            Ok(Some("notepad.exe".into())),
        );
        assert_eq!(resolve_window(&probe).application, "notepad.exe");
        assert_eq!(probe.fallback_calls.get(), 1);
    }

    #[test]
    fn both_lookups_failing_is_unknown() {
        let probe = FakeWin32::new(
            Err(ProbeError::Unavailable("GetModuleFileNameExW".into())),
            Err(ProbeError::NoData("PID 4 not in snapshot".into())),
        );
        let fields = resolve_window(&probe);
        assert_eq!(fields.application, UNKNOWN);
        assert_eq!(fields.title, "Untitled - Notepad");
    }

    #[test]
    fn absent_values_become_unknown() {
        let mut probe = FakeWin32::new(Ok(None), Ok(Some("unused.exe".into())));
        probe.title = Ok(Some(String::new()));
        let fields = resolve_window(&probe);
        assert_eq!(fields, WindowFields::unknown());
        assert_eq!(probe.fallback_calls.get(), 0);
    }

    #[test]
    fn no_foreground_window_is_unknown() {
        let mut probe = FakeWin32::new(Ok(Some("explorer.exe".into())), Ok(None));
        probe.active = Ok(None);
        assert_eq!(resolve_window(&probe), WindowFields::unknown());
    }
}
