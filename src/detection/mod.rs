// src/detection/mod.rs
//
// Single entry point: pick the resolver for the platform family, merge in the
// desktop label, hand back one record. Only configuration mistakes are errors.

pub mod desktop;
pub mod linux_detector;
pub mod macos_detector;
pub mod windows_detector;

use crate::config::Timeouts;
use crate::errors::{AppError, AppResult};
use crate::probe::ProbeResult;
use crate::types::{DesktopInfo, MacStrategy, PlatformFamily, WindowRecord};
use log::debug;

/// Resolves the active window with default timeouts.
///
/// `strategy` is only consulted for [`PlatformFamily::Macos`], where it is required.
pub fn resolve(family: PlatformFamily, strategy: Option<&str>) -> AppResult<WindowRecord> {
    resolve_with(family, strategy, &Timeouts::default())
}

pub fn resolve_with(
    family: PlatformFamily,
    strategy: Option<&str>,
    timeouts: &Timeouts,
) -> AppResult<WindowRecord> {
    match family {
        PlatformFamily::Unsupported => {
            Err(AppError::UnsupportedPlatform(std::env::consts::OS.to_string()))
        }
        PlatformFamily::Linux => native::linux_record(),
        PlatformFamily::Windows => native::windows_record(),
        PlatformFamily::Macos => {
            let strategy = MacStrategy::require(strategy)?;
            native::macos_record(strategy, timeouts)
        }
    }
}

/// Desktop label alone. Never fails; families without native support get the sentinel.
pub fn resolve_desktop(family: PlatformFamily, timeouts: &Timeouts) -> DesktopInfo {
    let desktop = match family {
        PlatformFamily::Linux => native::linux_desktop(),
        PlatformFamily::Windows => native::windows_desktop(),
        PlatformFamily::Macos => native::macos_desktop(timeouts),
        PlatformFamily::Unsupported => None,
    };
    desktop.unwrap_or_else(DesktopInfo::unknown)
}

// Collapses a failed field lookup to "absent".
pub(crate) fn field_or_log<T>(result: ProbeResult<Option<T>>, what: &str) -> Option<T> {
    result.unwrap_or_else(|e| {
        debug!("Could not read {}: {}", what, e);
        None
    })
}

fn not_built_for_host(family: PlatformFamily) -> AppError {
    AppError::UnsupportedPlatform(format!(
        "{} window detection is not available on {}",
        family,
        std::env::consts::OS
    ))
}

// Native sessions are opened here and dropped before returning, so nothing is
// held between calls.
mod native {
    use super::*;

    cfg_if::cfg_if! {
        if #[cfg(target_os = "linux")] {
            use crate::x11_api::X11Session;

            pub fn linux_record() -> AppResult<WindowRecord> {
                Ok(linux_detector::resolve_record(&X11Session::connect()))
            }

            pub fn linux_desktop() -> Option<DesktopInfo> {
                Some(desktop::linux_desktop(&X11Session::connect()))
            }
        } else {
            pub fn linux_record() -> AppResult<WindowRecord> {
                Err(not_built_for_host(PlatformFamily::Linux))
            }

            pub fn linux_desktop() -> Option<DesktopInfo> {
                None
            }
        }
    }

    cfg_if::cfg_if! {
        if #[cfg(target_os = "windows")] {
            use crate::windows_api::Win32Probe;

            pub fn windows_record() -> AppResult<WindowRecord> {
                Ok(windows_detector::resolve_record(&Win32Probe::new()))
            }

            pub fn windows_desktop() -> Option<DesktopInfo> {
                Some(desktop::windows_desktop(&Win32Probe::new()))
            }
        } else {
            pub fn windows_record() -> AppResult<WindowRecord> {
                Err(not_built_for_host(PlatformFamily::Windows))
            }

            pub fn windows_desktop() -> Option<DesktopInfo> {
                None
            }
        }
    }

    cfg_if::cfg_if! {
        if #[cfg(target_os = "macos")] {
            use crate::macos_api::OsaProbe;

            pub fn macos_record(
                strategy: MacStrategy,
                timeouts: &Timeouts,
            ) -> AppResult<WindowRecord> {
                Ok(macos_detector::resolve_record(&OsaProbe::new(*timeouts), strategy))
            }

            pub fn macos_desktop(timeouts: &Timeouts) -> Option<DesktopInfo> {
                Some(desktop::macos_desktop(&OsaProbe::new(*timeouts)))
            }
        } else {
            pub fn macos_record(
                _strategy: MacStrategy,
                _timeouts: &Timeouts,
            ) -> AppResult<WindowRecord> {
                Err(not_built_for_host(PlatformFamily::Macos))
            }

            pub fn macos_desktop(_timeouts: &Timeouts) -> Option<DesktopInfo> {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN;

    #[test]
    fn unsupported_platform_is_fatal() {
        assert!(matches!(
            resolve(PlatformFamily::Unsupported, None),
            Err(AppError::UnsupportedPlatform(_))
        ));
        assert!(matches!(
            resolve(PlatformFamily::Unsupported, Some("jxa")),
            Err(AppError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn macos_without_strategy_is_fatal() {
        assert!(matches!(resolve(PlatformFamily::Macos, None), Err(AppError::MissingMacStrategy)));
    }

    #[test]
    fn macos_with_unknown_strategy_is_fatal() {
        let result = resolve(PlatformFamily::Macos, Some("osascript"));
        assert!(matches!(result, Err(AppError::InvalidMacStrategy(name)) if name == "osascript"));
    }

    #[test]
    fn unsupported_desktop_is_unknown() {
        let info = resolve_desktop(PlatformFamily::Unsupported, &Timeouts::default());
        assert_eq!(info.desktop, UNKNOWN);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn foreign_family_is_fatal_off_host() {
        assert!(matches!(
            resolve(PlatformFamily::Windows, None),
            Err(AppError::UnsupportedPlatform(msg)) if msg.starts_with("windows")
        ));
        let info = resolve_desktop(PlatformFamily::Windows, &Timeouts::default());
        assert_eq!(info, DesktopInfo::unknown());
    }

    #[test]
    fn field_errors_collapse_to_absent() {
        use crate::probe::ProbeError;
        let failed: ProbeResult<Option<String>> = Err(ProbeError::NoData("WM_CLASS".into()));
        assert_eq!(field_or_log(failed, "window class"), None);
        assert_eq!(field_or_log(Ok(Some(7)), "desktop"), Some(7));
    }
}
