// src/detection/desktop.rs
//
// Current virtual desktop label. Never fails: every stage degrades to the next,
// and the last resort is the sentinel.

use crate::probe::{LinuxProbe, MacProbe, ProbeError, ProbeResult, WindowsProbe};
use crate::types::DesktopInfo;
use log::debug;
use serde::Deserialize;

pub fn linux_desktop<P: LinuxProbe + ?Sized>(probe: &P) -> DesktopInfo {
    let index = match probe.current_desktop() {
        Ok(Some(index)) => index,
        Ok(None) => {
            debug!("_NET_CURRENT_DESKTOP not set, no desktop-aware window manager?");
            return DesktopInfo::unknown();
        }
        Err(e) => {
            debug!("Linux virtual desktop detection failed: {}", e);
            return DesktopInfo::unknown();
        }
    };

    match probe.desktop_names() {
        Ok(Some(raw)) => {
            if let Some(name) = desktop_name_at(&raw, index) {
                return DesktopInfo::named(name);
            }
            debug!("No name for desktop index {}", index);
        }
        Ok(None) => debug!("_NET_DESKTOP_NAMES not set"),
        Err(e) => debug!("Reading desktop names failed: {}", e),
    }
    DesktopInfo::positional(u64::from(index) + 1)
}

// Names are null-terminated and positional; an empty entry means unnamed.
// Empty entries keep their slot so names stay aligned with desktop indices.
fn desktop_name_at(raw: &[u8], index: u32) -> Option<String> {
    String::from_utf8_lossy(raw)
        .split('\0')
        .nth(index as usize)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn is_subsystem_failure(e: &ProbeError) -> bool {
    matches!(e, ProbeError::Unavailable(_) | ProbeError::PermissionDenied(_))
}

pub fn windows_desktop<P: WindowsProbe + ?Sized>(probe: &P) -> DesktopInfo {
    let id = match probe.current_desktop_id() {
        Ok(Some(id)) => id,
        Ok(None) => return DesktopInfo::positional(1),
        Err(e) if is_subsystem_failure(&e) => {
            debug!("Windows virtual desktop detection failed: {}", e);
            return DesktopInfo::unknown();
        }
        Err(e) => {
            debug!("No current desktop id: {}", e);
            return DesktopInfo::positional(1);
        }
    };

    match probe.desktop_name(&id) {
        Ok(Some(name)) if !name.trim().is_empty() => return DesktopInfo::named(name),
        Ok(_) => debug!("Desktop {} has no stored name", id),
        Err(e) if is_subsystem_failure(&e) => {
            debug!("Desktop name lookup for {} failed: {}", id, e);
            return DesktopInfo::unknown();
        }
        Err(e) => debug!("Desktop {} has no stored name: {}", id, e),
    }

    let position = match probe.desktop_ids() {
        Ok(ids) => ids.iter().position(|known| known.eq_ignore_ascii_case(&id)).unwrap_or(0),
        Err(e) => {
            debug!("Desktop id list unavailable: {}", e);
            0
        }
    };
    DesktopInfo::positional(position as u64 + 1)
}

#[derive(Deserialize, Debug)]
struct SpaceInfo {
    index: Option<u64>,
    label: Option<String>,
}

pub(crate) fn parse_space_info(raw: &str) -> ProbeResult<DesktopInfo> {
    let space: SpaceInfo =
        serde_json::from_str(raw.trim()).map_err(|e| ProbeError::Malformed(e.to_string()))?;
    match (space.label, space.index) {
        (Some(label), _) if !label.is_empty() => Ok(DesktopInfo::named(label)),
        (_, Some(index)) => Ok(DesktopInfo::positional(index)),
        _ => Err(ProbeError::Malformed("space has neither label nor index".to_string())),
    }
}

// macOS has no public API for space names, so this stops at the positional default.
pub fn macos_desktop<P: MacProbe + ?Sized>(probe: &P) -> DesktopInfo {
    match probe.query_space().and_then(|raw| parse_space_info(&raw)) {
        Ok(info) => info,
        Err(e) => {
            debug!("Space query failed, using default desktop: {}", e);
            DesktopInfo::positional(1)
        }
    }
}
