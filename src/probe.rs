// src/probe.rs
//
// Raw native queries, one trait per platform family. Every call reports its own
// outcome; resolvers decide what a failure degrades to.

use crate::types::MacStrategy;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("API unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed output: {0}")]
    Malformed(String),
}

pub type ProbeResult<T> = Result<T, ProbeError>;

/// X11 window id.
pub type XWindow = u32;

/// Opaque Win32 window handle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(pub isize);

pub trait LinuxProbe {
    /// `Ok(None)` when nothing is focused.
    fn active_window(&self) -> ProbeResult<Option<XWindow>>;
    fn window_class(&self, window: XWindow) -> ProbeResult<Option<String>>;
    fn window_name(&self, window: XWindow) -> ProbeResult<Option<String>>;
    /// Zero-based index from `_NET_CURRENT_DESKTOP`.
    fn current_desktop(&self) -> ProbeResult<Option<u32>>;
    /// Raw `_NET_DESKTOP_NAMES` bytes, null separated.
    fn desktop_names(&self) -> ProbeResult<Option<Vec<u8>>>;
}

pub trait WindowsProbe {
    fn active_window(&self) -> ProbeResult<Option<WindowHandle>>;
    fn app_name(&self, handle: WindowHandle) -> ProbeResult<Option<String>>;
    /// Enumeration-based lookup, used when `app_name` fails.
    fn app_name_fallback(&self, handle: WindowHandle) -> ProbeResult<Option<String>>;
    fn window_title(&self, handle: WindowHandle) -> ProbeResult<Option<String>>;
    fn current_desktop_id(&self) -> ProbeResult<Option<String>>;
    /// Every desktop id in display order.
    fn desktop_ids(&self) -> ProbeResult<Vec<String>>;
    /// `Err(NoData)` when the store has no entry for `id`.
    fn desktop_name(&self, id: &str) -> ProbeResult<Option<String>>;
}

/// What an automation script reports about the frontmost window.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct MacWindowInfo {
    pub app: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub incognito: Option<bool>,
}

pub trait MacProbe {
    fn front_window(&self, strategy: MacStrategy) -> ProbeResult<MacWindowInfo>;
    /// Raw stdout of the space query tool.
    fn query_space(&self) -> ProbeResult<String>;
}

/// Formats a 16-byte little-endian GUID as `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub(crate) fn guid_from_bytes(bytes: &[u8]) -> Option<String> {
    if bytes.len() != 16 {
        return None;
    }
    let data1 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let data2 = u16::from_le_bytes([bytes[4], bytes[5]]);
    let data3 = u16::from_le_bytes([bytes[6], bytes[7]]);
    let tail: String = bytes[10..].iter().map(|b| format!("{:02X}", b)).collect();
    Some(format!(
        "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{}}}",
        data1, data2, data3, bytes[8], bytes[9], tail
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_registry_guid() {
        let bytes: Vec<u8> = (0u8..16).collect();
        assert_eq!(
            guid_from_bytes(&bytes).as_deref(),
            Some("{03020100-0504-0706-0809-0A0B0C0D0E0F}")
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(guid_from_bytes(&[0u8; 15]), None);
        assert_eq!(guid_from_bytes(&[]), None);
    }
}
