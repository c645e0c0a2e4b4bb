// src/x11_api.rs

use crate::probe::{LinuxProbe, ProbeError, ProbeResult, XWindow};
use log::{debug, warn};
use std::fmt::Display;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt, GetPropertyReply};
use x11rb::rust_connection::RustConnection;

// In 32-bit units, as GetProperty counts them.
const MAX_PROPERTY_LENGTH: u32 = 4096;

/// One X server connection, opened per resolution and closed on drop.
pub struct X11Session {
    conn: Result<(RustConnection, XWindow), ProbeError>,
}

fn x_error(e: impl Display) -> ProbeError {
    ProbeError::Unavailable(format!("X11 request failed: {}", e))
}

impl X11Session {
    pub fn connect() -> Self {
        let conn = x11rb::connect(None).map_err(x_error).and_then(|(conn, screen_num)| {
            let root = conn
                .setup()
                .roots
                .get(screen_num)
                .map(|screen| screen.root)
                .ok_or_else(|| {
                    ProbeError::Unavailable(format!("screen {} not found", screen_num))
                })?;
            Ok((conn, root))
        });
        if let Err(e) = &conn {
            warn!("Could not connect to X server: {}", e);
        }
        X11Session { conn }
    }

    fn connection(&self) -> ProbeResult<(&RustConnection, XWindow)> {
        match &self.conn {
            Ok((conn, root)) => Ok((conn, *root)),
            Err(e) => Err(e.clone()),
        }
    }

    fn atom(&self, name: &str) -> ProbeResult<Atom> {
        let (conn, _) = self.connection()?;
        let reply = conn
            .intern_atom(false, name.as_bytes())
            .map_err(x_error)?
            .reply()
            .map_err(x_error)?;
        Ok(reply.atom)
    }

    // Ok(None) when the property is not set on the window.
    fn property(
        &self,
        window: XWindow,
        property: Atom,
        type_: impl Into<Atom>,
    ) -> ProbeResult<Option<GetPropertyReply>> {
        let (conn, _) = self.connection()?;
        let reply = conn
            .get_property(false, window, property, type_, 0, MAX_PROPERTY_LENGTH)
            .map_err(x_error)?
            .reply()
            .map_err(x_error)?;
        if reply.type_ == x11rb::NONE || reply.value.is_empty() {
            return Ok(None);
        }
        Ok(Some(reply))
    }

    fn root_cardinal(&self, name: &str) -> ProbeResult<Option<u32>> {
        let (_, root) = self.connection()?;
        let Some(reply) = self.property(root, self.atom(name)?, AtomEnum::ANY)? else {
            return Ok(None);
        };
        let value = reply.value32().and_then(|mut values| values.next());
        Ok(value)
    }

    fn text_property(&self, window: XWindow, property: Atom) -> ProbeResult<Option<String>> {
        let reply = self.property(window, property, AtomEnum::ANY)?;
        Ok(reply.map(|r| String::from_utf8_lossy(&r.value).trim_end_matches('\0').to_string()))
    }
}

// WM_CLASS holds "instance\0class\0"; the class is the application name.
fn class_from_wm_class(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let mut parts = text.split('\0');
    let instance = parts.next().unwrap_or_default();
    let class = parts.next().unwrap_or_default();
    [class, instance].into_iter().find(|s| !s.is_empty()).map(str::to_string)
}

impl LinuxProbe for X11Session {
    fn active_window(&self) -> ProbeResult<Option<XWindow>> {
        let window = self.root_cardinal("_NET_ACTIVE_WINDOW")?;
        Ok(window.filter(|&w| w != x11rb::NONE))
    }

    fn window_class(&self, window: XWindow) -> ProbeResult<Option<String>> {
        let reply = self.property(window, AtomEnum::WM_CLASS.into(), AtomEnum::STRING)?;
        Ok(reply.and_then(|r| class_from_wm_class(&r.value)))
    }

    fn window_name(&self, window: XWindow) -> ProbeResult<Option<String>> {
        let net_name = self.text_property(window, self.atom("_NET_WM_NAME")?)?;
        match net_name {
            Some(name) if !name.is_empty() => Ok(Some(name)),
            _ => {
                debug!("_NET_WM_NAME missing on 0x{:x}, reading WM_NAME", window);
                self.text_property(window, AtomEnum::WM_NAME.into())
            }
        }
    }

    fn current_desktop(&self) -> ProbeResult<Option<u32>> {
        self.root_cardinal("_NET_CURRENT_DESKTOP")
    }

    fn desktop_names(&self) -> ProbeResult<Option<Vec<u8>>> {
        let (_, root) = self.connection()?;
        let reply = self.property(root, self.atom("_NET_DESKTOP_NAMES")?, AtomEnum::ANY)?;
        Ok(reply.map(|r| r.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_part_wins_over_instance() {
        assert_eq!(class_from_wm_class(b"navigator\0Firefox\0").as_deref(), Some("Firefox"));
        assert_eq!(class_from_wm_class(b"xterm\0\0").as_deref(), Some("xterm"));
        assert_eq!(class_from_wm_class(b"\0\0"), None);
    }
}
