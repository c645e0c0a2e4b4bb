// src/detection/linux_detector.rs

use super::{desktop, field_or_log};
use crate::probe::LinuxProbe;
use crate::types::{or_unknown, WindowFields, WindowRecord};
use log::{debug, warn};

pub fn resolve_window<P: LinuxProbe + ?Sized>(probe: &P) -> WindowFields {
    let window = match probe.active_window() {
        Ok(Some(window)) => window,
        Ok(None) => {
            debug!("No window focused.");
            return WindowFields::unknown();
        }
        Err(e) => {
            warn!("Could not query active window: {}", e);
            return WindowFields::unknown();
        }
    };
    debug!("Active window: 0x{:x}", window);

    let class = field_or_log(probe.window_class(window), "window class");
    let name = field_or_log(probe.window_name(window), "window name");
    WindowFields::new(or_unknown(class), or_unknown(name))
}

pub fn resolve_record<P: LinuxProbe + ?Sized>(probe: &P) -> WindowRecord {
    WindowRecord::new(resolve_window(probe), desktop::linux_desktop(probe))
}
