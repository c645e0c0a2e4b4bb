// src/lib.rs
//! Active window and virtual desktop detection for Linux (X11), Windows and macOS.
//!
//! [`resolve`] is the entry point: it returns a [`WindowRecord`] whose fields are
//! always populated, using `"unknown"` for anything the platform would not tell us.
//! Only configuration mistakes (unsupported platform, missing or invalid macOS
//! strategy) are returned as errors.

pub mod config;
pub mod detection;
pub mod errors;
pub mod probe;
pub mod types;
mod utils;

#[cfg(target_os = "linux")]
mod x11_api;
#[cfg(target_os = "macos")]
mod macos_api;
#[cfg(target_os = "windows")]
mod windows_api;

pub use detection::{resolve, resolve_desktop, resolve_with};
pub use errors::{AppError, AppResult};
pub use types::{DesktopInfo, MacStrategy, PlatformFamily, WindowRecord, UNKNOWN};
