// src/windows_api.rs

use crate::config::{
    CURRENT_DESKTOP_VALUE, DESKTOP_IDS_VALUE, DESKTOP_NAME_VALUE, VIRTUAL_DESKTOPS_KEY,
};
use crate::probe::{guid_from_bytes, ProbeError, ProbeResult, WindowHandle, WindowsProbe};
use std::ffi::{c_void, OsString};
use std::os::windows::ffi::OsStringExt;
use std::path::Path;
use windows::core::{HSTRING, PCWSTR};
use windows::Win32::Foundation::{
    CloseHandle, ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, HANDLE, HWND, MAX_PATH,
    WIN32_ERROR,
};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W, TH32CS_SNAPPROCESS,
};
use windows::Win32::System::ProcessStatus::GetModuleFileNameExW;
use windows::Win32::System::Registry::{
    RegGetValueW, HKEY_CURRENT_USER, REG_ROUTINE_FLAGS, RRF_RT_REG_BINARY, RRF_RT_REG_SZ,
};
use windows::Win32::System::RemoteDesktop::ProcessIdToSessionId;
use windows::Win32::System::Threading::{
    GetCurrentProcessId, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowTextW, GetWindowThreadProcessId,
};
use log::debug;

const MAX_TITLE_LENGTH: usize = 512;

// Closes a process or snapshot handle on every exit path.
struct HandleGuard(HANDLE);

impl Drop for HandleGuard {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            let _ = unsafe { CloseHandle(self.0) };
        }
    }
}

fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

fn win_error(e: windows::core::Error, what: String) -> ProbeError {
    if e.code() == ERROR_ACCESS_DENIED.to_hresult() {
        ProbeError::PermissionDenied(what)
    } else {
        ProbeError::Unavailable(format!("{}: {}", what, e))
    }
}

fn window_process_id(handle: WindowHandle) -> ProbeResult<u32> {
    let mut process_id: u32 = 0;
    let thread_id = unsafe { GetWindowThreadProcessId(hwnd(handle), Some(&mut process_id)) };
    if thread_id == 0 || process_id == 0 {
        return Err(ProbeError::NoData(format!("no owning process for {:?}", handle)));
    }
    Ok(process_id)
}

// --- Registry Helpers ---

fn registry_status(status: WIN32_ERROR, what: &str) -> ProbeResult<()> {
    if status == ERROR_SUCCESS {
        Ok(())
    } else if status == ERROR_FILE_NOT_FOUND {
        Err(ProbeError::NoData(format!("{} not present", what)))
    } else if status == ERROR_ACCESS_DENIED {
        Err(ProbeError::PermissionDenied(what.to_string()))
    } else {
        Err(ProbeError::Unavailable(format!("reading {} failed: {:?}", what, status)))
    }
}

fn read_registry_value(
    subkey: &str,
    value: &str,
    flags: REG_ROUTINE_FLAGS,
) -> ProbeResult<Vec<u8>> {
    let what = format!(r"HKCU\{}\{}", subkey, value);
    let subkey = HSTRING::from(subkey);
    let value = HSTRING::from(value);

    // First call sizes the buffer, second fills it.
    let mut size: u32 = 0;
    let status = unsafe {
        RegGetValueW(
            HKEY_CURRENT_USER,
            PCWSTR(subkey.as_ptr()),
            PCWSTR(value.as_ptr()),
            flags,
            None,
            None,
            Some(&mut size as *mut u32),
        )
    };
    registry_status(status, &what)?;

    let mut buffer = vec![0u8; size as usize];
    let status = unsafe {
        RegGetValueW(
            HKEY_CURRENT_USER,
            PCWSTR(subkey.as_ptr()),
            PCWSTR(value.as_ptr()),
            flags,
            None,
            Some(buffer.as_mut_ptr() as *mut c_void),
            Some(&mut size as *mut u32),
        )
    };
    registry_status(status, &what)?;
    buffer.truncate(size as usize);
    Ok(buffer)
}

fn read_registry_string(subkey: &str, value: &str) -> ProbeResult<String> {
    let bytes = read_registry_value(subkey, value, RRF_RT_REG_SZ)?;
    let wide: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    Ok(String::from_utf16_lossy(&wide[..len]))
}

// Windows 10 keeps the current desktop under the logon session instead.
fn session_desktops_key() -> ProbeResult<String> {
    let mut session_id: u32 = 0;
    unsafe { ProcessIdToSessionId(GetCurrentProcessId(), &mut session_id) }
        .map_err(|e| win_error(e, "ProcessIdToSessionId failed".to_string()))?;
    Ok(format!(
        r"Software\Microsoft\Windows\CurrentVersion\Explorer\SessionInfo\{}\VirtualDesktops",
        session_id
    ))
}

// --- Probe ---

/// Win32 window queries plus the registry's virtual desktop store.
pub struct Win32Probe;

impl Win32Probe {
    pub fn new() -> Self {
        Win32Probe
    }
}

impl WindowsProbe for Win32Probe {
    fn active_window(&self) -> ProbeResult<Option<WindowHandle>> {
        let foreground = unsafe { GetForegroundWindow() };
        if foreground.is_invalid() {
            return Ok(None);
        }
        Ok(Some(WindowHandle(foreground.0 as isize)))
    }

    fn app_name(&self, handle: WindowHandle) -> ProbeResult<Option<String>> {
        let process_id = window_process_id(handle)?;
        let access = PROCESS_QUERY_INFORMATION | PROCESS_VM_READ;
        let process_handle = unsafe { OpenProcess(access, false, process_id) }
            .map_err(|e| win_error(e, format!("OpenProcess failed for PID {}", process_id)))?;
        let _handle_guard = HandleGuard(process_handle);

        let mut exe_path_buf: Vec<u16> = vec![0; MAX_PATH as usize];
        let path_len =
            unsafe { GetModuleFileNameExW(Some(process_handle), None, &mut exe_path_buf) };
        if path_len == 0 {
            let e = windows::core::Error::from_win32();
            return Err(win_error(e, format!("GetModuleFileNameExW failed for PID {}", process_id)));
        }

        let exe_path = OsString::from_wide(&exe_path_buf[..path_len as usize]);
        Ok(Path::new(&exe_path).file_name().map(|name| name.to_string_lossy().into_owned()))
    }

    fn app_name_fallback(&self, handle: WindowHandle) -> ProbeResult<Option<String>> {
        let process_id = window_process_id(handle)?;
        let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
            .map_err(|e| win_error(e, "CreateToolhelp32Snapshot failed".to_string()))?;
        let _snapshot_guard = HandleGuard(snapshot);

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };
        let mut more = unsafe { Process32FirstW(snapshot, &mut entry) }.is_ok();
        while more {
            if entry.th32ProcessID == process_id {
                let exe = &entry.szExeFile;
                let len = exe.iter().position(|&c| c == 0).unwrap_or(exe.len());
                return Ok(Some(String::from_utf16_lossy(&entry.szExeFile[..len])));
            }
            more = unsafe { Process32NextW(snapshot, &mut entry) }.is_ok();
        }
        Err(ProbeError::NoData(format!("PID {} not in process snapshot", process_id)))
    }

    fn window_title(&self, handle: WindowHandle) -> ProbeResult<Option<String>> {
        let mut title_buf: Vec<u16> = vec![0; MAX_TITLE_LENGTH];
        let title_len = unsafe { GetWindowTextW(hwnd(handle), &mut title_buf) };
        if title_len <= 0 {
            return Ok(None);
        }
        let title = OsString::from_wide(&title_buf[..title_len as usize]);
        Ok(Some(title.to_string_lossy().into_owned()))
    }

    fn current_desktop_id(&self) -> ProbeResult<Option<String>> {
        let primary =
            read_registry_value(VIRTUAL_DESKTOPS_KEY, CURRENT_DESKTOP_VALUE, RRF_RT_REG_BINARY);
        let raw = match primary {
            Err(ProbeError::NoData(_)) => {
                debug!("No current desktop under {}, trying session key", VIRTUAL_DESKTOPS_KEY);
                let session_key = session_desktops_key()?;
                read_registry_value(&session_key, CURRENT_DESKTOP_VALUE, RRF_RT_REG_BINARY)?
            }
            other => other?,
        };
        guid_from_bytes(&raw)
            .map(Some)
            .ok_or_else(|| {
                ProbeError::Malformed(format!("{} is {} bytes", CURRENT_DESKTOP_VALUE, raw.len()))
            })
    }

    fn desktop_ids(&self) -> ProbeResult<Vec<String>> {
        let raw = read_registry_value(VIRTUAL_DESKTOPS_KEY, DESKTOP_IDS_VALUE, RRF_RT_REG_BINARY)?;
        Ok(raw.chunks_exact(16).filter_map(guid_from_bytes).collect())
    }

    fn desktop_name(&self, id: &str) -> ProbeResult<Option<String>> {
        let subkey = format!(r"{}\Desktops\{}", VIRTUAL_DESKTOPS_KEY, id);
        let name = read_registry_string(&subkey, DESKTOP_NAME_VALUE)?;
        Ok(Some(name).filter(|n| !n.is_empty()))
    }
}
