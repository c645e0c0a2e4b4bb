// src/macos_api.rs

use crate::config::{Timeouts, YABAI_PROGRAM, YABAI_SPACE_ARGS};
use crate::detection::macos_detector::{parse_applescript_output, parse_jxa_output};
use crate::probe::{MacProbe, MacWindowInfo, ProbeResult};
use crate::types::MacStrategy;
use crate::utils::run_with_timeout;

const OSASCRIPT: &str = "osascript";

// Prints {"app", "title", "url", "incognito"} as JSON. Browser lookups are
// best-effort; a browser without scripting access still reports app and title.
const JXA_SCRIPT: &str = r#"
function run() {
    var se = Application("System Events");
    var proc = se.processes.whose({ frontmost: true })[0];
    var app = proc.name();
    var title = null, url = null, incognito = null;
    try { title = proc.windows[0].name(); } catch (e) {}
    try {
        var chromium = ["Google Chrome", "Chromium", "Brave Browser", "Microsoft Edge", "Vivaldi"];
        if (chromium.indexOf(app) >= 0) {
            var win = Application(app).windows[0];
            title = win.activeTab.name();
            url = win.activeTab.url();
            incognito = win.mode() === "incognito";
        } else if (app === "Safari") {
            var doc = Application("Safari").documents[0];
            title = doc.name();
            url = doc.url();
        }
    } catch (e) {}
    return JSON.stringify({ app: app, title: title, url: url, incognito: incognito });
}
"#;

// Prints the app name, a newline, then the main window title.
const APPLESCRIPT: &str = r#"
set windowTitle to ""
tell application "System Events"
    set frontApp to first application process whose frontmost is true
    set frontAppName to name of frontApp
    tell process frontAppName
        try
            tell (1st window whose value of attribute "AXMain" is true)
                set windowTitle to value of attribute "AXTitle"
            end tell
        end try
    end tell
end tell
return frontAppName & linefeed & windowTitle
"#;

/// Automation through `osascript`, spaces through yabai. Each call is its own
/// bounded child process.
pub struct OsaProbe {
    timeouts: Timeouts,
}

impl OsaProbe {
    pub fn new(timeouts: Timeouts) -> Self {
        OsaProbe { timeouts }
    }
}

impl MacProbe for OsaProbe {
    fn front_window(&self, strategy: MacStrategy) -> ProbeResult<MacWindowInfo> {
        match strategy {
            MacStrategy::Jxa => {
                let args = ["-l", "JavaScript", "-e", JXA_SCRIPT];
                let raw = run_with_timeout(OSASCRIPT, &args, self.timeouts.script)?;
                parse_jxa_output(&raw)
            }
            MacStrategy::AppleScript => {
                let raw = run_with_timeout(OSASCRIPT, &["-e", APPLESCRIPT], self.timeouts.script)?;
                parse_applescript_output(&raw)
            }
        }
    }

    fn query_space(&self) -> ProbeResult<String> {
        run_with_timeout(YABAI_PROGRAM, &YABAI_SPACE_ARGS, self.timeouts.desktop_probe)
    }
}
