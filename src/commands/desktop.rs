// src/commands/desktop.rs

use window_watcher::config::AppConfig;
use window_watcher::errors::AppResult;
use window_watcher::types::PlatformFamily;

pub fn execute(app_config: &AppConfig) -> AppResult<()> {
    let info = window_watcher::resolve_desktop(PlatformFamily::detect(), &app_config.timeouts);
    println!("{}", serde_json::to_string(&info)?);
    Ok(())
}
