// src/commands/current.rs

use window_watcher::config::AppConfig;
use window_watcher::errors::AppResult;
use window_watcher::types::{Event, PlatformFamily};
use chrono::Utc;
use log::{debug, info};

pub fn execute(app_config: &AppConfig, pretty: bool) -> AppResult<()> {
    let family = PlatformFamily::detect();
    debug!("Detected platform family: {}", family);

    let strategy = Some(app_config.mac_strategy.as_str());
    let record = window_watcher::resolve_with(family, strategy, &app_config.timeouts)?;
    info!(
        "[Detected] App: '{}', Title: '{}', Desktop: '{}'",
        record.application(),
        record.title(),
        record.desktop()
    );

    let event = Event { timestamp: Utc::now(), data: &record };
    let json = if pretty {
        serde_json::to_string_pretty(&event)?
    } else {
        serde_json::to_string(&event)?
    };
    println!("{}", json);
    Ok(())
}
