use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};

const CONFIG: &str = include_str!("../.config/config.json5");

/// Tunables for the dashboard. Missing keys fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub command_timeout_secs: u64,
    pub scan_timeout_secs: u64,
    pub ping_host: String,
    pub live_redraw_ms: u64,
    pub capture_interval_ms: u64,
    pub capture_batch: usize,
    pub capture_window_secs: u64,
    pub packet_summary_count: usize,
    pub keystroke_capture_secs: u64,
    pub escalate_privileges: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            command_timeout_secs: 3,
            scan_timeout_secs: 60,
            ping_host: "1.1.1.1".to_string(),
            live_redraw_ms: 500,
            capture_interval_ms: 1000,
            capture_batch: 5,
            capture_window_secs: 1,
            packet_summary_count: 20,
            keystroke_capture_secs: 5,
            escalate_privileges: true,
        }
    }
}

impl DashboardSettings {
    /// `(label, value)` rows for the settings screen.
    pub fn describe(&self) -> Vec<(String, String)> {
        vec![
            ("Command timeout".into(), format!("{}s", self.command_timeout_secs)),
            ("Scan timeout".into(), format!("{}s", self.scan_timeout_secs)),
            ("Ping host".into(), self.ping_host.clone()),
            ("Live redraw".into(), format!("{}ms", self.live_redraw_ms)),
            ("Capture interval".into(), format!("{}ms", self.capture_interval_ms)),
            ("Capture batch".into(), self.capture_batch.to_string()),
            ("Capture window".into(), format!("{}s", self.capture_window_secs)),
            ("Summary packets".into(), self.packet_summary_count.to_string()),
            ("Keystroke window".into(), format!("{}s", self.keystroke_capture_secs)),
            (
                "Privilege retry".into(),
                if self.escalate_privileges { "sudo -n" } else { "off" }.into(),
            ),
        ]
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

impl Config {
    /// Embedded defaults, then any config file in the config directory, then `extra`.
    pub fn new(extra: Option<PathBuf>) -> Result<Self> {
        let config_dir = crate::utils::get_config_dir();
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
            ("config.ini", config::FileFormat::Ini),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let path = config_dir.join(file);
            if path.exists() {
                found_config = true;
            }
            builder = builder.add_source(config::File::from(path).format(*format).required(false));
        }

        if let Some(path) = extra {
            if !path.exists() {
                return Err(eyre!("config file {} does not exist", path.display()));
            }
            log::info!("Loading extra config from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
            found_config = true;
        }

        if !found_config {
            log::info!("No configuration file found, using built-in defaults");
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }
}
