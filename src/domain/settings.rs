use crate::domain::controller::ControllerConfig;
use crate::infrastructure::bridge::btleplug::SelectionConfig;
use crate::infrastructure::bridge::protocol;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_logging_enabled: default_true(),
            file_logging_enabled: default_false(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "led_remote".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Peripheral identifiers; must match the firmware exactly. Overridable
    // for rebuilt firmware with generated UUIDs.
    #[serde(default = "default_user_service_uuid")]
    pub user_service_uuid: String,
    #[serde(default = "default_led_char_uuid")]
    pub led_characteristic_uuid: String,
    #[serde(default = "default_button_char_uuid")]
    pub button_characteristic_uuid: String,
    #[serde(default = "default_psdi_service_uuid")]
    pub psdi_service_uuid: String,
    #[serde(default = "default_psdi_char_uuid")]
    pub psdi_characteristic_uuid: String,

    /// Seconds between availability re-checks while Bluetooth is off.
    #[serde(default = "default_availability_recheck_secs")]
    pub availability_recheck_secs: u64,
    /// How long device selection scans before giving up.
    #[serde(default = "default_selection_timeout_secs")]
    pub selection_timeout_secs: u64,
    /// Optional advertised-name filter applied during selection.
    #[serde(default)]
    pub device_name_filter: Option<String>,

    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_service_uuid: default_user_service_uuid(),
            led_characteristic_uuid: default_led_char_uuid(),
            button_characteristic_uuid: default_button_char_uuid(),
            psdi_service_uuid: default_psdi_service_uuid(),
            psdi_characteristic_uuid: default_psdi_char_uuid(),
            availability_recheck_secs: default_availability_recheck_secs(),
            selection_timeout_secs: default_selection_timeout_secs(),
            device_name_filter: None,
            log_settings: LogSettings::default(),
        }
    }
}

fn default_user_service_uuid() -> String {
    protocol::USER_SERVICE_UUID.to_string()
}
fn default_led_char_uuid() -> String {
    protocol::LED_CHARACTERISTIC_UUID.to_string()
}
fn default_button_char_uuid() -> String {
    protocol::BUTTON_CHARACTERISTIC_UUID.to_string()
}
fn default_psdi_service_uuid() -> String {
    protocol::PSDI_SERVICE_UUID.to_string()
}
fn default_psdi_char_uuid() -> String {
    protocol::PSDI_CHARACTERISTIC_UUID.to_string()
}
fn default_availability_recheck_secs() -> u64 {
    10
}
fn default_selection_timeout_secs() -> u64 {
    30
}

impl Settings {
    pub fn controller_config(&self) -> anyhow::Result<ControllerConfig> {
        Ok(ControllerConfig {
            user_service: Uuid::parse_str(&self.user_service_uuid)?,
            led_characteristic: Uuid::parse_str(&self.led_characteristic_uuid)?,
            button_characteristic: Uuid::parse_str(&self.button_characteristic_uuid)?,
            psdi_service: Uuid::parse_str(&self.psdi_service_uuid)?,
            psdi_characteristic: Uuid::parse_str(&self.psdi_characteristic_uuid)?,
            availability_recheck: Duration::from_secs(self.availability_recheck_secs),
        })
    }

    pub fn selection_config(&self) -> anyhow::Result<SelectionConfig> {
        Ok(SelectionConfig {
            user_service: Uuid::parse_str(&self.user_service_uuid)?,
            name_filter: self.device_name_filter.clone(),
            scan_timeout: Duration::from_secs(self.selection_timeout_secs),
        })
    }
}

pub struct SettingsService {
    settings: Settings,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();

        Ok(Self { settings })
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("led-remote");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &PathBuf) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }
}
