// Default value functions

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_disk_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

pub const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

pub const VALID_LOG_FORMATS: [&str; 3] = ["compact", "pretty", "json"];
