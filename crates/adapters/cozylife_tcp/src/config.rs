//! Per-device TCP configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::protocol::DEFAULT_PORT;

/// Configuration for one CozyLife device reached over TCP.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TcpDeviceConfig {
    /// Device hostname or IP address.
    pub host: String,
    /// Device TCP port.
    pub port: u16,
    /// Known device id. When unset, the id is asked from the device.
    pub device_id: Option<String>,
    /// Model name shown in the display name.
    pub model_name: String,
    /// CozyLife type code (`"00"` for switches).
    pub type_code: String,
    /// Upper bound for one request/reply exchange, in milliseconds.
    pub timeout_ms: u64,
    /// Wait for the device to answer set commands before reporting success.
    pub await_ack: bool,
}

impl TcpDeviceConfig {
    /// `host:port` socket address string.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TcpDeviceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            device_id: None,
            model_name: "CozyLife Switch".to_string(),
            type_code: "00".to_string(),
            timeout_ms: 3000,
            await_ack: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = TcpDeviceConfig::default();
        assert_eq!(config.port, 5555);
        assert_eq!(config.model_name, "CozyLife Switch");
        assert_eq!(config.type_code, "00");
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(config.device_id.is_none());
        assert!(!config.await_ack);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            host = "192.168.1.20"
            port = 5556
            device_id = "637060042462ab3fe3f2"
            model_name = "Smart Plug"
            type_code = "00"
            timeout_ms = 1500
            await_ack = true
        "#;
        let config: TcpDeviceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.addr(), "192.168.1.20:5556");
        assert_eq!(config.device_id.as_deref(), Some("637060042462ab3fe3f2"));
        assert_eq!(config.model_name, "Smart Plug");
        assert_eq!(config.timeout(), Duration::from_millis(1500));
        assert!(config.await_ack);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let toml = r#"host = "10.0.0.5""#;
        let config: TcpDeviceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.addr(), "10.0.0.5:5555");
        assert_eq!(config.timeout_ms, 3000);
    }
}
