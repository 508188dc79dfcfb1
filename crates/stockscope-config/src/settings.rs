//! Configuration structures.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stockscope_data::{CoordinatorSettings, FreshnessPolicy, ProviderConfig};

use crate::SettingsError;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub data: DataSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "stockscope".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
    /// Also write logs to this file when set.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Price acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub cache_dir: PathBuf,
    pub refresh_window_hours: i64,
    /// Session close as `HH:MM` (UTC).
    pub session_close_utc: String,
    pub lookback_days: u64,
    pub request_timeout_secs: u64,
    /// Tried in order: the first is the primary, the rest are fallbacks.
    pub providers: Vec<ProviderConfig>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/cache"),
            refresh_window_hours: 24,
            session_close_utc: "21:00".to_string(),
            lookback_days: 365,
            request_timeout_secs: 15,
            providers: ProviderConfig::default_chain(),
        }
    }
}

impl DataSettings {
    pub fn session_close(&self) -> Result<NaiveTime, SettingsError> {
        let raw = self.session_close_utc.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| {
                SettingsError::Invalid(format!(
                    "data.session_close_utc must be HH:MM, got {:?}",
                    self.session_close_utc
                ))
            })
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    /// Coordinator tunables derived from these settings.
    pub fn coordinator_settings(&self) -> Result<CoordinatorSettings, SettingsError> {
        Ok(CoordinatorSettings {
            policy: FreshnessPolicy::new(
                Duration::hours(self.refresh_window_hours),
                self.session_close()?,
            ),
            lookback_days: self.lookback_days,
            request_timeout: self.request_timeout(),
        })
    }
}

impl AppConfig {
    /// Reject settings that would only fail later at runtime.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: &str| Err(SettingsError::Invalid(msg.to_string()));

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return invalid("logging.format must be \"pretty\" or \"json\"");
        }
        if self.data.providers.is_empty() {
            return invalid("data.providers must list at least one provider");
        }
        if self.data.refresh_window_hours <= 0 {
            return invalid("data.refresh_window_hours must be positive");
        }
        if self.data.request_timeout_secs == 0 {
            return invalid("data.request_timeout_secs must be positive");
        }
        if self.data.lookback_days == 0 {
            return invalid("data.lookback_days must be positive");
        }
        self.data.session_close()?;
        Ok(())
    }

    /// Effective configuration as TOML. Inline API keys are never written out.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();

        let settings = config.data.coordinator_settings().unwrap();
        assert_eq!(settings.lookback_days, 365);
        assert_eq!(settings.request_timeout, std::time::Duration::from_secs(15));
        assert_eq!(settings.policy, FreshnessPolicy::default());
        assert_eq!(config.data.providers.len(), 2);
    }

    #[test]
    fn test_validation_failures() {
        let cases: Vec<Box<dyn Fn(&mut AppConfig)>> = vec![
            Box::new(|c| c.data.providers.clear()),
            Box::new(|c| c.data.refresh_window_hours = 0),
            Box::new(|c| c.data.request_timeout_secs = 0),
            Box::new(|c| c.data.lookback_days = 0),
            Box::new(|c| c.data.session_close_utc = "9pm".into()),
            Box::new(|c| c.logging.format = "xml".into()),
        ];

        for (i, mutate) in cases.iter().enumerate() {
            let mut config = AppConfig::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(SettingsError::Invalid(_))),
                "case {}",
                i
            );
        }
    }

    #[test]
    fn test_session_close_formats() {
        let mut data = DataSettings::default();
        assert_eq!(data.session_close().unwrap(), NaiveTime::from_hms_opt(21, 0, 0).unwrap());

        data.session_close_utc = "20:30:15".into();
        assert_eq!(data.session_close().unwrap(), NaiveTime::from_hms_opt(20, 30, 15).unwrap());
    }

    #[test]
    fn test_to_toml_omits_inline_key() {
        let mut config = AppConfig::default();
        if let ProviderConfig::AlphaVantage(av) = &mut config.data.providers[0] {
            av.api_key = Some("secret".into());
        }

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("kind = \"alpha_vantage\""));
        assert!(!rendered.contains("secret"));
    }
}
