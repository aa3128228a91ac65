//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Policy SID for secondary customer profiles and A2P trust products.
pub const DEFAULT_POLICY_SID: &str = "RNdfbf3fae0e1107f8aded0e7cead80bf5";

/// Onboarding configuration: the fixed content stamped onto created resources.
#[derive(Debug, Clone)]
pub struct A2pConfig {
    /// Policy the profile and trust product are evaluated against.
    pub policy_sid: String,
    /// Callback the provider notifies on profile / trust product changes.
    pub status_callback: String,
    /// Inbound message webhook for the messaging service.
    pub inbound_request_url: String,
    /// Fallback webhook for the messaging service.
    pub fallback_url: String,
    /// Content used when registering the A2P campaign.
    pub campaign: CampaignDefaults,
}

impl Default for A2pConfig {
    fn default() -> Self {
        Self {
            policy_sid: DEFAULT_POLICY_SID.to_string(),
            status_callback: "https://www.example.com/callback/status".to_string(),
            inbound_request_url: "https://www.example.com/inbound-messages-webhook".to_string(),
            fallback_url: "https://www.example.com/fallback".to_string(),
            campaign: CampaignDefaults::default(),
        }
    }
}

impl A2pConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            policy_sid: env_or("A2P_POLICY_SID", defaults.policy_sid),
            status_callback: env_or("A2P_STATUS_CALLBACK_URL", defaults.status_callback),
            inbound_request_url: env_or("A2P_INBOUND_REQUEST_URL", defaults.inbound_request_url),
            fallback_url: env_or("A2P_FALLBACK_URL", defaults.fallback_url),
            campaign: CampaignDefaults::from_env(),
        }
    }
}

/// Campaign content submitted with the A2P campaign.
#[derive(Debug, Clone)]
pub struct CampaignDefaults {
    pub description: String,
    pub message_flow: String,
    pub message_samples: Vec<String>,
    pub has_embedded_links: bool,
    pub has_embedded_phone: bool,
}

impl Default for CampaignDefaults {
    fn default() -> Self {
        Self {
            description: "Appointment reminders and account notifications sent to customers \
                          who opted in"
                .to_string(),
            message_flow: "Customers opt in by providing their phone number on the booking \
                           form and checking the SMS consent box"
                .to_string(),
            message_samples: vec![
                "Hi, this is a reminder of your appointment tomorrow at 10am. Reply STOP to opt out."
                    .to_string(),
                "Your account details were updated. Reply HELP for help or STOP to opt out."
                    .to_string(),
            ],
            has_embedded_links: false,
            has_embedded_phone: false,
        }
    }
}

impl CampaignDefaults {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let message_samples = std::env::var("A2P_CAMPAIGN_MESSAGE_SAMPLES")
            .ok()
            .map(|raw| {
                raw.split('|')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|samples| !samples.is_empty())
            .unwrap_or(defaults.message_samples);

        Self {
            description: env_or("A2P_CAMPAIGN_DESCRIPTION", defaults.description),
            message_flow: env_or("A2P_CAMPAIGN_MESSAGE_FLOW", defaults.message_flow),
            message_samples,
            has_embedded_links: env_flag("A2P_CAMPAIGN_EMBEDDED_LINKS", false),
            has_embedded_phone: env_flag("A2P_CAMPAIGN_EMBEDDED_PHONE", false),
        }
    }
}

/// Brand registration monitor timing.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between status fetches.
    pub tick_interval: Duration,
    /// Wall-clock limit measured from monitor start.
    pub deadline: Duration,
    /// Per-fetch limit; always shorter than `tick_interval`.
    pub fetch_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(3600),  // 1 hour
            deadline: Duration::from_secs(48 * 3600), // 48 hours
            fetch_timeout: Duration::from_secs(300),  // 5 minutes
        }
    }
}

impl MonitorConfig {
    pub fn new(
        tick_interval: Duration,
        deadline: Duration,
        fetch_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if tick_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "tick_interval".into(),
                message: "must be greater than zero".into(),
            });
        }
        if fetch_timeout >= tick_interval {
            return Err(ConfigError::InvalidValue {
                key: "fetch_timeout".into(),
                message: format!(
                    "{fetch_timeout:?} must be shorter than the tick interval {tick_interval:?}"
                ),
            });
        }
        Ok(Self {
            tick_interval,
            deadline,
            fetch_timeout,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Self::new(
            env_secs("A2P_POLL_INTERVAL_SECS", defaults.tick_interval)?,
            env_secs("A2P_MONITOR_DEADLINE_SECS", defaults.deadline)?,
            env_secs("A2P_FETCH_TIMEOUT_SECS", defaults.fetch_timeout)?,
        )
    }
}

/// Base URLs of the provider's REST APIs.
#[derive(Debug, Clone)]
pub struct TwilioEndpoints {
    pub trusthub: String,
    pub messaging: String,
    pub api: String,
}

impl Default for TwilioEndpoints {
    fn default() -> Self {
        Self {
            trusthub: "https://trusthub.twilio.com".to_string(),
            messaging: "https://messaging.twilio.com".to_string(),
            api: "https://api.twilio.com".to_string(),
        }
    }
}

impl TwilioEndpoints {
    /// All three APIs served from one base URL (used against fake servers).
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            trusthub: base.clone(),
            messaging: base.clone(),
            api: base,
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            trusthub: env_or("TWILIO_TRUSTHUB_URL", defaults.trusthub),
            messaging: env_or("TWILIO_MESSAGING_URL", defaults.messaging),
            api: env_or("TWILIO_API_URL", defaults.api),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("A2P_HTTP_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "A2P_HTTP_PORT".into(),
                message: format!("'{raw}' is not a port number"),
            })?,
            Err(_) => 8080,
        };
        Ok(Self { port })
    }
}

/// Everything the binary needs, loaded from the environment in one pass.
#[derive(Debug, Clone)]
pub struct Settings {
    pub a2p: A2pConfig,
    pub monitor: MonitorConfig,
    pub server: ServerConfig,
    pub endpoints: TwilioEndpoints,
}

impl Settings {
    pub fn from_env() -> crate::error::Result<Self> {
        Ok(Self {
            a2p: A2pConfig::from_env(),
            monitor: MonitorConfig::from_env()?,
            server: ServerConfig::from_env()?,
            endpoints: TwilioEndpoints::from_env(),
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

fn env_secs(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_secs(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}' is not a whole number of seconds"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_defaults_are_hourly_for_two_days() {
        let config = MonitorConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(3600));
        assert_eq!(config.deadline, Duration::from_secs(172_800));
        assert!(config.fetch_timeout < config.tick_interval);
    }

    #[test]
    fn fetch_timeout_must_be_shorter_than_tick() {
        let err = MonitorConfig::new(
            Duration::from_secs(60),
            Duration::from_secs(600),
            Duration::from_secs(60),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "fetch_timeout"));
    }

    #[test]
    fn config_errors_surface_through_crate_error() {
        let err: crate::error::Error =
            MonitorConfig::new(Duration::ZERO, Duration::from_secs(1), Duration::ZERO)
                .unwrap_err()
                .into();
        assert!(
            err.to_string()
                .starts_with("Configuration error: Invalid configuration value for tick_interval"),
            "{err}"
        );
    }

    #[test]
    fn zero_tick_rejected() {
        assert!(MonitorConfig::new(Duration::ZERO, Duration::from_secs(1), Duration::ZERO).is_err());
    }

    #[test]
    fn parse_secs_rejects_garbage() {
        assert_eq!(parse_secs("X", " 90 ").unwrap(), Duration::from_secs(90));
        assert!(parse_secs("X", "an hour").is_err());
    }

    #[test]
    fn single_endpoint_points_everything_at_one_host() {
        let endpoints = TwilioEndpoints::single("http://127.0.0.1:9");
        assert_eq!(endpoints.trusthub, "http://127.0.0.1:9");
        assert_eq!(endpoints.messaging, "http://127.0.0.1:9");
        assert_eq!(endpoints.api, "http://127.0.0.1:9");
    }

    #[test]
    fn default_campaign_has_two_samples() {
        assert_eq!(CampaignDefaults::default().message_samples.len(), 2);
    }
}
