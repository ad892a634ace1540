use std::{path::PathBuf, str::FromStr, time::Duration};

use dotenvy::dotenv;
use thiserror::Error;

use crate::{application::services::retry::RetryPolicy, domain::models::DEFAULT_MAX_ATTEMPTS};

const DEFAULT_WHATSAPP_API_URL: &str = "https://graph.facebook.com/v20.0";
const DEFAULT_TWILIO_API_URL: &str = "https://api.twilio.com";
const DEFAULT_AUDIT_LOG_DIR: &str = "logs/messages";
const DEFAULT_COUNTRY_CODE: &str = "91";
const MAX_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env param {0}")]
    Missing(&'static str),
    #[error("invalid value '{value}' for env param {name}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub scheme: String,
    pub host: String,
    pub delivery: DeliverySettings,
    pub channels: ChannelSettings,
    pub audit_log_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySettings {
    pub retry: RetryPolicy,
    pub rate_limit: Duration,
    pub tick: Duration,
    pub default_country_code: String,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            rate_limit: Duration::from_millis(2000),
            tick: Duration::from_millis(5000),
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChannelSettings {
    pub whatsapp: WhatsAppSettings,
    pub twilio: TwilioSettings,
    pub relay_url: Option<String>,
    pub test_mode: bool,
}

#[derive(Debug, Clone)]
pub struct WhatsAppSettings {
    pub api_url: String,
    pub access_token: Option<String>,
    pub phone_number_id: Option<String>,
}

impl Default for WhatsAppSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_WHATSAPP_API_URL.to_string(),
            access_token: None,
            phone_number_id: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TwilioSettings {
    pub api_url: String,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub whatsapp_from: Option<String>,
}

impl Default for TwilioSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_TWILIO_API_URL.to_string(),
            account_sid: None,
            auth_token: None,
            whatsapp_from: None,
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn try_parse() -> Result<Config, ConfigError> {
        let _ = dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let defaults = DeliverySettings::default();

        let max_attempts = env.parsed("DELIVERY_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "DELIVERY_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        let delivery = DeliverySettings {
            retry: RetryPolicy {
                max_attempts,
                base_delay: env.millis("DELIVERY_RETRY_BASE_MS", defaults.retry.base_delay)?,
                max_delay: env.millis("DELIVERY_RETRY_MAX_MS", defaults.retry.max_delay)?,
            },
            rate_limit: env.millis("DELIVERY_RATE_LIMIT_MS", defaults.rate_limit)?,
            tick: env.millis("DELIVERY_TICK_MS", defaults.tick)?,
            default_country_code: env
                .optional("DEFAULT_COUNTRY_CODE")
                .unwrap_or(defaults.default_country_code),
        };
        if !delivery
            .default_country_code
            .chars()
            .all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_COUNTRY_CODE",
                value: delivery.default_country_code,
            });
        }
        if delivery.tick.is_zero() {
            return Err(ConfigError::Invalid {
                name: "DELIVERY_TICK_MS",
                value: "0".to_string(),
            });
        }

        let channels = ChannelSettings {
            whatsapp: WhatsAppSettings {
                api_url: env
                    .optional("WHATSAPP_API_URL")
                    .unwrap_or_else(|| DEFAULT_WHATSAPP_API_URL.to_string()),
                access_token: env.optional("WHATSAPP_ACCESS_TOKEN"),
                phone_number_id: env.optional("WHATSAPP_PHONE_NUMBER_ID"),
            },
            twilio: TwilioSettings {
                api_url: env
                    .optional("TWILIO_API_URL")
                    .unwrap_or_else(|| DEFAULT_TWILIO_API_URL.to_string()),
                account_sid: env.optional("TWILIO_ACCOUNT_SID"),
                auth_token: env.optional("TWILIO_AUTH_TOKEN"),
                whatsapp_from: env.optional("TWILIO_WHATSAPP_FROM"),
            },
            relay_url: env.optional("RELAY_URL"),
            test_mode: env.flag("DELIVERY_TEST_MODE")?,
        };

        Ok(Config {
            port: env.required_parsed("PORT")?,
            scheme: env.required("SCHEME")?,
            host: env.required("HOST")?,
            delivery,
            channels,
            audit_log_dir: env
                .optional("AUDIT_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIT_LOG_DIR)),
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Unset and blank values both read as absent.
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn required_parsed<T: FromStr>(&self, name: &'static str) -> Result<T, ConfigError> {
        let value = self.required(name)?;
        value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value })
    }

    fn parsed<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(name) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value }),
            None => Ok(default),
        }
    }

    /// Durations above one day are rejected.
    fn millis(&self, name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        let millis = self.parsed::<u64>(name, default.as_millis() as u64)?;
        if millis > MAX_DURATION_MS {
            return Err(ConfigError::Invalid {
                name,
                value: millis.to_string(),
            });
        }
        Ok(Duration::from_millis(millis))
    }

    fn flag(&self, name: &'static str) -> Result<bool, ConfigError> {
        match self.optional(name).map(|v| v.to_ascii_lowercase()) {
            None => Ok(false),
            Some(value) => match value.as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::Invalid { name, value }),
            },
        }
    }
}
