use std::env;
use std::fs;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::application::DEFAULT_PROBE_TIMEOUT;
use crate::domain::TargetId;

pub const REFRESH_INTERVAL_RANGE: RangeInclusive<u64> = 30..=300;
pub const ALERT_THRESHOLD_RANGE: RangeInclusive<u64> = 100..=1000;
pub const DEFAULT_TWILIO_API: &str = "https://api.twilio.com";

const ENV_PREFIX: &str = "QDMON_";

/// Configuration errors, all detected before the session starts
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid value {value:?} for `{key}`")]
    Invalid { key: &'static str, value: String },

    #[error("`{key}` = {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("{channel} channel is partially configured, missing `{field}`")]
    IncompleteChannel {
        channel: &'static str,
        field: &'static str,
    },
}

/// Email relay settings
#[derive(Debug, Clone, PartialEq)]
pub struct EmailConfig {
    pub relay_url: String,
    pub api_token: Option<String>,
    pub from: String,
    pub to: String,
}

/// Twilio SMS settings
#[derive(Debug, Clone, PartialEq)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
    pub api_base: String,
}

/// Settings that drive one monitoring session
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub target: TargetId,
    pub refresh_interval: Duration,
    pub alert_threshold_ms: u32,
    pub retention: chrono::Duration,
}

impl MonitorConfig {
    pub fn new(
        target: impl Into<TargetId>,
        refresh_interval_secs: u64,
        alert_threshold_ms: u32,
    ) -> Result<Self, ConfigError> {
        check_range("refresh_interval_secs", refresh_interval_secs, &REFRESH_INTERVAL_RANGE)?;
        check_range(
            "alert_threshold_ms",
            u64::from(alert_threshold_ms),
            &ALERT_THRESHOLD_RANGE,
        )?;

        Ok(Self {
            target: target.into(),
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            alert_threshold_ms,
            retention: chrono::Duration::hours(24),
        })
    }

    pub fn threshold_ms(&self) -> f64 {
        f64::from(self.alert_threshold_ms)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub probe_timeout: Duration,
    pub monitor: MonitorConfig,
    pub email: Option<EmailConfig>,
    pub sms: Option<SmsConfig>,
}

/// Raw shape of the optional TOML file; every field may be overridden from the environment
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    port: Option<u16>,
    log_level: Option<String>,
    qdrant_url: Option<String>,
    qdrant_api_key: Option<String>,
    target: Option<String>,
    refresh_interval_secs: Option<u64>,
    alert_threshold_ms: Option<u32>,
    probe_timeout_secs: Option<u64>,
    email: RawEmail,
    sms: RawSms,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawEmail {
    relay_url: Option<String>,
    api_token: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSms {
    account_sid: Option<String>,
    auth_token: Option<String>,
    from: Option<String>,
    to: Option<String>,
    api_base: Option<String>,
}

impl Config {
    /// Load from the file named by `QDMON_CONFIG` (if any), then apply `QDMON_*` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match env::var(format!("{ENV_PREFIX}CONFIG")) {
            Ok(path) => Some(fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?),
            Err(_) => None,
        };

        Self::from_sources(file.as_deref(), |key| env::var(key).ok())
    }

    pub fn from_sources<F>(file: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw: FileConfig = match file {
            Some(contents) => toml::from_str(contents)?,
            None => FileConfig::default(),
        };

        let env = EnvOverrides { lookup: &lookup };
        env.apply("PORT", &mut raw.port, "port")?;
        env.apply("LOG_LEVEL", &mut raw.log_level, "log_level")?;
        env.apply("QDRANT_URL", &mut raw.qdrant_url, "qdrant_url")?;
        env.apply("QDRANT_API_KEY", &mut raw.qdrant_api_key, "qdrant_api_key")?;
        env.apply("TARGET", &mut raw.target, "target")?;
        env.apply("REFRESH_INTERVAL", &mut raw.refresh_interval_secs, "refresh_interval_secs")?;
        env.apply("ALERT_THRESHOLD_MS", &mut raw.alert_threshold_ms, "alert_threshold_ms")?;
        env.apply("PROBE_TIMEOUT", &mut raw.probe_timeout_secs, "probe_timeout_secs")?;

        env.apply("EMAIL_RELAY_URL", &mut raw.email.relay_url, "email.relay_url")?;
        env.apply("EMAIL_API_TOKEN", &mut raw.email.api_token, "email.api_token")?;
        env.apply("EMAIL_FROM", &mut raw.email.from, "email.from")?;
        env.apply("EMAIL_TO", &mut raw.email.to, "email.to")?;

        env.apply("TWILIO_ACCOUNT_SID", &mut raw.sms.account_sid, "sms.account_sid")?;
        env.apply("TWILIO_AUTH_TOKEN", &mut raw.sms.auth_token, "sms.auth_token")?;
        env.apply("TWILIO_FROM", &mut raw.sms.from, "sms.from")?;
        env.apply("TWILIO_TO", &mut raw.sms.to, "sms.to")?;
        env.apply("TWILIO_API_BASE", &mut raw.sms.api_base, "sms.api_base")?;

        raw.validate()
    }
}

struct EnvOverrides<'a, F> {
    lookup: &'a F,
}

impl<F> EnvOverrides<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn apply<T: FromStr>(
        &self,
        suffix: &str,
        slot: &mut Option<T>,
        key: &'static str,
    ) -> Result<(), ConfigError> {
        let Some(value) = (self.lookup)(&format!("{ENV_PREFIX}{suffix}")) else {
            return Ok(());
        };
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        *slot = Some(value.parse().map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        })?);
        Ok(())
    }
}

impl FileConfig {
    fn validate(self) -> Result<Config, ConfigError> {
        let qdrant_url = self.qdrant_url.ok_or(ConfigError::Missing("qdrant_url"))?;
        let target = self.target.ok_or(ConfigError::Missing("target"))?;

        let monitor = MonitorConfig::new(
            target,
            self.refresh_interval_secs.unwrap_or(60),
            self.alert_threshold_ms.unwrap_or(500),
        )?;

        let probe_timeout_secs = self
            .probe_timeout_secs
            .unwrap_or(DEFAULT_PROBE_TIMEOUT.as_secs());
        check_range("probe_timeout_secs", probe_timeout_secs, &(1..=60))?;

        Ok(Config {
            port: self.port.unwrap_or(3000),
            log_level: self.log_level.unwrap_or_else(|| "info".to_string()),
            qdrant_url,
            qdrant_api_key: self.qdrant_api_key,
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            monitor,
            email: self.email.complete()?,
            sms: self.sms.complete()?,
        })
    }
}

impl RawEmail {
    fn complete(self) -> Result<Option<EmailConfig>, ConfigError> {
        if self.relay_url.is_none()
            && self.api_token.is_none()
            && self.from.is_none()
            && self.to.is_none()
        {
            return Ok(None);
        }
        let field = |value: Option<String>, name| {
            value.ok_or(ConfigError::IncompleteChannel {
                channel: "email",
                field: name,
            })
        };

        Ok(Some(EmailConfig {
            relay_url: field(self.relay_url, "relay_url")?,
            api_token: self.api_token,
            from: field(self.from, "from")?,
            to: field(self.to, "to")?,
        }))
    }
}

impl RawSms {
    fn complete(self) -> Result<Option<SmsConfig>, ConfigError> {
        if self.account_sid.is_none()
            && self.auth_token.is_none()
            && self.from.is_none()
            && self.to.is_none()
            && self.api_base.is_none()
        {
            return Ok(None);
        }
        let field = |value: Option<String>, name| {
            value.ok_or(ConfigError::IncompleteChannel {
                channel: "sms",
                field: name,
            })
        };

        Ok(Some(SmsConfig {
            account_sid: field(self.account_sid, "account_sid")?,
            auth_token: field(self.auth_token, "auth_token")?,
            from: field(self.from, "from")?,
            to: field(self.to, "to")?,
            api_base: self
                .api_base
                .unwrap_or_else(|| DEFAULT_TWILIO_API.to_string()),
        }))
    }
}

fn check_range(
    key: &'static str,
    value: u64,
    range: &RangeInclusive<u64>,
) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
