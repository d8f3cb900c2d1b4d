// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::reminder::ReminderSettings;

const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const MAX_REMINDER_SPAN_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_address: String,
    pub smtp: SmtpConfig,
    pub reminder: ReminderSettings,
}

impl Config {
    /// Reads the process environment. Call `dotenv().ok()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let username = required("SMTP_USERNAME")?;
        let smtp = SmtpConfig {
            host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port: parse_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            password: required("SMTP_PASSWORD")?,
            from: lookup("EMAIL_FROM").unwrap_or_else(|| username.clone()),
            username,
        };

        let defaults = ReminderSettings::default();
        let lead_minutes: u64 = parse_or(&lookup, "REMINDER_LEAD_MINUTES", defaults.lead.as_secs() / 60)?;
        let window_secs: u64 = parse_or(&lookup, "REMINDER_WINDOW_SECS", defaults.window.as_secs())?;
        let poll_secs: u64 = parse_or(&lookup, "REMINDER_POLL_SECS", defaults.poll_interval.as_secs())?;

        let lead_secs = lead_minutes
            .checked_mul(60)
            .filter(|secs| *secs <= MAX_REMINDER_SPAN_SECS)
            .ok_or(ConfigError::Invalid { key: "REMINDER_LEAD_MINUTES", value: lead_minutes.to_string() })?;
        let window_secs = bounded_secs("REMINDER_WINDOW_SECS", window_secs)?;
        let poll_secs = bounded_secs("REMINDER_POLL_SECS", poll_secs)?;

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            server_address: lookup("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
            smtp,
            reminder: ReminderSettings {
                lead: Duration::from_secs(lead_secs),
                window: Duration::from_secs(window_secs),
                poll_interval: Duration::from_secs(poll_secs),
            },
        })
    }
}

// Window and poll interval must be non-zero; all three stay within a week.
fn bounded_secs(key: &'static str, secs: u64) -> Result<u64, ConfigError> {
    if secs == 0 || secs > MAX_REMINDER_SPAN_SECS {
        return Err(ConfigError::Invalid { key, value: secs.to_string() });
    }
    Ok(secs)
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
