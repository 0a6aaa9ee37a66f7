use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

use crate::giveaway::scheduler::SchedulerConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),
    #[error("environment variable {0} has an invalid value: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub debug: bool,
    pub scheduler: SchedulerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let or_default =
            |name: &'static str, default: &str| lookup(name).unwrap_or(default.to_string());

        let db_username = or_default("DB_USER", "postgres");
        let db_password = required("DB_PASSWORD")?;
        let db_host = or_default("DB_HOST", "localhost");
        let db_port = or_default("DB_PORT", "5432");
        let db_name = or_default("DB_NAME", "postgres");

        let defaults = SchedulerConfig::default();
        let scheduler = SchedulerConfig {
            interval: Duration::from_secs(parse(
                &lookup,
                "GIVEAWAY_TICK_SECONDS",
                defaults.interval.as_secs(),
            )?),
            initial_delay: Duration::from_secs(parse(
                &lookup,
                "GIVEAWAY_INITIAL_DELAY_SECONDS",
                defaults.initial_delay.as_secs(),
            )?),
            batch_size: parse(&lookup, "GIVEAWAY_BATCH_SIZE", defaults.batch_size)?,
        };
        if scheduler.batch_size == 0 {
            return Err(ConfigError::Invalid("GIVEAWAY_BATCH_SIZE", "0".to_string()));
        }

        Ok(Config {
            discord_token: required("DISCORD_TOKEN")?,
            database_url: format!(
                "postgres://{db_username}:{db_password}@{db_host}:{db_port}/{db_name}"
            ),
            debug: lookup("DEBUG").as_deref() == Some("true"),
            scheduler,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, value)),
        None => Ok(default),
    }
}
