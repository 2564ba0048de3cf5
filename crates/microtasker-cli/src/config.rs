use figment::{Figment, providers::{Format, Toml, Env}};
use microtasker_core::capture::{CaptureParser, TagVocabulary};
use microtasker_core::error::CoreError;
use microtasker_core::recurrence::{MonthEndPolicy, RecurrenceConfig, RecurrenceGenerator};
use microtasker_core::timezone::{validate_timezone, Today};
use serde::Deserialize;
use std::collections::HashMap;

pub const ENV_PREFIX: &str = "MTASK_";
const DEFAULT_DATABASE_PATH: &str = "microtasker.db";

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// IANA name of the zone "today" is computed in
    #[serde(default = "detect_system_timezone")]
    pub timezone: String,
    /// Filter expressions `list` applies when given no query
    #[serde(default)]
    pub default_filters: Vec<String>,
    #[serde(default)]
    pub recurrence: RecurrenceSettings,
    #[serde(default)]
    pub capture: CaptureSettings,
}

#[derive(Deserialize, Debug, Default)]
pub struct RecurrenceSettings {
    #[serde(default)]
    pub month_end: MonthEndPolicy,
}

/// Quick-capture vocabulary overrides
#[derive(Deserialize, Debug, Default)]
pub struct CaptureSettings {
    /// Whether `#medium` also sets the 5-10 min estimate
    #[serde(default)]
    pub medium_sets_estimate: bool,
    /// Extra tags, e.g. `deep = "estimate:10+ min"` or `soon = "due:+3"`
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn today(&self) -> Result<Today, CoreError> {
        Ok(Today::now(validate_timezone(&self.timezone)?))
    }

    pub fn capture_parser(&self) -> Result<CaptureParser, CoreError> {
        let vocabulary =
            TagVocabulary::from_config(self.capture.medium_sets_estimate, &self.capture.tags)?;
        Ok(CaptureParser::new(vocabulary))
    }

    pub fn recurrence_generator(&self) -> RecurrenceGenerator {
        RecurrenceGenerator::new(RecurrenceConfig {
            month_end: self.recurrence.month_end,
        })
    }
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if !tz.is_empty() && validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    "UTC".to_string()
}
