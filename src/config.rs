use std::env;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

pub const DEFAULT_WEEK_LENGTH_DAYS: u32 = 7;

/// Friday, counting weekdays from Sunday = 0.
pub const DEFAULT_STATEMENT_CLOSE_DAY: u32 = 5;

/// Options recognized by the aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EngineConfig {
    /// Length of every bucket, in days.
    pub week_length_days: u32,
    /// Weekday (0 = Sunday .. 6 = Saturday) on which each bucket starts.
    pub statement_close_day: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            week_length_days: DEFAULT_WEEK_LENGTH_DAYS,
            statement_close_day: DEFAULT_STATEMENT_CLOSE_DAY,
        }
    }
}

impl EngineConfig {
    pub fn new(week_length_days: u32, statement_close_day: u32) -> EngineResult<Self> {
        if week_length_days == 0 {
            return Err(EngineError::Validation(
                "week length must be at least one day".into(),
            ));
        }
        if statement_close_day > 6 {
            return Err(EngineError::Validation(format!(
                "statement close day must be between 0 and 6, got {}",
                statement_close_day
            )));
        }
        Ok(Self {
            week_length_days,
            statement_close_day,
        })
    }

    /// Read options from a host-supplied JSON object.
    ///
    /// Unknown keys are ignored. Values that are missing or out of range keep
    /// their defaults.
    pub fn from_json(options: &Value) -> Self {
        let defaults = Self::default();
        let week_length_days = read_option(
            options,
            &["weekLengthDays", "week_length_days"],
            |v| v > 0,
        )
        .unwrap_or(defaults.week_length_days);
        let statement_close_day = read_option(
            options,
            &["statementCloseDay", "statement_close_day"],
            |v| v <= 6,
        )
        .unwrap_or(defaults.statement_close_day);

        Self {
            week_length_days,
            statement_close_day,
        }
    }

    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source using the `SPENDSCOPE_*` names.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let week_length_days = parse_var(&lookup, "SPENDSCOPE_WEEK_LENGTH_DAYS", |v| v > 0)
            .unwrap_or(defaults.week_length_days);
        let statement_close_day =
            parse_var(&lookup, "SPENDSCOPE_STATEMENT_CLOSE_DAY", |v| v <= 6)
                .unwrap_or(defaults.statement_close_day);

        Self {
            week_length_days,
            statement_close_day,
        }
    }
}

fn read_option(options: &Value, keys: &[&str], valid: impl Fn(u32) -> bool) -> Option<u32> {
    let (key, raw) = keys
        .iter()
        .find_map(|key| options.get(*key).map(|v| (*key, v)))?;
    let parsed = raw.as_u64().and_then(|v| u32::try_from(v).ok());
    match parsed {
        Some(v) if valid(v) => Some(v),
        _ => {
            warn!(option = key, value = %raw, "Ignoring invalid engine option");
            None
        }
    }
}

fn parse_var<F>(lookup: &F, key: &str, valid: impl Fn(u32) -> bool) -> Option<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u32>() {
        Ok(v) if valid(v) => Some(v),
        _ => {
            warn!(variable = key, value = %raw, "Ignoring invalid environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.week_length_days, 7);
        assert_eq!(config.statement_close_day, 5);
    }

    #[test]
    fn test_new_validates() {
        assert!(EngineConfig::new(0, 5).is_err());
        assert!(EngineConfig::new(7, 7).is_err());
        let config = EngineConfig::new(14, 0).unwrap();
        assert_eq!(config.week_length_days, 14);
        assert_eq!(config.statement_close_day, 0);
    }

    #[test]
    fn test_from_json_reads_known_keys_and_ignores_others() {
        let config = EngineConfig::from_json(&json!({
            "weekLengthDays": 14,
            "statementCloseDay": 1,
            "theme": "dark"
        }));
        assert_eq!(config, EngineConfig::new(14, 1).unwrap());
    }

    #[test]
    fn test_from_json_accepts_snake_case() {
        let config = EngineConfig::from_json(&json!({ "statement_close_day": 3 }));
        assert_eq!(config.statement_close_day, 3);
        assert_eq!(config.week_length_days, 7);
    }

    #[test]
    fn test_from_json_invalid_values_fall_back() {
        let config = EngineConfig::from_json(&json!({
            "weekLengthDays": 0,
            "statementCloseDay": "monday"
        }));
        assert_eq!(config, EngineConfig::default());

        let config = EngineConfig::from_json(&json!("not an object"));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SPENDSCOPE_WEEK_LENGTH_DAYS", "10"),
            ("SPENDSCOPE_STATEMENT_CLOSE_DAY", "9"),
        ]);
        let config = EngineConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.week_length_days, 10);
        assert_eq!(config.statement_close_day, DEFAULT_STATEMENT_CLOSE_DAY);
    }
}
