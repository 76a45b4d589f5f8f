//! Process-wide configuration: server/database settings and the
//! priority-window loader (spec §4.3, §9 "Open question").

use cleanroute_domain::{PriorityWindow, PriorityWindows};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Server/storage configuration loaded from environment variables, in the
/// style of the ambient `AppConfig::from_env` convention.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub algorithm_version: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(Self {
            database_url: env_var("DATABASE_URL")?,
            bind_address: env_var_or("BIND_ADDRESS", "0.0.0.0:8080"),
            algorithm_version: env_var_or("ALGORITHM_VERSION", "cleanroute-1"),
            log_level: env_var_or("RUST_LOG", "info"),
        })
    }
}

fn env_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// The priority-window settings plus the keys that fell back to their
/// defaults, so the caller can emit `PHASE3_SETTINGS_FALLBACK_USED`
/// (spec §4.3).
#[derive(Debug, Clone)]
pub struct PriorityWindowLoadResult {
    pub windows: PriorityWindows,
    pub defaulted_keys: Vec<String>,
}

fn env_i64(key: &str) -> Option<i64> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Load the EO/HP/LP windows from environment settings, substituting the
/// documented defaults (spec §4.3's table) for any missing key.
///
/// Resolves the `eo_time`/`eo_end_time` inconsistency per spec §9: a present
/// `EO_END_MIN` is authoritative; if only the legacy `EO_TIME` is set, it is
/// treated as the window's end and the start keeps its documented default.
pub fn load_priority_windows() -> PriorityWindowLoadResult {
    dotenvy::dotenv().ok();
    let defaults = PriorityWindows::default();
    let mut defaulted_keys = Vec::new();

    let eo_start = env_i64("EO_START_MIN").unwrap_or_else(|| {
        defaulted_keys.push("EO_START_MIN".to_string());
        defaults.eo.start_min
    });
    let eo_end = match env_i64("EO_END_MIN") {
        Some(v) => v,
        None => match env_i64("EO_TIME") {
            Some(legacy) => {
                defaulted_keys.push("EO_END_MIN (derived from legacy EO_TIME)".to_string());
                legacy
            }
            None => {
                defaulted_keys.push("EO_END_MIN".to_string());
                defaults.eo.end_min.unwrap()
            }
        },
    };

    let hp_start = env_i64("HP_START_MIN").unwrap_or_else(|| {
        defaulted_keys.push("HP_START_MIN".to_string());
        defaults.hp.start_min
    });
    let hp_end = env_i64("HP_END_MIN").unwrap_or_else(|| {
        defaulted_keys.push("HP_END_MIN".to_string());
        defaults.hp.end_min.unwrap()
    });

    let lp_start = env_i64("LP_START_MIN").unwrap_or_else(|| {
        defaulted_keys.push("LP_START_MIN".to_string());
        defaults.lp.start_min
    });

    PriorityWindowLoadResult {
        windows: PriorityWindows {
            eo: PriorityWindow { start_min: eo_start, end_min: Some(eo_end), ..defaults.eo },
            hp: PriorityWindow { start_min: hp_start, end_min: Some(hp_end), ..defaults.hp },
            lp: PriorityWindow { start_min: lp_start, end_min: None, ..defaults.lp },
        },
        defaulted_keys,
    }
}
