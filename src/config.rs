//! TOML configuration for the generators.
//!
//! Every section has compiled-in defaults, so an empty file (or no file at
//! all) reproduces the stock calendar, rate table and risk model.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::generate::deploys::{DayRates, DeployConfig, SizeWeights};
use crate::generate::incidents::IncidentRiskModel;
use crate::generate::matches::MatchConfig;

/// Environment variable naming a config file to load.
pub const CONFIG_ENV: &str = "RISKGEN_CONFIG";

/// Config file picked up from the working directory.
pub const LOCAL_CONFIG: &str = "riskgen.toml";

/// Widest traffic lookup around a deploy, one week either side.
pub const MAX_TRAFFIC_RADIUS_HOURS: i64 = 24 * 7;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field}: probability {value} is outside [0, 1]")]
    Probability { field: String, value: f64 },
    #[error("{field}: rate {value} must be a finite non-negative number")]
    Rate { field: String, value: f64 },
    #[error("{field}: hour range {start}..{end} is not within 0..24 or is empty")]
    HourRange { field: String, start: u32, end: u32 },
    #[error("{field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Fixed seed for reproducible output. Unset means fresh entropy per run.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub matches: MatchConfig,
    #[serde(default)]
    pub deploys: DeployConfig,
    #[serde(default)]
    pub incidents: IncidentRiskModel,
}

impl GeneratorConfig {
    /// Load and validate configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("failed to load config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded generator configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Try, in order: `$RISKGEN_CONFIG`, `./riskgen.toml`, compiled-in defaults.
    pub fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "{} set but file could not be loaded, trying fallback",
                        CONFIG_ENV
                    );
                }
            }
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            match Self::load(local) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %local.display(),
                        error = %e,
                        "local config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize configuration")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_matches()?;
        self.validate_deploys()?;
        self.validate_incidents()
    }

    fn validate_matches(&self) -> Result<(), ConfigError> {
        let m = &self.matches;
        if !(m.traffic_std_dev.is_finite() && m.traffic_std_dev > 0.0) {
            return Err(invalid("matches.traffic_std_dev", "must be a positive number"));
        }
        if !(m.multiplier_floor.is_finite() && m.multiplier_ceiling.is_finite())
            || m.multiplier_floor > m.multiplier_ceiling
        {
            return Err(invalid(
                "matches.multiplier_floor",
                "must be finite and not exceed multiplier_ceiling",
            ));
        }
        for (i, w) in m.windows.iter().enumerate() {
            let field = format!("matches.windows[{}]", i);
            check_hours(&field, w.start_hour, w.end_hour)?;
            check_probability(&format!("{}.probability", field), w.probability)?;
            if !w.base_intensity.is_finite() {
                return Err(invalid(&format!("{}.base_intensity", field), "must be finite"));
            }
            if w.days.is_empty() {
                return Err(invalid(&format!("{}.days", field), "at least one weekday is required"));
            }
        }
        Ok(())
    }

    fn validate_deploys(&self) -> Result<(), ConfigError> {
        let d = &self.deploys;
        check_day_rates("deploys.rates.mon_thu", &d.rates.mon_thu)?;
        check_day_rates("deploys.rates.friday", &d.rates.friday)?;
        check_day_rates("deploys.rates.weekend", &d.rates.weekend)?;

        check_probability("deploys.critical.base", d.critical.base)?;
        check_probability("deploys.critical.weekend", d.critical.weekend)?;
        if !d.critical.friday_rush_bonus.is_finite() {
            return Err(invalid("deploys.critical.friday_rush_bonus", "must be finite"));
        }
        if d.critical.friday_rush_start > d.critical.friday_rush_end || d.critical.friday_rush_end > 23 {
            return Err(ConfigError::HourRange {
                field: "deploys.critical.friday_rush".to_string(),
                start: d.critical.friday_rush_start,
                end: d.critical.friday_rush_end,
            });
        }

        check_size_weights("deploys.sizes.critical", &d.sizes.critical)?;
        check_size_weights("deploys.sizes.routine", &d.sizes.routine)
    }

    fn validate_incidents(&self) -> Result<(), ConfigError> {
        let r = &self.incidents;
        check_probability("incidents.max_probability", r.max_probability)?;
        check_rate("incidents.load_rate_per_intensity", r.load_rate_per_intensity)?;
        if !(0..=MAX_TRAFFIC_RADIUS_HOURS).contains(&r.traffic_radius_hours) {
            return Err(invalid(
                "incidents.traffic_radius_hours",
                &format!("must be between 0 and {}", MAX_TRAFFIC_RADIUS_HOURS),
            ));
        }
        for (field, value) in [
            ("incidents.base", r.base),
            ("incidents.peak_hours_bonus", r.peak_hours_bonus),
            ("incidents.midweek_bonus", r.midweek_bonus),
            ("incidents.friday_bonus", r.friday_bonus),
            ("incidents.critical_fix_bonus", r.critical_fix_bonus),
            ("incidents.large_deploy_bonus", r.large_deploy_bonus),
            ("incidents.medium_deploy_bonus", r.medium_deploy_bonus),
            ("incidents.traffic_weight", r.traffic_weight),
            ("incidents.traffic_cap", r.traffic_cap),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability {
            field: field.to_string(),
            value,
        })
    }
}

fn check_rate(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Rate {
            field: field.to_string(),
            value,
        })
    }
}

fn check_hours(field: &str, start: u32, end: u32) -> Result<(), ConfigError> {
    if start < end && end <= 24 {
        Ok(())
    } else {
        Err(ConfigError::HourRange {
            field: field.to_string(),
            start,
            end,
        })
    }
}

fn check_day_rates(field: &str, day: &DayRates) -> Result<(), ConfigError> {
    check_rate(&format!("{}.baseline", field), day.baseline)?;
    for (i, band) in day.bands.iter().enumerate() {
        let band_field = format!("{}.bands[{}]", field, i);
        check_hours(&band_field, band.start_hour, band.end_hour)?;
        check_rate(&format!("{}.rate", band_field), band.rate)?;
    }
    Ok(())
}

fn check_size_weights(field: &str, weights: &SizeWeights) -> Result<(), ConfigError> {
    for (name, w) in [("small", weights.small), ("medium", weights.medium), ("large", weights.large)] {
        check_rate(&format!("{}.{}", field, name), w)?;
    }
    if weights.total() <= 0.0 {
        return Err(invalid(field, "at least one size needs a positive weight"));
    }
    Ok(())
}
