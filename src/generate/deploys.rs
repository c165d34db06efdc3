//! Deploy activity: hourly Poisson rates, critical-fix odds and size mix.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sampling::{bernoulli, minute_offset, poisson, weighted_choice};
use super::{sort_rows, DeployEvent, DeploySize};
use crate::timeline::{hours_between, is_weekend};

/// A block of hours `[start_hour, end_hour)` with its own deploy rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub start_hour: u32,
    pub end_hour: u32,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRates {
    /// Rate for hours not covered by any band.
    pub baseline: f64,
    #[serde(default)]
    pub bands: Vec<RateBand>,
}

impl DayRates {
    fn banded(baseline: f64, bands: &[(u32, u32, f64)]) -> Self {
        Self {
            baseline,
            bands: bands
                .iter()
                .map(|&(start_hour, end_hour, rate)| RateBand { start_hour, end_hour, rate })
                .collect(),
        }
    }

    /// First matching band wins.
    pub fn rate_at(&self, hour: u32) -> f64 {
        self.bands
            .iter()
            .find(|b| hour >= b.start_hour && hour < b.end_hour)
            .map(|b| b.rate)
            .unwrap_or(self.baseline)
    }
}

/// Expected deploys per hour, keyed by day class and hour of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployRateProfile {
    pub mon_thu: DayRates,
    pub friday: DayRates,
    pub weekend: DayRates,
}

impl Default for DeployRateProfile {
    fn default() -> Self {
        Self {
            mon_thu: DayRates::banded(0.08, &[(9, 12, 0.9), (12, 16, 1.1), (16, 18, 1.7), (18, 22, 0.7)]),
            friday: DayRates::banded(0.06, &[(10, 15, 0.55), (15, 17, 1.0), (17, 20, 0.45)]),
            weekend: DayRates::banded(0.03, &[]),
        }
    }
}

impl DeployRateProfile {
    pub fn for_day(&self, day: Weekday) -> &DayRates {
        match day {
            Weekday::Fri => &self.friday,
            Weekday::Sat | Weekday::Sun => &self.weekend,
            _ => &self.mon_thu,
        }
    }

    /// Poisson rate for the hour starting at `ts`.
    pub fn rate_at(&self, ts: NaiveDateTime) -> f64 {
        self.for_day(ts.weekday()).rate_at(ts.hour())
    }
}

/// Odds that a deploy is an urgent fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalFixPolicy {
    pub base: f64,
    /// Replaces `base` on Saturday and Sunday.
    pub weekend: f64,
    /// Added on Friday between the rush hours, inclusive.
    pub friday_rush_bonus: f64,
    pub friday_rush_start: u32,
    pub friday_rush_end: u32,
}

impl Default for CriticalFixPolicy {
    fn default() -> Self {
        Self {
            base: 0.07,
            weekend: 0.22,
            friday_rush_bonus: 0.10,
            friday_rush_start: 15,
            friday_rush_end: 18,
        }
    }
}

impl CriticalFixPolicy {
    pub fn probability_at(&self, ts: NaiveDateTime) -> f64 {
        let day = ts.weekday();
        let hour = ts.hour();
        let mut p = if is_weekend(day) { self.weekend } else { self.base };
        if day == Weekday::Fri && hour >= self.friday_rush_start && hour <= self.friday_rush_end {
            p += self.friday_rush_bonus;
        }
        p
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeWeights {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

impl SizeWeights {
    fn options(&self) -> [(DeploySize, f64); 3] {
        [
            (DeploySize::Small, self.small),
            (DeploySize::Medium, self.medium),
            (DeploySize::Large, self.large),
        ]
    }

    pub fn total(&self) -> f64 {
        self.small.max(0.0) + self.medium.max(0.0) + self.large.max(0.0)
    }
}

/// Size distributions for critical and routine deploys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeMix {
    pub critical: SizeWeights,
    pub routine: SizeWeights,
}

impl Default for SizeMix {
    fn default() -> Self {
        Self {
            critical: SizeWeights { small: 0.70, medium: 0.30, large: 0.0 },
            routine: SizeWeights { small: 0.45, medium: 0.40, large: 0.15 },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub rates: DeployRateProfile,
    pub critical: CriticalFixPolicy,
    pub sizes: SizeMix,
}

pub struct DeployEventGenerator<'a> {
    config: &'a DeployConfig,
}

impl<'a> DeployEventGenerator<'a> {
    pub fn new(config: &'a DeployConfig) -> Self {
        Self { config }
    }

    pub fn generate<R: Rng + ?Sized>(&self, start: NaiveDateTime, end: NaiveDateTime, rng: &mut R) -> Vec<DeployEvent> {
        let cfg = self.config;
        let mut rows = Vec::new();

        for hour_ts in hours_between(start, end) {
            let n_deploys = poisson(rng, cfg.rates.rate_at(hour_ts));
            let p_critical = cfg.critical.probability_at(hour_ts);

            for _ in 0..n_deploys {
                let timestamp = hour_ts + Duration::minutes(minute_offset(rng));
                let is_critical_fix = bernoulli(rng, p_critical);
                let weights = if is_critical_fix { &cfg.sizes.critical } else { &cfg.sizes.routine };
                let deploy_size = weighted_choice(rng, &weights.options());
                rows.push(DeployEvent { timestamp, is_critical_fix, deploy_size });
            }
        }

        sort_rows(&mut rows);
        debug!(rows = rows.len(), %start, %end, "generated deploy events");
        rows
    }
}

/// Generate deploy events with the default rate profile.
pub fn generate_deploy_events<R: Rng + ?Sized>(start: NaiveDateTime, end: NaiveDateTime, rng: &mut R) -> Vec<DeployEvent> {
    DeployEventGenerator::new(&DeployConfig::default()).generate(start, end, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::sampling::rng_from_seed;
    use crate::timeline::parse_timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_rate_table() {
        let rates = DeployRateProfile::default();
        // 2024-01-01 Monday, 2024-01-05 Friday, 2024-01-06 Saturday
        assert_eq!(rates.rate_at(ts("2024-01-01 03:00")), 0.08);
        assert_eq!(rates.rate_at(ts("2024-01-01 09:00")), 0.9);
        assert_eq!(rates.rate_at(ts("2024-01-01 12:00")), 1.1);
        assert_eq!(rates.rate_at(ts("2024-01-01 17:00")), 1.7);
        assert_eq!(rates.rate_at(ts("2024-01-04 21:00")), 0.7);
        assert_eq!(rates.rate_at(ts("2024-01-04 22:00")), 0.08);
        assert_eq!(rates.rate_at(ts("2024-01-05 10:00")), 0.55);
        assert_eq!(rates.rate_at(ts("2024-01-05 16:00")), 1.0);
        assert_eq!(rates.rate_at(ts("2024-01-05 19:00")), 0.45);
        assert_eq!(rates.rate_at(ts("2024-01-05 20:00")), 0.06);
        assert_eq!(rates.rate_at(ts("2024-01-06 17:00")), 0.03);
        assert_eq!(rates.rate_at(ts("2024-01-07 12:00")), 0.03);
    }

    #[test]
    fn test_critical_probability() {
        let policy = CriticalFixPolicy::default();
        assert!((policy.probability_at(ts("2024-01-02 10:00")) - 0.07).abs() < 1e-12);
        assert!((policy.probability_at(ts("2024-01-06 10:00")) - 0.22).abs() < 1e-12);
        assert!((policy.probability_at(ts("2024-01-05 15:00")) - 0.17).abs() < 1e-12);
        assert!((policy.probability_at(ts("2024-01-05 18:00")) - 0.17).abs() < 1e-12);
        assert!((policy.probability_at(ts("2024-01-05 19:00")) - 0.07).abs() < 1e-12);
    }

    #[test]
    fn test_critical_fixes_are_never_large() {
        let mut rng = rng_from_seed(Some(21));
        let rows = generate_deploy_events(ts("2024-01-01"), ts("2024-02-29 23:00"), &mut rng);
        assert!(rows.iter().any(|r| r.is_critical_fix));
        assert!(rows
            .iter()
            .filter(|r| r.is_critical_fix)
            .all(|r| r.deploy_size != DeploySize::Large));
    }

    #[test]
    fn test_deploys_stay_inside_their_hour() {
        let mut rng = rng_from_seed(Some(22));
        let hour = ts("2024-01-01 17:00");
        for _ in 0..200 {
            for row in generate_deploy_events(hour, hour, &mut rng) {
                assert!(row.timestamp >= hour && row.timestamp < hour + Duration::hours(1));
            }
        }
    }

    #[test]
    fn test_sorted_output() {
        let mut rng = rng_from_seed(Some(23));
        let rows = generate_deploy_events(ts("2024-01-01"), ts("2024-01-14 23:00"), &mut rng);
        assert!(rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
