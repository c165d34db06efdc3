//! Incident derivation from deploys and match traffic.
//!
//! Deploy incidents come from a hand-tuned additive risk score per deploy.
//! Load incidents come from a Poisson draw per hour of aggregated match
//! traffic. Neither row keeps a reference to the event that caused it.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sampling::{bernoulli, minute_offset, poisson};
use super::{sort_rows, DeployEvent, DeploySize, Incident, IncidentType, MatchEvent, Severity};
use crate::timeline::floor_to_hour;

/// Summed traffic multiplier per hour. Hours without matches are absent.
pub type HourlyIntensity = BTreeMap<NaiveDateTime, f64>;

/// Weights of the deploy risk score and the load incident model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentRiskModel {
    pub base: f64,
    /// Added when the deploy hour is within `[peak_start_hour, peak_end_hour]`.
    pub peak_hours_bonus: f64,
    pub peak_start_hour: u32,
    pub peak_end_hour: u32,
    /// Added on Tuesday and Wednesday.
    pub midweek_bonus: f64,
    /// Added on Friday within `[friday_start_hour, friday_end_hour]`.
    pub friday_bonus: f64,
    pub friday_start_hour: u32,
    pub friday_end_hour: u32,
    pub critical_fix_bonus: f64,
    pub large_deploy_bonus: f64,
    pub medium_deploy_bonus: f64,
    pub traffic_weight: f64,
    pub traffic_cap: f64,
    pub max_probability: f64,
    /// Hours on each side of a deploy searched for match traffic.
    pub traffic_radius_hours: i64,
    pub high_severity_probability: f64,
    pub medium_severity_probability: f64,
    /// Expected load incidents per unit of hourly intensity.
    pub load_rate_per_intensity: f64,
    pub high_severity_intensity: f64,
    pub medium_severity_intensity: f64,
}

impl Default for IncidentRiskModel {
    fn default() -> Self {
        Self {
            base: 0.010,
            peak_hours_bonus: 0.040,
            peak_start_hour: 16,
            peak_end_hour: 18,
            midweek_bonus: 0.010,
            friday_bonus: 0.025,
            friday_start_hour: 15,
            friday_end_hour: 18,
            critical_fix_bonus: 0.020,
            large_deploy_bonus: 0.030,
            medium_deploy_bonus: 0.015,
            traffic_weight: 0.02,
            traffic_cap: 0.08,
            max_probability: 0.95,
            traffic_radius_hours: 2,
            high_severity_probability: 0.12,
            medium_severity_probability: 0.07,
            load_rate_per_intensity: 0.03,
            high_severity_intensity: 4.5,
            medium_severity_intensity: 3.0,
        }
    }
}

impl IncidentRiskModel {
    /// Incident probability for one deploy, clamped to `[0, max_probability]`.
    pub fn deploy_incident_probability(&self, deploy: &DeployEvent, nearby_intensity: f64) -> f64 {
        let ts = deploy.timestamp;
        let day = ts.weekday();
        let hour = ts.hour();

        let mut p = self.base;
        if hour >= self.peak_start_hour && hour <= self.peak_end_hour {
            p += self.peak_hours_bonus;
        }
        if matches!(day, Weekday::Tue | Weekday::Wed) {
            p += self.midweek_bonus;
        }
        if day == Weekday::Fri && hour >= self.friday_start_hour && hour <= self.friday_end_hour {
            p += self.friday_bonus;
        }
        if deploy.is_critical_fix {
            p += self.critical_fix_bonus;
        }
        match deploy.deploy_size {
            DeploySize::Large => p += self.large_deploy_bonus,
            DeploySize::Medium => p += self.medium_deploy_bonus,
            DeploySize::Small => {}
        }
        p += self.traffic_cap.min(nearby_intensity * self.traffic_weight);

        if p.is_nan() {
            return 0.0;
        }
        p.clamp(0.0, self.max_probability.clamp(0.0, 1.0))
    }

    pub fn deploy_severity(&self, p: f64) -> Severity {
        if p >= self.high_severity_probability {
            Severity::High
        } else if p >= self.medium_severity_probability {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn load_severity(&self, intensity: f64) -> Severity {
        if intensity >= self.high_severity_intensity {
            Severity::High
        } else if intensity >= self.medium_severity_intensity {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn load_rate(&self, intensity: f64) -> f64 {
        (self.load_rate_per_intensity * intensity).max(0.0)
    }
}

/// Sum match traffic per floored hour.
pub fn hourly_match_intensity(matches: &[MatchEvent]) -> HourlyIntensity {
    let mut hourly = HourlyIntensity::new();
    for m in matches {
        *hourly.entry(floor_to_hour(m.timestamp)).or_insert(0.0) += m.traffic_multiplier;
    }
    hourly
}

/// Peak hourly intensity within `radius_hours` of the hour containing `ts`.
///
/// Hours with no matches count as zero rather than being skipped.
pub fn nearby_match_intensity(hourly: &HourlyIntensity, ts: NaiveDateTime, radius_hours: i64) -> f64 {
    let center = floor_to_hour(ts);
    (-radius_hours..=radius_hours)
        .map(|offset| {
            hourly
                .get(&(center + Duration::hours(offset)))
                .copied()
                .unwrap_or(0.0)
        })
        .fold(0.0, f64::max)
}

pub struct IncidentGenerator<'a> {
    model: &'a IncidentRiskModel,
}

impl<'a> IncidentGenerator<'a> {
    pub fn new(model: &'a IncidentRiskModel) -> Self {
        Self { model }
    }

    pub fn generate<R: Rng + ?Sized>(&self, deploys: &[DeployEvent], matches: &[MatchEvent], rng: &mut R) -> Vec<Incident> {
        let model = self.model;
        let hourly = hourly_match_intensity(matches);
        let mut rows = Vec::new();

        for deploy in deploys {
            let nearby = nearby_match_intensity(&hourly, deploy.timestamp, model.traffic_radius_hours);
            let p = model.deploy_incident_probability(deploy, nearby);
            if bernoulli(rng, p) {
                rows.push(Incident {
                    timestamp: deploy.timestamp,
                    incident_type: IncidentType::DeployIncident,
                    severity: model.deploy_severity(p),
                });
            }
        }
        let deploy_incidents = rows.len();

        for (&hour_ts, &intensity) in &hourly {
            let n_load = poisson(rng, model.load_rate(intensity));
            for _ in 0..n_load {
                rows.push(Incident {
                    timestamp: hour_ts + Duration::minutes(minute_offset(rng)),
                    incident_type: IncidentType::LoadIncident,
                    severity: model.load_severity(intensity),
                });
            }
        }

        sort_rows(&mut rows);
        debug!(
            deploy_incidents,
            load_incidents = rows.len() - deploy_incidents,
            traffic_hours = hourly.len(),
            "generated incidents"
        );
        rows
    }
}

/// Generate incidents with the default risk model.
pub fn generate_incidents<R: Rng + ?Sized>(deploys: &[DeployEvent], matches: &[MatchEvent], rng: &mut R) -> Vec<Incident> {
    IncidentGenerator::new(&IncidentRiskModel::default()).generate(deploys, matches, rng)
}
