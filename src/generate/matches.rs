//! Tournament traffic windows and the match event generator.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sampling::{bernoulli, clamped_normal};
use super::{sort_rows, MatchEvent};
use crate::timeline::hours_between;

/// A recurring slot in which a tournament may drive extra traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentWindow {
    pub name: String,
    pub days: Vec<Weekday>,
    /// First hour of day covered.
    pub start_hour: u32,
    /// Exclusive end hour.
    pub end_hour: u32,
    /// Mean traffic multiplier when the window fires.
    pub base_intensity: f64,
    /// Chance that a covered hour actually carries a match.
    pub probability: f64,
}

impl TournamentWindow {
    fn new(name: &str, days: &[Weekday], hours: std::ops::Range<u32>, base_intensity: f64, probability: f64) -> Self {
        Self {
            name: name.to_string(),
            days: days.to_vec(),
            start_hour: hours.start,
            end_hour: hours.end,
            base_intensity,
            probability,
        }
    }

    /// Whether both the weekday and hour of `ts` fall in this window.
    pub fn covers(&self, ts: NaiveDateTime) -> bool {
        let hour = ts.hour();
        self.days.contains(&ts.weekday()) && hour >= self.start_hour && hour < self.end_hour
    }
}

/// Return the built-in tournament calendar.
pub fn default_windows() -> Vec<TournamentWindow> {
    use Weekday::*;
    vec![
        TournamentWindow::new("Brasileirao", &[Wed, Thu], 19..22, 1.7, 0.80),
        TournamentWindow::new("Champions League", &[Wed], 15..22, 2.1, 0.65),
        TournamentWindow::new("Europa League", &[Thu], 15..22, 1.8, 0.60),
        TournamentWindow::new("Libertadores", &[Wed, Thu], 19..22, 1.9, 0.75),
        TournamentWindow::new("Weekend matches", &[Sat, Sun], 16..21, 2.0, 0.85),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Standard deviation of the traffic multiplier around a window's base.
    pub traffic_std_dev: f64,
    pub multiplier_floor: f64,
    pub multiplier_ceiling: f64,
    pub windows: Vec<TournamentWindow>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            traffic_std_dev: 0.20,
            multiplier_floor: 1.0,
            multiplier_ceiling: 3.2,
            windows: default_windows(),
        }
    }
}

pub struct MatchEventGenerator<'a> {
    config: &'a MatchConfig,
}

impl<'a> MatchEventGenerator<'a> {
    pub fn new(config: &'a MatchConfig) -> Self {
        Self { config }
    }

    /// One independent trial per (hour, covering window) pair.
    pub fn generate<R: Rng + ?Sized>(&self, start: NaiveDateTime, end: NaiveDateTime, rng: &mut R) -> Vec<MatchEvent> {
        let cfg = self.config;
        let mut rows = Vec::new();

        for ts in hours_between(start, end) {
            for window in cfg.windows.iter().filter(|w| w.covers(ts)) {
                if !bernoulli(rng, window.probability) {
                    continue;
                }
                let multiplier = clamped_normal(
                    rng,
                    window.base_intensity,
                    cfg.traffic_std_dev,
                    cfg.multiplier_floor,
                    cfg.multiplier_ceiling,
                );
                rows.push(MatchEvent {
                    timestamp: ts,
                    tournament: window.name.clone(),
                    traffic_multiplier: multiplier,
                });
            }
        }

        sort_rows(&mut rows);
        debug!(rows = rows.len(), %start, %end, "generated match events");
        rows
    }
}

/// Generate match events with the default tournament calendar.
pub fn generate_match_events<R: Rng + ?Sized>(start: NaiveDateTime, end: NaiveDateTime, rng: &mut R) -> Vec<MatchEvent> {
    MatchEventGenerator::new(&MatchConfig::default()).generate(start, end, rng)
}
