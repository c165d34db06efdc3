//! Row types and generators for the three synthetic tables.

pub mod deploys;
pub mod incidents;
pub mod matches;
pub mod sampling;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use deploys::{generate_deploy_events, DeployEventGenerator};
pub use incidents::{generate_incidents, IncidentGenerator};
pub use matches::{generate_match_events, MatchEventGenerator};

/// Rows that carry a timestamp and can be ordered by it.
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDateTime;
}

/// Stable ascending sort by timestamp. Ties keep generation order.
pub fn sort_rows<T: Timestamped>(rows: &mut [T]) {
    rows.sort_by_key(|r| r.timestamp());
}

/// A high-traffic hour produced by a tournament window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub timestamp: NaiveDateTime,
    pub tournament: String,
    pub traffic_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploySize {
    Small,
    Medium,
    Large,
}

impl DeploySize {
    pub const ALL: [DeploySize; 3] = [DeploySize::Small, DeploySize::Medium, DeploySize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploySize::Small => "small",
            DeploySize::Medium => "medium",
            DeploySize::Large => "large",
        }
    }
}

impl fmt::Display for DeploySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployEvent {
    pub timestamp: NaiveDateTime,
    pub is_critical_fix: bool,
    pub deploy_size: DeploySize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    /// Attributed to a specific deployment.
    DeployIncident,
    /// Attributed to a traffic spike.
    LoadIncident,
}

impl IncidentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::DeployIncident => "deploy_incident",
            IncidentType::LoadIncident => "load_incident",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub timestamp: NaiveDateTime,
    pub incident_type: IncidentType,
    pub severity: Severity,
}

impl Timestamped for MatchEvent {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl Timestamped for DeployEvent {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl Timestamped for Incident {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// The three generated tables, each sorted by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyntheticDataset {
    pub matches: Vec<MatchEvent>,
    pub deploys: Vec<DeployEvent>,
    pub incidents: Vec<Incident>,
}
