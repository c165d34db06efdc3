//! Descriptive statistics over a generated dataset.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::generate::incidents::hourly_match_intensity;
use crate::generate::{DeploySize, IncidentType, Severity, SyntheticDataset};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub match_events: usize,
    /// Distinct hours carrying at least one match.
    pub match_hours: usize,
    pub mean_hourly_intensity: f64,
    pub max_hourly_intensity: f64,
    pub deploy_events: usize,
    pub critical_fix_share: f64,
    pub deploys_by_size: BTreeMap<DeploySize, usize>,
    pub incidents: usize,
    pub incidents_by_type: BTreeMap<IncidentType, usize>,
    pub incidents_by_severity: BTreeMap<Severity, usize>,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &SyntheticDataset) -> Self {
        let hourly = hourly_match_intensity(&dataset.matches);
        let intensities: Vec<f64> = hourly.values().copied().collect();

        let critical = dataset.deploys.iter().filter(|d| d.is_critical_fix).count();

        let mut deploys_by_size = BTreeMap::new();
        for d in &dataset.deploys {
            *deploys_by_size.entry(d.deploy_size).or_insert(0) += 1;
        }

        let mut incidents_by_type = BTreeMap::new();
        let mut incidents_by_severity = BTreeMap::new();
        for i in &dataset.incidents {
            *incidents_by_type.entry(i.incident_type).or_insert(0) += 1;
            *incidents_by_severity.entry(i.severity).or_insert(0) += 1;
        }

        Self {
            match_events: dataset.matches.len(),
            match_hours: hourly.len(),
            mean_hourly_intensity: mean(&intensities),
            max_hourly_intensity: intensities.iter().copied().fold(0.0, f64::max),
            deploy_events: dataset.deploys.len(),
            critical_fix_share: ratio(critical, dataset.deploys.len()),
            deploys_by_size,
            incidents: dataset.incidents.len(),
            incidents_by_type,
            incidents_by_severity,
        }
    }

    /// Incidents per deploy, or 0 when there were no deploys.
    pub fn incident_rate(&self) -> f64 {
        ratio(self.incidents, self.deploy_events)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn count<K: Ord>(map: &BTreeMap<K, usize>, key: &K) -> usize {
    map.get(key).copied().unwrap_or(0)
}

/// Render a summary as a short plain-text report.
pub fn format_summary(summary: &DatasetSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Matches:   {} rows over {} hour{} (mean intensity {:.2}, peak {:.2})\n",
        summary.match_events,
        summary.match_hours,
        if summary.match_hours == 1 { "" } else { "s" },
        summary.mean_hourly_intensity,
        summary.max_hourly_intensity,
    ));
    out.push_str(&format!(
        "Deploys:   {} rows ({:.1}% critical; small {}, medium {}, large {})\n",
        summary.deploy_events,
        summary.critical_fix_share * 100.0,
        count(&summary.deploys_by_size, &DeploySize::Small),
        count(&summary.deploys_by_size, &DeploySize::Medium),
        count(&summary.deploys_by_size, &DeploySize::Large),
    ));
    out.push_str(&format!(
        "Incidents: {} rows (deploy {}, load {}; low {}, medium {}, high {})\n",
        summary.incidents,
        count(&summary.incidents_by_type, &IncidentType::DeployIncident),
        count(&summary.incidents_by_type, &IncidentType::LoadIncident),
        count(&summary.incidents_by_severity, &Severity::Low),
        count(&summary.incidents_by_severity, &Severity::Medium),
        count(&summary.incidents_by_severity, &Severity::High),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{DeployEvent, Incident, MatchEvent};
    use crate::timeline::parse_timestamp;

    fn dataset() -> SyntheticDataset {
        let t = |s: &str| parse_timestamp(s).unwrap();
        SyntheticDataset {
            matches: vec![
                MatchEvent { timestamp: t("2024-01-03 19:00"), tournament: "A".into(), traffic_multiplier: 1.5 },
                MatchEvent { timestamp: t("2024-01-03 19:00"), tournament: "B".into(), traffic_multiplier: 2.5 },
                MatchEvent { timestamp: t("2024-01-03 20:00"), tournament: "A".into(), traffic_multiplier: 2.0 },
            ],
            deploys: vec![
                DeployEvent { timestamp: t("2024-01-03 17:10"), is_critical_fix: true, deploy_size: DeploySize::Small },
                DeployEvent { timestamp: t("2024-01-03 18:10"), is_critical_fix: false, deploy_size: DeploySize::Large },
            ],
            incidents: vec![Incident {
                timestamp: t("2024-01-03 18:10"),
                incident_type: IncidentType::DeployIncident,
                severity: Severity::Medium,
            }],
        }
    }

    #[test]
    fn test_summary_counts() {
        let s = DatasetSummary::from_dataset(&dataset());
        assert_eq!(s.match_events, 3);
        assert_eq!(s.match_hours, 2);
        assert!((s.mean_hourly_intensity - 3.0).abs() < 1e-9);
        assert!((s.max_hourly_intensity - 4.0).abs() < 1e-9);
        assert_eq!(s.critical_fix_share, 0.5);
        assert_eq!(s.deploys_by_size.get(&DeploySize::Large), Some(&1));
        assert_eq!(s.incidents_by_severity.get(&Severity::Medium), Some(&1));
        assert_eq!(s.incident_rate(), 0.5);
    }

    #[test]
    fn test_empty_summary() {
        let s = DatasetSummary::from_dataset(&SyntheticDataset::default());
        assert_eq!(s, DatasetSummary::default());
        assert_eq!(s.incident_rate(), 0.0);
    }

    #[test]
    fn test_format_summary() {
        let text = format_summary(&DatasetSummary::from_dataset(&dataset()));
        assert!(text.contains("3 rows over 2 hours"));
        assert!(text.contains("50.0% critical"));
        assert!(text.contains("deploy 1, load 0"));
    }
}
