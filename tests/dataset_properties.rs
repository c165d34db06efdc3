//! Properties that must hold for every generated dataset.

use chrono::NaiveDateTime;
use riskgen::config::GeneratorConfig;
use riskgen::generate::sampling::rng_from_seed;
use riskgen::generate::{
    generate_deploy_events, generate_incidents, generate_match_events, DeploySize, IncidentType, Severity,
    Timestamped,
};
use riskgen::generate_dataset;
use riskgen::timeline::parse_timestamp;

fn ts(s: &str) -> NaiveDateTime {
    parse_timestamp(s).unwrap()
}

fn is_sorted<T: Timestamped>(rows: &[T]) -> bool {
    rows.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp())
}

#[test]
fn test_quarter_dataset_invariants() {
    let mut rng = rng_from_seed(Some(2024));
    let dataset = generate_dataset(&GeneratorConfig::default(), ts("2024-01-01"), ts("2024-03-31 23:00"), &mut rng);

    assert!(!dataset.matches.is_empty());
    assert!(!dataset.deploys.is_empty());
    assert!(!dataset.incidents.is_empty());

    assert!(is_sorted(&dataset.matches));
    assert!(is_sorted(&dataset.deploys));
    assert!(is_sorted(&dataset.incidents));

    assert!(dataset
        .matches
        .iter()
        .all(|m| (1.0..=3.2).contains(&m.traffic_multiplier)));
    assert!(dataset
        .deploys
        .iter()
        .all(|d| DeploySize::ALL.contains(&d.deploy_size)));
    assert!(dataset.incidents.iter().all(|i| matches!(
        i.incident_type,
        IncidentType::DeployIncident | IncidentType::LoadIncident
    )));
    assert!(dataset
        .incidents
        .iter()
        .all(|i| matches!(i.severity, Severity::Low | Severity::Medium | Severity::High)));
}

#[test]
fn test_reversed_range_yields_empty_tables() {
    let mut rng = rng_from_seed(Some(1));
    let start = ts("2024-01-02");
    let end = ts("2024-01-01");
    assert!(generate_match_events(start, end, &mut rng).is_empty());
    assert!(generate_deploy_events(start, end, &mut rng).is_empty());
    assert!(generate_incidents(&[], &[], &mut rng).is_empty());

    let dataset = generate_dataset(&GeneratorConfig::default(), start, end, &mut rng);
    assert!(dataset.matches.is_empty() && dataset.deploys.is_empty() && dataset.incidents.is_empty());
}

#[test]
fn test_no_matches_means_no_load_incidents() {
    let mut rng = rng_from_seed(Some(5));
    let deploys = generate_deploy_events(ts("2024-01-01"), ts("2024-03-31 23:00"), &mut rng);
    let incidents = generate_incidents(&deploys, &[], &mut rng);
    assert!(incidents
        .iter()
        .all(|i| i.incident_type == IncidentType::DeployIncident));
    // Without traffic the top score is 0.11 (critical medium deploy in the Friday rush), below the high cutoff.
    assert!(incidents.iter().all(|i| i.severity != Severity::High));
}

#[test]
fn test_no_deploys_means_no_deploy_incidents() {
    let mut rng = rng_from_seed(Some(6));
    let matches = generate_match_events(ts("2024-01-01"), ts("2024-06-30 23:00"), &mut rng);
    let incidents = generate_incidents(&[], &matches, &mut rng);
    assert!(incidents
        .iter()
        .all(|i| i.incident_type == IncidentType::LoadIncident));
}

#[test]
fn test_same_seed_same_tables() {
    let config = GeneratorConfig::default();
    let (start, end) = (ts("2024-02-01"), ts("2024-02-29 23:00"));
    let a = generate_dataset(&config, start, end, &mut rng_from_seed(Some(99)));
    let b = generate_dataset(&config, start, end, &mut rng_from_seed(Some(99)));
    assert_eq!(a, b);

    let c = generate_dataset(&config, start, end, &mut rng_from_seed(Some(100)));
    assert_ne!(a, c);
}

#[test]
fn test_monday_evening_deploy_rate_converges() {
    // 2024-01-01 is a Monday; 17:00 sits in the 1.7 deploys/hour band.
    let hour = ts("2024-01-01 17:00");
    let mut rng = rng_from_seed(Some(17));
    let trials = 20_000;
    let total: usize = (0..trials)
        .map(|_| generate_deploy_events(hour, hour, &mut rng).len())
        .sum();
    let mean = total as f64 / trials as f64;
    assert!((mean - 1.7).abs() < 0.05, "mean deploys per hour was {}", mean);
}

#[test]
fn test_weekend_deploys_are_more_often_critical() {
    let mut rng = rng_from_seed(Some(8));
    let deploys = generate_deploy_events(ts("2024-01-01"), ts("2024-12-31 23:00"), &mut rng);
    let share = |weekend: bool| {
        let subset: Vec<_> = deploys
            .iter()
            .filter(|d| {
                let day = riskgen::timeline::day_index(d.timestamp);
                (day >= 5) == weekend
            })
            .collect();
        subset.iter().filter(|d| d.is_critical_fix).count() as f64 / subset.len() as f64
    };
    assert!(share(true) > share(false));
}
