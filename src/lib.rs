//! riskgen -- synthetic match traffic, deploy and incident datasets for
//! prototyping a deployment-risk model.
//!
//! The match and deploy generators are independent hourly sampling loops.
//! The incident generator derives rows from both of their outputs, so it
//! always runs last.

pub mod config;
pub mod export;
pub mod generate;
pub mod summary;
pub mod timeline;

use chrono::NaiveDateTime;
use rand::Rng;

use crate::config::GeneratorConfig;
use crate::generate::{
    DeployEventGenerator, IncidentGenerator, MatchEventGenerator, SyntheticDataset,
};

/// Generate all three tables for `[start, end]` with one RNG stream.
pub fn generate_dataset<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    start: NaiveDateTime,
    end: NaiveDateTime,
    rng: &mut R,
) -> SyntheticDataset {
    let matches = MatchEventGenerator::new(&config.matches).generate(start, end, rng);
    let deploys = DeployEventGenerator::new(&config.deploys).generate(start, end, rng);
    let incidents = IncidentGenerator::new(&config.incidents).generate(&deploys, &matches, rng);

    tracing::info!(
        %start,
        %end,
        matches = matches.len(),
        deploys = deploys.len(),
        incidents = incidents.len(),
        "Generated synthetic dataset"
    );

    SyntheticDataset {
        matches,
        deploys,
        incidents,
    }
}
