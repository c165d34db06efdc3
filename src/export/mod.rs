//! Writing generated tables to disk.

pub mod csv;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use self::csv::{write_csv, CsvRow};
use crate::generate::SyntheticDataset;

pub const MATCH_EVENTS: &str = "match_events";
pub const DEPLOY_EVENTS: &str = "deploy_events";
pub const INCIDENTS: &str = "incidents";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Write the three tables into `dir`, creating it if needed.
///
/// Returns the written paths in match, deploy, incident order.
pub fn write_dataset(dataset: &SyntheticDataset, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let paths = vec![
        write_table(dir, MATCH_EVENTS, &dataset.matches, format)?,
        write_table(dir, DEPLOY_EVENTS, &dataset.deploys, format)?,
        write_table(dir, INCIDENTS, &dataset.incidents, format)?,
    ];
    Ok(paths)
}

fn write_table<T: CsvRow + Serialize>(dir: &Path, name: &str, rows: &[T], format: ExportFormat) -> Result<PathBuf> {
    let path = dir.join(format!("{}.{}", name, format.extension()));
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv => write_csv(&mut writer, rows),
        ExportFormat::Json => serde_json::to_writer_pretty(&mut writer, rows)
            .map_err(Into::into)
            .and_then(|_| writer.flush()),
    }
    .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote table");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{DeployEvent, DeploySize};
    use crate::timeline::parse_timestamp;

    fn sample() -> SyntheticDataset {
        SyntheticDataset {
            deploys: vec![DeployEvent {
                timestamp: parse_timestamp("2024-01-01 09:30").unwrap(),
                is_critical_fix: false,
                deploy_size: DeploySize::Small,
            }],
            ..SyntheticDataset::default()
        }
    }

    #[test]
    fn test_writes_three_csv_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("nested");
        let paths = write_dataset(&sample(), &out, ExportFormat::Csv)?;
        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("match_events.csv"));

        let deploys = std::fs::read_to_string(&paths[1])?;
        assert_eq!(deploys.lines().count(), 2);
        let incidents = std::fs::read_to_string(&paths[2])?;
        assert_eq!(incidents, "timestamp,incident_type,severity\n");
        Ok(())
    }

    #[test]
    fn test_json_export_is_parseable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = write_dataset(&sample(), dir.path(), ExportFormat::Json)?;
        let text = std::fs::read_to_string(&paths[1])?;
        let rows: Vec<DeployEvent> = serde_json::from_str(&text)?;
        assert_eq!(rows, sample().deploys);
        Ok(())
    }
}
