//! Minimal CSV rendering for the generated tables.

use std::borrow::Cow;
use std::io::{self, Write};

use crate::generate::{DeployEvent, Incident, MatchEvent};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A row with a fixed column layout.
pub trait CsvRow {
    const HEADER: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

impl CsvRow for MatchEvent {
    const HEADER: &'static [&'static str] = &["timestamp", "tournament", "traffic_multiplier"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.tournament.clone(),
            self.traffic_multiplier.to_string(),
        ]
    }
}

impl CsvRow for DeployEvent {
    const HEADER: &'static [&'static str] = &["timestamp", "is_critical_fix", "deploy_size"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.is_critical_fix.to_string(),
            self.deploy_size.to_string(),
        ]
    }
}

impl CsvRow for Incident {
    const HEADER: &'static [&'static str] = &["timestamp", "incident_type", "severity"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.incident_type.to_string(),
            self.severity.to_string(),
        ]
    }
}

/// Quote a field when it contains a delimiter, quote or line break.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Write a header line followed by one line per row.
pub fn write_csv<W: Write, T: CsvRow>(mut writer: W, rows: &[T]) -> io::Result<()> {
    writeln!(writer, "{}", T::HEADER.join(","))?;
    for row in rows {
        let fields = row.fields();
        let line: Vec<Cow<'_, str>> = fields.iter().map(|f| escape_field(f)).collect();
        writeln!(writer, "{}", line.join(","))?;
    }
    writer.flush()
}
