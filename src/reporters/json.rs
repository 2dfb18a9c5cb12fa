//! JSON reporter
//!
//! Outputs the AnalysisReport (and query results) as pretty-printed JSON.
//! serde_json writes non-ASCII characters as-is, so project names with
//! accents survive unescaped.

use crate::models::AnalysisReport;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Render any serializable value as pretty JSON
pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write the report to `path`, creating parent folders as needed
pub fn write_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = render(report)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Analysis report saved: {}", path.display());
    Ok(())
}
