//! Output reporters for xray-audit analysis results
//!
//! Supports:
//! - `text` - Terminal sections with colors and emoji
//! - `json` - The persisted analysis report and machine-readable query output
//! - `chart` - Composite PNG dashboard

pub mod chart;
pub mod json;
pub mod text;

use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported console output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
