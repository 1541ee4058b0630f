//! Report rendering
//!
//! This module turns a `ScoutReport` into something to print or save:
//! - pretty JSON, the shape API callers consume
//! - a markdown summary for people reading a terminal

mod json;
mod text;

pub use json::render_json;
pub use text::format_text_summary;

use crate::scout::ScoutReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown output format '{0}' (expected json or text)")]
    UnknownFormat(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// How a report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "markdown" | "md" => Ok(Self::Text),
            other => Err(OutputError::UnknownFormat(other.to_string())),
        }
    }
}

/// Renders a report in the given format
pub fn render(report: &ScoutReport, format: OutputFormat) -> OutputResult<String> {
    match format {
        OutputFormat::Json => Ok(render_json(report)?),
        OutputFormat::Text => Ok(format_text_summary(report)),
    }
}

/// Renders a report and writes it to `path`
pub fn write_report(report: &ScoutReport, format: OutputFormat, path: &Path) -> OutputResult<()> {
    let rendered = render(report, format)?;

    let mut file = File::create(path)?;
    file.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        file.write_all(b"\n")?;
    }

    Ok(())
}
