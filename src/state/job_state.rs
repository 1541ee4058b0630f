//! Extraction job status as reported by the provider
//!
//! Providers report status either at the top level of a response or under
//! `data.status`; both are normalized into this one type.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted but not started
    Pending,

    /// Still running; poll again later
    Processing,

    /// Finished with a result payload
    Completed,

    /// Finished without a result
    Failed,

    /// Any other status string the provider sends
    Other(String),

    /// No status field at all
    Missing,
}

impl JobStatus {
    /// Parses a provider status string (case-insensitive)
    pub fn parse(status: Option<&str>) -> Self {
        let status = match status {
            Some(s) if !s.trim().is_empty() => s.trim(),
            _ => return Self::Missing,
        };

        match status.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "failed" | "cancelled" | "canceled" => Self::Failed,
            _ => Self::Other(status.to_string()),
        }
    }

    /// Returns true if the job may still produce a result
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Returns true if the job finished with a result
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if polling should stop
    pub fn is_terminal(&self) -> bool {
        !self.is_in_progress()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Other(s) => write!(f, "{}", s),
            Self::Missing => write!(f, "<missing>"),
        }
    }
}
