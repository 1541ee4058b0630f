use crate::state::JobStatus;
use serde_json::Value;

/// A provider response reduced to the fields the job client acts on
///
/// This is the only place that knows where the provider may put things:
/// `status` is read from the top level first and from `data.status`
/// second, and a job id may arrive as a string or a number.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub success: Option<bool>,
    pub id: Option<String>,
    pub status: JobStatus,
    pub data: Option<Value>,
    pub error: Option<String>,
    /// The full response body
    pub raw: Value,
}

/// What to do after a submission
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The result is already in the response
    Completed,
    /// An asynchronous job to poll
    Job(String),
    /// The provider said no
    Rejected(String),
    /// None of the known shapes
    Unexpected(String),
}

/// What to do after a status fetch
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    Completed,
    Continue,
    Stop(String),
}

impl ProviderResponse {
    /// Parses a response body
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body).map(Self::from_value)
    }

    /// Normalizes a decoded response body
    pub fn from_value(raw: Value) -> Self {
        let success = raw.get("success").and_then(Value::as_bool);

        let id = match raw.get("id") {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let data = raw.get("data").filter(|d| !d.is_null()).cloned();

        let status = raw
            .get("status")
            .and_then(Value::as_str)
            .or_else(|| {
                data.as_ref()
                    .and_then(|d| d.get("status"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string);

        let error = raw
            .get("error")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        Self {
            success,
            id,
            status: JobStatus::parse(status.as_deref()),
            data,
            error,
            raw,
        }
    }

    /// Decides how to continue after a submission
    ///
    /// A completed status wins over a job id, and a job id wins over an
    /// inline payload, since a running job may echo partial data.
    pub fn submission(&self) -> Submission {
        match self.success {
            Some(true) => {}
            Some(false) => {
                return Submission::Rejected(
                    self.error
                        .clone()
                        .unwrap_or_else(|| "Extraction provider reported failure".to_string()),
                )
            }
            None => {
                return Submission::Unexpected(
                    "Extraction response has no success flag".to_string(),
                )
            }
        }

        if self.status.is_success() {
            return Submission::Completed;
        }

        if let Some(id) = &self.id {
            return Submission::Job(id.clone());
        }

        if self.data.is_some() {
            return Submission::Completed;
        }

        Submission::Unexpected("Extraction response has neither data nor a job id".to_string())
    }

    /// Decides how to continue after a status fetch
    pub fn poll_step(&self) -> PollStep {
        if self.status.is_success() {
            if self.success == Some(false) {
                return PollStep::Stop(self.failure_message());
            }
            return PollStep::Completed;
        }

        if self.status.is_in_progress() {
            return PollStep::Continue;
        }

        PollStep::Stop(self.failure_message())
    }

    fn failure_message(&self) -> String {
        match &self.error {
            Some(error) => error.clone(),
            None => format!("Extraction job ended with status {}", self.status),
        }
    }
}
