use crate::scout::ScoutReport;

/// Pretty-printed JSON for a report
///
/// Extraction failures appear as `{"success": false, "error": "..."}`
/// under `extraction`, the same shape the provider uses for its own.
pub fn render_json(report: &ScoutReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
