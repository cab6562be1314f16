//! Text and markdown rendering for diagnosed results.
//!
//! Only diagnosed results are ever rendered. User-supplied input is escaped so it cannot add
//! headings, code fences or horizontal rules to the report.

use crate::constants::REPORT_DISCLAIMER;
use crate::service::DiagnosisResult;
use chrono::{DateTime, Utc};

const REPORT_TITLE: &str = "# Medical Diagnosis Report";

/// The short three-line summary returned to the caller.
pub fn render_summary(result: &DiagnosisResult) -> String {
    format!(
        "Probable diagnosis: {} (confidence: {:.2}%)\nEstimated severity: {}\nRecommendation: {}",
        result.diagnosis, result.confidence, result.severity, result.recommendation
    )
}

/// Renders the full markdown report.
///
/// # Arguments
///
/// * `result` - The enriched diagnosis
/// * `input` - The text the user originally reported
/// * `generated_at` - Timestamp printed in the report header
pub fn render_report(result: &DiagnosisResult, input: &str, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(REPORT_TITLE);
    out.push_str("\n\n");
    out.push_str(&format!(
        "**Date:** {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    out.push_str("## Diagnosis\n\n");
    out.push_str(&format!("- Estimated condition: {}\n", result.diagnosis));
    out.push_str(&format!("- Confidence level: {:.2}%\n", result.confidence));
    out.push_str(&format!("- Estimated severity: {}\n\n", result.severity));

    out.push_str("## Reported symptoms\n\n");
    out.push_str(&escape_prose(input));
    out.push_str("\n\n");

    out.push_str("## Medical recommendation\n\n");
    out.push_str(&format!("> {}\n\n", escape_prose(&result.recommendation)));

    out.push_str("---\n\n");
    out.push_str(&format!("_{}_\n", REPORT_DISCLAIMER));
    out
}

/// Escapes line-leading `#`, standalone horizontal rules and triple backticks.
fn escape_prose(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim();
            if line.trim_start().starts_with('#') {
                line.replacen('#', r"\#", 1)
            } else if trimmed == "---" || trimmed == "***" || trimmed == "___" {
                format!(r"\{}", trimmed)
            } else {
                line.replace("```", r"\`\`\`")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
