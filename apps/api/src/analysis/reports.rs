//! Report types returned to clients, and their validation from raw oracle output.

use serde::{Deserialize, Serialize};

use super::client::LlmError;

/// Oracle output as received. Scores arrive as JSON numbers and are checked before use.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAtsReport {
    pub overall_score: f64,
    pub resume_verdict: String,
    #[serde(default)]
    pub extracted_keywords: Vec<String>,
    pub actionable_insights: String,
    pub clarity_score: f64,
    pub impact_score: f64,
    pub conciseness_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsReport {
    pub overall_score: u8,
    pub verdict: String,
    pub keywords: Vec<String>,
    /// Markdown bullet list, one suggestion per line.
    pub insights: String,
    pub clarity_score: u8,
    pub impact_score: u8,
    pub conciseness_score: u8,
}

impl TryFrom<RawAtsReport> for AtsReport {
    type Error = LlmError;

    fn try_from(raw: RawAtsReport) -> Result<Self, LlmError> {
        Ok(Self {
            overall_score: score("overallScore", raw.overall_score)?,
            verdict: non_empty("resumeVerdict", raw.resume_verdict)?,
            keywords: clean_list(raw.extracted_keywords),
            insights: raw.actionable_insights.trim().to_string(),
            clarity_score: score("clarityScore", raw.clarity_score)?,
            impact_score: score("impactScore", raw.impact_score)?,
            conciseness_score: score("concisenessScore", raw.conciseness_score)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCareerReport {
    pub role_suitability: String,
    pub recruiter_perspective: String,
    #[serde(default)]
    pub skill_gaps: Vec<String>,
    #[serde(default)]
    pub suggested_courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerReport {
    pub role_suitability: String,
    pub recruiter_perspective: String,
    pub skill_gaps: Vec<String>,
    pub suggested_courses: Vec<String>,
}

impl TryFrom<RawCareerReport> for CareerReport {
    type Error = LlmError;

    fn try_from(raw: RawCareerReport) -> Result<Self, LlmError> {
        Ok(Self {
            role_suitability: non_empty("roleSuitability", raw.role_suitability)?,
            recruiter_perspective: non_empty("recruiterPerspective", raw.recruiter_perspective)?,
            skill_gaps: clean_list(raw.skill_gaps),
            suggested_courses: clean_list(raw.suggested_courses),
        })
    }
}

/// Rounds to the nearest integer; anything outside 0..=100 is a schema violation.
fn score(field: &'static str, value: f64) -> Result<u8, LlmError> {
    let rounded = value.round();
    if !(0.0..=100.0).contains(&rounded) {
        return Err(LlmError::Schema(format!(
            "{field} must be between 0 and 100, got {value}"
        )));
    }
    Ok(rounded as u8)
}

fn non_empty(field: &'static str, value: String) -> Result<String, LlmError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LlmError::Schema(format!("{field} is empty")));
    }
    Ok(trimmed.to_string())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
