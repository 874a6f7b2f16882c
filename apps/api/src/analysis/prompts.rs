// Prompts and response schemas for the two analysis calls.
// Schemas use the OpenAPI subset the generateContent endpoint accepts.

use serde_json::{json, Value};

pub const ATS_PROMPT: &str = "\
Act as an expert career coach and professional resume reviewer with experience in \
Applicant Tracking Systems (ATS). Analyze the provided resume file in isolation and return \
a comprehensive, professional review as JSON matching the response schema.

Focus on:
1. Clarity and readability: is the resume easy to read, is the formatting clean?
2. Impact: does it use strong action verbs and quantify achievements with metrics?
3. Keyword optimization: does it contain the keywords expected for a typical role in its field?
4. Conciseness: is the content concise and to the point?

Provide an overallScore, clarityScore, impactScore and concisenessScore, each an integer from \
0 to 100; a short resumeVerdict such as 'Excellent', 'Good', 'Moderate' or 'Needs Improvement'; \
the extractedKeywords (key skills and technologies); and actionableInsights written as markdown \
bullet points separated by newlines.";

pub const CAREER_PROMPT: &str = "\
Act as a senior career counselor and corporate recruiter. Analyze the provided resume and \
return professional, actionable career advice as JSON matching the response schema. \
The language must be professional and direct. Do not use markdown formatting or asterisks.

Cover:
1. Role suitability: which roles and industries is this person a strong candidate for?
2. Recruiter's perspective: the primary strengths and weaknesses a recruiter would see.
3. Skill gaps: critical skills or technologies missing to advance in their field.
4. Recommendations: specific courses or certifications that would close those gaps.";

pub fn ats_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "overallScore": {
                "type": "NUMBER",
                "description": "0-100 overall quality based on clarity, impact, formatting and keyword usage."
            },
            "resumeVerdict": {
                "type": "STRING",
                "description": "One or two word verdict, e.g. 'Excellent', 'Good', 'Moderate', 'Needs Improvement'."
            },
            "extractedKeywords": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "The most important keywords, skills and technologies in the resume."
            },
            "actionableInsights": {
                "type": "STRING",
                "description": "Actionable improvement suggestions as markdown bullets separated by newlines."
            },
            "clarityScore": {
                "type": "NUMBER",
                "description": "0-100 clarity and readability."
            },
            "impactScore": {
                "type": "NUMBER",
                "description": "0-100 use of quantifiable achievements and strong action verbs."
            },
            "concisenessScore": {
                "type": "NUMBER",
                "description": "0-100 conciseness."
            }
        },
        "required": [
            "overallScore",
            "resumeVerdict",
            "extractedKeywords",
            "actionableInsights",
            "clarityScore",
            "impactScore",
            "concisenessScore"
        ]
    })
}

pub fn career_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "roleSuitability": {
                "type": "STRING",
                "description": "One paragraph on the roles and industries the candidate fits. No markdown."
            },
            "recruiterPerspective": {
                "type": "STRING",
                "description": "One paragraph on strengths and weaknesses as a recruiter sees them. No markdown."
            },
            "skillGaps": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "3-5 concise, high-impact skills or technologies to learn next."
            },
            "suggestedCourses": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "3-5 concrete courses or certifications that close the skill gaps."
            }
        },
        "required": ["roleSuitability", "recruiterPerspective", "skillGaps", "suggestedCourses"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(schema: &Value) -> Vec<&str> {
        schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect()
    }

    #[test]
    fn test_every_required_field_is_declared() {
        for schema in [ats_schema(), career_schema()] {
            for field in required(&schema) {
                assert!(
                    schema["properties"].get(field).is_some(),
                    "{field} is required but not declared"
                );
            }
        }
    }
}
