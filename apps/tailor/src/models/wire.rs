//! Request and response bodies exchanged with the generation service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::skills::CategoryMap;

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

/// Form body for `POST /generate_resume`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub resume_content: String,
    pub job_description: String,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Form body for `POST /reoptimize_resume`.
#[derive(Debug, Clone, Serialize)]
pub struct ReoptimizeRequest {
    pub latex_code: String,
    pub job_description: String,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Form body for `POST /reanalyze_skills`.
#[derive(Debug, Clone, Serialize)]
pub struct ReanalyzeSkillsRequest {
    pub latex_code: String,
    pub job_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// JSON body for `POST /regenerate_skills_latex`.
///
/// Certifications are not tracked by the session; they are always sent empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegenerateSkillsRequest {
    pub current_skills_by_category: CategoryMap,
    pub recommended_skills_by_category: CategoryMap,
    pub missing_skills: Vec<String>,
    pub current_certifications: Vec<String>,
    pub recommended_certifications: Vec<String>,
}

/// JSON body for `POST /save_main_resume`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveSourceRequest {
    pub resume_content: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Responses
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub resume_id: Option<String>,
    #[serde(default)]
    pub latex_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub optimized: bool,
    #[serde(default)]
    pub optimization_message: Option<String>,
    #[serde(default)]
    pub skills_analysis: Option<Value>,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReoptimizeResponse {
    #[serde(default)]
    pub resume_id: Option<String>,
    #[serde(default)]
    pub latex_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub optimization_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReanalyzeSkillsResponse {
    #[serde(default)]
    pub skills_analysis: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegenerateSkillsResponse {
    #[serde(default)]
    pub latex_skills_section: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveSourceResponse {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadSourceResponse {
    #[serde(default)]
    pub resume_content: Option<String>,
}

/// Accepts a finite number or numeric string; anything else reads as absent.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let score = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(score.filter(|s| s.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_response_tolerates_missing_fields() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "latex_code": "X"
        }))
        .unwrap();
        assert_eq!(response.latex_code.as_deref(), Some("X"));
        assert_eq!(response.score, None);
        assert!(!response.optimized);
        assert!(response.skills_analysis.is_none());
    }

    #[test]
    fn test_score_accepts_numeric_string() {
        let response: ReoptimizeResponse =
            serde_json::from_value(json!({"score": "7.5"})).unwrap();
        assert_eq!(response.score, Some(7.5));

        let response: ReoptimizeResponse =
            serde_json::from_value(json!({"score": "high"})).unwrap();
        assert_eq!(response.score, None);

        let response: ReoptimizeResponse =
            serde_json::from_value(json!({"score": "NaN"})).unwrap();
        assert_eq!(response.score, None);
    }

    #[test]
    fn test_generate_request_omits_absent_api_key() {
        let request = GenerateRequest {
            resume_content: "r".to_string(),
            job_description: "j".to_string(),
            company_name: String::new(),
            api_key: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("api_key").is_none());
        assert_eq!(value["company_name"], "");
    }

    #[test]
    fn test_regenerate_request_shape() {
        let request = RegenerateSkillsRequest {
            missing_skills: vec!["Kafka".to_string()],
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "current_skills_by_category": {},
                "recommended_skills_by_category": {},
                "missing_skills": ["Kafka"],
                "current_certifications": [],
                "recommended_certifications": []
            })
        );
    }
}
