//! Skills payloads as the generation service sends them.
//!
//! The service reports each skills group in one of two shapes: a mapping of
//! category name to skill list, or a flat list. `SkillsGroup` makes the shape
//! explicit so the reconciler never inspects JSON ad hoc.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// One named category and its skills, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCategory {
    pub name: String,
    pub skills: Vec<String>,
}

impl SkillCategory {
    pub fn new(name: impl Into<String>, skills: Vec<String>) -> Self {
        Self {
            name: name.into(),
            skills,
        }
    }
}

/// Ordered category list that serializes as a JSON object (category → skills).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap(pub Vec<SkillCategory>);

impl CategoryMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillCategory> {
        self.0.iter()
    }
}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in &self.0 {
            map.serialize_entry(&category.name, &category.skills)?;
        }
        map.end()
    }
}

/// A skills group in whichever shape the service chose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SkillsGroup {
    ByCategory(CategoryMap),
    Flat(Vec<String>),
    #[default]
    Missing,
}

/// Typed skills analysis, produced from the raw wire form by [`SkillsPayload::from_raw`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillsPayload {
    pub current: SkillsGroup,
    /// Only ever `Flat` or `Missing`.
    pub missing: SkillsGroup,
    pub recommended: SkillsGroup,
    pub latex_skills_section: Option<String>,
}

/// Skills analysis exactly as received. Every group is kept as raw JSON so a
/// malformed group cannot fail the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSkillsAnalysis {
    #[serde(default)]
    pub current_skills_by_category: Option<Value>,
    #[serde(default)]
    pub current_skills: Option<Value>,
    #[serde(default)]
    pub missing_skills: Option<Value>,
    #[serde(default)]
    pub recommended_skills_by_category: Option<Value>,
    #[serde(default)]
    pub recommended_skills: Option<Value>,
    #[serde(default)]
    pub latex_skills_section: Option<Value>,
}

impl SkillsPayload {
    /// Resolves the raw analysis into tagged groups.
    ///
    /// A by-category mapping is authoritative whenever it is present, even
    /// when empty; only an absent or null mapping falls back to the flat list.
    /// Malformed groups become `Missing` and are reported through tracing only.
    pub fn from_raw(raw: &RawSkillsAnalysis) -> Self {
        Self {
            current: resolve_group(
                "current",
                raw.current_skills_by_category.as_ref(),
                raw.current_skills.as_ref(),
            ),
            missing: resolve_group("missing", None, raw.missing_skills.as_ref()),
            recommended: resolve_group(
                "recommended",
                raw.recommended_skills_by_category.as_ref(),
                raw.recommended_skills.as_ref(),
            ),
            latex_skills_section: match &raw.latex_skills_section {
                Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
                Some(Value::String(_)) | Some(Value::Null) | None => None,
                Some(other) => {
                    warn!(
                        "latex_skills_section is not a string ({}); ignoring",
                        json_kind(other)
                    );
                    None
                }
            },
        }
    }
}

/// Reads the `skills_analysis` section of a response. A section that is not a
/// JSON object is traced and treated as absent.
pub fn parse_skills_analysis(value: &Value) -> Option<SkillsPayload> {
    match value {
        Value::Object(_) => match RawSkillsAnalysis::deserialize(value) {
            Ok(raw) => Some(SkillsPayload::from_raw(&raw)),
            Err(e) => {
                warn!("skills analysis could not be read: {e}");
                None
            }
        },
        Value::Null => None,
        other => {
            warn!("skills analysis is not an object ({}); ignoring", json_kind(other));
            None
        }
    }
}

fn resolve_group(group: &str, by_category: Option<&Value>, flat: Option<&Value>) -> SkillsGroup {
    match by_category {
        Some(Value::Object(map)) => {
            return SkillsGroup::ByCategory(parse_categories(group, map));
        }
        Some(Value::Null) | None => {}
        Some(other) => {
            warn!(
                "{group} skills by category is malformed ({}); treating group as empty",
                json_kind(other)
            );
            return SkillsGroup::Missing;
        }
    }

    match flat {
        Some(Value::Array(items)) => SkillsGroup::Flat(parse_skill_list(group, items)),
        Some(Value::Null) | None => SkillsGroup::Missing,
        Some(other) => {
            warn!(
                "{group} skills list is malformed ({}); treating group as empty",
                json_kind(other)
            );
            SkillsGroup::Missing
        }
    }
}

fn parse_categories(group: &str, map: &Map<String, Value>) -> CategoryMap {
    let mut categories = Vec::with_capacity(map.len());
    for (name, value) in map {
        match value {
            Value::Array(items) => {
                categories.push(SkillCategory::new(name.clone(), parse_skill_list(group, items)))
            }
            other => warn!(
                "{group} skills category '{name}' is not a list ({}); skipping",
                json_kind(other)
            ),
        }
    }
    CategoryMap(categories)
}

fn parse_skill_list(group: &str, items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(skill) => Some(skill.clone()),
            Value::Null => None,
            other => {
                warn!(
                    "{group} skills entry is not a string ({}); skipping",
                    json_kind(other)
                );
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawSkillsAnalysis {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_by_category_preferred_over_flat() {
        let payload = SkillsPayload::from_raw(&raw(json!({
            "current_skills_by_category": {"Languages": ["Go"]},
            "current_skills": ["Rust"]
        })));
        assert_eq!(
            payload.current,
            SkillsGroup::ByCategory(CategoryMap(vec![SkillCategory::new(
                "Languages",
                vec!["Go".to_string()]
            )]))
        );
    }

    #[test]
    fn test_empty_mapping_does_not_fall_back_to_flat() {
        let payload = SkillsPayload::from_raw(&raw(json!({
            "current_skills_by_category": {},
            "current_skills": ["Unable to analyze skills without AI service"]
        })));
        assert_eq!(payload.current, SkillsGroup::ByCategory(CategoryMap::default()));
    }

    #[test]
    fn test_null_mapping_falls_back_to_flat() {
        let payload = SkillsPayload::from_raw(&raw(json!({
            "recommended_skills_by_category": null,
            "recommended_skills": ["Kubernetes"]
        })));
        assert_eq!(
            payload.recommended,
            SkillsGroup::Flat(vec!["Kubernetes".to_string()])
        );
    }

    #[test]
    fn test_category_order_is_source_order() {
        let payload = SkillsPayload::from_raw(&raw(json!({
            "recommended_skills_by_category": {
                "Zeta": ["z"],
                "Alpha": ["a"],
                "Mid": ["m"]
            }
        })));
        let SkillsGroup::ByCategory(map) = payload.recommended else {
            panic!("expected categories");
        };
        let names: Vec<_> = map.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_malformed_mapping_is_missing_not_flat() {
        let payload = SkillsPayload::from_raw(&raw(json!({
            "current_skills_by_category": ["Go"],
            "current_skills": ["Rust"]
        })));
        assert_eq!(payload.current, SkillsGroup::Missing);
    }

    #[test]
    fn test_malformed_category_is_skipped() {
        let payload = SkillsPayload::from_raw(&raw(json!({
            "current_skills_by_category": {"Bad": "Go", "Good": ["Rust", 7, null]}
        })));
        assert_eq!(
            payload.current,
            SkillsGroup::ByCategory(CategoryMap(vec![SkillCategory::new(
                "Good",
                vec!["Rust".to_string()]
            )]))
        );
    }

    #[test]
    fn test_missing_skills_never_categorized() {
        let payload = SkillsPayload::from_raw(&raw(json!({
            "missing_skills": {"Cloud": ["AWS"]}
        })));
        assert_eq!(payload.missing, SkillsGroup::Missing);
    }

    #[test]
    fn test_latex_section_non_string_ignored() {
        let payload = SkillsPayload::from_raw(&raw(json!({"latex_skills_section": 42})));
        assert_eq!(payload.latex_skills_section, None);

        let payload = SkillsPayload::from_raw(&raw(json!({"latex_skills_section": "\\section{Skills}"})));
        assert_eq!(payload.latex_skills_section.as_deref(), Some("\\section{Skills}"));
    }

    #[test]
    fn test_non_object_analysis_is_absent() {
        assert!(parse_skills_analysis(&json!("oops")).is_none());
        assert!(parse_skills_analysis(&Value::Null).is_none());
        assert!(parse_skills_analysis(&json!({})).is_some());
    }

    #[test]
    fn test_category_map_serializes_as_ordered_object() {
        let map = CategoryMap(vec![
            SkillCategory::new("Tools", vec!["Docker".to_string()]),
            SkillCategory::new("Languages", vec!["Go".to_string(), "Rust".to_string()]),
        ]);
        let text = serde_json::to_string(&map).unwrap();
        assert_eq!(text, r#"{"Tools":["Docker"],"Languages":["Go","Rust"]}"#);
    }
}
