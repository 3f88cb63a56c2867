use crate::models::skills::{CategoryMap, SkillsGroup, SkillsPayload};
use crate::models::wire::RegenerateSkillsRequest;
use crate::skills::{CanonicalSkillsView, GroupView};

/// Projects the canonical view back into a categorized payload.
///
/// Only category blocks carry over for current and recommended skills: a group
/// shown as a plain list or as its sentinel yields an empty mapping. Missing
/// skills carry over as their list; the sentinel is never read back as data.
pub fn extract_from_view(view: &CanonicalSkillsView) -> SkillsPayload {
    SkillsPayload {
        current: SkillsGroup::ByCategory(categories_of(&view.current)),
        missing: SkillsGroup::Flat(match &view.missing {
            GroupView::Listed(skills) => skills.clone(),
            GroupView::Categorized(_) | GroupView::NoneFound => Vec::new(),
        }),
        recommended: SkillsGroup::ByCategory(categories_of(&view.recommended)),
        latex_skills_section: view.latex_section.clone(),
    }
}

/// Builds the regeneration request body from the current canonical view.
pub fn regenerate_request(view: &CanonicalSkillsView) -> RegenerateSkillsRequest {
    let payload = extract_from_view(view);
    RegenerateSkillsRequest {
        current_skills_by_category: into_categories(payload.current),
        recommended_skills_by_category: into_categories(payload.recommended),
        missing_skills: match payload.missing {
            SkillsGroup::Flat(skills) => skills,
            _ => Vec::new(),
        },
        current_certifications: Vec::new(),
        recommended_certifications: Vec::new(),
    }
}

fn categories_of(group: &GroupView) -> CategoryMap {
    match group {
        GroupView::Categorized(categories) => CategoryMap(
            categories
                .iter()
                .filter(|c| !c.skills.is_empty())
                .cloned()
                .collect(),
        ),
        GroupView::Listed(_) | GroupView::NoneFound => CategoryMap::default(),
    }
}

fn into_categories(group: SkillsGroup) -> CategoryMap {
    match group {
        SkillsGroup::ByCategory(map) => map,
        _ => CategoryMap::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::skills::{parse_skills_analysis, SkillCategory};
    use crate::skills::normalize;
    use serde_json::json;

    #[test]
    fn test_extract_from_empty_view_is_empty_mapping() {
        let payload = extract_from_view(&CanonicalSkillsView::default());
        assert_eq!(payload.current, SkillsGroup::ByCategory(CategoryMap::default()));
        assert_eq!(payload.recommended, SkillsGroup::ByCategory(CategoryMap::default()));
        assert_eq!(payload.missing, SkillsGroup::Flat(vec![]));
    }

    #[test]
    fn test_sentinel_never_read_back_as_skill() {
        let request = regenerate_request(&CanonicalSkillsView::default());
        assert!(request.missing_skills.is_empty());
        let body = serde_json::to_string(&request).unwrap();
        assert!(!body.contains(crate::skills::NO_MISSING_SKILLS));
        assert!(!body.contains(crate::skills::NO_CURRENT_SKILLS));
    }

    #[test]
    fn test_flat_group_yields_no_categories() {
        let view = CanonicalSkillsView {
            current: GroupView::Listed(vec!["Rust".to_string()]),
            ..Default::default()
        };
        let request = regenerate_request(&view);
        assert!(request.current_skills_by_category.is_empty());
    }

    #[test]
    fn test_normalize_extract_round_trip() {
        let analysis = json!({
            "current_skills_by_category": {
                "Languages": ["Go", " ", "Rust"],
                "Blank": [" "],
                "Tools": ["Docker"]
            },
            "recommended_skills_by_category": {"Cloud": ["AWS", ""]},
            "missing_skills": ["Kafka", ""],
            "latex_skills_section": "\\section{Skills}"
        });
        let original = normalize(&parse_skills_analysis(&analysis).unwrap());
        let reread = normalize(&extract_from_view(&original));
        assert_eq!(original, reread);

        assert_eq!(
            reread.current,
            GroupView::Categorized(vec![
                SkillCategory::new("Languages", vec!["Go".to_string(), "Rust".to_string()]),
                SkillCategory::new("Tools", vec!["Docker".to_string()]),
            ])
        );
    }

    #[test]
    fn test_regenerate_request_body_matches_view() {
        let analysis = json!({
            "current_skills_by_category": {"Languages": ["Go"]},
            "recommended_skills_by_category": {"Cloud": ["AWS"]},
            "missing_skills": ["Kafka"]
        });
        let view = normalize(&parse_skills_analysis(&analysis).unwrap());
        let value = serde_json::to_value(regenerate_request(&view)).unwrap();
        assert_eq!(
            value,
            json!({
                "current_skills_by_category": {"Languages": ["Go"]},
                "recommended_skills_by_category": {"Cloud": ["AWS"]},
                "missing_skills": ["Kafka"],
                "current_certifications": [],
                "recommended_certifications": []
            })
        );
    }
}
