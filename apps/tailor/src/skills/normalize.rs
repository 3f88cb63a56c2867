use crate::models::skills::{SkillCategory, SkillsGroup, SkillsPayload};
use crate::skills::{CanonicalSkillsView, GroupView};

/// Normalizes a typed skills payload into the canonical view.
///
/// Rules, applied per group:
/// - by-category: categories in source order, blank entries dropped, a category
///   kept only if something survives
/// - flat: same blank filtering over the list
/// - nothing survives → `GroupView::NoneFound`
///
/// Entries are kept verbatim (not trimmed); blankness only decides survival.
pub fn normalize(payload: &SkillsPayload) -> CanonicalSkillsView {
    CanonicalSkillsView {
        current: normalize_group(&payload.current),
        missing: match &payload.missing {
            // Missing skills only have a flat shape.
            SkillsGroup::ByCategory(_) => GroupView::NoneFound,
            other => normalize_group(other),
        },
        recommended: normalize_group(&payload.recommended),
        latex_section: payload
            .latex_skills_section
            .clone()
            .filter(|text| !text.is_empty()),
    }
}

fn normalize_group(group: &SkillsGroup) -> GroupView {
    match group {
        SkillsGroup::ByCategory(map) => {
            let categories: Vec<SkillCategory> = map
                .iter()
                .filter_map(|category| {
                    let skills = non_blank(&category.skills);
                    (!skills.is_empty()).then(|| SkillCategory::new(category.name.clone(), skills))
                })
                .collect();
            if categories.is_empty() {
                GroupView::NoneFound
            } else {
                GroupView::Categorized(categories)
            }
        }
        SkillsGroup::Flat(skills) => {
            let skills = non_blank(skills);
            if skills.is_empty() {
                GroupView::NoneFound
            } else {
                GroupView::Listed(skills)
            }
        }
        SkillsGroup::Missing => GroupView::NoneFound,
    }
}

fn non_blank(skills: &[String]) -> Vec<String> {
    skills
        .iter()
        .filter(|skill| !skill.trim().is_empty())
        .cloned()
        .collect()
}
