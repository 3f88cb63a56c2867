//! Skills Reconciler — turns heterogeneous skills payloads into one canonical,
//! render-ready structure, and projects that structure back into the payload
//! the skills-section regeneration endpoint expects.
//!
//! The canonical view is kept in the session after every normalization, so
//! the read-back is a pure in-memory projection rather than a scrape of
//! whatever was last displayed.

pub mod extract;
pub mod normalize;

pub use extract::extract_from_view;
pub use normalize::normalize;

use crate::models::skills::SkillCategory;

pub const NO_CURRENT_SKILLS: &str = "No skills found";
pub const NO_MISSING_SKILLS: &str = "No missing skills";
pub const NO_RECOMMENDED_SKILLS: &str = "No recommended skills";
pub const NO_SKILLS_SECTION: &str = "No LaTeX skills section generated";

/// Render-ready form of one skills group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupView {
    /// Category blocks, each holding at least one non-blank skill.
    Categorized(Vec<SkillCategory>),
    /// A plain list of non-blank skills, never empty.
    Listed(Vec<String>),
    /// Nothing survived filtering; rendered as the group's sentinel line.
    NoneFound,
}

impl GroupView {
    /// Every skill in the group, in render order.
    pub fn skills(&self) -> Vec<&str> {
        match self {
            GroupView::Categorized(categories) => categories
                .iter()
                .flat_map(|c| c.skills.iter().map(String::as_str))
                .collect(),
            GroupView::Listed(skills) => skills.iter().map(String::as_str).collect(),
            GroupView::NoneFound => Vec::new(),
        }
    }
}

/// The normalized skills analysis held by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSkillsView {
    pub current: GroupView,
    pub missing: GroupView,
    pub recommended: GroupView,
    /// Opaque code section from the service; `None` renders [`NO_SKILLS_SECTION`].
    pub latex_section: Option<String>,
}

impl Default for CanonicalSkillsView {
    fn default() -> Self {
        Self {
            current: GroupView::NoneFound,
            missing: GroupView::NoneFound,
            recommended: GroupView::NoneFound,
            latex_section: None,
        }
    }
}

impl CanonicalSkillsView {
    pub fn latex_section_text(&self) -> &str {
        self.latex_section.as_deref().unwrap_or(NO_SKILLS_SECTION)
    }
}
