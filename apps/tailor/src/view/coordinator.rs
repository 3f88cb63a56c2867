//! View Coordinator — tab selection, score badge tiers, and the visibility of
//! the result view's auxiliary affordances.

use std::fmt;
use std::str::FromStr;

/// The three mutually exclusive result views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Code,
    Feedback,
    Skills,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Code, Tab::Feedback, Tab::Skills];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Code => "LaTeX Code",
            Tab::Feedback => "Feedback",
            Tab::Skills => "Skills Analysis",
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" | "latex" => Ok(Tab::Code),
            "feedback" => Ok(Tab::Feedback),
            "skills" => Ok(Tab::Skills),
            other => Err(format!("unknown tab '{other}' (expected code, feedback or skills)")),
        }
    }
}

/// Score badge tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeClass {
    Success,
    Primary,
    Info,
}

impl BadgeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeClass::Success => "success",
            BadgeClass::Primary => "primary",
            BadgeClass::Info => "info",
        }
    }
}

impl fmt::Display for BadgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `>= 8` success, `[6, 8)` primary, below 6 info. No clamping here.
pub fn classify_score(score: f64) -> BadgeClass {
    if score >= 8.0 {
        BadgeClass::Success
    } else if score >= 6.0 {
        BadgeClass::Primary
    } else {
        BadgeClass::Info
    }
}

/// Badge text, e.g. `9/10` or `7.5/10`.
pub fn score_text(score: f64) -> String {
    if score.fract() == 0.0 && score.abs() < 1e15 {
        format!("{}/10", score as i64)
    } else {
        format!("{score}/10")
    }
}

/// Visibility state of the page around the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewCoordinator {
    active: Tab,
    result_visible: bool,
    process_visible: bool,
    optimized_badge_visible: bool,
    reoptimize_visible: bool,
    download_href: Option<String>,
}

impl ViewCoordinator {
    pub fn active(&self) -> Tab {
        self.active
    }

    /// Selecting the active tab again changes nothing.
    pub fn select(&mut self, tab: Tab) {
        self.active = tab;
    }

    pub fn is_visible(&self, tab: Tab) -> bool {
        self.result_visible && self.active == tab
    }

    pub fn result_visible(&self) -> bool {
        self.result_visible
    }

    pub fn process_visible(&self) -> bool {
        self.process_visible
    }

    pub fn optimized_badge_visible(&self) -> bool {
        self.optimized_badge_visible
    }

    pub fn reoptimize_visible(&self) -> bool {
        self.reoptimize_visible
    }

    pub fn download_href(&self) -> Option<&str> {
        self.download_href.as_deref()
    }

    pub fn show_process(&mut self) {
        self.process_visible = true;
    }

    /// Applied after a successful generation only.
    pub fn reveal_result(&mut self, was_optimized: bool) {
        self.result_visible = true;
        self.reoptimize_visible = true;
        self.optimized_badge_visible = was_optimized;
    }

    /// Enables the download link. A response without an id leaves the link as it was.
    pub fn offer_download(&mut self, href: Option<String>) {
        if let Some(href) = href {
            self.download_href = Some(href);
        }
    }

    /// Hides the result and process containers for a new submission.
    pub fn reset(&mut self) {
        self.result_visible = false;
        self.process_visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_boundaries() {
        assert_eq!(classify_score(8.0), BadgeClass::Success);
        assert_eq!(classify_score(10.0), BadgeClass::Success);
        assert_eq!(classify_score(7.999), BadgeClass::Primary);
        assert_eq!(classify_score(6.0), BadgeClass::Primary);
        assert_eq!(classify_score(5.999), BadgeClass::Info);
        assert_eq!(classify_score(0.0), BadgeClass::Info);
    }

    #[test]
    fn test_score_text_formats_like_integers_when_whole() {
        assert_eq!(score_text(9.0), "9/10");
        assert_eq!(score_text(7.5), "7.5/10");
        assert_eq!(score_text(0.0), "0/10");
    }

    #[test]
    fn test_initial_tab_is_code() {
        assert_eq!(ViewCoordinator::default().active(), Tab::Code);
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut view = ViewCoordinator::default();
        view.reveal_result(false);
        view.select(Tab::Feedback);
        let once = view.clone();
        view.select(Tab::Feedback);
        assert_eq!(view, once);

        let visible: Vec<_> = Tab::ALL.iter().filter(|t| view.is_visible(**t)).collect();
        assert_eq!(visible, vec![&Tab::Feedback]);
    }

    #[test]
    fn test_download_link_never_cleared() {
        let mut view = ViewCoordinator::default();
        view.offer_download(Some("http://svc/download_latex/r1".to_string()));
        view.offer_download(None);
        assert_eq!(view.download_href(), Some("http://svc/download_latex/r1"));
    }

    #[test]
    fn test_reveal_result_sets_optimized_badge() {
        let mut view = ViewCoordinator::default();
        view.reveal_result(true);
        assert!(view.optimized_badge_visible());
        assert!(view.reoptimize_visible());
        view.reveal_result(false);
        assert!(!view.optimized_badge_visible());
    }

    #[test]
    fn test_tab_from_str() {
        assert_eq!("Skills".parse::<Tab>().unwrap(), Tab::Skills);
        assert_eq!("latex".parse::<Tab>().unwrap(), Tab::Code);
        assert!("pdf".parse::<Tab>().is_err());
    }
}
