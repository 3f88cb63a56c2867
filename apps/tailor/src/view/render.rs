//! Renders a [`Session`] into a plain [`PageView`], the data the terminal
//! front end prints. Rendering is a pure function of the session.

use std::fmt;

use crate::models::skills::SkillCategory;
use crate::process_log::LogKind;
use crate::skills::{
    GroupView, NO_CURRENT_SKILLS, NO_MISSING_SKILLS, NO_RECOMMENDED_SKILLS,
};
use crate::state::Session;
use crate::view::coordinator::{classify_score, score_text, BadgeClass, Tab};

pub const NO_CODE: &str = "No LaTeX code generated";
pub const NO_FEEDBACK: &str = "No feedback available";

// ────────────────────────────────────────────────────────────────────────────
// Syntax highlighting
// ────────────────────────────────────────────────────────────────────────────

/// Formatting applied to generated code at render time only.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str) -> String;
}

pub struct PlainText;

impl Highlighter for PlainText {
    fn highlight(&self, code: &str) -> String {
        code.to_string()
    }
}

/// Colors LaTeX control sequences and `%` comments with ANSI escapes.
pub struct AnsiLatex;

const ANSI_COMMAND: &str = "\x1b[36m";
const ANSI_COMMENT: &str = "\x1b[2m";
const ANSI_RESET: &str = "\x1b[0m";

impl Highlighter for AnsiLatex {
    fn highlight(&self, code: &str) -> String {
        let mut out = String::with_capacity(code.len() + code.len() / 4);
        for (i, line) in code.split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
            }
            highlight_line(line, &mut out);
        }
        out
    }
}

fn highlight_line(line: &str, out: &mut String) {
    let mut chars = line.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            // Escaped `\%` never reaches here: the command arm consumes it.
            '%' => {
                out.push_str(ANSI_COMMENT);
                out.push_str(&line[idx..]);
                out.push_str(ANSI_RESET);
                return;
            }
            '\\' => {
                out.push_str(ANSI_COMMAND);
                out.push('\\');
                let mut took_letter = false;
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_alphabetic() {
                        out.push(next);
                        chars.next();
                        took_letter = true;
                    } else {
                        break;
                    }
                }
                if !took_letter {
                    if let Some((_, next)) = chars.next() {
                        out.push(next);
                    }
                }
                out.push_str(ANSI_RESET);
            }
            _ => out.push(ch),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub title: String,
    pub heading: String,
    /// `None` while the log container is hidden.
    pub process_log: Option<Vec<LogLine>>,
    /// `None` while the result view is hidden.
    pub result: Option<ResultPanel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub time: String,
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultPanel {
    pub active: Tab,
    pub score_badge: String,
    pub badge_class: BadgeClass,
    pub optimized_badge: bool,
    pub optimization_status: String,
    pub download_href: Option<String>,
    pub reoptimize_available: bool,
    pub body: PanelBody,
}

/// Content of the single visible tab.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    Code(String),
    Feedback(Vec<String>),
    Skills(SkillsPanel),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillsPanel {
    pub current: RenderedGroup,
    pub missing: RenderedGroup,
    pub recommended: RenderedGroup,
    pub latex_section: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedGroup {
    Categories(Vec<SkillCategory>),
    Items(Vec<String>),
    Sentinel(&'static str),
}

pub fn render_page(session: &Session, highlighter: &dyn Highlighter) -> PageView {
    let view = session.view();
    let title = session.title();

    let process_log = view.process_visible().then(|| {
        session
            .log()
            .entries()
            .iter()
            .map(|entry| LogLine {
                time: entry.at.format("%H:%M:%S").to_string(),
                text: entry.text.clone(),
                is_error: entry.kind == LogKind::Error,
            })
            .collect()
    });

    let result = view.result_visible().then(|| {
        let state = session.result();
        ResultPanel {
            active: view.active(),
            score_badge: score_text(state.score),
            badge_class: classify_score(state.score),
            optimized_badge: view.optimized_badge_visible(),
            optimization_status: session.optimization_status().to_string(),
            download_href: view.download_href().map(str::to_string),
            reoptimize_available: view.reoptimize_visible(),
            body: render_body(session, view.active(), highlighter),
        }
    });

    PageView {
        title: title.title.clone(),
        heading: title.heading.clone(),
        process_log,
        result,
    }
}

fn render_body(session: &Session, tab: Tab, highlighter: &dyn Highlighter) -> PanelBody {
    let state = session.result();
    match tab {
        Tab::Code => PanelBody::Code(if state.document_code.is_empty() {
            NO_CODE.to_string()
        } else {
            highlighter.highlight(&state.document_code)
        }),
        Tab::Feedback => {
            let text = if state.feedback_text.is_empty() {
                NO_FEEDBACK
            } else {
                state.feedback_text.as_str()
            };
            PanelBody::Feedback(text.split('\n').map(str::to_string).collect())
        }
        Tab::Skills => {
            let skills = state.skills.clone().unwrap_or_default();
            PanelBody::Skills(SkillsPanel {
                current: render_group(&skills.current, NO_CURRENT_SKILLS),
                missing: render_group(&skills.missing, NO_MISSING_SKILLS),
                recommended: render_group(&skills.recommended, NO_RECOMMENDED_SKILLS),
                latex_section: match &skills.latex_section {
                    Some(section) => highlighter.highlight(section),
                    None => skills.latex_section_text().to_string(),
                },
            })
        }
    }
}

fn render_group(group: &GroupView, sentinel: &'static str) -> RenderedGroup {
    match group {
        GroupView::Categorized(categories) => RenderedGroup::Categories(categories.clone()),
        GroupView::Listed(items) => RenderedGroup::Items(items.clone()),
        GroupView::NoneFound => RenderedGroup::Sentinel(sentinel),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Terminal output
// ────────────────────────────────────────────────────────────────────────────

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.heading)?;

        if let Some(lines) = &self.process_log {
            writeln!(f)?;
            writeln!(f, "-- Process --")?;
            for line in lines {
                let marker = if line.is_error { "!" } else { " " };
                writeln!(f, "{marker} [{}] {}", line.time, line.text)?;
            }
        }

        if let Some(result) = &self.result {
            writeln!(f)?;
            write!(f, "{result}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ResultPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tabs: Vec<String> = Tab::ALL
            .iter()
            .map(|tab| {
                if *tab == self.active {
                    format!("[{}]", tab.label())
                } else {
                    format!(" {} ", tab.label())
                }
            })
            .collect();
        writeln!(f, "{}", tabs.join(" "))?;

        write!(f, "Score: {} ({})", self.score_badge, self.badge_class)?;
        if self.optimized_badge {
            write!(f, "  [Optimized]")?;
        }
        writeln!(f)?;
        if !self.optimization_status.is_empty() {
            writeln!(f, "{}", self.optimization_status)?;
        }
        if let Some(href) = &self.download_href {
            writeln!(f, "Download: {href}")?;
        }
        writeln!(f)?;

        match &self.body {
            PanelBody::Code(code) => writeln!(f, "{code}"),
            PanelBody::Feedback(lines) => {
                for line in lines {
                    writeln!(f, "{line}")?;
                }
                Ok(())
            }
            PanelBody::Skills(panel) => {
                write_group(f, "Current Skills", &panel.current)?;
                write_group(f, "Missing Skills", &panel.missing)?;
                write_group(f, "Recommended Skills", &panel.recommended)?;
                writeln!(f, "LaTeX Skills Section:")?;
                writeln!(f, "{}", panel.latex_section)
            }
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, heading: &str, group: &RenderedGroup) -> fmt::Result {
    writeln!(f, "{heading}:")?;
    match group {
        RenderedGroup::Categories(categories) => {
            for category in categories {
                writeln!(f, "  {}", category.name)?;
                for skill in &category.skills {
                    writeln!(f, "    - {skill}")?;
                }
            }
        }
        RenderedGroup::Items(items) => {
            for item in items {
                writeln!(f, "  - {item}")?;
            }
        }
        RenderedGroup::Sentinel(text) => writeln!(f, "  ({text})")?,
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Outcome;
    use serde_json::json;

    fn scenario_session() -> Session {
        let mut session = Session::new("http://svc");
        session.set_source_document("My resume");
        session.set_target_description("Go engineer");
        let (ticket, _) = session.begin_generate().unwrap();
        session.complete(
            ticket,
            Outcome::Generated(
                serde_json::from_value(json!({
                    "latex_code": "X",
                    "feedback": "A\nB",
                    "score": 9,
                    "skills_analysis": {"current_skills_by_category": {"Languages": ["Go", " "]}},
                    "resume_id": "r1",
                    "optimized": true
                }))
                .unwrap(),
            ),
        );
        session
    }

    #[test]
    fn test_generate_scenario_renders_every_view() {
        let mut session = scenario_session();

        let page = render_page(&session, &PlainText);
        let result = page.result.unwrap();
        assert_eq!(result.body, PanelBody::Code("X".to_string()));
        assert_eq!(result.score_badge, "9/10");
        assert_eq!(result.badge_class, BadgeClass::Success);
        assert!(result.optimized_badge);
        assert_eq!(
            result.download_href.as_deref(),
            Some("http://svc/download_latex/r1")
        );

        session.select_tab(Tab::Feedback);
        let page = render_page(&session, &PlainText);
        assert_eq!(
            page.result.unwrap().body,
            PanelBody::Feedback(vec!["A".to_string(), "B".to_string()])
        );

        session.select_tab(Tab::Skills);
        let page = render_page(&session, &PlainText);
        let PanelBody::Skills(panel) = page.result.unwrap().body else {
            panic!("expected skills panel");
        };
        assert_eq!(
            panel.current,
            RenderedGroup::Categories(vec![SkillCategory::new(
                "Languages",
                vec!["Go".to_string()]
            )])
        );
        assert_eq!(panel.missing, RenderedGroup::Sentinel(NO_MISSING_SKILLS));
        assert_eq!(panel.recommended, RenderedGroup::Sentinel(NO_RECOMMENDED_SKILLS));
        assert_eq!(panel.latex_section, crate::skills::NO_SKILLS_SECTION);
    }

    #[test]
    fn test_hidden_result_renders_nothing() {
        let session = Session::new("http://svc");
        let page = render_page(&session, &PlainText);
        assert!(page.result.is_none());
        assert!(page.process_log.is_none());
        assert_eq!(page.heading, "AI Resume Generator");
    }

    #[test]
    fn test_validation_error_before_generate_is_rendered() {
        let mut session = Session::new("http://svc");
        session.set_source_document("My resume");
        session.begin_generate().unwrap_err();

        let page = render_page(&session, &PlainText);
        let lines = page.process_log.as_ref().expect("log should be visible");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_error);
        assert_eq!(lines[0].text, "Please provide a job description for tailoring.");
        assert!(page.result.is_none());
        assert!(page.to_string().contains("Please provide a job description"));
    }

    #[test]
    fn test_empty_fields_render_placeholders() {
        let mut session = Session::new("http://svc");
        session.set_source_document("r");
        session.set_target_description("j");
        let (ticket, _) = session.begin_generate().unwrap();
        session.complete(ticket, Outcome::Generated(Default::default()));

        let page = render_page(&session, &PlainText);
        let result = page.result.unwrap();
        assert_eq!(result.body, PanelBody::Code(NO_CODE.to_string()));
        assert_eq!(result.score_badge, "0/10");
        assert_eq!(result.badge_class, BadgeClass::Info);

        session.select_tab(Tab::Feedback);
        let page = render_page(&session, &PlainText);
        assert_eq!(
            page.result.unwrap().body,
            PanelBody::Feedback(vec![NO_FEEDBACK.to_string()])
        );
    }

    #[test]
    fn test_display_marks_active_tab_and_errors() {
        let mut session = scenario_session();
        session.select_tab(Tab::Feedback);
        let text = render_page(&session, &PlainText).to_string();
        assert!(text.contains("[Feedback]"));
        assert!(text.contains(" LaTeX Code "));
        assert!(text.contains("Score: 9/10 (success)  [Optimized]"));
    }

    #[test]
    fn test_ansi_latex_highlights_commands_and_comments() {
        let out = AnsiLatex.highlight("\\section{Skills} 100\\% % note");
        assert!(out.starts_with("\x1b[36m\\section\x1b[0m{Skills}"));
        assert!(out.contains("\x1b[36m\\%\x1b[0m"));
        assert!(out.ends_with("\x1b[2m% note\x1b[0m"));
    }

    #[test]
    fn test_plain_text_is_identity() {
        assert_eq!(PlainText.highlight("\\item{x}"), "\\item{x}");
    }
}
