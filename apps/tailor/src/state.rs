//! Session state — the single container for everything the page shows.
//!
//! Each action goes through two entry points: a `begin_*` method that
//! validates inputs, writes the starting log line and issues a [`Ticket`], and
//! [`Session::complete`], which folds the exchange outcome back in. A failed
//! or stale completion never touches [`ResultState`].

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::errors::ActionError;
use crate::models::skills::parse_skills_analysis;
use crate::models::wire::{
    GenerateRequest, GenerateResponse, ReanalyzeSkillsRequest, ReanalyzeSkillsResponse,
    RegenerateSkillsRequest, RegenerateSkillsResponse, ReoptimizeRequest, ReoptimizeResponse,
    SaveSourceRequest, SaveSourceResponse,
};
use crate::process_log::ProcessLog;
use crate::service_client::download_reference;
use crate::skills::extract::regenerate_request;
use crate::skills::{normalize, CanonicalSkillsView};
use crate::view::coordinator::{Tab, ViewCoordinator};
use crate::view::title::{page_title, PageTitle};

pub const REOPTIMIZE_PENDING_STATUS: &str = "Re-optimization in progress...";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// The latest successfully generated artifact. Replaced wholesale on every
/// applied action, never edited in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultState {
    pub document_code: String,
    pub feedback_text: String,
    /// 0–10; absent in a response reads as 0.
    pub score: f64,
    /// Last normalized skills analysis, kept for the regeneration read-back.
    pub skills: Option<CanonicalSkillsView>,
    pub resume_id: Option<String>,
    pub was_optimized: bool,
    pub optimization_message: String,
    pub company_name: Option<String>,
}

/// Values of the page's input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInputs {
    pub source_document: String,
    pub target_description: String,
    pub company_name: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    Generate,
    Reoptimize,
    ReanalyzeSkills,
    RegenerateSkillsSection,
    SaveSource,
}

/// Which generated code a copy takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Code,
    SkillsSection,
}

/// Identifies one dispatched action. Only the newest ticket of each kind may
/// apply its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: ActionKind,
    pub seq: u64,
}

/// Result of the single network exchange of an action.
#[derive(Debug)]
pub enum Outcome {
    Generated(GenerateResponse),
    Reoptimized(ReoptimizeResponse),
    SkillsReanalyzed(ReanalyzeSkillsResponse),
    SkillsSectionRegenerated(RegenerateSkillsResponse),
    SourceSaved(SaveSourceResponse),
    Failed(ActionError),
}

/// What [`Session::complete`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Succeeded but lacked the section the action exists for; state untouched.
    Partial,
    Failed,
    /// Superseded by a newer dispatch of the same kind; discarded.
    Stale,
}

#[derive(Debug, Clone, Default)]
struct RequestSequencer {
    latest: BTreeMap<ActionKind, u64>,
}

impl RequestSequencer {
    fn issue(&mut self, kind: ActionKind) -> Ticket {
        let seq = self.latest.entry(kind).or_insert(0);
        *seq += 1;
        Ticket { kind, seq: *seq }
    }

    fn is_latest(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.kind) == Some(&ticket.seq)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Session {
    form: FormInputs,
    result: ResultState,
    view: ViewCoordinator,
    log: ProcessLog,
    title: PageTitle,
    sequencer: RequestSequencer,
    in_flight: BTreeMap<ActionKind, usize>,
    service_url: String,
}

impl Session {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            form: FormInputs::default(),
            result: ResultState::default(),
            view: ViewCoordinator::default(),
            log: ProcessLog::default(),
            title: page_title(""),
            sequencer: RequestSequencer::default(),
            in_flight: BTreeMap::new(),
            service_url: service_url.into(),
        }
    }

    pub fn form(&self) -> &FormInputs {
        &self.form
    }

    pub fn result(&self) -> &ResultState {
        &self.result
    }

    pub fn view(&self) -> &ViewCoordinator {
        &self.view
    }

    pub fn log(&self) -> &ProcessLog {
        &self.log
    }

    pub fn title(&self) -> &PageTitle {
        &self.title
    }

    pub fn is_pending(&self, kind: ActionKind) -> bool {
        self.in_flight.get(&kind).copied().unwrap_or(0) > 0
    }

    /// Status line shown next to the score.
    pub fn optimization_status(&self) -> &str {
        if self.is_pending(ActionKind::Reoptimize) {
            REOPTIMIZE_PENDING_STATUS
        } else {
            &self.result.optimization_message
        }
    }

    // ── input events ─────────────────────────────────────────────────────────

    pub fn set_source_document(&mut self, text: impl Into<String>) {
        self.form.source_document = text.into();
    }

    pub fn set_target_description(&mut self, text: impl Into<String>) {
        self.form.target_description = text.into();
    }

    /// Every edit re-derives the page title and heading.
    pub fn set_company_name(&mut self, name: impl Into<String>) {
        self.form.company_name = name.into();
        self.title = page_title(&self.form.company_name);
    }

    pub fn set_api_key(&mut self, key: Option<String>) {
        self.form.api_key = key.filter(|k| !k.trim().is_empty());
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.view.select(tab);
    }

    /// "New resume": hides the result and the log, keeps everything else.
    pub fn reset(&mut self) {
        self.view.reset();
    }

    // ── copies ───────────────────────────────────────────────────────────────

    /// Text a copy of the code view or the skills code section takes. `None`
    /// while nothing has been generated for it.
    pub fn export_text(&self, target: ExportTarget) -> Option<String> {
        match target {
            ExportTarget::Code => {
                Some(self.result.document_code.clone()).filter(|code| !code.is_empty())
            }
            ExportTarget::SkillsSection => self
                .result
                .skills
                .as_ref()
                .and_then(|skills| skills.latex_section.clone()),
        }
    }

    pub fn record_export(&mut self, target: ExportTarget, copied: bool) {
        self.view.show_process();
        match (target, copied) {
            (ExportTarget::Code, true) => self.log.system("LaTeX code copied!"),
            (ExportTarget::Code, false) => self.log.error("Failed to copy LaTeX code."),
            (ExportTarget::SkillsSection, true) => self.log.system("Skills LaTeX code copied!"),
            (ExportTarget::SkillsSection, false) => {
                self.log.error("Failed to copy skills LaTeX code.")
            }
        }
    }

    // ── action starts ────────────────────────────────────────────────────────

    pub fn begin_generate(&mut self) -> Result<(Ticket, GenerateRequest), ActionError> {
        if self.form.source_document.trim().is_empty() {
            return Err(self.reject("Please provide your resume content."));
        }
        if self.form.target_description.trim().is_empty() {
            return Err(self.reject("Please provide a job description for tailoring."));
        }

        self.log.clear();
        self.log.system("Submitting resume for processing...");

        let request = GenerateRequest {
            resume_content: self.form.source_document.clone(),
            job_description: self.form.target_description.clone(),
            company_name: self.form.company_name.trim().to_string(),
            api_key: self.form.api_key.clone(),
        };
        Ok((self.dispatch(ActionKind::Generate), request))
    }

    pub fn begin_reoptimize(&mut self) -> Result<(Ticket, ReoptimizeRequest), ActionError> {
        self.require_generated_code()?;
        self.require_target_description()?;

        self.log.system("Re-optimizing resume...");
        let request = ReoptimizeRequest {
            latex_code: self.result.document_code.clone(),
            job_description: self.form.target_description.clone(),
            feedback: self.result.feedback_text.clone(),
            api_key: self.form.api_key.clone(),
        };
        Ok((self.dispatch(ActionKind::Reoptimize), request))
    }

    pub fn begin_reanalyze_skills(
        &mut self,
    ) -> Result<(Ticket, ReanalyzeSkillsRequest), ActionError> {
        self.require_generated_code()?;
        self.require_target_description()?;

        self.log.system("Re-analyzing skills...");
        let request = ReanalyzeSkillsRequest {
            latex_code: self.result.document_code.clone(),
            job_description: self.form.target_description.clone(),
            api_key: self.form.api_key.clone(),
        };
        Ok((self.dispatch(ActionKind::ReanalyzeSkills), request))
    }

    /// Reads the categorized skills back from the retained canonical view.
    /// With no analysis yet the request carries empty mappings.
    pub fn begin_regenerate_skills_section(&mut self) -> (Ticket, RegenerateSkillsRequest) {
        self.log.system("Regenerating skills LaTeX section...");
        let request = self
            .result
            .skills
            .as_ref()
            .map(regenerate_request)
            .unwrap_or_default();
        (self.dispatch(ActionKind::RegenerateSkillsSection), request)
    }

    pub fn begin_save_source(&mut self) -> Result<(Ticket, SaveSourceRequest), ActionError> {
        if self.form.source_document.trim().is_empty() {
            return Err(self.reject("Please enter your resume content before saving."));
        }

        self.log.system("Saving resume...");
        let request = SaveSourceRequest {
            resume_content: self.form.source_document.clone(),
        };
        Ok((self.dispatch(ActionKind::SaveSource), request))
    }

    fn require_generated_code(&mut self) -> Result<(), ActionError> {
        if self.result.document_code.trim().is_empty() {
            return Err(self.reject("No generated resume yet. Generate a resume first."));
        }
        Ok(())
    }

    fn require_target_description(&mut self) -> Result<(), ActionError> {
        if self.form.target_description.trim().is_empty() {
            return Err(self.reject("Please provide a job description for tailoring."));
        }
        Ok(())
    }

    fn reject(&mut self, message: &str) -> ActionError {
        self.view.show_process();
        self.log.error(message);
        ActionError::Validation(message.to_string())
    }

    fn dispatch(&mut self, kind: ActionKind) -> Ticket {
        self.view.show_process();
        *self.in_flight.entry(kind).or_insert(0) += 1;
        self.sequencer.issue(kind)
    }

    // ── completion ───────────────────────────────────────────────────────────

    /// Folds an exchange outcome into the session.
    pub fn complete(&mut self, ticket: Ticket, outcome: Outcome) -> Completion {
        if let Some(count) = self.in_flight.get_mut(&ticket.kind) {
            *count = count.saturating_sub(1);
        }

        if !self.sequencer.is_latest(&ticket) {
            warn!(
                "Discarding stale {:?} response (seq {})",
                ticket.kind, ticket.seq
            );
            return Completion::Stale;
        }

        self.view.show_process();
        match outcome {
            Outcome::Failed(err) => {
                self.log.error(err.log_message());
                Completion::Failed
            }
            Outcome::Generated(response) => self.apply_generated(response),
            Outcome::Reoptimized(response) => self.apply_reoptimized(response),
            Outcome::SkillsReanalyzed(response) => self.apply_reanalyzed(response),
            Outcome::SkillsSectionRegenerated(response) => self.apply_regenerated(response),
            Outcome::SourceSaved(response) => self.apply_saved(response),
        }
    }

    fn apply_generated(&mut self, response: GenerateResponse) -> Completion {
        self.log.system("Resume processed successfully!");
        if response.optimized {
            self.log
                .system("Resume was optimized to better match the job description.");
        }

        let skills = response
            .skills_analysis
            .as_ref()
            .and_then(parse_skills_analysis)
            .map(|payload| normalize(&payload));
        let skills_received = skills.is_some();

        let company_name = response
            .company_name
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(company) = &company_name {
            self.set_company_name(company.clone());
        }

        self.result = ResultState {
            document_code: response.latex_code.unwrap_or_default(),
            feedback_text: response.feedback.unwrap_or_default(),
            score: clamp_score(response.score),
            // A response without an analysis keeps the previous one on screen.
            skills: skills.or_else(|| self.result.skills.clone()),
            resume_id: response.resume_id,
            was_optimized: response.optimized,
            optimization_message: response.optimization_message.unwrap_or_default(),
            company_name,
        };

        if skills_received {
            self.log.system("Skills analysis completed successfully.");
        } else {
            self.log.system("Skills analysis data not available.");
        }

        self.view.reveal_result(self.result.was_optimized);
        self.offer_download();
        info!(
            "Generation applied: score {}, optimized {}",
            self.result.score, self.result.was_optimized
        );
        Completion::Applied
    }

    fn apply_reoptimized(&mut self, response: ReoptimizeResponse) -> Completion {
        let previous = &self.result;
        self.result = ResultState {
            document_code: response.latex_code.unwrap_or_default(),
            feedback_text: response.feedback.unwrap_or_default(),
            score: clamp_score(response.score),
            resume_id: response.resume_id.or_else(|| previous.resume_id.clone()),
            optimization_message: response.optimization_message.unwrap_or_default(),
            ..previous.clone()
        };
        self.log.system("Resume re-optimized!");
        self.offer_download();
        Completion::Applied
    }

    fn apply_reanalyzed(&mut self, response: ReanalyzeSkillsResponse) -> Completion {
        let Some(payload) = response
            .skills_analysis
            .as_ref()
            .and_then(parse_skills_analysis)
        else {
            self.log.system("Skills analysis data not available.");
            return Completion::Partial;
        };

        self.result = ResultState {
            skills: Some(normalize(&payload)),
            ..self.result.clone()
        };
        self.log.system("Skills re-analyzed successfully!");
        Completion::Applied
    }

    fn apply_regenerated(&mut self, response: RegenerateSkillsResponse) -> Completion {
        let Some(section) = response.latex_skills_section.filter(|s| !s.is_empty()) else {
            self.log
                .system("Skills LaTeX section not included in the response.");
            return Completion::Partial;
        };

        let skills = CanonicalSkillsView {
            latex_section: Some(section),
            ..self.result.skills.clone().unwrap_or_default()
        };
        self.result = ResultState {
            skills: Some(skills),
            ..self.result.clone()
        };
        self.log
            .system("Skills LaTeX section regenerated successfully!");
        Completion::Applied
    }

    fn apply_saved(&mut self, response: SaveSourceResponse) -> Completion {
        if response.success {
            self.log.system("Resume saved successfully!");
            Completion::Applied
        } else {
            self.log.error("Failed to save resume.");
            Completion::Failed
        }
    }

    fn offer_download(&mut self) {
        let href = self
            .result
            .resume_id
            .as_deref()
            .map(|id| download_reference(&self.service_url, id));
        self.view.offer_download(href);
    }
}

fn clamp_score(score: Option<f64>) -> f64 {
    score.unwrap_or(0.0).clamp(0.0, 10.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
