//! Action Pipeline — runs the user-triggered actions against the service.
//!
//! Flow per action: lock → `begin_*` (validate, log, ticket) → unlock →
//! one exchange → lock → `complete`. The session lock is never held across
//! a network await, so actions of different kinds may overlap freely.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::errors::{ActionError, ServiceError};
use crate::service_client::{GenerationService, SourceStore};
use crate::state::{ActionKind, Completion, ExportTarget, Outcome, Session, Ticket};
use crate::view::coordinator::Tab;
use crate::view::render::{render_page, Highlighter, PageView};

/// Shared handle to one session and the service it talks to.
#[derive(Clone)]
pub struct Controller {
    session: Arc<Mutex<Session>>,
    service: Arc<dyn GenerationService>,
    store: Arc<dyn SourceStore>,
}

impl Controller {
    pub fn new(
        session: Session,
        service: Arc<dyn GenerationService>,
        store: Arc<dyn SourceStore>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            service,
            store,
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Actions
    // ────────────────────────────────────────────────────────────────────────

    /// `Err` means the action was rejected before any exchange; the reason is
    /// already in the Process Log.
    pub async fn generate(&self) -> Result<Completion, ActionError> {
        let (ticket, request) = self.session.lock().await.begin_generate()?;
        info!("Generating resume ({} chars)", request.resume_content.len());
        let result = self.service.generate(&request).await;
        Ok(self.finish(ticket, result, Outcome::Generated).await)
    }

    pub async fn reoptimize(&self) -> Result<Completion, ActionError> {
        let (ticket, request) = self.session.lock().await.begin_reoptimize()?;
        let result = self.service.reoptimize(&request).await;
        Ok(self.finish(ticket, result, Outcome::Reoptimized).await)
    }

    pub async fn reanalyze_skills(&self) -> Result<Completion, ActionError> {
        let (ticket, request) = self.session.lock().await.begin_reanalyze_skills()?;
        let result = self.service.reanalyze_skills(&request).await;
        Ok(self.finish(ticket, result, Outcome::SkillsReanalyzed).await)
    }

    pub async fn regenerate_skills_section(&self) -> Completion {
        let (ticket, request) = self.session.lock().await.begin_regenerate_skills_section();
        let result = self.service.regenerate_skills_section(&request).await;
        self.finish(ticket, result, Outcome::SkillsSectionRegenerated)
            .await
    }

    pub async fn save_source(&self) -> Result<Completion, ActionError> {
        let (ticket, request) = self.session.lock().await.begin_save_source()?;
        let result = self.store.save_source(&request).await;
        Ok(self.finish(ticket, result, Outcome::SourceSaved).await)
    }

    /// Runs the action of the given kind.
    pub async fn run(&self, kind: ActionKind) -> Result<Completion, ActionError> {
        match kind {
            ActionKind::Generate => self.generate().await,
            ActionKind::Reoptimize => self.reoptimize().await,
            ActionKind::ReanalyzeSkills => self.reanalyze_skills().await,
            ActionKind::RegenerateSkillsSection => Ok(self.regenerate_skills_section().await),
            ActionKind::SaveSource => self.save_source().await,
        }
    }

    /// Fills the source field from the saved copy if the field is still blank.
    /// Failures are traced only.
    pub async fn load_source(&self) {
        match self.store.load_source().await {
            Ok(response) => {
                let Some(content) = response.resume_content.filter(|c| !c.trim().is_empty())
                else {
                    debug!("No saved resume to load");
                    return;
                };
                let mut session = self.session.lock().await;
                if session.form().source_document.trim().is_empty() {
                    info!("Loaded saved resume ({} chars)", content.len());
                    session.set_source_document(content);
                }
            }
            Err(e) => warn!("Could not load saved resume: {e}"),
        }
    }

    async fn finish<R>(
        &self,
        ticket: Ticket,
        result: Result<R, ServiceError>,
        wrap: fn(R) -> Outcome,
    ) -> Completion {
        let outcome = match result {
            Ok(response) => wrap(response),
            Err(e) => Outcome::Failed(e.into()),
        };
        let completion = self.session.lock().await.complete(ticket, outcome);
        debug!("{:?} #{} completed: {completion:?}", ticket.kind, ticket.seq);
        completion
    }

    // ────────────────────────────────────────────────────────────────────────
    // Input events
    // ────────────────────────────────────────────────────────────────────────

    pub async fn set_source_document(&self, text: String) {
        self.session.lock().await.set_source_document(text);
    }

    pub async fn set_target_description(&self, text: String) {
        self.session.lock().await.set_target_description(text);
    }

    pub async fn set_company_name(&self, name: String) {
        self.session.lock().await.set_company_name(name);
    }

    pub async fn set_api_key(&self, key: Option<String>) {
        self.session.lock().await.set_api_key(key);
    }

    pub async fn select_tab(&self, tab: Tab) {
        self.session.lock().await.select_tab(tab);
    }

    pub async fn reset(&self) {
        self.session.lock().await.reset();
    }

    pub async fn export_text(&self, target: ExportTarget) -> Option<String> {
        self.session.lock().await.export_text(target)
    }

    pub async fn record_export(&self, target: ExportTarget, copied: bool) {
        self.session.lock().await.record_export(target, copied);
    }

    // ────────────────────────────────────────────────────────────────────────
    // Read access
    // ────────────────────────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub async fn render(&self, highlighter: &dyn Highlighter) -> PageView {
        render_page(&*self.session.lock().await, highlighter)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Background actions
// ────────────────────────────────────────────────────────────────────────────

pub type ActionResult = (ActionKind, Result<Completion, ActionError>);

/// Actions running in the background. Every spawned action is kept until it
/// is joined, so [`ActionSet::drain`] lets outstanding exchanges settle
/// before shutdown.
pub struct ActionSet {
    controller: Controller,
    tasks: JoinSet<ActionResult>,
}

impl ActionSet {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn(&mut self, kind: ActionKind) {
        let controller = self.controller.clone();
        self.tasks
            .spawn(async move { (kind, controller.run(kind).await) });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for the next action to settle. `None` once nothing is running.
    pub async fn next_finished(&mut self) -> Option<ActionResult> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(result) => return Some(result),
                Err(e) => warn!("Background action did not finish: {e}"),
            }
        }
        None
    }

    /// Waits for every outstanding action.
    pub async fn drain(&mut self) -> Vec<ActionResult> {
        let mut finished = Vec::with_capacity(self.tasks.len());
        while let Some(result) = self.next_finished().await {
            finished.push(result);
        }
        finished
    }
}
