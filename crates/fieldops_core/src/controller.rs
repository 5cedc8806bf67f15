use crate::chat::responder::AutoResponder;
use crate::chat::{ChatSession, ChatSessionId, DEFAULT_REPLY_DELAY, PendingReply};
use crate::error::AppError;
use crate::geolocation::{GeolocationError, PositionOptions};
use crate::model::{Coordinates, Employee, Job, LocationFix};
use crate::notify::{Notice, Notifier};
use crate::storage::job_store::StartOutcome;
use crate::storage::{JobStore, SeedData};
use crate::task_form::{FormId, LocationRequest, MISSING_PROOF_NOTICE, TaskForm};
use crate::view::job_list::JobListEvent;
use serde::Serialize;
use std::time::Duration;

pub const COMPLETION_NOTICE: &str = "Tugas berhasil diselesaikan!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Jobs,
    Profile,
}

impl View {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "jobs" | "tugas" => Some(Self::Jobs),
            "profile" | "profil" => Some(Self::Profile),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub chat_reply_delay: Duration,
    pub position_options: PositionOptions,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            chat_reply_delay: DEFAULT_REPLY_DELAY,
            position_options: PositionOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A fresh form is open and waits for the given location request.
    Opened(LocationRequest),
    AlreadyOpen,
    JobCompleted,
    UnknownJob,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(Job),
    /// The form lacked a photo or a location; nothing changed.
    Rejected,
    /// The form's job no longer exists in the store.
    UnknownJob,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
    Selected(SelectOutcome),
    ChatOpened(Option<ChatSessionId>),
    /// Completed rows carry no chat action.
    ChatUnavailable,
}

/// Root of the application: owns the session flag, the job store and the two
/// modal slots, and is the only place any of them change.
pub struct AppController {
    logged_in: bool,
    username: Option<String>,
    view: View,
    store: JobStore,
    employee: Employee,
    task_form: Option<TaskForm>,
    chat: Option<ChatSession>,
    responder: AutoResponder,
    notifier: Box<dyn Notifier>,
    settings: ControllerSettings,
    next_form_id: u64,
    next_chat_id: u64,
}

impl AppController {
    pub fn new(
        seed: SeedData,
        notifier: Box<dyn Notifier>,
        settings: ControllerSettings,
    ) -> Result<Self, AppError> {
        let store = JobStore::new(seed.jobs)?;
        Ok(Self {
            logged_in: false,
            username: None,
            view: View::Jobs,
            store,
            employee: seed.employee,
            task_form: None,
            chat: None,
            responder: AutoResponder::standard(),
            notifier,
            settings,
            next_form_id: 0,
            next_chat_id: 0,
        })
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn jobs(&self) -> &[Job] {
        self.store.jobs()
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.store.get(id)
    }

    pub fn pending_count(&self) -> usize {
        self.store.pending_count()
    }

    pub fn employee(&self) -> &Employee {
        &self.employee
    }

    pub fn task_form(&self) -> Option<&TaskForm> {
        self.task_form.as_ref()
    }

    pub fn selected_job_id(&self) -> Option<&str> {
        self.task_form.as_ref().map(|form| form.job().id.as_str())
    }

    pub fn chat(&self) -> Option<&ChatSession> {
        self.chat.as_ref()
    }

    /// Any non-empty pair is accepted; there is no credential store.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AppError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::invalid_input("username and password are required"));
        }

        self.logged_in = true;
        self.username = Some(username.to_string());
        tracing::info!(username, "technician logged in");
        Ok(())
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
        self.username = None;
        self.view = View::Jobs;
        self.task_form = None;
        self.chat = None;
        tracing::info!("technician logged out");
    }

    pub fn show_view(&mut self, view: View) -> Result<(), AppError> {
        self.ensure_logged_in()?;
        self.view = view;
        Ok(())
    }

    pub fn select_job(&mut self, job_id: &str) -> Result<SelectOutcome, AppError> {
        self.ensure_logged_in()?;
        let job_id = job_id.trim();

        if self.selected_job_id() == Some(job_id) {
            return Ok(SelectOutcome::AlreadyOpen);
        }

        match self.store.start(job_id) {
            None => {
                tracing::debug!(job_id, "select ignored: unknown job");
                Ok(SelectOutcome::UnknownJob)
            }
            Some(StartOutcome::Completed) => {
                tracing::debug!(job_id, "select ignored: job already completed");
                Ok(SelectOutcome::JobCompleted)
            }
            Some(outcome) => {
                if outcome == StartOutcome::Started {
                    tracing::info!(job_id, "job moved to in-progress");
                }
                let job = self
                    .store
                    .get(job_id)
                    .cloned()
                    .ok_or_else(|| AppError::invalid_data("selected job vanished"))?;
                self.next_form_id += 1;
                let (form, request) = TaskForm::open(
                    FormId(self.next_form_id),
                    job,
                    self.settings.position_options,
                );
                self.task_form = Some(form);
                Ok(SelectOutcome::Opened(request))
            }
        }
    }

    pub fn close_task_form(&mut self) -> bool {
        self.task_form.take().is_some()
    }

    pub fn refresh_location(&mut self) -> Result<LocationRequest, AppError> {
        Ok(self.open_form_mut()?.request_location())
    }

    /// Feeds a provider result back into the form that asked for it. Returns
    /// `false` when that form is gone or the request was superseded.
    pub fn apply_location(
        &mut self,
        request: &LocationRequest,
        outcome: Result<Coordinates, GeolocationError>,
    ) -> bool {
        match self.task_form.as_mut() {
            Some(form) => form.apply_location(request, outcome),
            None => false,
        }
    }

    pub fn attach_photo(&mut self, form: FormId, data_url: String) -> bool {
        match self.task_form.as_mut() {
            Some(open) if open.id() == form => {
                open.set_photo(data_url);
                true
            }
            _ => {
                tracing::debug!(form = form.0, "dropping photo for closed form");
                false
            }
        }
    }

    pub fn remove_photo(&mut self) -> Result<bool, AppError> {
        Ok(self.open_form_mut()?.remove_photo())
    }

    pub fn set_form_notes(&mut self, notes: &str) -> Result<(), AppError> {
        self.open_form_mut()?.set_notes(notes);
        Ok(())
    }

    pub fn submit_task_form(&mut self) -> Result<SubmitOutcome, AppError> {
        let completion = match self.open_form_mut()?.submit() {
            Ok(completion) => completion,
            Err(_) => {
                self.emit(Notice::warning(MISSING_PROOF_NOTICE));
                return Ok(SubmitOutcome::Rejected);
            }
        };

        match self.complete_job(&completion.job_id, &completion.photo, &completion.location)? {
            Some(job) => Ok(SubmitOutcome::Completed(job)),
            None => Ok(SubmitOutcome::UnknownJob),
        }
    }

    /// Marks a job completed with a note derived from the location. Unknown
    /// ids change nothing and raise no notice.
    pub fn complete_job(
        &mut self,
        job_id: &str,
        photo: &str,
        location: &LocationFix,
    ) -> Result<Option<Job>, AppError> {
        self.ensure_logged_in()?;

        let Some(job) = self.store.complete(job_id, &location.address) else {
            tracing::debug!(job_id, "completion ignored: unknown job");
            return Ok(None);
        };

        self.task_form = None;
        tracing::info!(
            job_id,
            address = %location.address,
            photo_bytes = photo.len(),
            "job completed"
        );
        self.emit(Notice::success(COMPLETION_NOTICE));
        Ok(Some(job))
    }

    /// Opens the support chat for a job, replacing any open chat. The log
    /// always starts fresh.
    pub fn open_chat(&mut self, job_id: &str) -> Result<Option<ChatSessionId>, AppError> {
        self.ensure_logged_in()?;
        let Some(job) = self.store.get(job_id.trim()).cloned() else {
            return Ok(None);
        };

        self.next_chat_id += 1;
        let id = ChatSessionId(self.next_chat_id);
        self.chat = Some(ChatSession::open(id, job)?);
        Ok(Some(id))
    }

    pub fn close_chat(&mut self) -> Option<ChatSessionId> {
        self.chat.take().map(|session| session.id())
    }

    pub fn send_chat_message(
        &mut self,
        job_id: &str,
        text: &str,
    ) -> Result<Option<PendingReply>, AppError> {
        self.ensure_logged_in()?;
        let delay = self.settings.chat_reply_delay;
        let job_id = job_id.trim();
        let session = match self.chat.as_mut() {
            Some(session) if session.job().id == job_id => session,
            Some(_) => {
                return Err(AppError::invalid_input(format!(
                    "chat is not open for {job_id}"
                )));
            }
            None => return Err(AppError::invalid_input("chat is not open")),
        };
        session.send(text, &self.responder, delay)
    }

    pub fn set_chat_draft(&mut self, text: &str) -> Result<(), AppError> {
        self.open_chat_mut()?.set_draft(text);
        Ok(())
    }

    pub fn apply_quick_reply(&mut self, index: usize) -> Result<String, AppError> {
        Ok(self.open_chat_mut()?.apply_quick_reply(index)?.to_string())
    }

    pub fn send_chat_draft(&mut self) -> Result<Option<PendingReply>, AppError> {
        let delay = self.settings.chat_reply_delay;
        self.ensure_logged_in()?;
        let session = self
            .chat
            .as_mut()
            .ok_or_else(|| AppError::invalid_input("chat is not open"))?;
        session.send_draft(&self.responder, delay)
    }

    /// Lands a scheduled reply if its chat is still the one on screen.
    pub fn deliver_reply(&mut self, reply: &PendingReply) -> Result<bool, AppError> {
        match self.chat.as_mut() {
            Some(session) => session.deliver(reply),
            None => {
                tracing::debug!(session = reply.session.0, "dropping reply for closed chat");
                Ok(false)
            }
        }
    }

    /// Routes a job list interaction to exactly one action.
    pub fn handle_list_event(&mut self, event: JobListEvent) -> Result<ListOutcome, AppError> {
        match event {
            JobListEvent::Select(job_id) => Ok(ListOutcome::Selected(self.select_job(&job_id)?)),
            JobListEvent::OpenChat(job_id) => {
                self.ensure_logged_in()?;
                if self
                    .store
                    .get(job_id.trim())
                    .is_some_and(|job| job.status.is_terminal())
                {
                    tracing::debug!(job_id = %job_id, "chat ignored: job already completed");
                    return Ok(ListOutcome::ChatUnavailable);
                }
                Ok(ListOutcome::ChatOpened(self.open_chat(&job_id)?))
            }
        }
    }

    fn ensure_logged_in(&self) -> Result<(), AppError> {
        if self.logged_in {
            Ok(())
        } else {
            Err(AppError::unauthenticated("login required"))
        }
    }

    fn open_form_mut(&mut self) -> Result<&mut TaskForm, AppError> {
        self.ensure_logged_in()?;
        self.task_form
            .as_mut()
            .ok_or_else(|| AppError::invalid_input("no task form is open"))
    }

    fn open_chat_mut(&mut self) -> Result<&mut ChatSession, AppError> {
        self.ensure_logged_in()?;
        self.chat
            .as_mut()
            .ok_or_else(|| AppError::invalid_input("chat is not open"))
    }

    fn emit(&self, notice: Notice) {
        if let Err(err) = self.notifier.notify(&notice) {
            tracing::warn!(error = %err, "failed to show notice");
        }
    }
}
