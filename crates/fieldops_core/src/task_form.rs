use crate::error::AppError;
use crate::geolocation::{GeolocationError, PositionOptions, resolve_fix};
use crate::model::{Coordinates, Job, LocationFix};
use serde::Serialize;

pub const MISSING_PROOF_NOTICE: &str = "Mohon ambil foto dan pastikan lokasi terdeteksi";

/// Identity of one opened form. A form closed and reopened for the same job
/// gets a new id, so late results for the old one are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FormId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    pub form: FormId,
    pub seq: u64,
    pub options: PositionOptions,
}

/// Proof collected by a form, ready to be handed to the job store.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub job_id: String,
    pub photo: String,
    pub location: LocationFix,
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    id: FormId,
    job: Job,
    photo: Option<String>,
    location: Option<LocationFix>,
    notes: String,
    options: PositionOptions,
    next_seq: u64,
    awaiting: Option<u64>,
}

impl TaskForm {
    /// Opens the form and issues the single automatic location request.
    pub fn open(id: FormId, job: Job, options: PositionOptions) -> (Self, LocationRequest) {
        let mut form = Self {
            id,
            job,
            photo: None,
            location: None,
            notes: String::new(),
            options,
            next_seq: 0,
            awaiting: None,
        };
        let request = form.request_location();
        (form, request)
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn location(&self) -> Option<&LocationFix> {
        self.location.as_ref()
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn is_getting_location(&self) -> bool {
        self.awaiting.is_some()
    }

    /// Starts a location request. Only the latest request may update the form.
    pub fn request_location(&mut self) -> LocationRequest {
        self.next_seq += 1;
        self.awaiting = Some(self.next_seq);
        LocationRequest {
            form: self.id,
            seq: self.next_seq,
            options: self.options,
        }
    }

    pub fn apply_location(
        &mut self,
        request: &LocationRequest,
        outcome: Result<Coordinates, GeolocationError>,
    ) -> bool {
        if request.form != self.id || self.awaiting != Some(request.seq) {
            tracing::debug!(
                form = request.form.0,
                seq = request.seq,
                "dropping superseded location result"
            );
            return false;
        }

        self.location = Some(resolve_fix(outcome));
        self.awaiting = None;
        true
    }

    pub fn set_photo(&mut self, data_url: String) {
        self.photo = Some(data_url);
    }

    pub fn remove_photo(&mut self) -> bool {
        self.photo.take().is_some()
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = notes.to_string();
    }

    pub fn can_submit(&self) -> bool {
        self.photo.is_some() && self.location.is_some()
    }

    /// Packages the proof for completion. The free-text notes are not part of
    /// the completion; the stored note is derived from the location instead.
    pub fn submit(&self) -> Result<Completion, AppError> {
        match (self.photo.as_ref(), self.location.as_ref()) {
            (Some(photo), Some(location)) => Ok(Completion {
                job_id: self.job.id.clone(),
                photo: photo.clone(),
                location: location.clone(),
            }),
            _ => Err(AppError::invalid_input(MISSING_PROOF_NOTICE)),
        }
    }
}
