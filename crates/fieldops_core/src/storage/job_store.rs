use crate::error::AppError;
use crate::model::{Job, JobStatus};
use std::collections::HashSet;

/// Ordered, in-memory collection of the jobs assigned for the session.
///
/// Jobs are loaded once from the seed and never removed; the only mutations
/// are the two forward status transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStore {
    jobs: Vec<Job>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyStarted,
    Completed,
}

impl JobStore {
    pub fn new(jobs: Vec<Job>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for job in &jobs {
            if job.id.trim().is_empty() {
                return Err(AppError::invalid_data("job id is required"));
            }
            if !seen.insert(job.id.as_str()) {
                return Err(AppError::invalid_data(format!(
                    "duplicate job id {}",
                    job.id
                )));
            }
        }

        Ok(Self { jobs })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    /// Jobs still waiting to be picked up. In-progress jobs are not counted.
    pub fn pending_count(&self) -> usize {
        pending_count(&self.jobs)
    }

    pub fn start(&mut self, id: &str) -> Option<StartOutcome> {
        let job = self.jobs.iter_mut().find(|job| job.id == id)?;
        let outcome = if job.status.is_terminal() {
            StartOutcome::Completed
        } else if job.start() {
            StartOutcome::Started
        } else {
            StartOutcome::AlreadyStarted
        };
        Some(outcome)
    }

    /// Completes the matching job whatever its current status. Unknown ids
    /// leave the store untouched.
    pub fn complete(&mut self, id: &str, address: &str) -> Option<Job> {
        let job = self.jobs.iter_mut().find(|job| job.id == id)?;
        job.complete(address);
        Some(job.clone())
    }
}

pub fn pending_count(jobs: &[Job]) -> usize {
    jobs.iter()
        .filter(|job| job.status == JobStatus::Pending)
        .count()
}
