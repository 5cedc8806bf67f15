use crate::model::{Job, JobStatus, Priority};
use crate::storage::job_store::pending_count;
use serde::Serialize;

pub const CHAT_ACTION_LABEL: &str = "Chat dengan CS Support";

/// Interactions a job row can emit. Each maps to exactly one controller
/// action; opening the chat never selects the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobListEvent {
    Select(String),
    OpenChat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub status: JobStatus,
    pub icon: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityBadge {
    pub priority: Priority,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRow {
    pub id: String,
    pub customer_name: String,
    pub address: String,
    pub scheduled_time: String,
    pub package_type: String,
    pub status: StatusBadge,
    pub priority: PriorityBadge,
    pub notes: Option<String>,
    pub chat_action: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobListView {
    pub pending_count: usize,
    pub banner: Option<String>,
    pub rows: Vec<JobRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    pub title: &'static str,
    pub pending_badge: Option<usize>,
}

pub fn status_badge(status: JobStatus) -> StatusBadge {
    let (icon, label, color) = match status {
        JobStatus::Completed => ("check-circle", "Selesai", "green"),
        JobStatus::InProgress => ("alert-circle", "Sedang Dikerjakan", "orange"),
        JobStatus::Pending => ("circle", "Belum Dikerjakan", "gray"),
    };
    StatusBadge {
        status,
        icon,
        label,
        color,
    }
}

pub fn priority_badge(priority: Priority) -> PriorityBadge {
    let (label, color) = match priority {
        Priority::High => ("Prioritas Tinggi", "red"),
        Priority::Medium => ("Prioritas Sedang", "yellow"),
        Priority::Low => ("Prioritas Rendah", "blue"),
    };
    PriorityBadge {
        priority,
        label,
        color,
    }
}

pub fn pending_banner(count: usize) -> Option<String> {
    (count > 0).then(|| format!("Anda memiliki {count} tugas baru yang belum dikerjakan"))
}

impl JobListView {
    /// `chat_enabled` says whether a chat handler is wired to the list.
    pub fn project(jobs: &[Job], chat_enabled: bool) -> Self {
        let pending_count = pending_count(jobs);
        let rows = jobs
            .iter()
            .map(|job| JobRow {
                id: job.id.clone(),
                customer_name: job.customer_name.clone(),
                address: job.address.clone(),
                scheduled_time: job.scheduled_time.clone(),
                package_type: job.package_type.clone(),
                status: status_badge(job.status),
                priority: priority_badge(job.priority),
                notes: job.notes.clone(),
                chat_action: (chat_enabled && job.status != JobStatus::Completed)
                    .then_some(CHAT_ACTION_LABEL),
            })
            .collect();

        Self {
            pending_count,
            banner: pending_banner(pending_count),
            rows,
        }
    }
}

impl HeaderView {
    pub fn project(jobs: &[Job]) -> Self {
        let count = pending_count(jobs);
        Self {
            title: "ISP Operations",
            pending_badge: (count > 0).then_some(count),
        }
    }
}
