use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub package_type: String,
    pub scheduled_time: String,
    pub status: JobStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Note stored on a job once proof of completion has been submitted.
pub fn completion_note(address: &str) -> String {
    format!("Selesai di {address}")
}

impl Job {
    /// Moves a pending job to in-progress. Returns `false` when the job had
    /// already left the pending state.
    pub fn start(&mut self) -> bool {
        if self.status != JobStatus::Pending {
            return false;
        }
        self.status = JobStatus::InProgress;
        true
    }

    /// Marks the job completed from any state and replaces its notes.
    pub fn complete(&mut self, address: &str) {
        self.status = JobStatus::Completed;
        self.notes = Some(completion_note(address));
    }
}
