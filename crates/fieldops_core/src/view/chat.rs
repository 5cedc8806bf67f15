use crate::chat::{ChatSession, ChatSessionId, QUICK_REPLIES};
use crate::model::Sender;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLine {
    pub id: String,
    pub sender: Sender,
    pub message: String,
    pub time: String,
    /// Delivery ticks are drawn on the technician's own messages only.
    pub ticks: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatView {
    pub session: ChatSessionId,
    pub title: &'static str,
    pub status: &'static str,
    pub job_banner: String,
    pub dial_link: String,
    pub lines: Vec<ChatLine>,
    pub typing: bool,
    pub quick_replies: Vec<&'static str>,
    pub draft: String,
}

impl ChatView {
    pub fn project(session: &ChatSession) -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        let job = session.job();
        Self {
            session: session.id(),
            title: "CS Support",
            status: "Online - Siap membantu",
            job_banner: format!("Job: {} - {}", job.customer_name, job.package_type),
            dial_link: session.dial_link(),
            lines: session
                .messages()
                .iter()
                .map(|message| ChatLine {
                    id: message.id.clone(),
                    sender: message.sender,
                    message: message.message.clone(),
                    time: clock_label(&message.timestamp, offset),
                    ticks: (message.sender == Sender::User)
                        .then_some(if message.read { "✓✓ dibaca" } else { "✓✓" }),
                })
                .collect(),
            typing: session.is_typing(),
            quick_replies: QUICK_REPLIES.to_vec(),
            draft: session.draft().to_string(),
        }
    }
}

/// `HH:MM` in the given offset; unparseable timestamps render as `--:--`.
pub fn clock_label(timestamp: &str, offset: UtcOffset) -> String {
    let format = format_description!("[hour]:[minute]");
    OffsetDateTime::parse(timestamp, &Rfc3339)
        .ok()
        .and_then(|parsed| parsed.to_offset(offset).format(&format).ok())
        .unwrap_or_else(|| "--:--".to_string())
}
