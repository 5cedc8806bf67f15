pub mod responder;

use crate::error::AppError;
use crate::model::{ChatMessage, Job, Sender};
use responder::{AutoResponder, ReplyTopic};
use serde::Serialize;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1500);

pub const QUICK_REPLIES: [&str; 4] = [
    "Konfirmasi alamat pelanggan",
    "Konfirmasi nomor telepon",
    "Detail paket langganan",
    "Konfirmasi jadwal instalasi",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChatSessionId(pub u64);

/// A support reply scheduled by a send. It may only land in the session that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub session: ChatSessionId,
    pub job_id: String,
    pub topic: ReplyTopic,
    pub text: String,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    id: ChatSessionId,
    job: Job,
    messages: Vec<ChatMessage>,
    draft: String,
    pending: usize,
    next_seq: u64,
}

impl ChatSession {
    pub fn open(id: ChatSessionId, job: Job) -> Result<Self, AppError> {
        let mut session = Self {
            id,
            job,
            messages: Vec::new(),
            draft: String::new(),
            pending: 0,
            next_seq: 0,
        };

        let greeting = format!(
            "Halo! Saya dari CS Support. Ada yang bisa saya bantu terkait instalasi untuk {}?",
            session.job.customer_name
        );
        let sent_at = OffsetDateTime::now_utc() - time::Duration::minutes(1);
        session.push(Sender::Support, greeting, sent_at, true)?;
        Ok(session)
    }

    pub fn id(&self) -> ChatSessionId {
        self.id
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_typing(&self) -> bool {
        self.pending > 0
    }

    pub fn dial_link(&self) -> String {
        let digits: String = self
            .job
            .phone
            .chars()
            .filter(|ch| ch.is_ascii_digit() || *ch == '+')
            .collect();
        format!("tel:{digits}")
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }

    /// Fills the draft with a canned phrase without sending it.
    pub fn apply_quick_reply(&mut self, index: usize) -> Result<&str, AppError> {
        let phrase = QUICK_REPLIES.get(index).ok_or_else(|| {
            AppError::invalid_input(format!(
                "quick reply must be between 1 and {}",
                QUICK_REPLIES.len()
            ))
        })?;
        self.draft = phrase.to_string();
        Ok(phrase)
    }

    /// Appends the user's message and schedules exactly one support reply.
    /// Blank input is ignored.
    pub fn send(
        &mut self,
        text: &str,
        responder: &AutoResponder,
        delay: Duration,
    ) -> Result<Option<PendingReply>, AppError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        self.push(Sender::User, text.to_string(), OffsetDateTime::now_utc(), false)?;
        self.draft.clear();
        self.pending += 1;

        let reply = responder.reply(&self.job, text);
        tracing::debug!(
            session = self.id.0,
            job_id = %self.job.id,
            topic = ?reply.topic,
            "scheduled support reply"
        );

        Ok(Some(PendingReply {
            session: self.id,
            job_id: self.job.id.clone(),
            topic: reply.topic,
            text: reply.text,
            delay,
        }))
    }

    pub fn send_draft(
        &mut self,
        responder: &AutoResponder,
        delay: Duration,
    ) -> Result<Option<PendingReply>, AppError> {
        let draft = self.draft.clone();
        self.send(&draft, responder, delay)
    }

    pub fn deliver(&mut self, reply: &PendingReply) -> Result<bool, AppError> {
        if reply.session != self.id || self.pending == 0 {
            return Ok(false);
        }

        self.push(
            Sender::Support,
            reply.text.clone(),
            OffsetDateTime::now_utc(),
            true,
        )?;
        self.pending -= 1;
        Ok(true)
    }

    fn push(
        &mut self,
        sender: Sender,
        message: String,
        sent_at: OffsetDateTime,
        read: bool,
    ) -> Result<(), AppError> {
        self.next_seq += 1;
        let timestamp = sent_at
            .format(&Rfc3339)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        self.messages.push(ChatMessage {
            id: format!("msg-{:06}", self.next_seq),
            sender,
            message,
            timestamp,
            read,
        });
        Ok(())
    }
}
