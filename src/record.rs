use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque contextual snapshot captured alongside a submission (page, video,
/// location metadata). The engine never interprets the keys.
pub type ContextMap = BTreeMap<String, String>;

/// Lifecycle state of a reconciled record. Transitions only leave
/// `AwaitingConfirmation`; both other states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    AwaitingConfirmation,
    Confirmed,
    ConfirmationTimedOut,
}

impl RecordStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RecordStatus::AwaitingConfirmation)
    }
}

/// Structured media descriptor extracted from a submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub index: usize,
}

/// Durable record of one submission and (eventually) its confirmation.
///
/// At most one live record exists per correlation token; confirmation and
/// timeout mutate the record in place rather than appending a second copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub content: String,
    pub created_at_ms: u64,
    pub correlation_token: String,
    #[serde(default)]
    pub confirmed_id: Option<String>,
    pub status: RecordStatus,
    #[serde(default)]
    pub attachments: Vec<MediaAttachment>,
    #[serde(default)]
    pub context: ContextMap,
}

impl EventRecord {
    /// Builds a record in the `AwaitingConfirmation` state.
    pub fn awaiting(
        correlation_token: impl Into<String>,
        content: impl Into<String>,
        created_at_ms: u64,
        attachments: Vec<MediaAttachment>,
        context: ContextMap,
    ) -> Self {
        Self {
            content: content.into(),
            created_at_ms,
            correlation_token: correlation_token.into(),
            confirmed_id: None,
            status: RecordStatus::AwaitingConfirmation,
            attachments,
            context,
        }
    }

    /// Applies the confirmed identifier. Returns false (and leaves the record
    /// untouched) if a terminal state was already reached.
    pub fn confirm(&mut self, confirmed_id: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.confirmed_id = Some(confirmed_id.into());
        self.status = RecordStatus::Confirmed;
        true
    }

    /// Marks the record as having outlived its confirmation window.
    pub fn time_out(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = RecordStatus::ConfirmationTimedOut;
        true
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}
