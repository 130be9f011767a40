use crate::payload::normalize_confirmation;
use crate::record::ContextMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Submission awaiting its confirmation, exclusively owned by the table.
/// The event store holds a copy, never a shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEntry {
    pub correlation_token: String,
    pub content: String,
    pub created_at_ms: u64,
    #[serde(default)]
    pub context: ContextMap,
}

/// Which layer of the matching strategy produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    DirectToken,
    Content,
    Recency,
}

/// Fixed priority order of the matching strategies; first hit wins.
pub const MATCH_STRATEGIES: [MatchStrategy; 3] = [
    MatchStrategy::DirectToken,
    MatchStrategy::Content,
    MatchStrategy::Recency,
];

/// Successful resolution: the removed entry plus the strategy that won.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMatch {
    pub entry: PendingEntry,
    pub strategy: MatchStrategy,
}

/// Table of unconfirmed submissions keyed by correlation token.
///
/// Tokens embed a zero-padded creation timestamp, so map iteration runs in
/// creation order and the content-matching heuristic is deterministic.
pub struct PendingTable {
    entries: BTreeMap<String, PendingEntry>,
    ttl_ms: u64,
}

impl PendingTable {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            entries: BTreeMap::new(),
            ttl_ms: ttl_ms.max(1),
        }
    }

    pub fn insert(&mut self, entry: PendingEntry) {
        self.entries.insert(entry.correlation_token.clone(), entry);
    }

    /// Atomic remove-if-present. This is the seam that makes the
    /// timeout/resolve race safe: whichever side runs second finds nothing.
    pub fn remove(&mut self, correlation_token: &str) -> Option<PendingEntry> {
        self.entries.remove(correlation_token)
    }

    pub fn contains(&self, correlation_token: &str) -> bool {
        self.entries.contains_key(correlation_token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Matches a confirmation against the table, trying each strategy in
    /// priority order. On success exactly one entry is removed and returned.
    pub fn resolve(
        &mut self,
        raw_content: &str,
        hinted_token: Option<&str>,
        now_ms: u64,
    ) -> Option<ResolvedMatch> {
        for strategy in MATCH_STRATEGIES {
            let token = match strategy {
                MatchStrategy::DirectToken => self.match_direct(hinted_token, now_ms),
                MatchStrategy::Content => self.match_content(raw_content, now_ms),
                MatchStrategy::Recency => self.match_recency(now_ms),
            };
            if let Some(token) = token {
                let entry = self.entries.remove(&token)?;
                return Some(ResolvedMatch { entry, strategy });
            }
        }
        None
    }

    /// Removes every expired entry, returning them so the caller can apply
    /// the terminal transition to the corresponding store records.
    pub fn expire(&mut self, now_ms: u64) -> Vec<PendingEntry> {
        let ttl_ms = self.ttl_ms;
        let expired_tokens: Vec<String> = self
            .entries
            .values()
            .filter(|entry| !is_live(entry, now_ms, ttl_ms))
            .map(|entry| entry.correlation_token.clone())
            .collect();
        expired_tokens
            .into_iter()
            .filter_map(|token| self.entries.remove(&token))
            .collect()
    }

    fn match_direct(&self, hinted_token: Option<&str>, now_ms: u64) -> Option<String> {
        let token = hinted_token?;
        self.entries
            .get(token)
            .filter(|entry| is_live(entry, now_ms, self.ttl_ms))
            .map(|entry| entry.correlation_token.clone())
    }

    /// Best-effort content heuristic: equal after reply-quote normalization,
    /// or substring in either direction. Known limitation: two pending
    /// entries sharing a substring can steal each other's confirmation.
    fn match_content(&self, raw_content: &str, now_ms: u64) -> Option<String> {
        let normalized = normalize_confirmation(raw_content);
        if normalized.is_empty() {
            return None;
        }
        self.entries
            .values()
            .filter(|entry| is_live(entry, now_ms, self.ttl_ms))
            .find(|entry| {
                entry.content == normalized
                    || entry.content.contains(&normalized)
                    || normalized.contains(&entry.content)
            })
            .map(|entry| entry.correlation_token.clone())
    }

    /// Confirmations do not always echo the original content verbatim, so the
    /// last resort is the most recently created live entry.
    fn match_recency(&self, now_ms: u64) -> Option<String> {
        self.entries
            .values()
            .filter(|entry| is_live(entry, now_ms, self.ttl_ms))
            .max_by_key(|entry| entry.created_at_ms)
            .map(|entry| entry.correlation_token.clone())
    }
}

/// An entry exactly at its TTL counts as expired.
fn is_live(entry: &PendingEntry, now_ms: u64, ttl_ms: u64) -> bool {
    now_ms.saturating_sub(entry.created_at_ms) < ttl_ms
}

/// Generates correlation tokens: zero-padded creation timestamp, monotonic
/// sequence, random suffix. Sorting tokens therefore sorts by creation.
#[derive(Debug, Default)]
pub struct TokenGenerator {
    sequence: u64,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_token(&mut self, now_ms: u64) -> String {
        self.sequence = self.sequence.wrapping_add(1);
        let suffix: u32 = rand::random();
        format!("{now_ms:013}-{:06}-{suffix:08x}", self.sequence)
    }
}
