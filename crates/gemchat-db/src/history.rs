//! Per-user chat history stored as a JSON array under `user:<id>:history`.

use gemchat_types::models::HistoryEntry;

use crate::{Database, Result};

/// Most recent entries kept per user.
pub const HISTORY_LIMIT: usize = 100;

pub fn history_key(user_id: &str) -> String {
    format!("user:{}:history", user_id)
}

impl Database {
    pub fn get_history(&self, user_id: &str) -> Result<Vec<HistoryEntry>> {
        decode(self.kv_get(&history_key(user_id))?)
    }

    /// Append `entries` to the user's history and drop the oldest lines
    /// beyond [`HISTORY_LIMIT`].
    pub fn append_history(&self, user_id: &str, entries: Vec<HistoryEntry>) -> Result<()> {
        self.kv_update(&history_key(user_id), move |current| {
            let mut history = decode(current)?;
            push_capped(&mut history, entries, HISTORY_LIMIT);
            Ok(serde_json::to_string(&history)?)
        })
    }

    /// Remove every entry of `session_id`, leaving the rest in order.
    /// Returns how many entries were removed.
    pub fn delete_session(&self, user_id: &str, session_id: &str) -> Result<usize> {
        let mut removed = 0;
        self.kv_update(&history_key(user_id), |current| {
            let mut history = decode(current)?;
            removed = remove_session(&mut history, session_id);
            Ok(serde_json::to_string(&history)?)
        })?;
        Ok(removed)
    }
}

fn decode(raw: Option<String>) -> Result<Vec<HistoryEntry>> {
    match raw {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

fn push_capped(history: &mut Vec<HistoryEntry>, entries: Vec<HistoryEntry>, limit: usize) {
    history.extend(entries);
    if history.len() > limit {
        let excess = history.len() - limit;
        history.drain(..excess);
    }
}

fn remove_session(history: &mut Vec<HistoryEntry>, session_id: &str) -> usize {
    let before = history.len();
    history.retain(|entry| entry.session_id != session_id);
    before - history.len()
}
