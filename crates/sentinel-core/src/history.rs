//! Conversation history: bounded, shareable archive of completed runs.
//!
//! Injected into the API layer instead of living as a module-level
//! global; retention is capped so the process cannot grow without bound.
use std::collections::VecDeque;
use std::sync::RwLock;

use crate::data_model::FinalResult;

pub struct ConversationHistory {
    entries: RwLock<VecDeque<FinalResult>>,
    capacity: usize,
}

impl ConversationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    /// Archive one finished run, evicting the oldest entry at capacity.
    pub fn record(&self, result: FinalResult) {
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(result);
    }

    /// The most recent runs, newest last, at most `n`.
    pub fn recent(&self, n: usize) -> Vec<FinalResult> {
        let entries = match self.entries.read() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn find(&self, conversation_id: &str) -> Option<FinalResult> {
        let entries = match self.entries.read() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries
            .iter()
            .find(|r| r.conversation_id == conversation_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(id: &str) -> FinalResult {
        FinalResult {
            conversation_id: id.to_string(),
            question: "q".to_string(),
            response: "r".to_string(),
            sources: vec![],
            tool_results: BTreeMap::new(),
            confidence: 0.0,
            requires_human_review: false,
            trace: vec![],
            processing_ms: 1,
        }
    }

    #[test]
    fn test_record_and_find() {
        let history = ConversationHistory::new(10);
        history.record(result("abc"));
        assert_eq!(history.len(), 1);
        assert!(history.find("abc").is_some());
        assert!(history.find("missing").is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let history = ConversationHistory::new(2);
        history.record(result("first"));
        history.record(result("second"));
        history.record(result("third"));

        assert_eq!(history.len(), 2);
        assert!(history.find("first").is_none());
        assert!(history.find("third").is_some());
    }

    #[test]
    fn test_recent_returns_newest_last() {
        let history = ConversationHistory::new(10);
        for id in ["a", "b", "c"] {
            history.record(result(id));
        }

        let recent = history.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].conversation_id, "b");
        assert_eq!(recent[1].conversation_id, "c");
    }
}
