use serde::Serialize;
use std::collections::VecDeque;

use crate::classify::{ClassificationResult, Label};

pub const HISTORY_CAPACITY: usize = 10;

/// Entries shown on the dashboard, newest first.
pub const RECENT_SHOWN: usize = 5;

/// Per-session counters and bounded history.
///
/// `total == positive + negative` holds after every [`AnalyticsState::record`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct AnalyticsState {
    pub total: u64,
    pub positive: u64,
    pub negative: u64,
    history: VecDeque<ClassificationResult>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalyticsSnapshot {
    pub total: u64,
    pub positive: u64,
    pub negative: u64,
    pub positive_share: f64,
    pub negative_share: f64,
    /// Oldest first.
    pub history: Vec<ClassificationResult>,
    /// Newest first.
    pub recent: Vec<ClassificationResult>,
}

impl AnalyticsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: ClassificationResult) {
        self.total += 1;
        match result.label {
            Label::Positive => self.positive += 1,
            Label::Negative => self.negative += 1,
        }

        self.history.push_back(result);
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.history.iter()
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ClassificationResult> {
        self.history.iter().rev().take(limit).cloned().collect()
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let share = |n: u64| {
            if self.total == 0 {
                0.0
            } else {
                n as f64 / self.total as f64
            }
        };
        AnalyticsSnapshot {
            total: self.total,
            positive: self.positive,
            negative: self.negative,
            positive_share: share(self.positive),
            negative_share: share(self.negative),
            history: self.history().cloned().collect(),
            recent: self.recent(RECENT_SHOWN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(p: f32, text: &str) -> ClassificationResult {
        let labels = ["neg".to_string(), "pos".to_string()];
        ClassificationResult::new(p, text, &labels, 0.0)
    }

    #[test]
    fn counters_track_every_record() {
        let mut state = AnalyticsState::new();
        let probs = [0.9, 0.1, 0.5, 0.49, 0.7, 0.2, 0.99];
        for (i, &p) in probs.iter().enumerate() {
            state.record(result(p, "x"));
            assert_eq!(state.total, i as u64 + 1);
            assert_eq!(state.positive + state.negative, state.total);
        }
        assert_eq!(state.positive, 4);
        assert_eq!(state.negative, 3);
    }

    #[test]
    fn boundary_counts_as_positive() {
        let mut state = AnalyticsState::new();
        state.record(result(0.5, "tie"));
        assert_eq!(state.positive, 1);
        assert_eq!(state.negative, 0);
    }

    #[test]
    fn history_keeps_ten_most_recent_in_order() {
        let mut state = AnalyticsState::new();
        for i in 0..25 {
            state.record(result(0.9, &format!("entry {}", i)));
        }
        assert_eq!(state.total, 25);
        assert_eq!(state.history().count(), HISTORY_CAPACITY);
        let previews: Vec<_> = state.history().map(|r| r.text_preview.clone()).collect();
        let expected: Vec<_> = (15..25).map(|i| format!("entry {}", i)).collect();
        assert_eq!(previews, expected);
    }

    #[test]
    fn history_below_capacity_is_not_evicted() {
        let mut state = AnalyticsState::new();
        for i in 0..3 {
            state.record(result(0.2, &i.to_string()));
        }
        assert_eq!(state.history().count(), 3);
    }

    #[test]
    fn recent_is_newest_first() {
        let mut state = AnalyticsState::new();
        for i in 0..8 {
            state.record(result(0.9, &i.to_string()));
        }
        let recent: Vec<_> = state
            .recent(RECENT_SHOWN)
            .into_iter()
            .map(|r| r.text_preview)
            .collect();
        assert_eq!(recent, vec!["7", "6", "5", "4", "3"]);
    }

    #[test]
    fn snapshot_shares() {
        let empty = AnalyticsState::new().snapshot();
        assert_eq!(empty.positive_share, 0.0);
        assert!(empty.history.is_empty());

        let mut state = AnalyticsState::new();
        state.record(result(0.9, "a"));
        state.record(result(0.1, "b"));
        state.record(result(0.8, "c"));
        state.record(result(0.7, "d"));
        let snap = state.snapshot();
        assert_eq!(snap.positive_share, 0.75);
        assert_eq!(snap.negative_share, 0.25);
        assert_eq!(snap.history.len(), 4);
        assert_eq!(snap.recent[0].text_preview, "d");
    }
}
