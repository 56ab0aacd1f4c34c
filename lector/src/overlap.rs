//! Overlap resolution between suggestions.
//!
//! Highlights are drawn one region per suggestion, and two regions must never
//! intersect. When the service reports overlapping spans, all but one of each
//! cluster is dropped.
//!
//! # Policies
//!
//! - [`OverlapPolicy::LaterWins`] scans from the last suggestion to the first,
//!   remembering the start of the last kept span. A suggestion whose span ends
//!   past that start is dropped. Among overlapping suggestions the one listed
//!   last by the service survives.
//! - [`OverlapPolicy::EarlierWins`] scans forward, remembering the end of the last
//!   kept span. A suggestion starting before that end is dropped.
//!
//! Either way the survivors are pairwise disjoint and keep their service order.
//!
//! ```text
//! service order:  A [5, 15)   B [8, 11)
//! LaterWins:      B
//! EarlierWins:    A
//! ```

use crate::suggestion::Suggestion;
use serde::Deserialize;
use tracing::{debug, trace};

/// Which suggestion survives when spans overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    #[default]
    LaterWins,
    EarlierWins,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapResolver {
    policy: OverlapPolicy,
}

impl OverlapResolver {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Keep a disjoint subset of `suggestions`, which must be in service order.
    pub fn resolve(&self, suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        let total = suggestions.len();
        let kept = match self.policy {
            OverlapPolicy::LaterWins => resolve_later_wins(suggestions),
            OverlapPolicy::EarlierWins => resolve_earlier_wins(suggestions),
        };
        debug!(
            policy = ?self.policy,
            kept = kept.len(),
            dropped = total - kept.len(),
            "resolved overlapping suggestions"
        );
        kept
    }
}

fn resolve_later_wins(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut previous_span_start: Option<usize> = None;
    let mut kept = Vec::with_capacity(suggestions.len());

    for suggestion in suggestions.into_iter().rev() {
        if let Some(previous_start) = previous_span_start {
            if suggestion.span_end() > previous_start {
                trace!(span = ?suggestion.span(), rule_id = %suggestion.rule_id, "dropping overlap");
                continue;
            }
        }
        previous_span_start = Some(suggestion.offset);
        kept.push(suggestion);
    }

    kept.reverse();
    kept
}

fn resolve_earlier_wins(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut previous_span_end: Option<usize> = None;
    let mut kept = Vec::with_capacity(suggestions.len());

    for suggestion in suggestions {
        if let Some(previous_end) = previous_span_end {
            if suggestion.offset < previous_end {
                trace!(span = ?suggestion.span(), rule_id = %suggestion.rule_id, "dropping overlap");
                continue;
            }
        }
        previous_span_end = Some(suggestion.span_end());
        kept.push(suggestion);
    }

    kept
}
