//! Per-endpoint health records and the ordering function used to pick among them.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;

/// One endpoint's observed health, as tracked by the manager and persisted across
/// runs.
///
/// Invariants: `failure_count` increases monotonically and is never decremented; a
/// successful connection clears `last_failure` and sets `healthy = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointHealth {
    /// The endpoint's websocket URL.
    pub url: String,
    /// Whether the endpoint is currently considered usable.
    pub healthy: bool,
    /// Total observed failures. Never decremented.
    pub failure_count: u64,
    /// Unix millis of the last health check (connect attempt or poll), if any.
    pub last_check: Option<i64>,
    /// Unix millis of the most recent failure, if any.
    pub last_failure: Option<i64>,
    /// A 0.7/0.3 exponentially weighted moving average of connect+init latency, in
    /// milliseconds. `None` until the first successful sample.
    pub avg_response_time_ms: Option<f64>,
    /// Unix millis this record was first created, used to age out stale persisted
    /// entries.
    pub created_at: i64,
}

impl EndpointHealth {
    /// A fresh, unvisited record for `url`, created at `now_ms`.
    pub fn new(url: impl Into<String>, now_ms: i64) -> Self {
        Self {
            url: url.into(),
            healthy: true,
            failure_count: 0,
            last_check: None,
            last_failure: None,
            avg_response_time_ms: None,
            created_at: now_ms,
        }
    }

    /// Records a successful connection/check: clears `last_failure`, marks healthy,
    /// and folds `latency_ms` into the moving average.
    pub fn record_success(&mut self, latency_ms: f64, now_ms: i64) {
        self.healthy = true;
        self.last_failure = None;
        self.last_check = Some(now_ms);
        self.avg_response_time_ms = Some(match self.avg_response_time_ms {
            Some(prev) => 0.7 * prev + 0.3 * latency_ms,
            None => latency_ms,
        });
    }

    /// Records a failed connection/check: increments `failure_count` and marks
    /// unhealthy.
    pub fn record_failure(&mut self, now_ms: i64) {
        self.healthy = false;
        self.failure_count += 1;
        self.last_check = Some(now_ms);
        self.last_failure = Some(now_ms);
    }

    /// Whether this endpoint's `last_failure` falls within `cooldown_ms` of `now_ms`,
    /// making it ineligible for selection until the cooldown passes.
    pub fn in_cooldown(&self, cooldown_ms: i64, now_ms: i64) -> bool {
        match self.last_failure {
            Some(t) => now_ms.saturating_sub(t) < cooldown_ms,
            None => false,
        }
    }
}

/// Orders endpoints for selection: healthy before unhealthy, then ascending failure
/// count, then ascending average response time (absent time treated as `+infinity`).
/// Endpoints in cooldown are expected to have already been filtered out by the
/// caller; this function only orders, it does not filter.
///
/// A stable sort is required by callers: ties are broken by original list order.
pub fn compare_for_selection(a: &EndpointHealth, b: &EndpointHealth) -> CmpOrdering {
    match b.healthy.cmp(&a.healthy) {
        CmpOrdering::Equal => {}
        other => return other,
    }
    match a.failure_count.cmp(&b.failure_count) {
        CmpOrdering::Equal => {}
        other => return other,
    }
    let ra = a.avg_response_time_ms.unwrap_or(f64::INFINITY);
    let rb = b.avg_response_time_ms.unwrap_or(f64::INFINITY);
    ra.partial_cmp(&rb).unwrap_or(CmpOrdering::Equal)
}

/// Orders `entries` in place per [`compare_for_selection`], excluding any endpoint
/// whose `last_failure` is within `cooldown_ms`. Uses a stable sort so equal-ranked
/// endpoints keep their relative input order.
pub fn order_candidates<'a>(
    entries: &'a [EndpointHealth],
    cooldown_ms: i64,
    now_ms: i64,
) -> Vec<&'a EndpointHealth> {
    let mut candidates: Vec<&EndpointHealth> =
        entries.iter().filter(|e| !e.in_cooldown(cooldown_ms, now_ms)).collect();
    candidates.sort_by(|a, b| compare_for_selection(a, b));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy(url: &str, failures: u64, avg: Option<f64>) -> EndpointHealth {
        EndpointHealth {
            url: url.to_string(),
            healthy: true,
            failure_count: failures,
            last_check: None,
            last_failure: None,
            avg_response_time_ms: avg,
            created_at: 0,
        }
    }

    #[test]
    fn a_single_failure_never_moves_ahead_of_an_equal_healthy_endpoint() {
        let mut good = healthy("a", 0, Some(50.0));
        let bad = {
            let mut e = healthy("b", 0, Some(50.0));
            e.record_failure(1_000);
            e
        };
        let ordered = order_candidates(&[good.clone(), bad.clone()], 300_000, 2_000);
        assert_eq!(ordered[0].url, "a");
        assert_eq!(ordered[1].url, "b");

        good.record_failure(1_000);
        let ordered = order_candidates(&[good.clone(), bad.clone()], 300_000, 2_000);
        assert!(ordered.iter().all(|e| e.url == "a" || e.url == "b"));
    }

    #[test]
    fn healthy_ranks_before_unhealthy_regardless_of_failure_count() {
        let unhealthy_but_few_failures = {
            let mut e = healthy("a", 1, None);
            e.healthy = false;
            e
        };
        let healthy_many_failures = healthy("b", 10, None);
        let ordered =
            order_candidates(&[unhealthy_but_few_failures, healthy_many_failures], 300_000, 0);
        assert_eq!(ordered[0].url, "b");
    }

    #[test]
    fn ties_are_broken_by_input_order() {
        let a = healthy("a", 0, None);
        let b = healthy("b", 0, None);
        let ordered = order_candidates(&[a, b], 300_000, 0);
        assert_eq!(ordered[0].url, "a");
        assert_eq!(ordered[1].url, "b");
    }

    #[test]
    fn endpoints_in_cooldown_are_excluded() {
        let mut recent_failure = healthy("a", 1, None);
        recent_failure.last_failure = Some(9_000);
        let fine = healthy("b", 5, None);
        let ordered = order_candidates(&[recent_failure, fine], 300_000, 10_000);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].url, "b");
    }

    #[test]
    fn absent_response_time_sorts_last() {
        let no_sample = healthy("a", 0, None);
        let slow_sample = healthy("b", 0, Some(9_999.0));
        let ordered = order_candidates(&[no_sample, slow_sample], 300_000, 0);
        assert_eq!(ordered[0].url, "b");
        assert_eq!(ordered[1].url, "a");
    }
}
