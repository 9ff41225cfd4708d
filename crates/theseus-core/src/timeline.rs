//! Approximate originality curve across sampled history.
//!
//! Re-tracing every sampled revision would cost a full analysis per sample.
//! Instead each sample gets a closed-form estimate from its relative age and
//! the churn of that revision. The only exact point is the newest snapshot,
//! which is pinned to the measured current percentage.

use futures::future::join_all;
use tracing::debug;

use crate::history::RevisionHistoryProvider;
use crate::model::{HistorySnapshot, Revision};

/// Share of originality lost between the oldest and newest sample.
pub const AGE_DECAY_RATE: f64 = 0.6;

/// Estimates never drop below this percentage.
pub const MIN_ESTIMATE_PCT: f64 = 10.0;

/// Weight of the remaining headroom used by the anchor correction.
pub const ANCHOR_HEADROOM: f64 = 0.3;

/// Map a revision's churn (added + deleted lines) to a multiplier in `(0.3, 1.0]`.
///
/// - `<= 50`: 1.0
/// - `50..=200`: linear 1.0 → 0.7
/// - `200..=1000`: linear 0.7 → 0.5
/// - `> 1000`: `0.5·e^(−(churn−1000)/2000) + 0.3`
pub fn churn_factor(churn: u64) -> f64 {
    match churn {
        0..=50 => 1.0,
        51..=200 => 1.0 - (churn - 50) as f64 / 150.0 * 0.3,
        201..=1000 => 0.7 - (churn - 200) as f64 / 800.0 * 0.2,
        _ => 0.5 * (-((churn - 1000) as f64) / 2000.0).exp() + 0.3,
    }
}

/// Estimated original percentage for a non-anchor sample.
pub fn estimate_pct(age_ratio: f64, churn: u64, current_pct: f64) -> f64 {
    let age_decay = 1.0 - age_ratio * AGE_DECAY_RATE;
    let raw = (100.0 * age_decay * churn_factor(churn)).max(MIN_ESTIMATE_PCT);

    if raw < current_pct {
        current_pct + age_decay * (100.0 - current_pct) * ANCHOR_HEADROOM
    } else {
        raw
    }
}

/// Every `stride`-th revision starting from the oldest, plus the newest.
///
/// `revisions` is newest first; the result is oldest first.
pub fn sample_revisions(revisions: &[Revision], stride: usize) -> Vec<Revision> {
    let mut sampled: Vec<Revision> = (0..revisions.len())
        .rev()
        .step_by(stride.max(1))
        .map(|i| revisions[i].clone())
        .collect();

    if let Some(newest) = revisions.first() {
        if sampled.last().map(|r| &r.id) != Some(&newest.id) {
            sampled.push(newest.clone());
        }
    }

    sampled
}

/// Builds history snapshots anchored at the current measurement.
pub struct TimelineEstimator<'a> {
    provider: &'a dyn RevisionHistoryProvider,
    stride: usize,
}

impl<'a> TimelineEstimator<'a> {
    pub fn new(provider: &'a dyn RevisionHistoryProvider, stride: usize) -> Self {
        Self {
            provider,
            stride: stride.max(1),
        }
    }

    /// Snapshots oldest first; the last one equals `current_pct` exactly.
    ///
    /// Missing churn stats count as zero churn.
    pub async fn estimate(&self, revisions: &[Revision], current_pct: f64) -> Vec<HistorySnapshot> {
        let sampled = sample_revisions(revisions, self.stride);
        let Some((newest, older)) = sampled.split_last() else {
            return Vec::new();
        };

        let churns = join_all(older.iter().map(|r| async move {
            match self.provider.churn_stats(&r.id).await {
                Ok(stats) => stats.total(),
                Err(e) => {
                    debug!(revision = %r.short(), error = %e, "no churn stats, assuming zero");
                    0
                }
            }
        }))
        .await;

        let last_index = (sampled.len() - 1) as f64;
        let mut snapshots: Vec<HistorySnapshot> = older
            .iter()
            .zip(churns)
            .enumerate()
            .map(|(i, (revision, churn))| HistorySnapshot {
                revision_id: revision.id.clone(),
                timestamp: revision.timestamp,
                estimated_original_pct: estimate_pct(i as f64 / last_index, churn, current_pct),
            })
            .collect();

        snapshots.push(HistorySnapshot {
            revision_id: newest.id.clone(),
            timestamp: newest.timestamp,
            estimated_original_pct: current_pct,
        });

        snapshots
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::fakes::MemoryHistoryProvider;

    /// `n` revisions, newest first, ids `r{n-1}` .. `r0`.
    fn history(n: usize) -> Vec<Revision> {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .rev()
            .map(|i| Revision::new(format!("r{i}"), start + Duration::days(i as i64)))
            .collect()
    }

    #[test]
    fn test_churn_factor_bands() {
        assert_eq!(churn_factor(0), 1.0);
        assert_eq!(churn_factor(50), 1.0);
        assert!((churn_factor(125) - 0.85).abs() < 1e-12);
        assert!((churn_factor(200) - 0.7).abs() < 1e-12);
        assert!((churn_factor(600) - 0.6).abs() < 1e-12);
        assert!((churn_factor(1000) - 0.5).abs() < 1e-12);
        assert!((churn_factor(3000) - (0.5 * (-1.0f64).exp() + 0.3)).abs() < 1e-12);
        assert!(churn_factor(1_000_000) > 0.3);
    }

    #[test]
    fn test_churn_factor_above_1000_uses_exponential_curve() {
        assert!((churn_factor(1000) - 0.5).abs() < 1e-12);
        // not continuous: the curve restarts near 0.8
        assert!((churn_factor(1001) - (0.5 * (-1.0f64 / 2000.0).exp() + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_oldest_quiet_revision_is_full() {
        assert_eq!(estimate_pct(0.0, 0, 40.0), 100.0);
    }

    #[test]
    fn test_estimate_floor_applies_before_anchor() {
        // raw = 100 * 0.4 * ~0.3 ≈ 12, above the floor and above current
        let pct = estimate_pct(1.0, 1_000_000, 5.0);
        assert!(pct >= MIN_ESTIMATE_PCT);
    }

    #[test]
    fn test_anchor_correction_replaces_low_estimates() {
        // raw = 100 * 0.4 * 1.0 = 40 < 70
        let pct = estimate_pct(1.0, 0, 70.0);
        let expected = 70.0 + 0.4 * 30.0 * ANCHOR_HEADROOM;
        assert!((pct - expected).abs() < 1e-12);
    }

    #[test]
    fn test_sampling_includes_oldest_and_newest() {
        let revisions = history(7);
        let ids: Vec<String> = sample_revisions(&revisions, 3)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["r0", "r3", "r6"]);

        let ids: Vec<String> = sample_revisions(&revisions, 4)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["r0", "r4", "r6"]);
    }

    #[test]
    fn test_sampling_empty_and_single() {
        assert!(sample_revisions(&[], 5).is_empty());
        let single = history(1);
        assert_eq!(sample_revisions(&single, 5).len(), 1);
    }

    #[tokio::test]
    async fn test_newest_snapshot_is_pinned_for_any_stride() {
        let provider = MemoryHistoryProvider::new();
        for n in 1..=12 {
            let revisions = history(n);
            for stride in 1..=5 {
                let estimator = TimelineEstimator::new(&provider, stride);
                let snapshots = estimator.estimate(&revisions, 37.5).await;
                let last = snapshots.last().unwrap();
                assert_eq!(last.estimated_original_pct, 37.5);
                assert_eq!(last.revision_id, revisions[0].id);
            }
        }
    }

    #[tokio::test]
    async fn test_estimates_never_below_floor() {
        let mut provider = MemoryHistoryProvider::new();
        let revisions = history(20);
        for (i, r) in revisions.iter().enumerate() {
            provider = provider.with_churn(&r.id, (i as u64) * 900, 0);
        }
        let snapshots = TimelineEstimator::new(&provider, 1)
            .estimate(&revisions, 12.0)
            .await;
        assert_eq!(snapshots.len(), 20);
        for s in &snapshots {
            assert!(s.estimated_original_pct >= MIN_ESTIMATE_PCT, "{s:?}");
        }
    }

    #[tokio::test]
    async fn test_single_revision_is_only_the_anchor() {
        let provider = MemoryHistoryProvider::new();
        let snapshots = TimelineEstimator::new(&provider, 50)
            .estimate(&history(1), 64.0)
            .await;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].estimated_original_pct, 64.0);
    }

    #[tokio::test]
    async fn test_snapshots_are_oldest_first() {
        let provider = MemoryHistoryProvider::new();
        let snapshots = TimelineEstimator::new(&provider, 2)
            .estimate(&history(5), 50.0)
            .await;
        let ids: Vec<&str> = snapshots.iter().map(|s| s.revision_id.as_str()).collect();
        assert_eq!(ids, vec!["r0", "r2", "r4"]);
        assert!(snapshots.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        // oldest, zero churn: untouched by decay
        assert_eq!(snapshots[0].estimated_original_pct, 100.0);
    }

    #[tokio::test]
    async fn test_high_churn_lowers_estimate() {
        let revisions = history(3);
        let quiet = MemoryHistoryProvider::new();
        let noisy = MemoryHistoryProvider::new().with_churn("r1", 800, 400);

        let quiet_pct = TimelineEstimator::new(&quiet, 1)
            .estimate(&revisions, 20.0)
            .await[1]
            .estimated_original_pct;
        let noisy_pct = TimelineEstimator::new(&noisy, 1)
            .estimate(&revisions, 20.0)
            .await[1]
            .estimated_original_pct;
        assert!(noisy_pct < quiet_pct);
    }
}
