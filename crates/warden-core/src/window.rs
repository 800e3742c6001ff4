use crate::error::ConfigError;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const DEFAULT_WINDOW_MS: i64 = 5_000;
pub const DEFAULT_THRESHOLD: i64 = 5;

/// Window length and trip count, fixed for the lifetime of a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    window_ms: u64,
    threshold: usize,
}

impl WindowConfig {
    pub fn new(window: Duration, threshold: u32) -> Result<Self, ConfigError> {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        Self::from_raw(window_ms, i64::from(threshold))
    }

    /// Validates values as they come out of a config file.
    pub fn from_raw(window_ms: i64, threshold: i64) -> Result<Self, ConfigError> {
        if window_ms <= 0 {
            return Err(ConfigError::InvalidWindow(window_ms));
        }
        if threshold <= 0 {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        Ok(Self {
            window_ms: window_ms as u64,
            threshold: usize::try_from(threshold).unwrap_or(usize::MAX),
        })
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// An entry is live while strictly younger than the window.
    fn is_live(&self, ts: u64, now: u64) -> bool {
        now.saturating_sub(ts) < self.window_ms
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS as u64,
            threshold: DEFAULT_THRESHOLD as usize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub count: usize,
    pub exceeded: bool,
}

/// Per-subject rolling event counter.
///
/// Timestamps are caller-supplied milliseconds from a monotonic source and
/// are expected in non-decreasing order per subject, so stale entries are
/// always at the front of a subject's history.
#[derive(Debug)]
pub struct SlidingWindowCounter<K> {
    config: WindowConfig,
    subjects: Mutex<HashMap<K, VecDeque<u64>>>,
}

impl<K> SlidingWindowCounter<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            subjects: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> WindowConfig {
        self.config
    }

    pub fn record(&self, subject: &K, now: u64) -> Verdict {
        let mut subjects = self.lock();
        let history = subjects.entry(subject.clone()).or_default();
        history.push_back(now);
        while let Some(&oldest) = history.front() {
            if self.config.is_live(oldest, now) {
                break;
            }
            history.pop_front();
        }
        let count = history.len();
        Verdict {
            count,
            exceeded: count >= self.config.threshold,
        }
    }

    /// Retained count as of the subject's last `record`.
    pub fn peek(&self, subject: &K) -> usize {
        self.lock().get(subject).map(VecDeque::len).unwrap_or(0)
    }

    /// Count of entries that would still be live at `now`, without pruning.
    pub fn peek_at(&self, subject: &K, now: u64) -> usize {
        self.lock()
            .get(subject)
            .map(|history| {
                history
                    .iter()
                    .filter(|&&ts| self.config.is_live(ts, now))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn reset(&self, subject: &K) {
        self.lock().remove(subject);
    }

    /// Drops subjects whose entire history has gone stale by `now`.
    pub fn sweep(&self, now: u64) -> usize {
        let mut subjects = self.lock();
        let before = subjects.len();
        subjects.retain(|_, history| {
            history
                .back()
                .is_some_and(|&newest| self.config.is_live(newest, now))
        });
        before - subjects.len()
    }

    pub fn subjects(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, VecDeque<u64>>> {
        self.subjects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn counter(window_ms: i64, threshold: i64) -> SlidingWindowCounter<&'static str> {
        SlidingWindowCounter::new(WindowConfig::from_raw(window_ms, threshold).unwrap())
    }

    #[test]
    fn rejects_non_positive_config() {
        assert!(matches!(
            WindowConfig::from_raw(0, 5),
            Err(ConfigError::InvalidWindow(0))
        ));
        assert!(matches!(
            WindowConfig::from_raw(-1, 5),
            Err(ConfigError::InvalidWindow(-1))
        ));
        assert!(matches!(
            WindowConfig::from_raw(5000, 0),
            Err(ConfigError::InvalidThreshold(0))
        ));
        assert!(matches!(
            WindowConfig::new(Duration::ZERO, 5),
            Err(ConfigError::InvalidWindow(0))
        ));
        assert!(WindowConfig::new(Duration::from_secs(5), 5).is_ok());
    }

    #[test]
    fn counts_every_event_inside_one_window() {
        let c = counter(5000, 100);
        for (i, ts) in (0..4000).step_by(250).enumerate() {
            let v = c.record(&"u1", ts);
            assert_eq!(v.count, i + 1);
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let c = counter(5000, 3);
        assert!(!c.record(&"u1", 0).exceeded);
        assert!(!c.record(&"u1", 10).exceeded);
        let v = c.record(&"u1", 20);
        assert_eq!(v, Verdict { count: 3, exceeded: true });
        assert!(c.record(&"u1", 30).exceeded);
    }

    #[test]
    fn event_on_window_boundary_is_expired() {
        let c = counter(5000, 5);
        c.record(&"u1", 0);
        let v = c.record(&"u1", 5000);
        assert_eq!(v.count, 1);

        let c = counter(5000, 5);
        c.record(&"u1", 0);
        assert_eq!(c.record(&"u1", 4999).count, 2);
    }

    #[test]
    fn reference_scenario() {
        let c = counter(5000, 5);
        let mut last = None;
        for ts in [0, 1000, 2000, 3000, 4000] {
            last = Some(c.record(&"u1", ts));
        }
        assert_eq!(last, Some(Verdict { count: 5, exceeded: true }));
        assert_eq!(c.record(&"u1", 4500), Verdict { count: 6, exceeded: true });
        assert_eq!(c.record(&"u1", 6000), Verdict { count: 5, exceeded: true });
    }

    #[test]
    fn peek_does_not_disturb_history() {
        let c = counter(5000, 3);
        c.record(&"u1", 0);
        c.record(&"u1", 100);
        for _ in 0..10 {
            assert_eq!(c.peek(&"u1"), 2);
            assert_eq!(c.peek_at(&"u1", 5050), 1);
        }
        assert_eq!(c.record(&"u1", 200), Verdict { count: 3, exceeded: true });
    }

    #[test]
    fn subjects_are_isolated() {
        let c = counter(5000, 2);
        c.record(&"a", 0);
        c.record(&"a", 1);
        assert!(c.record(&"a", 2).exceeded);
        assert_eq!(c.record(&"b", 3), Verdict { count: 1, exceeded: false });
        assert_eq!(c.peek(&"b"), 1);
    }

    #[test]
    fn reset_clears_subject() {
        let c = counter(5000, 2);
        c.record(&"u1", 0);
        c.record(&"u1", 1);
        c.reset(&"u1");
        assert_eq!(c.peek(&"u1"), 0);
        assert_eq!(c.record(&"u1", 2).count, 1);
    }

    #[test]
    fn unknown_subject_is_empty() {
        let c = counter(5000, 2);
        assert_eq!(c.peek(&"ghost"), 0);
        assert_eq!(c.peek_at(&"ghost", 10), 0);
        c.reset(&"ghost");
        assert_eq!(c.subjects(), 0);
    }

    #[test]
    fn sweep_evicts_only_idle_subjects() {
        let c = counter(1000, 5);
        c.record(&"old", 0);
        c.record(&"fresh", 900);
        assert_eq!(c.sweep(1500), 1);
        assert_eq!(c.subjects(), 1);
        assert_eq!(c.peek(&"old"), 0);
        assert_eq!(c.peek(&"fresh"), 1);
    }

    #[test]
    fn earlier_timestamp_is_retained() {
        let c = counter(1000, 5);
        c.record(&"u1", 500);
        assert_eq!(c.record(&"u1", 400).count, 2);
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        let c = Arc::new(counter(60_000, 1000));
        std::thread::scope(|s| {
            for _ in 0..8 {
                let c = c.clone();
                s.spawn(move || {
                    for i in 0..50 {
                        c.record(&"shared", i);
                    }
                });
            }
        });
        assert_eq!(c.peek(&"shared"), 400);
    }
}
