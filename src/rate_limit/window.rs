//! Fixed-window request counters, one per backend.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::registry::BackendId;

/// A simple fixed-window counter.
#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self { count: 0, started: now }
    }

    fn expired(&self, length: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.started) > length
    }

    fn roll(&mut self, length: Duration, now: Instant) {
        if self.expired(length, now) {
            self.count = 0;
            self.started = now;
        }
    }
}

/// Current usage of one backend's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowUsage {
    pub count: u32,
    pub limit: u32,
}

impl WindowUsage {
    /// Fraction of the window still available, in `[0, 1]`.
    pub fn headroom(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        (1.0 - self.count as f64 / self.limit as f64).clamp(0.0, 1.0)
    }
}

/// Per-backend request admission.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Vec<Mutex<Window>>,
    limits: Vec<u32>,
    length: Duration,
}

impl RateLimiter {
    /// `limits[i]` is the per-window allowance of the backend with index `i`.
    pub fn new(limits: Vec<u32>, length: Duration) -> Self {
        let now = Instant::now();
        let windows = limits.iter().map(|_| Mutex::new(Window::new(now))).collect();
        Self { windows, limits, length }
    }

    pub fn window_length(&self) -> Duration {
        self.length
    }

    /// Admit one request if the backend has room in its current window.
    pub fn try_admit(&self, id: BackendId) -> bool {
        self.try_admit_at(id, Instant::now())
    }

    pub fn try_admit_at(&self, id: BackendId, now: Instant) -> bool {
        let limit = self.limits[id.index()];
        let mut window = self.lock(id);
        window.roll(self.length, now);
        if window.count < limit {
            window.count += 1;
            true
        } else {
            false
        }
    }

    /// Count a request without enforcing the limit.
    pub fn record(&self, id: BackendId) {
        self.record_at(id, Instant::now());
    }

    pub fn record_at(&self, id: BackendId, now: Instant) {
        let mut window = self.lock(id);
        window.roll(self.length, now);
        window.count = window.count.saturating_add(1);
    }

    /// Usage as of now. An expired window reads as empty but is not reset.
    pub fn usage(&self, id: BackendId) -> WindowUsage {
        self.usage_at(id, Instant::now())
    }

    pub fn usage_at(&self, id: BackendId, now: Instant) -> WindowUsage {
        let window = self.lock(id);
        let count = if window.expired(self.length, now) { 0 } else { window.count };
        WindowUsage {
            count,
            limit: self.limits[id.index()],
        }
    }

    fn lock(&self, id: BackendId) -> MutexGuard<'_, Window> {
        self.windows[id.index()].lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_exact_limit_then_rollover() {
        let limiter = RateLimiter::new(vec![5], MINUTE);
        let id = BackendId(0);
        let t0 = Instant::now();

        for _ in 0..5 {
            assert!(limiter.try_admit_at(id, t0));
        }
        assert!(!limiter.try_admit_at(id, t0 + Duration::from_secs(59)));
        assert_eq!(limiter.usage_at(id, t0).count, 5);

        let later = t0 + Duration::from_secs(61);
        assert_eq!(limiter.usage_at(id, later).count, 0);
        assert!(limiter.try_admit_at(id, later));
        assert_eq!(limiter.usage_at(id, later).count, 1);
    }

    #[test]
    fn test_rejection_does_not_increment() {
        let limiter = RateLimiter::new(vec![1], MINUTE);
        let id = BackendId(0);
        let t0 = Instant::now();
        assert!(limiter.try_admit_at(id, t0));
        assert!(!limiter.try_admit_at(id, t0));
        assert!(!limiter.try_admit_at(id, t0));
        assert_eq!(limiter.usage_at(id, t0), WindowUsage { count: 1, limit: 1 });
    }

    #[test]
    fn test_record_ignores_limit() {
        let limiter = RateLimiter::new(vec![1], MINUTE);
        let id = BackendId(0);
        limiter.record(id);
        limiter.record(id);
        assert_eq!(limiter.usage(id).count, 2);
        assert_eq!(limiter.usage(id).headroom(), 0.0);
        assert!(!limiter.try_admit(id));
    }

    #[test]
    fn test_concurrent_admission_is_exact() {
        let limiter = Arc::new(RateLimiter::new(vec![10, 10], MINUTE));
        let handles: Vec<_> = (0..50)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.try_admit(BackendId(0)))
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(admitted, 10);
        assert_eq!(limiter.usage(BackendId(1)).count, 0);
    }
}
