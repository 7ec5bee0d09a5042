//! Connection metrics.
//!
//! Tracks attempt/success/failure counters and latency for a single
//! connection so callers can build dashboards or drive pool eviction
//! decisions without needing a separate observability crate.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::time::Clock;

/// Counters and timing data for one logical connection.
///
/// The counters are atomics so a handle can be shared between the task that
/// owns the connection and a background health-check/metrics reporter
/// without additional locking; the last-activity timestamp needs an actual
/// `Instant` and so lives behind a small mutex instead.
#[derive(Debug)]
pub struct ConnectionMetrics {
    connect_attempts: AtomicU64,
    connect_successes: AtomicU64,
    connect_failures: AtomicU64,
    commands_sent: AtomicU64,
    command_errors: AtomicU64,
    total_response_nanos: AtomicU64,
    response_samples: AtomicU64,
    last_activity: Mutex<Option<Instant>>,
}

impl Default for ConnectionMetrics {
    fn default() -> Self {
        Self {
            connect_attempts: AtomicU64::new(0),
            connect_successes: AtomicU64::new(0),
            connect_failures: AtomicU64::new(0),
            commands_sent: AtomicU64::new(0),
            command_errors: AtomicU64::new(0),
            total_response_nanos: AtomicU64::new(0),
            response_samples: AtomicU64::new(0),
            last_activity: Mutex::new(None),
        }
    }
}

impl ConnectionMetrics {
    /// Creates a fresh, zeroed metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a connection attempt.
    pub fn record_connect_attempt(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful connection (LOGIN completed).
    pub fn record_connect_success(&self) {
        self.connect_successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed connection attempt.
    pub fn record_connect_failure(&self) {
        self.connect_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a command round-trip, updating the running average response
    /// time and the last-activity timestamp relative to `clock`.
    pub fn record_command(&self, clock: &dyn Clock, started_at: Instant, failed: bool) {
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.command_errors.fetch_add(1, Ordering::Relaxed);
        }
        let elapsed = clock.elapsed(started_at);
        self.total_response_nanos
            .fetch_add(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX), Ordering::Relaxed);
        self.response_samples.fetch_add(1, Ordering::Relaxed);
        self.touch(clock);
    }

    /// Updates the last-activity timestamp to `clock.now()`.
    pub fn touch(&self, clock: &dyn Clock) {
        let mut guard = self.last_activity.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(clock.now());
    }

    /// Returns how long it has been since the connection last did anything,
    /// or `None` if it has never recorded activity.
    #[must_use]
    pub fn idle_for(&self, clock: &dyn Clock) -> Option<Duration> {
        let guard = self.last_activity.lock().unwrap_or_else(|e| e.into_inner());
        guard.map(|last| clock.elapsed(last))
    }

    /// Total number of connection attempts recorded.
    #[must_use]
    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    /// Total number of successful connections.
    #[must_use]
    pub fn connect_successes(&self) -> u64 {
        self.connect_successes.load(Ordering::Relaxed)
    }

    /// Total number of failed connection attempts.
    #[must_use]
    pub fn connect_failures(&self) -> u64 {
        self.connect_failures.load(Ordering::Relaxed)
    }

    /// Total number of commands sent.
    #[must_use]
    pub fn commands_sent(&self) -> u64 {
        self.commands_sent.load(Ordering::Relaxed)
    }

    /// Total number of commands that resulted in an error.
    #[must_use]
    pub fn command_errors(&self) -> u64 {
        self.command_errors.load(Ordering::Relaxed)
    }

    /// Average command response time across all recorded samples.
    #[must_use]
    pub fn average_response_time(&self) -> Duration {
        let samples = self.response_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return Duration::ZERO;
        }
        let total = self.total_response_nanos.load(Ordering::Relaxed);
        Duration::from_nanos(total / samples)
    }

    /// Fraction of sent commands that completed without error, in `[0.0, 1.0]`.
    ///
    /// Returns `1.0` when no commands have been sent yet (vacuously healthy).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        let sent = self.commands_sent.load(Ordering::Relaxed);
        if sent == 0 {
            return 1.0;
        }
        let errors = self.command_errors.load(Ordering::Relaxed);
        (sent - errors) as f64 / sent as f64
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::time::MockClock;

    #[test]
    fn test_connect_counters() {
        let metrics = ConnectionMetrics::new();
        metrics.record_connect_attempt();
        metrics.record_connect_attempt();
        metrics.record_connect_success();
        metrics.record_connect_failure();

        assert_eq!(metrics.connect_attempts(), 2);
        assert_eq!(metrics.connect_successes(), 1);
        assert_eq!(metrics.connect_failures(), 1);
    }

    #[test]
    fn test_average_response_time() {
        let metrics = ConnectionMetrics::new();
        let clock = MockClock::new();
        let start = clock.now();

        clock.advance(Duration::from_millis(100));
        metrics.record_command(&clock, start, false);

        let start2 = clock.now();
        clock.advance(Duration::from_millis(300));
        metrics.record_command(&clock, start2, true);

        assert_eq!(metrics.commands_sent(), 2);
        assert_eq!(metrics.command_errors(), 1);
        assert_eq!(metrics.average_response_time(), Duration::from_millis(200));
    }

    #[test]
    fn test_empty_average_is_zero() {
        let metrics = ConnectionMetrics::new();
        assert_eq!(metrics.average_response_time(), Duration::ZERO);
    }

    #[test]
    fn test_success_rate_vacuously_healthy_when_unused() {
        let metrics = ConnectionMetrics::new();
        assert!((metrics.success_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_reflects_errors() {
        let metrics = ConnectionMetrics::new();
        let clock = MockClock::new();
        metrics.record_command(&clock, clock.now(), false);
        metrics.record_command(&clock, clock.now(), false);
        metrics.record_command(&clock, clock.now(), true);

        assert!((metrics.success_rate() - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_idle_for() {
        let metrics = ConnectionMetrics::new();
        let clock = MockClock::new();

        assert!(metrics.idle_for(&clock).is_none());

        metrics.touch(&clock);
        clock.advance(Duration::from_secs(5));
        assert_eq!(metrics.idle_for(&clock), Some(Duration::from_secs(5)));
    }
}
