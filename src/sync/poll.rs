//! Periodic refresh of a mounted list, plus refresh on focus/visibility.
//!
//! A `Poller` holds exactly one schedule. It does not sleep; the event loop
//! asks [`Poller::next_wake`] how long to wait and calls [`Poller::due`] when
//! it wakes.

use log::{debug, info};
use rand::Rng;
use std::time::{Duration, Instant};

use crate::config::RefreshSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mount,
    Interval,
    Focus,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_backoff: Duration,
    pub jitter: Duration,
}

impl PollPolicy {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            max_backoff: interval,
            jitter: Duration::ZERO,
        }
    }
}

impl From<&RefreshSettings> for PollPolicy {
    fn from(settings: &RefreshSettings) -> Self {
        let interval = Duration::from_secs(settings.poll_interval_secs.max(1));
        Self {
            interval,
            max_backoff: Duration::from_secs(settings.max_backoff_secs).max(interval),
            jitter: Duration::from_millis(settings.jitter_ms),
        }
    }
}

#[derive(Debug)]
pub struct Poller {
    policy: PollPolicy,
    next_at: Instant,
    failures: u32,
    mounted: bool,
}

impl Poller {
    /// Start polling. The caller should fetch right away for `Trigger::Mount`.
    pub fn mount(policy: PollPolicy, now: Instant) -> (Self, Trigger) {
        let mut poller = Self {
            policy,
            next_at: now,
            failures: 0,
            mounted: true,
        };
        poller.schedule(now);
        info!("polling every {:?}", policy.interval);
        (poller, Trigger::Mount)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Fires once per elapsed interval
    pub fn due(&mut self, now: Instant) -> Option<Trigger> {
        if !self.mounted || now < self.next_at {
            return None;
        }
        self.schedule(now);
        Some(Trigger::Interval)
    }

    pub fn on_focus(&self) -> Option<Trigger> {
        self.mounted.then_some(Trigger::Focus)
    }

    /// Only becoming visible triggers a refresh
    pub fn on_visibility(&self, visible: bool) -> Option<Trigger> {
        (self.mounted && visible).then_some(Trigger::Visible)
    }

    /// Feed back the outcome of a fetch; failures stretch the next interval.
    ///
    /// The pending tick moves only when the delay itself changes. Outcomes
    /// that leave it as it was, such as a focus refresh while healthy or
    /// another failure at the cap, keep the interval cadence.
    pub fn record(&mut self, success: bool, now: Instant) {
        let before = self.current_delay();
        if success {
            self.failures = 0;
        } else {
            self.failures = self.failures.saturating_add(1);
        }
        if self.mounted && self.current_delay() != before {
            self.schedule(now);
        }
    }

    /// Time the event loop may sleep before calling `due` again
    pub fn next_wake(&self, now: Instant) -> Option<Duration> {
        self.mounted
            .then(|| self.next_at.saturating_duration_since(now))
    }

    pub fn current_delay(&self) -> Duration {
        let factor = 2u32.saturating_pow(self.failures.min(16));
        self.policy
            .interval
            .saturating_mul(factor)
            .min(self.policy.max_backoff)
    }

    pub fn unmount(&mut self) {
        if self.mounted {
            debug!("polling stopped");
        }
        self.mounted = false;
    }

    fn schedule(&mut self, now: Instant) {
        let mut delay = self.current_delay();
        if !self.policy.jitter.is_zero() {
            let extra = rand::thread_rng().gen_range(0..=self.policy.jitter.as_millis() as u64);
            delay += Duration::from_millis(extra);
        }
        self.next_at = now + delay;
    }
}
