//! Delaying lookups until typing pauses.
//!
//! Nothing here owns a timer. Callers pass `now` in and ask what is due, so
//! the same code serves an event loop and a unit test.

use log::debug;
use std::time::{Duration, Instant};

/// Identifies one scheduled value; a result tagged with an older generation
/// belongs to superseded input and must be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug)]
struct Pending<T> {
    value: T,
    due: Instant,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
    generation: u64,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            generation: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace whatever was pending with `value`, due `delay` from now
    pub fn schedule(&mut self, value: T, now: Instant) -> Generation {
        self.generation += 1;
        self.pending = Some(Pending {
            value,
            due: now + self.delay,
        });
        Generation(self.generation)
    }

    /// Drop the pending value and invalidate anything already handed out
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value fires, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Hand out the pending value once its delay has elapsed
    pub fn take_due(&mut self, now: Instant) -> Option<(Generation, T)> {
        let ready = self.pending.as_ref().is_some_and(|p| now >= p.due);
        if !ready {
            return None;
        }
        self.pending
            .take()
            .map(|p| (Generation(self.generation), p.value))
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }
}

/// A lookup the caller should perform now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub generation: Generation,
    pub query: String,
}

/// Suggestion list fed by debounced text input
#[derive(Debug)]
pub struct Autocomplete<S> {
    debouncer: Debouncer<String>,
    suggestions: Vec<S>,
    limit: usize,
}

impl<S> Autocomplete<S> {
    pub fn new(delay: Duration, limit: usize) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            suggestions: Vec::new(),
            limit,
        }
    }

    /// Record a keystroke. Clearing the field empties suggestions at once.
    pub fn on_input(&mut self, text: &str, now: Instant) {
        let query = text.trim();
        if query.is_empty() {
            self.debouncer.cancel();
            self.suggestions.clear();
            return;
        }
        self.debouncer.schedule(query.to_string(), now);
    }

    pub fn poll(&mut self, now: Instant) -> Option<LookupRequest> {
        self.debouncer
            .take_due(now)
            .map(|(generation, query)| LookupRequest { generation, query })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Store lookup results unless newer input arrived meanwhile.
    ///
    /// A failed lookup degrades to an empty list. Returns false when the
    /// result was discarded.
    pub fn apply<E: std::fmt::Display>(
        &mut self,
        generation: Generation,
        result: Result<Vec<S>, E>,
    ) -> bool {
        if !self.debouncer.is_current(generation) {
            debug!("discarding stale lookup result {:?}", generation);
            return false;
        }
        match result {
            Ok(mut found) => {
                found.truncate(self.limit);
                self.suggestions = found;
            }
            Err(e) => {
                log::warn!("suggestion lookup failed: {e}");
                self.suggestions.clear();
            }
        }
        true
    }

    pub fn suggestions(&self) -> &[S] {
        &self.suggestions
    }

    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.suggestions.clear();
    }

    /// Called when the owner goes away; late results are ignored afterwards
    pub fn teardown(&mut self) {
        self.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn burst_of_keystrokes_yields_one_lookup() {
        let start = Instant::now();
        let mut ac: Autocomplete<String> = Autocomplete::new(DELAY, 10);
        let mut lookups = Vec::new();

        for (i, text) in ["a", "ar", "arr", "arro", "arroz"].iter().enumerate() {
            let now = start + Duration::from_millis(50 * i as u64);
            ac.on_input(text, now);
            if let Some(req) = ac.poll(now) {
                lookups.push(req);
            }
        }
        let settled = start + Duration::from_millis(200) + DELAY;
        if let Some(req) = ac.poll(settled) {
            lookups.push(req);
        }
        assert!(ac.poll(settled + DELAY).is_none());

        assert_eq!(lookups.len(), 1);
        assert_eq!(lookups[0].query, "arroz");
    }

    #[test]
    fn nothing_fires_before_the_delay() {
        let start = Instant::now();
        let mut ac: Autocomplete<String> = Autocomplete::new(DELAY, 10);
        ac.on_input("feijao", start);
        assert!(ac.poll(start + Duration::from_millis(299)).is_none());
        assert!(ac.poll(start + DELAY).is_some());
    }

    #[test]
    fn clearing_input_drops_suggestions_immediately() {
        let start = Instant::now();
        let mut ac: Autocomplete<String> = Autocomplete::new(DELAY, 10);
        ac.on_input("sal", start);
        let req = ac.poll(start + DELAY).unwrap();
        assert!(ac.apply::<String>(req.generation, Ok(vec!["Sal 1kg".into()])));
        assert_eq!(ac.suggestions().len(), 1);

        ac.on_input("  ", start + DELAY);
        assert!(ac.suggestions().is_empty());
        assert!(ac.poll(start + DELAY * 3).is_none());
    }

    #[test]
    fn superseded_result_is_discarded() {
        let start = Instant::now();
        let mut ac: Autocomplete<String> = Autocomplete::new(DELAY, 10);
        ac.on_input("oleo", start);
        let first = ac.poll(start + DELAY).unwrap();

        ac.on_input("oleo de soja", start + DELAY);
        assert!(!ac.apply::<String>(first.generation, Ok(vec!["Oleo".into()])));
        assert!(ac.suggestions().is_empty());

        let second = ac.poll(start + DELAY * 2).unwrap();
        assert!(ac.apply::<String>(second.generation, Ok(vec!["Oleo de soja".into()])));
        assert_eq!(ac.suggestions(), ["Oleo de soja".to_string()]);
    }

    #[test]
    fn teardown_ignores_in_flight_result() {
        let start = Instant::now();
        let mut ac: Autocomplete<String> = Autocomplete::new(DELAY, 10);
        ac.on_input("acucar", start);
        let req = ac.poll(start + DELAY).unwrap();
        ac.teardown();
        assert!(!ac.apply::<String>(req.generation, Ok(vec!["Acucar".into()])));
    }

    #[test]
    fn results_are_truncated_and_errors_clear() {
        let start = Instant::now();
        let mut ac: Autocomplete<u32> = Autocomplete::new(DELAY, 10);
        ac.on_input("x", start);
        let req = ac.poll(start + DELAY).unwrap();
        ac.apply::<String>(req.generation, Ok((0..25).collect()));
        assert_eq!(ac.suggestions().len(), 10);

        ac.on_input("xy", start + DELAY);
        let req = ac.poll(start + DELAY * 2).unwrap();
        ac.apply(req.generation, Err("boom"));
        assert!(ac.suggestions().is_empty());
    }
}
