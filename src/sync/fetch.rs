//! Loading state for one remote list, with request sequencing.
//!
//! Each load takes a [`Ticket`]. Only the most recently issued ticket may write
//! its result back; anything older is dropped, so a slow response can never
//! overwrite a newer one.

use log::debug;

use crate::error::BackofficeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug, Default)]
pub struct RemoteState<T> {
    data: T,
    loading: bool,
    error: Option<String>,
    issued: u64,
    loads: u64,
}

impl<T: Default> RemoteState<T> {
    pub fn new() -> Self {
        Self {
            data: T::default(),
            loading: false,
            error: None,
            issued: 0,
            loads: 0,
        }
    }

    /// Start a request: mark loading and forget the previous error
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.loading = true;
        self.error = None;
        Ticket(self.issued)
    }

    /// Write a response back, if it still belongs to the latest request
    pub fn finish(&mut self, ticket: Ticket, result: Result<T, BackofficeError>) -> Outcome {
        if ticket.0 != self.issued {
            debug!(
                "dropping response for request {} (latest is {})",
                ticket.0, self.issued
            );
            return Outcome::Stale;
        }
        self.loading = false;
        self.loads += 1;
        match result {
            Ok(data) => {
                self.data = data;
                Outcome::Applied
            }
            Err(e) => {
                self.data = T::default();
                self.error = Some(e.to_string());
                Outcome::Failed
            }
        }
    }

    /// Begin, fetch and finish in one go
    pub fn run<F>(&mut self, fetch: F) -> Outcome
    where
        F: FnOnce() -> Result<T, BackofficeError>,
    {
        let ticket = self.begin();
        let result = fetch();
        self.finish(ticket, result)
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of responses applied so far (successful or not)
    pub fn completed_loads(&self) -> u64 {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(msg: &str) -> BackofficeError {
        BackofficeError::Api {
            status: 500,
            message: msg.to_string(),
        }
    }

    #[test]
    fn success_replaces_data_and_clears_loading() {
        let mut state: RemoteState<Vec<u32>> = RemoteState::new();
        let ticket = state.begin();
        assert!(state.is_loading());
        assert_eq!(state.finish(ticket, Ok(vec![1, 2, 3])), Outcome::Applied);
        assert!(!state.is_loading());
        assert_eq!(state.data(), &vec![1, 2, 3]);

        state.run(|| Ok(vec![9]));
        assert_eq!(state.data(), &vec![9]);
    }

    #[test]
    fn failure_empties_data_and_records_message() {
        let mut state: RemoteState<Vec<u32>> = RemoteState::new();
        state.run(|| Ok(vec![1, 2]));
        let outcome = state.run(|| Err(api_error("database offline")));
        assert_eq!(outcome, Outcome::Failed);
        assert!(state.data().is_empty());
        assert!(!state.is_loading());
        assert!(state.error().unwrap().contains("database offline"));
    }

    #[test]
    fn new_request_clears_previous_error() {
        let mut state: RemoteState<Vec<u32>> = RemoteState::new();
        state.run(|| Err(api_error("nope")));
        let _ticket = state.begin();
        assert!(state.error().is_none());
    }

    #[test]
    fn older_response_cannot_overwrite_newer_one() {
        let mut state: RemoteState<Vec<&str>> = RemoteState::new();
        let poll_tick = state.begin();
        let filter_change = state.begin();

        assert_eq!(state.finish(filter_change, Ok(vec!["filtered"])), Outcome::Applied);
        assert_eq!(state.finish(poll_tick, Ok(vec!["stale"])), Outcome::Stale);
        assert_eq!(state.data(), &vec!["filtered"]);
    }

    #[test]
    fn stale_response_keeps_loading_for_pending_request() {
        let mut state: RemoteState<Vec<u32>> = RemoteState::new();
        let first = state.begin();
        let second = state.begin();
        assert_eq!(state.finish(first, Err(api_error("late failure"))), Outcome::Stale);
        assert!(state.is_loading());
        assert!(state.error().is_none());
        state.finish(second, Ok(vec![4]));
        assert!(!state.is_loading());
        assert_eq!(state.completed_loads(), 1);
    }
}
