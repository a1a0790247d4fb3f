//! Building blocks shared by every list page: filters, debounced lookups,
//! sequenced fetches, polling, derived views and single-draft mutations.

pub mod debounce;
pub mod draft;
pub mod fetch;
pub mod filter;
pub mod poll;
pub mod projection;

pub use debounce::{Autocomplete, Debouncer, Generation, LookupRequest};
pub use draft::{Draft, DraftSlot, Phase};
pub use fetch::{Outcome, RemoteState, Ticket};
pub use filter::{FilterCriteria, PageKeys, QueryParams};
pub use poll::{PollPolicy, Poller, Trigger};
