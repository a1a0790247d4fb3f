pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod pages;
pub mod sync;

#[cfg(test)]
mod test_utils;

pub use api::{BackofficeApi, HttpApi};
pub use config::{load_config, Config};
pub use error::{BackofficeError, Result};
pub use export::DisplayContext;
pub use pages::{DebtsPage, ExpensesPage, SupplyHistoryPage};
