//! Page controllers. Each owns its filters, remote list and drafts, and talks
//! to the API through a borrowed [`BackofficeApi`](crate::api::BackofficeApi).

pub mod debts;
pub mod expenses;
pub mod supplies;

pub use debts::{DebtDetail, DebtsPage, PaymentDraft, PaymentReceipt};
pub use expenses::{ExpenseDraft, ExpenseListing, ExpensesPage, HistoryFilter};
pub use supplies::{SortOrder, SupplyFilter, SupplyHistoryPage};
