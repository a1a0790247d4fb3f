//! The remote back-office API as seen by the pages.
//!
//! Pages only know the [`BackofficeApi`] trait; `main` builds one
//! [`HttpApi`] and lends it to whichever page a command needs.

mod http;
mod types;

pub use http::HttpApi;
pub use types::{
    Debt, DebtItem, DebtList, DebtPayment, Expense, ExpenseCategory, ExpenseKind, ExpensePayload,
    ExpensesTotal, PaymentMethod, Product, SupplyPage, SupplyRecord,
};

use crate::error::Result;
use crate::sync::QueryParams;

pub trait BackofficeApi {
    fn list_supply_history(&self, params: &QueryParams) -> Result<SupplyPage>;

    fn search_products(&self, query: &str) -> Result<Vec<Product>>;

    fn list_expenses(&self, params: &QueryParams) -> Result<Vec<Expense>>;

    fn expenses_total(&self, params: &QueryParams) -> Result<ExpensesTotal>;

    fn list_expense_history(&self, params: &QueryParams) -> Result<Vec<Expense>>;

    fn list_expense_categories(&self) -> Result<Vec<ExpenseCategory>>;

    fn create_expense_category(&self, name: &str) -> Result<ExpenseCategory>;

    fn create_expense(&self, payload: &ExpensePayload) -> Result<Expense>;

    fn update_expense(&self, id: &str, payload: &ExpensePayload) -> Result<Expense>;

    fn delete_expense(&self, id: &str) -> Result<()>;

    fn list_debts(&self) -> Result<Vec<Debt>>;

    fn debt_detail(&self, id: &str) -> Result<Debt>;

    fn pay_debt(&self, id: &str, payment: &DebtPayment) -> Result<Debt>;
}
