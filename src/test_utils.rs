//! Test utilities for the page controllers.
//!
//! `MockApi` is an in-memory stand-in for the remote API. It records every
//! call (so tests can assert "no request was made" or "exactly one request")
//! and can be told to fail individual operations. Only compiled for tests.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::api::*;
use crate::error::{BackofficeError, Result};
use crate::sync::QueryParams;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub arg: String,
}

#[derive(Default)]
pub struct MockApi {
    calls: RefCell<Vec<Call>>,
    failing: RefCell<HashSet<&'static str>>,
    pub supply_page: RefCell<SupplyPage>,
    pub products: RefCell<Vec<Product>>,
    pub expenses: RefCell<Vec<Expense>>,
    pub total: RefCell<Option<f64>>,
    pub history: RefCell<Vec<Expense>>,
    pub categories: RefCell<Vec<ExpenseCategory>>,
    pub debts: RefCell<Vec<Debt>>,
    pub detail_items: RefCell<Vec<DebtItem>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.borrow_mut().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.borrow_mut().remove(op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|c| c.op).collect()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.op == op).count()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn last_arg(&self, op: &str) -> Option<String> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|c| c.op == op)
            .map(|c| c.arg.clone())
    }

    fn record(&self, op: &'static str, arg: String) -> Result<()> {
        self.calls.borrow_mut().push(Call { op, arg });
        if self.failing.borrow().contains(op) {
            return Err(BackofficeError::Api {
                status: 500,
                message: format!("{op} failed"),
            });
        }
        Ok(())
    }
}

fn describe(params: &QueryParams) -> String {
    params
        .pairs()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn debt(id: &str, total: f64, paid: f64) -> Debt {
    Debt {
        id: id.to_string(),
        client_name: Some(format!("Client {id}")),
        status: Some("pendente".to_string()),
        total,
        paid,
        ..Default::default()
    }
}

pub fn expense(id: &str, description: &str, category: &str, amount: f64) -> Expense {
    Expense {
        id: id.to_string(),
        kind: Some("Fixa".to_string()),
        category: Some(category.to_string()),
        description: Some(description.to_string()),
        amount,
        paid_on: Some("2026-10-01".to_string()),
        created_at: None,
    }
}

pub fn category(name: &str) -> ExpenseCategory {
    ExpenseCategory {
        id: name.to_lowercase(),
        name: name.to_string(),
    }
}

impl BackofficeApi for MockApi {
    fn list_supply_history(&self, params: &QueryParams) -> Result<SupplyPage> {
        self.record("list_supply_history", describe(params))?;
        Ok(self.supply_page.borrow().clone())
    }

    fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        self.record("search_products", query.to_string())?;
        Ok(self.products.borrow().clone())
    }

    fn list_expenses(&self, params: &QueryParams) -> Result<Vec<Expense>> {
        self.record("list_expenses", describe(params))?;
        Ok(self.expenses.borrow().clone())
    }

    fn expenses_total(&self, params: &QueryParams) -> Result<ExpensesTotal> {
        self.record("expenses_total", describe(params))?;
        Ok(ExpensesTotal {
            total: *self.total.borrow(),
        })
    }

    fn list_expense_history(&self, params: &QueryParams) -> Result<Vec<Expense>> {
        self.record("list_expense_history", describe(params))?;
        Ok(self.history.borrow().clone())
    }

    fn list_expense_categories(&self) -> Result<Vec<ExpenseCategory>> {
        self.record("list_expense_categories", String::new())?;
        Ok(self.categories.borrow().clone())
    }

    fn create_expense_category(&self, name: &str) -> Result<ExpenseCategory> {
        self.record("create_expense_category", name.to_string())?;
        let created = category(name);
        self.categories.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn create_expense(&self, payload: &ExpensePayload) -> Result<Expense> {
        self.record("create_expense", serde_json::to_string(payload)?)?;
        let mut expenses = self.expenses.borrow_mut();
        let created = Expense {
            id: format!("e{}", expenses.len() + 1),
            kind: Some(payload.kind.to_string()),
            category: Some(payload.category.clone()),
            description: Some(payload.description.clone()),
            amount: payload.amount,
            paid_on: Some(payload.paid_on.clone()),
            created_at: None,
        };
        expenses.push(created.clone());
        Ok(created)
    }

    fn update_expense(&self, id: &str, payload: &ExpensePayload) -> Result<Expense> {
        self.record(
            "update_expense",
            format!("{id} {}", serde_json::to_string(payload)?),
        )?;
        let mut expenses = self.expenses.borrow_mut();
        let existing = expenses
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| BackofficeError::ExpenseNotFound(id.to_string()))?;
        existing.description = Some(payload.description.clone());
        existing.category = Some(payload.category.clone());
        existing.amount = payload.amount;
        Ok(existing.clone())
    }

    fn delete_expense(&self, id: &str) -> Result<()> {
        self.record("delete_expense", id.to_string())?;
        self.expenses.borrow_mut().retain(|e| e.id != id);
        Ok(())
    }

    fn list_debts(&self) -> Result<Vec<Debt>> {
        self.record("list_debts", String::new())?;
        Ok(self.debts.borrow().clone())
    }

    fn debt_detail(&self, id: &str) -> Result<Debt> {
        self.record("debt_detail", id.to_string())?;
        let mut found = self
            .debts
            .borrow()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| BackofficeError::DebtNotFound(id.to_string()))?;
        found.items = self.detail_items.borrow().clone();
        Ok(found)
    }

    fn pay_debt(&self, id: &str, payment: &DebtPayment) -> Result<Debt> {
        self.record("pay_debt", format!("{id} {}", serde_json::to_string(payment)?))?;
        let mut debts = self.debts.borrow_mut();
        let debt = debts
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| BackofficeError::DebtNotFound(id.to_string()))?;
        debt.paid += payment.amount;
        Ok(debt.clone())
    }
}
