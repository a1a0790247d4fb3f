//! Open expenses with their running total, the create/edit/delete flows and
//! the searchable history.

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::api::{BackofficeApi, Expense, ExpenseCategory, ExpenseKind, ExpensePayload};
use crate::error::{BackofficeError, Result};
use crate::export::{printable_html, to_csv, DisplayContext};
use crate::format::parse_amount;
use crate::sync::projection::{first_n, matches_text, summary, within_dates};
use crate::sync::{DraftSlot, Outcome, QueryParams, RemoteState};

/// Records shown in the compact list
pub const COMPACT_ROWS: usize = 5;
/// Upper bound asked of the history endpoint
pub const HISTORY_LIMIT: u32 = 500;

const PAID_STATUS: &str = "Pago";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseListing {
    pub items: Vec<Expense>,
    pub total: f64,
}

/// Form state for creating or editing one expense. Amount stays as typed
/// until submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseDraft {
    pub id: Option<String>,
    pub kind: ExpenseKind,
    pub category: String,
    pub description: String,
    pub amount: String,
}

impl ExpenseDraft {
    fn from_expense(expense: &Expense) -> Self {
        Self {
            id: Some(expense.id.clone()),
            kind: expense
                .kind
                .as_deref()
                .map(ExpenseKind::from_label)
                .unwrap_or_default(),
            category: expense.category.clone().unwrap_or_default(),
            description: expense.description.clone().unwrap_or_default(),
            amount: expense.amount.to_string(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Check the form and build the request body. Payment and due dates are
    /// both `today`.
    pub fn to_payload(&self, today: NaiveDate) -> Result<ExpensePayload> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(BackofficeError::Validation(
                "Description is required".to_string(),
            ));
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(BackofficeError::Validation(
                "Choose or type a category".to_string(),
            ));
        }
        let amount = parse_amount(&self.amount)
            .filter(|v| *v > 0.0)
            .ok_or_else(|| {
                BackofficeError::Validation(
                    "Amount must be a number greater than zero".to_string(),
                )
            })?;

        let day = today.format("%Y-%m-%d").to_string();
        Ok(ExpensePayload {
            kind: self.kind,
            category: category.to_string(),
            description: description.to_string(),
            amount,
            status: PAID_STATUS.to_string(),
            paid_on: day.clone(),
            due_on: day,
        })
    }
}

/// Client-side filters of the history view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    pub search: String,
    pub kind: Option<String>,
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl HistoryFilter {
    fn accepts(&self, expense: &Expense) -> bool {
        let text_ok = matches_text(
            &self.search,
            &[
                Some(expense.id.as_str()),
                expense.description.as_deref(),
                expense.category.as_deref(),
                expense.kind.as_deref(),
                expense.paid_on.as_deref(),
            ],
        );
        let kind_ok = exact(self.kind.as_deref(), expense.kind.as_deref());
        let category_ok = exact(self.category.as_deref(), expense.category.as_deref());
        text_ok
            && kind_ok
            && category_ok
            && within_dates(
                expense.paid_on.as_deref(),
                self.from.as_deref(),
                self.to.as_deref(),
            )
    }
}

fn exact(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted.map(str::trim).filter(|w| !w.is_empty()) {
        Some(w) => actual == Some(w),
        None => true,
    }
}

pub struct ExpensesPage<'a, A: BackofficeApi + ?Sized> {
    api: &'a A,
    list: RemoteState<ExpenseListing>,
    categories: Vec<ExpenseCategory>,
    editor: DraftSlot<ExpenseDraft>,
    pending_delete: DraftSlot<String>,
    history: Option<Vec<Expense>>,
    history_filter: HistoryFilter,
}

impl<'a, A: BackofficeApi + ?Sized> ExpensesPage<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            list: RemoteState::new(),
            categories: Vec::new(),
            editor: DraftSlot::new(),
            pending_delete: DraftSlot::new(),
            history: None,
            history_filter: HistoryFilter::default(),
        }
    }

    fn open_params() -> QueryParams {
        QueryParams::new().with("fechada", "0")
    }

    /// Fetch open expenses and their total. Both must succeed.
    pub fn load(&mut self) -> Outcome {
        let api = self.api;
        let params = Self::open_params();
        let outcome = self.list.run(|| {
            let items = api.list_expenses(&params)?;
            let total = api
                .expenses_total(&params)?
                .total
                .unwrap_or_else(|| items.iter().map(|e| e.amount).sum());
            Ok(ExpenseListing { items, total })
        });
        info!(
            "loaded {} open expenses, total {:.2} ({:?})",
            self.items().len(),
            self.total(),
            outcome
        );
        outcome
    }

    pub fn items(&self) -> &[Expense] {
        &self.list.data().items
    }

    pub fn total(&self) -> f64 {
        self.list.data().total
    }

    pub fn error(&self) -> Option<&str> {
        self.list.error()
    }

    pub fn compact_items(&self) -> &[Expense] {
        first_n(self.items(), COMPACT_ROWS)
    }

    pub fn compact_summary(&self) -> String {
        summary(self.compact_items().len(), self.items().len())
    }

    pub fn load_categories(&mut self) -> Result<&[ExpenseCategory]> {
        self.categories = self.api.list_expense_categories()?;
        debug!("cached {} expense categories", self.categories.len());
        Ok(&self.categories)
    }

    pub fn categories(&self) -> &[ExpenseCategory] {
        &self.categories
    }

    /// Open a blank form; the first known category is preselected
    pub fn start_create(&mut self) {
        let category = self
            .categories
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_default();
        self.editor.open(ExpenseDraft {
            category,
            ..Default::default()
        });
    }

    pub fn start_edit(&mut self, id: &str) -> Result<()> {
        let expense = self
            .items()
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| BackofficeError::ExpenseNotFound(id.to_string()))?;
        let draft = ExpenseDraft::from_expense(expense);
        self.editor.open(draft);
        Ok(())
    }

    pub fn draft(&self) -> Option<&ExpenseDraft> {
        self.editor.value()
    }

    pub fn draft_mut(&mut self) -> Option<&mut ExpenseDraft> {
        self.editor.value_mut()
    }

    pub fn draft_error(&self) -> Option<&str> {
        self.editor.error()
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.editor.cancel()
    }

    /// Validate, make sure the category exists, then create or update.
    ///
    /// Invalid input never reaches the network. Any failure leaves the form
    /// open with its message.
    pub fn submit(&mut self, today: NaiveDate) -> Result<Expense> {
        let draft = self
            .editor
            .value()
            .cloned()
            .ok_or_else(|| BackofficeError::Validation("No expense is open".to_string()))?;

        let payload = match draft.to_payload(today) {
            Ok(payload) => payload,
            Err(e) => {
                self.editor.fail(e.to_string());
                return Err(e);
            }
        };

        self.ensure_category(&payload.category);

        if self.editor.begin_submit().is_none() {
            return Err(BackofficeError::Validation(
                "A submit is already in progress".to_string(),
            ));
        }
        let result = match draft.id.as_deref() {
            Some(id) => self.api.update_expense(id, &payload),
            None => self.api.create_expense(&payload),
        };

        match result {
            Ok(saved) => {
                info!(
                    "{} expense '{}'",
                    if draft.is_edit() { "updated" } else { "created" },
                    payload.description
                );
                self.editor.commit();
                self.load();
                Ok(saved)
            }
            Err(e) => {
                self.editor.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Create the category if no cached one matches (ignoring case).
    /// Failures are logged and otherwise ignored.
    fn ensure_category(&mut self, name: &str) {
        if self.categories.is_empty() {
            if let Err(e) = self.load_categories() {
                warn!("could not load expense categories: {e}");
            }
        }
        let wanted = name.to_lowercase();
        if self
            .categories
            .iter()
            .any(|c| c.name.to_lowercase() == wanted)
        {
            return;
        }
        match self.api.create_expense_category(name) {
            Ok(created) => {
                info!("created expense category '{}'", created.name);
                if self.load_categories().is_err() {
                    self.categories.push(created);
                }
            }
            Err(e) => warn!("could not create category '{name}': {e}"),
        }
    }

    pub fn ask_delete(&mut self, id: &str) {
        self.pending_delete.open(id.to_string());
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.value().map(String::as_str)
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.pending_delete.cancel()
    }

    pub fn confirm_delete(&mut self) -> Result<()> {
        let id = self
            .pending_delete
            .begin_submit()
            .cloned()
            .ok_or_else(|| BackofficeError::Validation("Nothing to delete".to_string()))?;

        match self.api.delete_expense(&id) {
            Ok(()) => {
                info!("deleted expense {id}");
                self.pending_delete.commit();
                self.load();
                Ok(())
            }
            Err(e) => {
                self.pending_delete.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch the full history. A failure shows an empty history.
    pub fn open_history(&mut self) -> &[Expense] {
        let params = QueryParams::new().with("limit", HISTORY_LIMIT.to_string());
        let records = self.api.list_expense_history(&params).unwrap_or_else(|e| {
            warn!("expense history unavailable: {e}");
            Vec::new()
        });
        self.history_filter = HistoryFilter::default();
        &*self.history.insert(records)
    }

    pub fn is_history_open(&self) -> bool {
        self.history.is_some()
    }

    pub fn history_filter_mut(&mut self) -> &mut HistoryFilter {
        &mut self.history_filter
    }

    /// History records matching the current history filter
    pub fn history_view(&self) -> Vec<&Expense> {
        self.history
            .iter()
            .flatten()
            .filter(|e| self.history_filter.accepts(e))
            .collect()
    }

    pub fn close_history(&mut self) {
        self.history = None;
        self.history_filter = HistoryFilter::default();
    }

    fn history_rows(&self) -> Vec<Expense> {
        self.history_view().into_iter().cloned().collect()
    }

    pub fn export_history_csv(&self, ctx: &DisplayContext) -> Result<String> {
        to_csv(&self.history_rows(), ctx)
    }

    pub fn export_history_html(&self, ctx: &DisplayContext) -> String {
        let rows = self.history_rows();
        let total: f64 = rows.iter().map(|e| e.amount).sum();
        let subtitle = format!(
            "{} records · total {}",
            rows.len(),
            crate::format::format_money(total, &ctx.currency_symbol)
        );
        printable_html("Expense history", Some(&subtitle), &rows, ctx)
    }
}
