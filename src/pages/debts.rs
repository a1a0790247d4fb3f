//! Outstanding customer debts: polled list, debounced search, payments and
//! the detail view.

use log::{debug, info, warn};
use std::time::{Duration, Instant};

use crate::api::{BackofficeApi, Debt, DebtPayment, PaymentMethod};
use crate::config::{LookupSettings, RefreshSettings};
use crate::error::{BackofficeError, Result};
use crate::export::{printable_html, to_csv, DisplayContext};
use crate::format::parse_amount;
use crate::sync::projection::matches_text;
use crate::sync::{Debouncer, DraftSlot, Outcome, PollPolicy, Poller, RemoteState, Trigger};

/// Slack when comparing a payment with the remaining balance
const BALANCE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    pub debt_id: String,
    pub remaining: f64,
    pub amount: String,
    pub method: PaymentMethod,
}

impl PaymentDraft {
    fn validated_amount(&self) -> Result<f64> {
        let amount = parse_amount(&self.amount)
            .filter(|v| *v > 0.0)
            .ok_or_else(|| {
                BackofficeError::Validation("Enter an amount greater than zero".to_string())
            })?;
        if amount > self.remaining + BALANCE_EPSILON {
            return Err(BackofficeError::OverPayment {
                remaining: self.remaining,
            });
        }
        Ok(amount)
    }
}

/// A registered payment: the server's updated debt and what was sent
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub debt: Debt,
    pub amount: f64,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebtDetail {
    pub debt: Debt,
    pub error: Option<String>,
}

pub struct DebtsPage<'a, A: BackofficeApi + ?Sized> {
    api: &'a A,
    list: RemoteState<Vec<Debt>>,
    policy: PollPolicy,
    poller: Option<Poller>,
    search: Debouncer<String>,
    applied_search: String,
    payment: DraftSlot<PaymentDraft>,
    detail: Option<DebtDetail>,
    user_id: Option<String>,
}

impl<'a, A: BackofficeApi + ?Sized> DebtsPage<'a, A> {
    pub fn new(
        api: &'a A,
        refresh: &RefreshSettings,
        lookup: &LookupSettings,
        user_id: Option<String>,
    ) -> Self {
        Self {
            api,
            list: RemoteState::new(),
            policy: PollPolicy::from(refresh),
            poller: None,
            search: Debouncer::new(Duration::from_millis(lookup.search_debounce_ms)),
            applied_search: String::new(),
            payment: DraftSlot::new(),
            detail: None,
            user_id,
        }
    }

    pub fn load(&mut self) -> Outcome {
        let api = self.api;
        let outcome = self.list.run(|| api.list_debts());
        info!("loaded {} debts ({:?})", self.list.data().len(), outcome);
        outcome
    }

    fn refresh(&mut self, trigger: Trigger, now: Instant) -> Outcome {
        debug!("debt list refresh: {:?}", trigger);
        let outcome = self.load();
        if let Some(poller) = self.poller.as_mut() {
            poller.record(outcome != Outcome::Failed, now);
        }
        outcome
    }

    /// Start polling and fetch immediately. Mounting again replaces the
    /// previous schedule.
    pub fn mount(&mut self, now: Instant) -> Outcome {
        let (poller, trigger) = Poller::mount(self.policy, now);
        self.poller = Some(poller);
        self.refresh(trigger, now)
    }

    pub fn is_mounted(&self) -> bool {
        self.poller.as_ref().is_some_and(Poller::is_mounted)
    }

    /// Refresh if the polling interval has elapsed
    pub fn tick(&mut self, now: Instant) -> Option<Outcome> {
        let trigger = self.poller.as_mut()?.due(now)?;
        Some(self.refresh(trigger, now))
    }

    pub fn on_focus(&mut self, now: Instant) -> Option<Outcome> {
        let trigger = self.poller.as_ref()?.on_focus()?;
        Some(self.refresh(trigger, now))
    }

    pub fn on_visibility(&mut self, visible: bool, now: Instant) -> Option<Outcome> {
        let trigger = self.poller.as_ref()?.on_visibility(visible)?;
        Some(self.refresh(trigger, now))
    }

    pub fn unmount(&mut self) {
        if let Some(poller) = self.poller.as_mut() {
            poller.unmount();
        }
        self.search.cancel();
    }

    /// How long the event loop may sleep before the next tick or search
    pub fn next_wake(&self, now: Instant) -> Option<Duration> {
        let poll = self.poller.as_ref().and_then(|p| p.next_wake(now));
        let search = self
            .search
            .deadline()
            .map(|due| due.saturating_duration_since(now));
        match (poll, search) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn search_input(&mut self, text: &str, now: Instant) {
        self.search.schedule(text.trim().to_lowercase(), now);
    }

    /// Apply the typed search once typing has paused
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.search.take_due(now) {
            Some((_, query)) => {
                self.applied_search = query;
                true
            }
            None => false,
        }
    }

    /// Apply a search immediately, skipping the debounce
    pub fn set_search(&mut self, text: &str) {
        self.search.cancel();
        self.applied_search = text.trim().to_lowercase();
    }

    pub fn search(&self) -> &str {
        &self.applied_search
    }

    pub fn debts(&self) -> &[Debt] {
        self.list.data()
    }

    /// Debts matching the applied search on client, note or status
    pub fn filtered(&self) -> Vec<&Debt> {
        self.debts()
            .iter()
            .filter(|d| {
                matches_text(
                    &self.applied_search,
                    &[
                        d.client_name.as_deref(),
                        d.note.as_deref(),
                        d.status.as_deref(),
                    ],
                )
            })
            .collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.list.error()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    fn find(&self, id: &str) -> Option<&Debt> {
        self.debts().iter().find(|d| d.id == id)
    }

    /// Prefill a payment for the whole remaining balance
    pub fn open_payment(&mut self, id: &str) -> Result<&PaymentDraft> {
        let debt = self
            .find(id)
            .ok_or_else(|| BackofficeError::DebtNotFound(id.to_string()))?;
        let remaining = debt.remaining();
        if remaining <= 0.0 {
            return Err(BackofficeError::NothingOwed(id.to_string()));
        }
        let draft = PaymentDraft {
            debt_id: debt.id.clone(),
            remaining,
            amount: format!("{:.2}", remaining),
            method: PaymentMethod::default(),
        };
        self.payment.open(draft);
        self.payment
            .value()
            .ok_or_else(|| BackofficeError::Validation("Payment form unavailable".to_string()))
    }

    pub fn payment(&self) -> Option<&PaymentDraft> {
        self.payment.value()
    }

    pub fn payment_mut(&mut self) -> Option<&mut PaymentDraft> {
        self.payment.value_mut()
    }

    pub fn payment_error(&self) -> Option<&str> {
        self.payment.error()
    }

    pub fn cancel_payment(&mut self) -> bool {
        self.payment.cancel()
    }

    /// Validate locally, register the payment once, then reload the list
    pub fn submit_payment(&mut self) -> Result<PaymentReceipt> {
        let draft = self
            .payment
            .value()
            .cloned()
            .ok_or_else(|| BackofficeError::Validation("No payment is open".to_string()))?;

        let amount = match draft.validated_amount() {
            Ok(amount) => amount,
            Err(e) => {
                self.payment.fail(e.to_string());
                return Err(e);
            }
        };

        if self.payment.begin_submit().is_none() {
            return Err(BackofficeError::Validation(
                "A payment is already being submitted".to_string(),
            ));
        }
        let payment = DebtPayment {
            amount,
            method: draft.method,
            user_id: self.user_id.clone(),
        };

        match self.api.pay_debt(&draft.debt_id, &payment) {
            Ok(updated) => {
                info!(
                    "registered {:.2} ({}) on debt {}",
                    amount, draft.method, draft.debt_id
                );
                self.payment.commit();
                self.load();
                Ok(PaymentReceipt {
                    debt: updated,
                    amount,
                    method: draft.method,
                })
            }
            Err(e) => {
                self.payment.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Show the list record at once, then replace it with the full detail.
    /// If the detail request fails the list record stays, with the error.
    pub fn open_detail(&mut self, id: &str) -> Result<&DebtDetail> {
        let known = self.find(id).cloned();
        if let Some(debt) = known.clone() {
            self.detail = Some(DebtDetail { debt, error: None });
        }

        let detail = match (self.api.debt_detail(id), known) {
            (Ok(debt), _) => DebtDetail { debt, error: None },
            (Err(e), Some(debt)) => {
                warn!("debt detail {id} unavailable: {e}");
                DebtDetail {
                    debt,
                    error: Some(e.to_string()),
                }
            }
            (Err(e), None) => {
                self.detail = None;
                return Err(e);
            }
        };
        Ok(&*self.detail.insert(detail))
    }

    pub fn detail(&self) -> Option<&DebtDetail> {
        self.detail.as_ref()
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    fn filtered_rows(&self) -> Vec<Debt> {
        self.filtered().into_iter().cloned().collect()
    }

    pub fn export_csv(&self, ctx: &DisplayContext) -> Result<String> {
        to_csv(&self.filtered_rows(), ctx)
    }

    pub fn export_html(&self, ctx: &DisplayContext) -> String {
        let rows = self.filtered_rows();
        let subtitle = match self.applied_search.as_str() {
            "" => format!("{} debts", rows.len()),
            query => format!("{} debts matching \"{}\"", rows.len(), query),
        };
        printable_html("Debts", Some(&subtitle), &rows, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DebtItem;
    use crate::test_utils::{debt, MockApi};

    fn refresh() -> RefreshSettings {
        RefreshSettings {
            poll_interval_secs: 20,
            max_backoff_secs: 300,
            jitter_ms: 0,
        }
    }

    fn seeded() -> MockApi {
        let api = MockApi::new();
        let mut settled = debt("d3", 50.0, 50.0);
        settled.status = Some("pago".into());
        let mut noted = debt("d2", 300.0, 0.0);
        noted.note = Some("Entrega em Matola".into());
        *api.debts.borrow_mut() = vec![debt("d1", 1000.0, 250.0), noted, settled];
        api
    }

    fn page(api: &MockApi) -> DebtsPage<'_, MockApi> {
        DebtsPage::new(api, &refresh(), &LookupSettings::default(), Some("u-9".into()))
    }

    #[test]
    fn polling_fetches_on_mount_interval_and_focus() {
        let api = seeded();
        let mut page = page(&api);
        let start = Instant::now();

        page.mount(start);
        assert_eq!(api.count("list_debts"), 1);

        assert!(page.tick(start + Duration::from_secs(19)).is_none());
        assert!(page.tick(start + Duration::from_secs(20)).is_some());
        assert!(page.tick(start + Duration::from_secs(39)).is_none());
        assert!(page.tick(start + Duration::from_secs(40)).is_some());
        assert_eq!(api.count("list_debts"), 3);

        page.on_focus(start + Duration::from_secs(41));
        page.on_visibility(false, start + Duration::from_secs(42));
        page.on_visibility(true, start + Duration::from_secs(43));
        assert_eq!(api.count("list_debts"), 5);

        page.unmount();
        assert!(page.tick(start + Duration::from_secs(600)).is_none());
        assert!(page.on_focus(start + Duration::from_secs(601)).is_none());
        assert_eq!(api.count("list_debts"), 5);
        assert!(!page.is_mounted());
    }

    #[test]
    fn failures_back_off_until_a_success() {
        let api = seeded();
        api.fail("list_debts");
        let mut page = page(&api);
        let start = Instant::now();
        page.mount(start);
        assert!(page.error().is_some());
        assert_eq!(page.next_wake(start), Some(Duration::from_secs(40)));

        api.recover("list_debts");
        let later = start + Duration::from_secs(40);
        assert_eq!(page.tick(later), Some(Outcome::Applied));
        assert_eq!(page.next_wake(later), Some(Duration::from_secs(20)));
    }

    #[test]
    fn search_is_debounced_and_case_insensitive() {
        let api = seeded();
        let mut page = page(&api);
        let start = Instant::now();
        page.mount(start);

        page.search_input("Mat", start);
        page.search_input("MATOLA", start + Duration::from_millis(100));
        assert!(!page.poll_search(start + Duration::from_millis(300)));
        assert_eq!(page.filtered().len(), 3);
        assert!(page.poll_search(start + Duration::from_millis(350)));
        assert_eq!(page.search(), "matola");
        let ids: Vec<_> = page.filtered().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d2"]);

        page.set_search("PAGO");
        assert_eq!(page.filtered()[0].id, "d3");
    }

    #[test]
    fn overpayment_is_rejected_without_a_request() {
        let api = seeded();
        let mut page = page(&api);
        page.load();
        let draft = page.open_payment("d1").unwrap();
        assert_eq!(draft.amount, "750.00");
        assert_eq!(draft.method, PaymentMethod::Cash);
        api.reset_calls();

        page.payment_mut().unwrap().amount = "750.01".into();
        assert!(matches!(
            page.submit_payment(),
            Err(BackofficeError::OverPayment { .. })
        ));
        page.payment_mut().unwrap().amount = "0".into();
        assert!(page.submit_payment().unwrap_err().is_validation());
        page.payment_mut().unwrap().amount = "abc".into();
        assert!(page.submit_payment().is_err());

        assert!(api.calls().is_empty());
        assert!(page.payment().is_some());
        assert_eq!(page.payment_error(), Some("Enter an amount greater than zero"));
    }

    #[test]
    fn valid_payment_calls_once_and_reloads() {
        let api = seeded();
        let mut page = page(&api);
        page.load();
        page.open_payment("d1").unwrap();
        {
            let draft = page.payment_mut().unwrap();
            draft.amount = "250,5".into();
            draft.method = PaymentMethod::Mpesa;
        }
        api.reset_calls();

        let receipt = page.submit_payment().unwrap();
        assert_eq!(receipt.amount, 250.5);
        assert_eq!(receipt.method, PaymentMethod::Mpesa);
        assert_eq!(receipt.debt.paid, 500.5);
        assert_eq!(api.ops(), vec!["pay_debt", "list_debts"]);
        let body = api.last_arg("pay_debt").unwrap();
        assert!(body.starts_with("d1 "));
        assert!(body.contains("\"valor\":250.5"));
        assert!(body.contains("\"forma_pagamento\":\"mpesa\""));
        assert!(body.contains("\"usuario_id\":\"u-9\""));
        assert!(page.payment().is_none());
        assert_eq!(page.debts()[0].remaining(), 499.5);
    }

    #[test]
    fn full_balance_within_epsilon_is_accepted() {
        let api = seeded();
        let mut page = page(&api);
        page.load();
        page.open_payment("d2").unwrap();
        page.payment_mut().unwrap().amount = "300.0000001".into();
        let receipt = page.submit_payment().unwrap();
        assert_eq!(receipt.amount, 300.0000001);
    }

    #[test]
    fn failed_payment_keeps_draft_with_message() {
        let api = seeded();
        api.fail("pay_debt");
        let mut page = page(&api);
        page.load();
        page.open_payment("d1").unwrap();
        assert!(page.submit_payment().is_err());
        assert_eq!(page.payment_error(), Some("Server responded with 500: pay_debt failed"));
        assert_eq!(api.count("list_debts"), 1);
        assert!(page.cancel_payment());
    }

    #[test]
    fn settled_debt_cannot_be_paid() {
        let api = seeded();
        let mut page = page(&api);
        page.load();
        assert!(matches!(
            page.open_payment("d3"),
            Err(BackofficeError::NothingOwed(_))
        ));
        assert!(matches!(
            page.open_payment("zz"),
            Err(BackofficeError::DebtNotFound(_))
        ));
    }

    #[test]
    fn detail_falls_back_to_list_record() {
        let api = seeded();
        *api.detail_items.borrow_mut() = vec![DebtItem {
            product_name: Some("Arroz".into()),
            quantity: 2.0,
            unit_price: 125.0,
            subtotal: 250.0,
            ..Default::default()
        }];
        let mut page = page(&api);
        page.load();

        let detail = page.open_detail("d1").unwrap();
        assert_eq!(detail.debt.items.len(), 1);
        assert!(detail.error.is_none());

        api.fail("debt_detail");
        let detail = page.open_detail("d2").unwrap();
        assert_eq!(detail.debt.id, "d2");
        assert!(detail.debt.items.is_empty());
        assert!(detail.error.is_some());

        page.close_detail();
        assert!(page.detail().is_none());
        assert!(page.open_detail("missing").is_err());
    }

    #[test]
    fn export_follows_the_search() {
        let api = seeded();
        let mut page = page(&api);
        page.load();
        page.set_search("matola");
        let csv = page.export_csv(&DisplayContext::default()).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(page
            .export_html(&DisplayContext::default())
            .contains("1 debts matching"));
    }
}
