use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use ureq::Agent;

use super::types::*;
use super::BackofficeApi;
use crate::error::{BackofficeError, Result};
use crate::sync::QueryParams;

const SUPPLY_HISTORY: &str = "/abastecimentos/historico";
const PRODUCTS: &str = "/produtos";
const EXPENSES: &str = "/despesas";
const EXPENSES_TOTAL: &str = "/despesas/total";
const EXPENSE_HISTORY: &str = "/despesas/historico";
const EXPENSE_CATEGORIES: &str = "/categorias-despesa";
const DEBTS: &str = "/dividas";

/// Blocking JSON client for the back-office API
#[derive(Clone)]
pub struct HttpApi {
    agent: Agent,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, params: &QueryParams) -> Result<T> {
        let url = self.url(path);
        debug!("GET {url} {params:?}");
        let mut response = self.agent.get(&url).query_pairs(params.pairs()).call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        decode(status, &body)
    }

    fn send<B: Serialize, T: DeserializeOwned + Default>(
        &self,
        method: &str,
        path: &str,
        payload: &B,
    ) -> Result<T> {
        let url = self.url(path);
        let json = serde_json::to_string(payload)?;
        debug!("{method} {url}");
        let request = match method {
            "PUT" => self.agent.put(&url),
            _ => self.agent.post(&url),
        };
        let mut response = request
            .header("Content-Type", "application/json")
            .send(json.as_str())?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        decode_or_default(status, &body)
    }
}

/// Turn a response into `T`, or into an `Api` error for non-2xx statuses
fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    if !(200..300).contains(&status) {
        let message = error_message(body).unwrap_or_else(|| format!("HTTP {status}"));
        warn!("API error {status}: {message}");
        return Err(BackofficeError::Api { status, message });
    }
    Ok(serde_json::from_str(body)?)
}

/// Like `decode`, but an empty success body is fine (e.g. 204 on delete)
fn decode_or_default<T: DeserializeOwned + Default>(status: u16, body: &str) -> Result<T> {
    if (200..300).contains(&status) && body.trim().is_empty() {
        return Ok(T::default());
    }
    decode(status, body)
}

/// Pull a human-readable message out of an error body
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return Some(trimmed.chars().take(200).collect());
    };
    for key in ["detail", "message", "error"] {
        match &json[key] {
            serde_json::Value::String(s) if !s.is_empty() => return Some(s.clone()),
            serde_json::Value::Array(list) => {
                let parts: Vec<String> = list
                    .iter()
                    .filter_map(|item| item["msg"].as_str().or(item.as_str()))
                    .map(str::to_string)
                    .collect();
                if !parts.is_empty() {
                    return Some(parts.join("; "));
                }
            }
            _ => {}
        }
    }
    None
}

/// Percent-encode one path segment (ids come from the server, so be careful)
fn segment(id: &str) -> String {
    id.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

#[derive(Serialize)]
struct NewCategory<'a> {
    #[serde(rename = "nome")]
    name: &'a str,
}

impl BackofficeApi for HttpApi {
    fn list_supply_history(&self, params: &QueryParams) -> Result<SupplyPage> {
        self.get(SUPPLY_HISTORY, params)
    }

    fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        self.get(PRODUCTS, &QueryParams::new().with("q", query))
    }

    fn list_expenses(&self, params: &QueryParams) -> Result<Vec<Expense>> {
        self.get(EXPENSES, params)
    }

    fn expenses_total(&self, params: &QueryParams) -> Result<ExpensesTotal> {
        self.get(EXPENSES_TOTAL, params)
    }

    fn list_expense_history(&self, params: &QueryParams) -> Result<Vec<Expense>> {
        self.get(EXPENSE_HISTORY, params)
    }

    fn list_expense_categories(&self) -> Result<Vec<ExpenseCategory>> {
        self.get(EXPENSE_CATEGORIES, &QueryParams::new())
    }

    fn create_expense_category(&self, name: &str) -> Result<ExpenseCategory> {
        self.send("POST", EXPENSE_CATEGORIES, &NewCategory { name })
    }

    fn create_expense(&self, payload: &ExpensePayload) -> Result<Expense> {
        self.send("POST", EXPENSES, payload)
    }

    fn update_expense(&self, id: &str, payload: &ExpensePayload) -> Result<Expense> {
        self.send("PUT", &format!("{EXPENSES}/{}", segment(id)), payload)
    }

    fn delete_expense(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("{EXPENSES}/{}", segment(id)));
        debug!("DELETE {url}");
        let mut response = self.agent.delete(&url).call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        decode_or_default::<serde_json::Value>(status, &body).map(|_| ())
    }

    fn list_debts(&self) -> Result<Vec<Debt>> {
        let list: DebtList = self.get(DEBTS, &QueryParams::new())?;
        Ok(list.into_vec())
    }

    fn debt_detail(&self, id: &str) -> Result<Debt> {
        self.get(&format!("{DEBTS}/{}", segment(id)), &QueryParams::new())
    }

    fn pay_debt(&self, id: &str, payment: &DebtPayment) -> Result<Debt> {
        self.send("POST", &format!("{DEBTS}/{}/pagamentos", segment(id)), payment)
    }
}
