//! Wire records exchanged with the back-office API.
//!
//! The server is loose about numbers (sometimes strings, sometimes null), so
//! every amount goes through [`lenient_f64`].

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Accepts a JSON number, a numeric string or null (treated as zero)
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Missing(Option<()>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
        Raw::Missing(_) => 0.0,
    })
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Missing(Option<()>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Some(n),
        Raw::Text(s) => s.trim().replace(',', ".").parse().ok(),
        Raw::Missing(_) => None,
    })
}

/// Identifiers arrive as strings (UUIDs) or integers
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Missing(Option<()>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Missing(_) => String::new(),
    })
}

fn lenient_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Missing(Option<()>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => Some(s),
        Raw::Int(n) => Some(n.to_string()),
        Raw::Missing(_) => None,
    })
}

/// One stock replenishment entry
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SupplyRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "produto_nome")]
    pub product_name: Option<String>,
    #[serde(default, rename = "codigo")]
    pub product_code: Option<String>,
    #[serde(default, rename = "quantidade", deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default, rename = "custo_unitario", deserialize_with = "lenient_f64")]
    pub unit_cost: f64,
    #[serde(default, rename = "total_custo", deserialize_with = "lenient_f64")]
    pub total_cost: f64,
    #[serde(default, rename = "usuario_nome")]
    pub user_name: Option<String>,
    #[serde(default, rename = "observacao")]
    pub note: Option<String>,
}

/// A page of supply history as returned by the server
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SupplyPage {
    #[serde(default)]
    pub items: Vec<SupplyRecord>,
    #[serde(default)]
    pub has_next: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, rename = "nome")]
    pub name: String,
    #[serde(default, rename = "codigo")]
    pub code: Option<String>,
}

impl Product {
    /// Text shown in the product field once a suggestion is picked
    pub fn label(&self) -> String {
        match self.code.as_deref().filter(|c| !c.is_empty()) {
            Some(code) => format!("{} ({})", self.name, code),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExpenseKind {
    #[default]
    #[serde(rename = "Fixa")]
    #[value(name = "fixed")]
    Fixed,
    #[serde(rename = "Variável")]
    #[value(name = "variable")]
    Variable,
}

impl ExpenseKind {
    /// Unknown labels fall back to fixed
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "variável" | "variavel" => ExpenseKind::Variable,
            _ => ExpenseKind::Fixed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseKind::Fixed => "Fixa",
            ExpenseKind::Variable => "Variável",
        }
    }
}

impl fmt::Display for ExpenseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Expense {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// Kept as text so unknown kinds from the server still decode
    #[serde(default, rename = "tipo")]
    pub kind: Option<String>,
    #[serde(default, rename = "categoria")]
    pub category: Option<String>,
    #[serde(default, rename = "descricao")]
    pub description: Option<String>,
    #[serde(default, rename = "valor", deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(default, rename = "data_pagamento")]
    pub paid_on: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Expense {
    /// Payment date when known, creation timestamp otherwise
    pub fn display_date(&self) -> Option<&str> {
        self.paid_on.as_deref().or(self.created_at.as_deref())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ExpenseCategory {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, rename = "nome")]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ExpensesTotal {
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub total: Option<f64>,
}

/// Body of create/update expense requests
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ExpensePayload {
    #[serde(rename = "tipo")]
    pub kind: ExpenseKind,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    pub status: String,
    #[serde(rename = "data_pagamento")]
    pub paid_on: String,
    #[serde(rename = "data_vencimento")]
    pub due_on: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct DebtItem {
    #[serde(default, rename = "produto_id", deserialize_with = "lenient_opt_id")]
    pub product_id: Option<String>,
    #[serde(default, rename = "produto_nome")]
    pub product_name: Option<String>,
    #[serde(default, rename = "quantidade", deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default, rename = "preco_unitario", deserialize_with = "lenient_f64")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub subtotal: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Debt {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, rename = "id_local")]
    pub local_id: Option<i64>,
    #[serde(default, rename = "cliente_nome")]
    pub client_name: Option<String>,
    #[serde(default, rename = "usuario_nome")]
    pub seller_name: Option<String>,
    #[serde(default, rename = "data_divida")]
    pub created_on: Option<String>,
    #[serde(default, rename = "observacao")]
    pub note: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "valor_total", deserialize_with = "lenient_f64")]
    pub total: f64,
    #[serde(default, rename = "valor_pago", deserialize_with = "lenient_f64")]
    pub paid: f64,
    #[serde(default, rename = "itens")]
    pub items: Vec<DebtItem>,
}

impl Debt {
    /// Amount still owed, never negative even if the server's figures disagree
    pub fn remaining(&self) -> f64 {
        (self.total - self.paid).max(0.0)
    }

    pub fn title(&self) -> String {
        match self.local_id {
            Some(n) => format!("Debt #{n}"),
            None => "Debt".to_string(),
        }
    }
}

/// The debts endpoint answers with either a bare array or `{items: [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DebtList {
    Bare(Vec<Debt>),
    Wrapped {
        #[serde(default)]
        items: Vec<Debt>,
    },
}

impl DebtList {
    pub fn into_vec(self) -> Vec<Debt> {
        match self {
            DebtList::Bare(items) | DebtList::Wrapped { items } => items,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "dinheiro")]
    #[value(name = "cash")]
    Cash,
    #[serde(rename = "mpesa")]
    #[value(name = "mpesa")]
    Mpesa,
    #[serde(rename = "emola")]
    #[value(name = "emola")]
    Emola,
    #[serde(rename = "transferencia")]
    #[value(name = "transfer")]
    Transfer,
    #[serde(rename = "pos")]
    #[value(name = "pos")]
    Pos,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Mpesa => "M-Pesa",
            PaymentMethod::Emola => "e-Mola",
            PaymentMethod::Transfer => "Transfer",
            PaymentMethod::Pos => "POS",
        };
        f.write_str(label)
    }
}

/// Body of a debt payment request
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DebtPayment {
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "forma_pagamento")]
    pub method: PaymentMethod,
    #[serde(rename = "usuario_id")]
    pub user_id: Option<String>,
}
