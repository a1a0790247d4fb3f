use super::{Cell, DisplayContext, Tabular};
use crate::api::{Debt, Expense, SupplyRecord};
use crate::format::{format_amount, format_money, format_quantity, format_timestamp};

impl Tabular for SupplyRecord {
    fn headers() -> &'static [&'static str] {
        &[
            "Date",
            "Product",
            "Code",
            "Quantity",
            "Unit Cost",
            "Total Cost",
            "User",
            "Note",
        ]
    }

    fn cells(&self, ctx: &DisplayContext) -> Vec<Cell> {
        vec![
            Cell::text(
                self.created_at
                    .as_deref()
                    .map(|ts| format_timestamp(ts, ctx.offset))
                    .unwrap_or_default(),
            ),
            Cell::opt(self.product_name.as_deref()),
            Cell::opt(self.product_code.as_deref()),
            Cell::number(self.quantity, format_quantity(self.quantity)),
            Cell::number(self.unit_cost, format_amount(self.unit_cost)),
            Cell::number(self.total_cost, format_amount(self.total_cost)),
            Cell::opt(self.user_name.as_deref()),
            Cell::opt(self.note.as_deref()),
        ]
    }
}

impl Tabular for Expense {
    fn headers() -> &'static [&'static str] {
        &["Date", "Description", "Category", "Type", "Amount"]
    }

    fn cells(&self, ctx: &DisplayContext) -> Vec<Cell> {
        vec![
            Cell::opt(self.display_date()),
            Cell::opt(self.description.as_deref()),
            Cell::opt(self.category.as_deref()),
            Cell::opt(self.kind.as_deref()),
            Cell::number(self.amount, format_money(self.amount, &ctx.currency_symbol)),
        ]
    }
}

impl Tabular for Debt {
    fn headers() -> &'static [&'static str] {
        &[
            "Debt", "Client", "Seller", "Date", "Status", "Total", "Paid", "Remaining", "Note",
        ]
    }

    fn cells(&self, ctx: &DisplayContext) -> Vec<Cell> {
        let remaining = self.remaining();
        vec![
            Cell::text(self.title()),
            Cell::opt(self.client_name.as_deref()),
            Cell::opt(self.seller_name.as_deref()),
            Cell::text(
                self.created_on
                    .as_deref()
                    .map(|ts| format_timestamp(ts, ctx.offset))
                    .unwrap_or_default(),
            ),
            Cell::opt(self.status.as_deref()),
            Cell::number(self.total, format_money(self.total, &ctx.currency_symbol)),
            Cell::number(self.paid, format_money(self.paid, &ctx.currency_symbol)),
            Cell::number(remaining, format_money(remaining, &ctx.currency_symbol)),
            Cell::opt(self.note.as_deref()),
        ]
    }
}
