//! Stock replenishment history: server-side filters, pagination and a
//! product autocomplete feeding the product filter.

use log::{debug, info};
use std::time::{Duration, Instant};

use crate::api::{BackofficeApi, Product, SupplyPage, SupplyRecord};
use crate::config::LookupSettings;
use crate::error::Result;
use crate::export::{printable_html, to_csv, DisplayContext};
use crate::sync::{Autocomplete, FilterCriteria, Outcome, PageKeys, RemoteState};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const PAGE_SIZES: [u32; 3] = [10, 20, 50];

const KEYS: PageKeys = PageKeys {
    page: "pagina",
    page_size: "limite",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyFilter {
    DateFrom,
    DateTo,
    User,
    Product,
    Order,
}

impl SupplyFilter {
    fn key(self) -> &'static str {
        match self {
            SupplyFilter::DateFrom => "data_inicial",
            SupplyFilter::DateTo => "data_final",
            SupplyFilter::User => "usuario_id",
            SupplyFilter::Product => "produto_id",
            SupplyFilter::Order => "ordenacao",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "created_at_desc",
            SortOrder::Oldest => "created_at_asc",
        }
    }
}

pub struct SupplyHistoryPage<'a, A: BackofficeApi + ?Sized> {
    api: &'a A,
    filters: FilterCriteria,
    list: RemoteState<SupplyPage>,
    loaded_revision: Option<u64>,
    product_text: String,
    products: Autocomplete<Product>,
}

impl<'a, A: BackofficeApi + ?Sized> SupplyHistoryPage<'a, A> {
    pub fn new(api: &'a A, lookup: &LookupSettings) -> Self {
        Self {
            api,
            filters: FilterCriteria::new(KEYS, DEFAULT_PAGE_SIZE)
                .with_default(SupplyFilter::Order.key(), SortOrder::Newest.as_str()),
            list: RemoteState::new(),
            loaded_revision: None,
            product_text: String::new(),
            products: Autocomplete::new(
                Duration::from_millis(lookup.debounce_ms),
                lookup.max_suggestions,
            ),
        }
    }

    /// Fetch the current page with the current filters
    pub fn load(&mut self) -> Outcome {
        let params = self.filters.params().clone();
        let revision = self.filters.revision();
        let api = self.api;
        let outcome = self.list.run(|| api.list_supply_history(&params));
        self.loaded_revision = Some(revision);
        info!(
            "supply history page {}: {} records ({:?})",
            self.filters.page(),
            self.items().len(),
            outcome
        );
        outcome
    }

    /// Reload only when the filters moved since the last load
    pub fn refresh_if_changed(&mut self) -> Option<Outcome> {
        if self.loaded_revision == Some(self.filters.revision()) {
            return None;
        }
        Some(self.load())
    }

    pub fn set_filter(&mut self, filter: SupplyFilter, value: Option<&str>) -> bool {
        self.filters.set(filter.key(), value)
    }

    pub fn set_order(&mut self, order: SortOrder) -> bool {
        self.filters.set(SupplyFilter::Order.key(), Some(order.as_str()))
    }

    pub fn filter(&self, filter: SupplyFilter) -> Option<&str> {
        self.filters.get(filter.key())
    }

    /// Reset dates, user and product; the sort order stays
    pub fn clear_filters(&mut self) -> bool {
        let order = self.filters.get(SupplyFilter::Order.key()).map(str::to_string);
        let mut changed = self.filters.clear();
        if let Some(order) = order {
            changed |= self.filters.set(SupplyFilter::Order.key(), Some(&order));
        }
        self.product_text.clear();
        self.products.clear();
        changed
    }

    pub fn set_page_size(&mut self, size: u32) -> bool {
        self.filters.set_page_size(size)
    }

    pub fn page(&self) -> u32 {
        self.filters.page()
    }

    pub fn page_size(&self) -> u32 {
        self.filters.page_size()
    }

    pub fn can_next(&self) -> bool {
        self.list.data().has_next && !self.list.is_loading()
    }

    pub fn can_prev(&self) -> bool {
        self.filters.page() > 1 && !self.list.is_loading()
    }

    pub fn next_page(&mut self) -> bool {
        let has_next = self.can_next();
        self.filters.next_page(has_next)
    }

    pub fn prev_page(&mut self) -> bool {
        if self.list.is_loading() {
            return false;
        }
        self.filters.prev_page()
    }

    pub fn set_page(&mut self, page: u32) -> bool {
        self.filters.set_page(page)
    }

    pub fn items(&self) -> &[SupplyRecord] {
        &self.list.data().items
    }

    pub fn error(&self) -> Option<&str> {
        self.list.error()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    /// Keystroke in the product field
    pub fn product_input(&mut self, text: &str, now: Instant) {
        self.product_text = text.to_string();
        self.products.on_input(text, now);
    }

    pub fn product_text(&self) -> &str {
        &self.product_text
    }

    pub fn lookup_deadline(&self) -> Option<Instant> {
        self.products.deadline()
    }

    /// Run the product search if typing has settled. Returns true when new
    /// suggestions were stored.
    pub fn poll_lookup(&mut self, now: Instant) -> bool {
        let Some(request) = self.products.poll(now) else {
            return false;
        };
        debug!("searching products for '{}'", request.query);
        let result = self.api.search_products(&request.query);
        self.products.apply(request.generation, result)
    }

    pub fn suggestions(&self) -> &[Product] {
        self.products.suggestions()
    }

    /// Pick a suggestion: it becomes the product filter
    pub fn select_product(&mut self, product: &Product) -> bool {
        self.product_text = product.label();
        self.products.clear();
        self.filters
            .set(SupplyFilter::Product.key(), Some(product.id.as_str()))
    }

    pub fn clear_product(&mut self) -> bool {
        self.product_text.clear();
        self.products.clear();
        self.filters.set(SupplyFilter::Product.key(), None)
    }

    /// The page is going away; late lookup results are ignored
    pub fn unmount(&mut self) {
        self.products.teardown();
    }

    pub fn export_csv(&self, ctx: &DisplayContext) -> Result<String> {
        to_csv(self.items(), ctx)
    }

    pub fn export_html(&self, ctx: &DisplayContext) -> String {
        let subtitle = format!("Page {} · {} records", self.page(), self.items().len());
        printable_html("Supply history", Some(&subtitle), self.items(), ctx)
    }
}
