//! User-editable filter criteria and the query parameters derived from them.

use std::cell::OnceCell;
use std::collections::BTreeMap;

/// Ordered key/value pairs sent as the query string of a list request.
///
/// Absent filters are simply not present; there is never an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair, skipping blank values
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.0.push((key.to_string(), trimmed.to_string()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Wire names used for pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageKeys {
    pub page: &'static str,
    pub page_size: &'static str,
}

/// Holds the current filter values plus page/page-size.
///
/// Every effective change bumps `revision`, which controllers compare with the
/// revision they last loaded to decide whether a refetch is due. Changing a
/// filter or the page size sends the page back to 1.
#[derive(Debug)]
pub struct FilterCriteria {
    values: BTreeMap<&'static str, String>,
    defaults: BTreeMap<&'static str, String>,
    keys: PageKeys,
    page: u32,
    page_size: u32,
    default_page_size: u32,
    revision: u64,
    params: OnceCell<QueryParams>,
}

impl FilterCriteria {
    pub fn new(keys: PageKeys, default_page_size: u32) -> Self {
        Self {
            values: BTreeMap::new(),
            defaults: BTreeMap::new(),
            keys,
            page: 1,
            page_size: default_page_size.max(1),
            default_page_size: default_page_size.max(1),
            revision: 0,
            params: OnceCell::new(),
        }
    }

    /// Register a value that survives `clear()` (e.g. sort order)
    pub fn with_default(mut self, key: &'static str, value: &str) -> Self {
        self.defaults.insert(key, value.to_string());
        self.values.insert(key, value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Set or clear a filter. Blank values remove the key.
    ///
    /// Returns true when the effective criteria changed.
    pub fn set(&mut self, key: &'static str, value: Option<&str>) -> bool {
        let normalized = value.map(str::trim).filter(|v| !v.is_empty());
        let changed = match normalized {
            Some(v) => {
                if self.values.get(key).map(String::as_str) == Some(v) {
                    false
                } else {
                    self.values.insert(key, v.to_string());
                    true
                }
            }
            None => self.values.remove(key).is_some(),
        };
        if changed {
            self.page = 1;
            self.touch();
        }
        changed
    }

    /// Drop every filter except registered defaults, back to page 1
    pub fn clear(&mut self) -> bool {
        let cleared: BTreeMap<_, _> = self.defaults.clone();
        let changed = cleared != self.values || self.page != 1;
        if changed {
            self.values = cleared;
            self.page = 1;
            self.touch();
        }
        changed
    }

    /// Page size 0 falls back to the default size
    pub fn set_page_size(&mut self, size: u32) -> bool {
        let size = if size == 0 { self.default_page_size } else { size };
        if size == self.page_size && self.page == 1 {
            return false;
        }
        self.page_size = size;
        self.page = 1;
        self.touch();
        true
    }

    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if page == self.page {
            return false;
        }
        self.page = page;
        self.touch();
        true
    }

    /// Advance one page, only if the server said there is more
    pub fn next_page(&mut self, has_next: bool) -> bool {
        if !has_next {
            return false;
        }
        self.set_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.set_page(self.page - 1)
    }

    /// Effective query parameters, rebuilt only after a change
    pub fn params(&self) -> &QueryParams {
        self.params.get_or_init(|| {
            let mut params = QueryParams::new();
            for (key, value) in &self.values {
                params.push(key, value.as_str());
            }
            params.push(self.keys.page, self.page.to_string());
            params.push(self.keys.page_size, self.page_size.to_string());
            params
        })
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.params = OnceCell::new();
    }
}
