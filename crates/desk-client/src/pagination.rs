//! Paged list queries and infinite-scroll accumulation.
//!
//! List endpoints accept `page` / `per_page` and report totals in the
//! `X-WP-Total` and `X-WP-TotalPages` headers. Some custom endpoints wrap
//! the list instead (`{"items": [...], "total": 40, "total_pages": 2}`);
//! both shapes decode into [`Page`].

use std::future::Future;

use serde::Deserialize;

use crate::error::DeskApiError;

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page size the backend accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Parameters for a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            search: None,
            filters: Vec::new(),
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-based page number; 0 is treated as 1.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Clamped to `1..=MAX_PER_PAGE`.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.trim().is_empty()).then_some(term);
        self
    }

    /// Add a filter such as `status=pending` or `client_id=12`.
    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((key.into(), value.to_string()));
        self
    }

    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        let mut filters = self.filters.clone();
        filters.sort();
        pairs.extend(filters);
        pairs
    }

    /// Cache-key segments identifying this query (page excluded).
    pub fn key_segments(&self) -> Vec<String> {
        self.to_pairs()
            .into_iter()
            .filter(|(k, _)| k != "page")
            .map(|(k, v)| format!("{k}={v}"))
            .collect()
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: Option<u64>,
    pub total_pages: Option<u32>,
}

impl<T> Page<T> {
    /// Whether another page exists after this one.
    ///
    /// Without server totals a full page is taken to mean "maybe more".
    pub fn has_next(&self) -> bool {
        match self.total_pages {
            Some(total_pages) => self.page < total_pages,
            None => self.items.len() as u32 >= self.per_page && !self.items.is_empty(),
        }
    }
}

/// Wire shape of a list response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "data", alias = "results")]
        items: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default, alias = "totalPages", alias = "pages")]
        total_pages: Option<u32>,
    },
}

impl<T> ListBody<T> {
    pub(crate) fn into_page(
        self,
        page: u32,
        per_page: u32,
        header_total: Option<u64>,
        header_pages: Option<u32>,
    ) -> Page<T> {
        let (items, body_total, body_pages) = match self {
            ListBody::Bare(items) => (items, None, None),
            ListBody::Wrapped {
                items,
                total,
                total_pages,
            } => (items, total, total_pages),
        };
        let total = header_total.or(body_total);
        let total_pages = header_pages.or(body_pages).or_else(|| {
            total.map(|t| t.div_ceil(u64::from(per_page.max(1))) as u32)
        });
        Page {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Accumulates pages as the user scrolls.
#[derive(Debug, Clone)]
pub struct InfiniteList<T> {
    items: Vec<T>,
    next_page: u32,
    per_page: u32,
    total: Option<u64>,
    exhausted: bool,
}

impl<T> InfiniteList<T> {
    pub fn new(per_page: u32) -> Self {
        Self {
            items: Vec::new(),
            next_page: 1,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            total: None,
            exhausted: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Server-reported total, once known.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    /// Drop everything and start again from page 1.
    pub fn reset(&mut self) {
        self.items.clear();
        self.next_page = 1;
        self.total = None;
        self.exhausted = false;
    }

    /// Fetch the next page and append it. Returns how many items were added.
    ///
    /// `fetch` receives `(page, per_page)`. Once the last page is loaded further
    /// calls return `Ok(0)` without fetching. A failed fetch leaves the list
    /// unchanged so the same page can be retried.
    pub async fn load_next<F, Fut>(&mut self, fetch: F) -> Result<usize, DeskApiError>
    where
        F: FnOnce(u32, u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, DeskApiError>>,
    {
        if self.exhausted {
            return Ok(0);
        }
        let page = fetch(self.next_page, self.per_page).await?;
        let added = page.items.len();
        self.exhausted = !page.has_next() || added == 0;
        if page.total.is_some() {
            self.total = page.total;
        }
        self.items.extend(page.items);
        self.next_page += 1;
        Ok(added)
    }
}
