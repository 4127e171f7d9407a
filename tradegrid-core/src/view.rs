//! The list pipeline: filter → sort → paginate.
//!
//! [`build_view`] is a pure function of its inputs. [`MemoizedView`] wraps it
//! with a single-entry cache whose key is a BLAKE3 hash over every input the
//! pipeline reads, so a change to any of them recomputes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::filter::FilterSet;
use crate::paginate::{ItemRange, PageItem, PaginationError, Paginator, DEFAULT_MAX_VISIBLE_PAGES, DEFAULT_PAGE_SIZE};
use crate::sort::{sort_rows, SortRegistry, SortSpec};

/// Everything a screen controls about its list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewQuery {
    pub filters: FilterSet,
    pub sort: Option<SortSpec>,
    pub page: usize,
    pub items_per_page: usize,
    pub max_visible_pages: usize,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            filters: FilterSet::default(),
            sort: None,
            page: 1,
            items_per_page: DEFAULT_PAGE_SIZE,
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
        }
    }
}

/// One rendered page plus the pagination strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewPage {
    pub rows: Vec<Value>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub visible_pages: Vec<PageItem>,
    pub range: Option<ItemRange>,
    pub should_render: bool,
}

/// The full filtered and sorted set, as handed to the exporters.
pub fn prepare(
    rows: &[Value],
    filters: &FilterSet,
    sort: Option<&SortSpec>,
    registry: &SortRegistry,
) -> Vec<Value> {
    let mut out = filters.apply(rows);
    if let Some(spec) = sort {
        sort_rows(&mut out, spec, registry);
    }
    out
}

pub fn build_view(
    rows: &[Value],
    query: &ViewQuery,
    registry: &SortRegistry,
) -> Result<ViewPage, PaginationError> {
    let prepared = prepare(rows, &query.filters, query.sort.as_ref(), registry);
    let paginator = Paginator::new(prepared.len(), query.items_per_page)?
        .with_max_visible_pages(query.max_visible_pages)?
        .with_current_page(query.page);

    Ok(ViewPage {
        rows: paginator.slice(&prepared).to_vec(),
        current_page: paginator.current_page(),
        total_pages: paginator.total_pages(),
        total_items: paginator.total_items(),
        visible_pages: paginator.visible_pages(),
        range: paginator.range(),
        should_render: paginator.should_render(),
    })
}

// ─── Memoization ────────────────────────────────────────────────────

/// Content hash of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewKey(pub String);

impl ViewKey {
    pub fn compute(rows: &[Value], query: &ViewQuery, registry: &SortRegistry) -> Self {
        // serde_json maps are key-sorted, so this serialization is canonical.
        let canonical = json!({
            "rows": rows,
            "query": query,
            "registry": registry,
        });
        Self(blake3::hash(canonical.to_string().as_bytes()).to_hex().to_string())
    }
}

#[derive(Debug, Default)]
pub struct MemoizedView {
    last: Option<(ViewKey, ViewPage)>,
    hits: u64,
    misses: u64,
}

impl MemoizedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        rows: &[Value],
        query: &ViewQuery,
        registry: &SortRegistry,
    ) -> Result<ViewPage, PaginationError> {
        let key = ViewKey::compute(rows, query, registry);
        if let Some((cached_key, page)) = &self.last {
            if *cached_key == key {
                self.hits += 1;
                return Ok(page.clone());
            }
        }
        let page = build_view(rows, query, registry)?;
        self.misses += 1;
        self.last = Some((key, page.clone()));
        Ok(page)
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
