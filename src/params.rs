//! Pagination and tab state stored in the URL query string.
//!
//! The query string is the source of truth. [`ParamState`] mirrors it into a
//! [`PaginationParams`] value on every navigation and writes updates back by
//! replacing the current history entry, so nothing reloads.

use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

use crate::tabs::Tab;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_ROWS: u32 = 100;

pub const PAGE_KEY: &str = "page";
pub const ROWS_KEY: &str = "rows";
pub const ORDER_KEY: &str = "order";
pub const START_KEY: &str = "start";
pub const END_KEY: &str = "end";
pub const CURRENT_TAB_KEY: &str = "currentTab";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn toggled(self) -> Order {
        match self {
            Order::Asc => Order::Desc,
            Order::Desc => Order::Asc,
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Order::Desc
    }
}

impl FromStr for Order {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            _ => Err(anyhow::anyhow!("Invalid order '{s}'. Valid options: asc, desc")),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Asc => write!(f, "asc"),
            Order::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub rows: u32,
    pub order: Order,
    pub start: Option<u32>,
    pub end: Option<u32>,
    pub current_tab: Option<Tab>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            rows: DEFAULT_ROWS,
            order: Order::Desc,
            start: None,
            end: None,
            current_tab: None,
        }
    }
}

/// Ordered key/value pairs of a query string. Lookups return the last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first occurrence of `key` in place, dropping duplicates.
    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(idx) => {
                self.pairs[idx].1 = value;
                let mut seen = 0usize;
                self.pairs.retain(|(k, _)| {
                    if k == key {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    fn positive_or(&self, key: &str, default: u32) -> u32 {
        self.get(key)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(default)
    }

    fn optional_u32(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }
}

/// Split `path?query#fragment` into its three parts (without delimiters).
pub fn split_url(url: &str) -> (&str, &str, &str) {
    let (rest, fragment) = url.split_once('#').unwrap_or((url, ""));
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
    (path, query, fragment)
}

pub fn join_url(path: &str, query: &str, fragment: &str) -> String {
    let mut url = path.to_string();
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }
    if !fragment.is_empty() {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

/// History entries the parameter state reads from and writes to.
pub trait UrlState {
    fn current(&self) -> String;
    /// Replace the current entry without navigating.
    fn replace(&mut self, url: &str);
    /// Navigate to a new entry.
    fn push(&mut self, url: &str);
    /// Step back one entry; `false` when there is nothing to go back to.
    fn back(&mut self) -> bool {
        false
    }
}

/// In-process history used by the terminal app and tests.
#[derive(Clone, Debug)]
pub struct MemoryHistory {
    entries: Vec<String>,
}

impl MemoryHistory {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            entries: vec![url.into()],
        }
    }

    /// Step back one entry. The first entry is never popped.
    pub fn back(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl UrlState for MemoryHistory {
    fn current(&self) -> String {
        self.entries.last().cloned().unwrap_or_else(|| "/".into())
    }

    fn replace(&mut self, url: &str) {
        match self.entries.last_mut() {
            Some(last) => *last = url.to_string(),
            None => self.entries.push(url.to_string()),
        }
    }

    fn push(&mut self, url: &str) {
        self.entries.push(url.to_string());
    }

    fn back(&mut self) -> bool {
        MemoryHistory::back(self)
    }
}

pub fn read_params(query: &QueryParams) -> PaginationParams {
    PaginationParams {
        page: query.positive_or(PAGE_KEY, DEFAULT_PAGE),
        rows: query.positive_or(ROWS_KEY, DEFAULT_ROWS),
        order: query
            .get(ORDER_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default(),
        start: query.optional_u32(START_KEY),
        end: query.optional_u32(END_KEY),
        current_tab: query.get(CURRENT_TAB_KEY).and_then(|v| v.parse().ok()),
    }
}

fn write_params(query: &mut QueryParams, params: &PaginationParams) {
    query.set(PAGE_KEY, params.page);
    query.set(ROWS_KEY, params.rows);
    query.set(ORDER_KEY, params.order);
    match params.start {
        Some(start) => query.set(START_KEY, start),
        None => query.remove(START_KEY),
    }
    match params.end {
        Some(end) => query.set(END_KEY, end),
        None => query.remove(END_KEY),
    }
    match params.current_tab {
        Some(tab) => query.set(CURRENT_TAB_KEY, tab),
        None => query.remove(CURRENT_TAB_KEY),
    }
}

pub struct ParamState<S: UrlState> {
    history: S,
    params: PaginationParams,
    default_rows: u32,
}

impl<S: UrlState> ParamState<S> {
    pub fn new(history: S) -> Self {
        Self::with_default_rows(history, DEFAULT_ROWS)
    }

    /// Like [`ParamState::new`], with a different rows-per-page fallback for
    /// URLs that do not carry one.
    pub fn with_default_rows(history: S, default_rows: u32) -> Self {
        let mut state = Self {
            history,
            params: PaginationParams::default(),
            default_rows: default_rows.max(1),
        };
        state.sync();
        state
    }

    /// Re-read the in-memory mirror from the current URL.
    pub fn sync(&mut self) {
        let query = self.query();
        self.params = read_params(&query);
        self.params.rows = query.positive_or(ROWS_KEY, self.default_rows);
    }

    pub fn default_rows(&self) -> u32 {
        self.default_rows
    }

    pub fn params(&self) -> &PaginationParams {
        &self.params
    }

    pub fn url(&self) -> String {
        self.history.current()
    }

    pub fn path(&self) -> String {
        let url = self.history.current();
        split_url(&url).0.to_string()
    }

    pub fn query(&self) -> QueryParams {
        let url = self.history.current();
        QueryParams::parse(split_url(&url).1)
    }

    pub fn history(&self) -> &S {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut S {
        &mut self.history
    }

    fn write_query(&mut self, query: &QueryParams) {
        let url = self.history.current();
        let (path, _, fragment) = split_url(&url);
        let next = join_url(path, &query.encode(), fragment);
        log::debug!("[ecashx][params] replace {url} -> {next}");
        self.history.replace(&next);
        self.sync();
    }

    /// Mutate the pagination parameters and write them back to the URL.
    /// Query keys the manager does not own are preserved.
    pub fn update(&mut self, f: impl FnOnce(&mut PaginationParams)) {
        let mut params = self.params.clone();
        f(&mut params);
        let mut query = self.query();
        write_params(&mut query, &params);
        self.write_query(&query);
    }

    pub fn navigate(&mut self, url: &str) {
        self.history.push(url);
        self.sync();
    }

    pub fn current_tab(&self) -> Tab {
        self.params.current_tab.unwrap_or_default()
    }

    pub fn set_current_tab(&mut self, tab: Tab) {
        let mut query = self.query();
        query.set(CURRENT_TAB_KEY, tab);
        self.write_query(&query);
    }

    pub fn tab_page(&self, tab: Tab) -> u32 {
        self.query().positive_or(tab.page_key(), DEFAULT_PAGE)
    }

    pub fn tab_rows(&self, tab: Tab) -> u32 {
        self.query().positive_or(tab.rows_key(), self.default_rows)
    }

    pub fn set_tab_page(&mut self, tab: Tab, page: u32) {
        let mut query = self.query();
        query.set(tab.page_key(), page.max(1));
        self.write_query(&query);
    }

    pub fn set_tab_rows(&mut self, tab: Tab, rows: u32) {
        let mut query = self.query();
        query.set(tab.rows_key(), rows.max(1));
        // rows change invalidates the page position
        query.set(tab.page_key(), DEFAULT_PAGE);
        self.write_query(&query);
    }
}
