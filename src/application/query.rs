//! Mirror of the list state in the page URL.
//!
//! The `page` parameter is 0-based because the server-side pageable expects
//! it that way; everything else in this crate counts pages from 1.

use tracing::warn;
use url::form_urlencoded;

use crate::application::{
    filter::{FilterKey, FilterState},
    sort::{SortDirection, SortField, SortState},
};

pub const PAGE_PARAM: &str = "page";
pub const SIZE_PARAM: &str = "size";
pub const SORT_PARAM: &str = "sort";
pub const DIR_PARAM: &str = "dir";

/// How a URL change should be recorded in browser history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Filter, sort and page changes: the back button leaves the list.
    Replace,
    /// A real navigation to another page.
    Push,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlUpdate {
    pub query: String,
    pub mode: HistoryMode,
}

impl UrlUpdate {
    pub fn replace(query: String) -> Self {
        Self {
            query,
            mode: HistoryMode::Replace,
        }
    }

    pub fn navigate(href: impl Into<String>) -> Self {
        Self {
            query: href.into(),
            mode: HistoryMode::Push,
        }
    }

    /// Target of the history entry: a full href for navigations, otherwise
    /// `path` with the query appended.
    pub fn href(&self, path: &str) -> String {
        match self.mode {
            HistoryMode::Push => self.query.clone(),
            HistoryMode::Replace if self.query.is_empty() => path.to_string(),
            HistoryMode::Replace => format!("{path}?{}", self.query),
        }
    }
}

/// List state decoded from, or encoded into, a query string.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filters: FilterState,
    pub sort: SortState,
    /// 1-based.
    pub page: usize,
    pub page_size: Option<usize>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            sort: SortState::default(),
            page: 1,
            page_size: None,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a query string, with or without the leading `?`.
    ///
    /// Unknown parameters are ignored and malformed values are dropped with a
    /// warning.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let filters = FilterState::from_pairs(
            pairs
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );

        let mut parsed = Self {
            filters,
            ..Self::new()
        };

        for (key, value) in &pairs {
            match key.as_str() {
                PAGE_PARAM => match value.trim().parse::<usize>() {
                    Ok(zero_based) => parsed.page = zero_based.saturating_add(1),
                    Err(_) => warn_param(key, value),
                },
                SIZE_PARAM => match value.trim().parse::<usize>() {
                    Ok(size) if size > 0 => parsed.page_size = Some(size),
                    _ => warn_param(key, value),
                },
                SORT_PARAM | "sortBy" => match SortField::parse(value) {
                    Some(field) => parsed.sort.field = field,
                    None => warn_param(key, value),
                },
                DIR_PARAM | "sortDir" => match SortDirection::parse(value) {
                    Some(direction) => parsed.sort.direction = direction,
                    None => warn_param(key, value),
                },
                _ => {}
            }
        }

        parsed
    }

    /// Encode the state, omitting values that match the defaults.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.filters.active() {
            serializer.append_pair(key.param(), &value);
        }
        if self.sort != SortState::default() {
            serializer.append_pair(SORT_PARAM, self.sort.field.as_param());
            serializer.append_pair(DIR_PARAM, self.sort.direction.as_param());
        }
        if self.page > 1 {
            serializer.append_pair(PAGE_PARAM, &(self.page - 1).to_string());
        }
        if let Some(size) = self.page_size {
            serializer.append_pair(SIZE_PARAM, &size.to_string());
        }
        serializer.finish()
    }

    /// Query for the server-side pageable: always carries `page` and `size`.
    pub fn server_pairs(&self, default_size: usize) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .filters
            .active()
            .into_iter()
            .map(|(key, value)| (key.param(), value))
            .collect();
        pairs.push((PAGE_PARAM, self.page.saturating_sub(1).to_string()));
        pairs.push((SIZE_PARAM, self.page_size.unwrap_or(default_size).to_string()));
        pairs.push(("sortBy", self.sort.field.as_param().to_string()));
        pairs.push(("sortDir", self.sort.direction.as_param().to_string()));
        pairs
    }

    pub fn filter(&self, key: FilterKey) -> Option<String> {
        self.filters.get(key)
    }
}

fn warn_param(key: &str, value: &str) {
    warn!(
        target = "docdesk::application::query",
        key, value, "ignoring malformed query parameter"
    );
}
