//! Per-page list controller.
//!
//! One instance owns the records of a single page load together with the
//! filter, sort, pagination and selection state derived from them. Every
//! mutation recomputes the visible slice and hands back the URL the page
//! should now show.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    application::{
        bulk::{BulkAction, BulkError, BulkForm, BulkRequest, BulkTarget, CsrfToken},
        filter::{FilterKey, FilterState},
        pagination::{PageSlot, PagerControls, PaginationError, Paginator, Showing},
        query::{ListQuery, UrlUpdate},
        selection::{BulkGate, CheckState, SelectAllScope, SelectionPolicy, SelectionSet},
        sort::{SortField, SortState},
        summary::ListSummary,
    },
    domain::{entities::Record, types::RecordId},
    util::format::{format_compact, format_date, format_file_size, format_price},
};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_WINDOW_RADIUS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub page_size: usize,
    pub window_radius: usize,
    pub select_all_scope: SelectAllScope,
    pub selection_policy: SelectionPolicy,
    /// Endpoint the bulk button submits to, when the page has one.
    pub bulk_target: Option<BulkTarget>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            window_radius: DEFAULT_WINDOW_RADIUS,
            select_all_scope: SelectAllScope::Page,
            selection_policy: SelectionPolicy::Prune,
            bulk_target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub avatar: String,
    pub category: String,
    pub status_label: &'static str,
    pub badge_class: &'static str,
    pub file_type: String,
    pub size: String,
    pub price: String,
    pub views: String,
    pub downloads: String,
    pub rating: String,
    pub created: String,
    pub has_reports: bool,
    pub selected: bool,
}

impl RowView {
    fn from_record(record: &Record, selected: bool) -> Self {
        Self {
            id: record.id.to_string(),
            title: record.title.clone(),
            author: record.author.name.clone(),
            avatar: record.author.avatar.clone(),
            category: record.category.name.clone(),
            status_label: record.status_label(),
            badge_class: record
                .status
                .map_or("bg-secondary", |status| status.badge_class()),
            file_type: record.file_type.clone(),
            size: format_file_size(record.file_size_mb),
            price: format_price(record.price),
            views: format_compact(record.views),
            downloads: format_compact(record.downloads),
            rating: format!("{:.1}", record.rating),
            created: record.created_at.map(format_date).unwrap_or_default(),
            has_reports: record.has_reports,
            selected,
        }
    }
}

/// Snapshot of everything a list page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub rows: Vec<RowView>,
    pub showing: Showing,
    pub controls: PagerControls,
    pub window: Vec<PageSlot>,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub header: CheckState,
    pub selected_count: usize,
    pub bulk_enabled: bool,
    pub sort: SortState,
    pub summary: ListSummary,
}

#[derive(Debug, Clone)]
pub struct ListController {
    records: Vec<Record>,
    options: ListOptions,
    filters: FilterState,
    sort: SortState,
    paginator: Paginator,
    page_size_in_url: bool,
    selection: SelectionSet,
    bulk_action: Option<BulkAction>,
    /// Indices into `records` that pass the filters, in display order.
    filtered: Vec<usize>,
}

impl ListController {
    pub fn new(
        records: Vec<Record>,
        options: ListOptions,
        query: ListQuery,
    ) -> Result<Self, PaginationError> {
        let paginator = Paginator::new(query.page_size.unwrap_or(options.page_size))?;
        let mut controller = Self {
            records: dedupe(records),
            options,
            filters: query.filters,
            sort: query.sort,
            paginator,
            page_size_in_url: query.page_size.is_some(),
            selection: SelectionSet::new(),
            bulk_action: None,
            filtered: Vec::new(),
        };
        controller.recompute();
        controller.paginator.go_to(query.page);
        Ok(controller)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn bulk_action(&self) -> Option<BulkAction> {
        self.bulk_action
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    /// Every record passing the filters, sorted.
    pub fn filtered(&self) -> Vec<&Record> {
        self.filtered
            .iter()
            .map(|&index| &self.records[index])
            .collect()
    }

    /// Records on the current page.
    pub fn visible(&self) -> Vec<&Record> {
        self.filtered[self.paginator.slice_bounds()]
            .iter()
            .map(|&index| &self.records[index])
            .collect()
    }

    pub fn set_filter(&mut self, key: FilterKey, raw: &str) -> UrlUpdate {
        self.filters.set(key, raw);
        self.after_filter_change()
    }

    pub fn replace_filters(&mut self, filters: FilterState) -> UrlUpdate {
        self.filters = filters;
        self.after_filter_change()
    }

    pub fn clear_filters(&mut self) -> UrlUpdate {
        self.filters.clear();
        self.after_filter_change()
    }

    /// Header click on a sortable column. The current page is kept.
    pub fn sort_by(&mut self, field: SortField) -> UrlUpdate {
        self.sort.toggle(field);
        self.recompute();
        self.url_update()
    }

    pub fn go_to(&mut self, page: usize) -> UrlUpdate {
        self.paginator.go_to(page);
        self.url_update()
    }

    pub fn first_page(&mut self) -> UrlUpdate {
        self.paginator.first();
        self.url_update()
    }

    pub fn prev_page(&mut self) -> UrlUpdate {
        self.paginator.prev();
        self.url_update()
    }

    pub fn next_page(&mut self) -> UrlUpdate {
        self.paginator.next();
        self.url_update()
    }

    pub fn last_page(&mut self) -> UrlUpdate {
        self.paginator.last();
        self.url_update()
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<UrlUpdate, PaginationError> {
        self.paginator.set_page_size(page_size)?;
        self.page_size_in_url = true;
        Ok(self.url_update())
    }

    /// Row checkbox. Ids that are not part of this load are ignored.
    pub fn toggle(&mut self, id: &RecordId, checked: bool) -> bool {
        if !self.records.iter().any(|record| &record.id == id) {
            warn!(
                target = "docdesk::application::controller",
                record_id = %id,
                "ignoring selection of unknown record"
            );
            return false;
        }
        self.selection.toggle(id.clone(), checked);
        true
    }

    /// Header checkbox, scoped by `ListOptions::select_all_scope`.
    pub fn select_all(&mut self, checked: bool) {
        let relevant: Vec<RecordId> = self.relevant_ids().into_iter().cloned().collect();
        self.selection.select_all(&relevant, checked);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn header_check_state(&self) -> CheckState {
        self.selection.check_state(self.relevant_ids())
    }

    pub fn set_bulk_action(&mut self, action: Option<BulkAction>) {
        self.bulk_action = action;
    }

    pub fn bulk_enabled(&self) -> bool {
        let requires_action = self
            .options
            .bulk_target
            .is_some_and(BulkTarget::requires_action);
        BulkGate::new(requires_action).is_open(&self.selection, self.bulk_action.is_some())
    }

    /// Hidden form for the configured bulk endpoint.
    pub fn bulk_form(
        &self,
        target: BulkTarget,
        csrf: Option<&CsrfToken>,
        reason: Option<&str>,
    ) -> Result<BulkForm, BulkError> {
        let form = BulkRequest::new(target, &self.selection)
            .csrf(csrf)
            .action(self.bulk_action)
            .reason(reason)
            .build()?;
        debug!(
            target = "docdesk::application::controller",
            bulk_target = %target,
            ids = form.id_count(),
            "bulk form prepared"
        );
        Ok(form)
    }

    /// Swap in a fresh load. Selected ids that no longer exist are dropped.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.records = dedupe(records);
        let known: HashSet<RecordId> = self.records.iter().map(|record| record.id.clone()).collect();
        self.selection.retain(|id| known.contains(id));
        self.recompute();
    }

    /// Drop rows the server confirmed as deleted.
    pub fn remove_records(&mut self, ids: &[RecordId]) {
        let removed: HashSet<&RecordId> = ids.iter().collect();
        self.records.retain(|record| !removed.contains(&record.id));
        self.selection.retain(|id| !removed.contains(id));
        self.recompute();
    }

    pub fn query(&self) -> ListQuery {
        ListQuery {
            filters: self.filters.clone(),
            sort: self.sort,
            page: self.paginator.current_page(),
            page_size: self
                .page_size_in_url
                .then(|| self.paginator.page_size()),
        }
    }

    pub fn url_update(&self) -> UrlUpdate {
        UrlUpdate::replace(self.query().encode())
    }

    pub fn summary(&self) -> ListSummary {
        ListSummary::from_records(self.filtered())
    }

    pub fn view(&self) -> ListView {
        let rows = self
            .visible()
            .into_iter()
            .map(|record| RowView::from_record(record, self.selection.contains(&record.id)))
            .collect();

        ListView {
            rows,
            showing: self.paginator.showing(),
            controls: self.paginator.controls(),
            window: self.paginator.window(self.options.window_radius),
            current_page: self.paginator.current_page(),
            total_pages: self.paginator.total_pages(),
            page_size: self.paginator.page_size(),
            header: self.header_check_state(),
            selected_count: self.selection.len(),
            bulk_enabled: self.bulk_enabled(),
            sort: self.sort,
            summary: self.summary(),
        }
    }

    fn after_filter_change(&mut self) -> UrlUpdate {
        self.recompute();
        self.paginator.first();
        if self.options.selection_policy == SelectionPolicy::Prune {
            let passing: HashSet<&RecordId> = self
                .filtered
                .iter()
                .map(|&index| &self.records[index].id)
                .collect();
            self.selection.retain(|id| passing.contains(id));
        }
        self.url_update()
    }

    fn recompute(&mut self) {
        let mut filtered = self.filters.apply_indices(&self.records);
        self.sort.sort_indices(&self.records, &mut filtered);
        self.filtered = filtered;
        self.paginator.set_total(self.filtered.len());
    }

    fn relevant_ids(&self) -> Vec<&RecordId> {
        let indices = match self.options.select_all_scope {
            SelectAllScope::Page => &self.filtered[self.paginator.slice_bounds()],
            SelectAllScope::Filtered => &self.filtered[..],
        };
        indices.iter().map(|&index| &self.records[index].id).collect()
    }
}

fn dedupe(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert(record.id.clone());
            if !fresh {
                warn!(
                    target = "docdesk::application::controller",
                    record_id = %record.id,
                    "dropping duplicate record id"
                );
            }
            fresh
        })
        .collect()
}
