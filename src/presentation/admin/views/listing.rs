use askama::Template;

use crate::application::{
    controller::{ListView, RowView},
    pagination::PageSlot,
    sort::{SortField, SortState},
    summary::SummaryCard,
};

#[derive(Clone)]
pub struct AdminColumnView {
    pub field: &'static str,
    pub label: &'static str,
    pub indicator: &'static str,
    pub is_active: bool,
}

impl AdminColumnView {
    fn new(field: SortField, sort: SortState) -> Self {
        Self {
            field: field.as_param(),
            label: column_label(field),
            indicator: sort.indicator(field),
            is_active: sort.field == field,
        }
    }
}

fn column_label(field: SortField) -> &'static str {
    match field {
        SortField::Title => "Tiêu đề",
        SortField::Author => "Tác giả",
        SortField::Category => "Danh mục",
        SortField::Status => "Trạng thái",
        SortField::Price => "Giá",
        SortField::Views => "Lượt xem",
        SortField::Downloads => "Lượt tải",
        SortField::Rating => "Đánh giá",
        SortField::CreatedAt => "Ngày tạo",
    }
}

/// One entry of the page-number strip. Gaps carry no page.
#[derive(Clone)]
pub struct AdminPageLinkView {
    pub label: String,
    pub page: Option<usize>,
    pub is_current: bool,
}

impl From<PageSlot> for AdminPageLinkView {
    fn from(slot: PageSlot) -> Self {
        match slot {
            PageSlot::Page { number, current } => Self {
                label: number.to_string(),
                page: Some(number),
                is_current: current,
            },
            PageSlot::Gap => Self {
                label: "…".to_string(),
                page: None,
                is_current: false,
            },
        }
    }
}

#[derive(Clone)]
pub struct AdminPagerView {
    pub showing_from: usize,
    pub showing_to: usize,
    pub total: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub first_enabled: bool,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub last_enabled: bool,
    pub prev_page: usize,
    pub next_page: usize,
    pub links: Vec<AdminPageLinkView>,
}

impl AdminPagerView {
    pub fn from_view(view: &ListView) -> Self {
        Self {
            showing_from: view.showing.from,
            showing_to: view.showing.to,
            total: view.showing.total,
            current_page: view.current_page,
            total_pages: view.total_pages,
            page_size: view.page_size,
            first_enabled: view.controls.first,
            prev_enabled: view.controls.prev,
            next_enabled: view.controls.next,
            last_enabled: view.controls.last,
            prev_page: view.current_page.saturating_sub(1).max(1),
            next_page: (view.current_page + 1).min(view.total_pages),
            links: view.window.iter().copied().map(AdminPageLinkView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "admin/pagination.html")]
pub struct AdminPaginationTemplate {
    pub pager: AdminPagerView,
}

#[derive(Template)]
#[template(path = "admin/listing.html")]
pub struct AdminListingTemplate {
    pub columns: Vec<AdminColumnView>,
    pub rows: Vec<RowView>,
    pub header_checked: bool,
    pub header_indeterminate: bool,
    pub selected_count: usize,
    pub bulk_enabled: bool,
    pub summary_cards: Vec<SummaryCard>,
    pub pager: AdminPagerView,
}

impl AdminListingTemplate {
    pub fn from_view(view: &ListView) -> Self {
        Self {
            columns: SortField::ALL
                .into_iter()
                .map(|field| AdminColumnView::new(field, view.sort))
                .collect(),
            rows: view.rows.clone(),
            header_checked: view.header.is_checked(),
            header_indeterminate: view.header.is_indeterminate(),
            selected_count: view.selected_count,
            bulk_enabled: view.bulk_enabled,
            summary_cards: view.summary.cards(),
            pager: AdminPagerView::from_view(view),
        }
    }
}
