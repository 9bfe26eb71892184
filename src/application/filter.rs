//! Client-side filtering over a loaded listing.
//!
//! Every predicate is optional and they combine with AND. Values arrive as
//! raw query-string text; anything that cannot be understood is dropped with
//! a warning and leaves that key unconstrained.

use std::fmt;

use time::{Date, UtcOffset};
use tracing::warn;

use crate::domain::{
    entities::{Record, parse_date},
    types::RecordStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    Search,
    Status,
    Category,
    FileType,
    Price,
    Author,
    Tags,
    DateFrom,
    DateTo,
    Size,
    Views,
    Rating,
    Violation,
}

impl FilterKey {
    pub const ALL: [FilterKey; 13] = [
        FilterKey::Search,
        FilterKey::Status,
        FilterKey::Category,
        FilterKey::FileType,
        FilterKey::Price,
        FilterKey::Author,
        FilterKey::Tags,
        FilterKey::DateFrom,
        FilterKey::DateTo,
        FilterKey::Size,
        FilterKey::Views,
        FilterKey::Rating,
        FilterKey::Violation,
    ];

    /// Query-string parameter the admin pages use for this key.
    pub fn param(self) -> &'static str {
        match self {
            FilterKey::Search => "keyword",
            FilterKey::Status => "status",
            FilterKey::Category => "category",
            FilterKey::FileType => "type",
            FilterKey::Price => "price",
            FilterKey::Author => "author",
            FilterKey::Tags => "tags",
            FilterKey::DateFrom => "dateFrom",
            FilterKey::DateTo => "dateTo",
            FilterKey::Size => "fileSize",
            FilterKey::Views => "views",
            FilterKey::Rating => "rating",
            FilterKey::Violation => "violation",
        }
    }

    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "search" | "q" => Some(FilterKey::Search),
            "fileType" => Some(FilterKey::FileType),
            other => FilterKey::ALL.into_iter().find(|key| key.param() == other),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBucket {
    Free,
    Paid,
}

impl PriceBucket {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "free" => Some(PriceBucket::Free),
            "paid" => Some(PriceBucket::Paid),
            _ => None,
        }
    }

    fn as_param(self) -> &'static str {
        match self {
            PriceBucket::Free => "free",
            PriceBucket::Paid => "paid",
        }
    }

    fn contains(self, price: f64) -> bool {
        match self {
            PriceBucket::Free => price == 0.0,
            PriceBucket::Paid => price > 0.0,
        }
    }
}

/// File size buckets in megabytes: `< 10`, `[10, 50)`, `>= 50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "small" => Some(SizeBucket::Small),
            "medium" => Some(SizeBucket::Medium),
            "large" => Some(SizeBucket::Large),
            _ => None,
        }
    }

    fn as_param(self) -> &'static str {
        match self {
            SizeBucket::Small => "small",
            SizeBucket::Medium => "medium",
            SizeBucket::Large => "large",
        }
    }

    fn contains(self, size_mb: f64) -> bool {
        match self {
            SizeBucket::Small => size_mb < 10.0,
            SizeBucket::Medium => (10.0..50.0).contains(&size_mb),
            SizeBucket::Large => size_mb >= 50.0,
        }
    }
}

/// View count buckets: `< 1000`, `[1000, 10000)`, `>= 10000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewsBucket {
    Low,
    Medium,
    High,
}

impl ViewsBucket {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "low" => Some(ViewsBucket::Low),
            "medium" => Some(ViewsBucket::Medium),
            "high" => Some(ViewsBucket::High),
            _ => None,
        }
    }

    fn as_param(self) -> &'static str {
        match self {
            ViewsBucket::Low => "low",
            ViewsBucket::Medium => "medium",
            ViewsBucket::High => "high",
        }
    }

    fn contains(self, views: u64) -> bool {
        match self {
            ViewsBucket::Low => views < 1_000,
            ViewsBucket::Medium => (1_000..10_000).contains(&views),
            ViewsBucket::High => views >= 10_000,
        }
    }
}

/// Active filter predicates. `None` means the key imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    search: Option<String>,
    status: Option<RecordStatus>,
    category: Option<String>,
    file_type: Option<String>,
    price: Option<PriceBucket>,
    author: Option<String>,
    tags: Option<String>,
    date_from: Option<Date>,
    date_to: Option<Date>,
    size: Option<SizeBucket>,
    views: Option<ViewsBucket>,
    rating: Option<f64>,
    violation: Option<bool>,
}

pub(crate) fn normalize_filter_value(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(param, value)` pairs, ignoring parameters that are not filters.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut state = Self::default();
        for (param, value) in pairs {
            if let Some(key) = FilterKey::from_param(param) {
                state.set(key, value);
            }
        }
        state
    }

    /// Set one key from raw input. Blank input clears the key.
    ///
    /// Returns `true` when the key ends up constraining the listing.
    pub fn set(&mut self, key: FilterKey, raw: &str) -> bool {
        let Some(value) = normalize_filter_value(Some(raw)) else {
            self.clear_key(key);
            return false;
        };

        let accepted = match key {
            FilterKey::Search => {
                self.search = Some(value.to_string());
                true
            }
            FilterKey::Category => {
                self.category = Some(value.to_string());
                true
            }
            FilterKey::FileType => {
                self.file_type = Some(value.to_string());
                true
            }
            FilterKey::Author => {
                self.author = Some(value.to_string());
                true
            }
            FilterKey::Tags => {
                self.tags = Some(value.to_string());
                true
            }
            FilterKey::Status => {
                self.status = RecordStatus::try_from(value).ok();
                self.status.is_some()
            }
            FilterKey::Price => {
                self.price = PriceBucket::parse(value);
                self.price.is_some()
            }
            FilterKey::Size => {
                self.size = SizeBucket::parse(value);
                self.size.is_some()
            }
            FilterKey::Views => {
                self.views = ViewsBucket::parse(value);
                self.views.is_some()
            }
            FilterKey::DateFrom => {
                self.date_from = parse_date(value);
                self.date_from.is_some()
            }
            FilterKey::DateTo => {
                self.date_to = parse_date(value);
                self.date_to.is_some()
            }
            FilterKey::Rating => {
                self.rating = value
                    .parse::<f64>()
                    .ok()
                    .filter(|rating| rating.is_finite() && *rating >= 0.0);
                self.rating.is_some()
            }
            FilterKey::Violation => {
                self.violation = match value.to_ascii_lowercase().as_str() {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                };
                self.violation.is_some()
            }
        };

        if !accepted {
            warn!(
                target = "docdesk::application::filter",
                key = %key,
                value,
                "ignoring malformed filter value"
            );
        }
        accepted
    }

    pub fn clear_key(&mut self, key: FilterKey) {
        match key {
            FilterKey::Search => self.search = None,
            FilterKey::Status => self.status = None,
            FilterKey::Category => self.category = None,
            FilterKey::FileType => self.file_type = None,
            FilterKey::Price => self.price = None,
            FilterKey::Author => self.author = None,
            FilterKey::Tags => self.tags = None,
            FilterKey::DateFrom => self.date_from = None,
            FilterKey::DateTo => self.date_to = None,
            FilterKey::Size => self.size = None,
            FilterKey::Views => self.views = None,
            FilterKey::Rating => self.rating = None,
            FilterKey::Violation => self.violation = None,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        FilterKey::ALL.into_iter().all(|key| self.get(key).is_none())
    }

    /// Canonical text for a key, as written back into the URL.
    pub fn get(&self, key: FilterKey) -> Option<String> {
        match key {
            FilterKey::Search => self.search.clone(),
            FilterKey::Status => self.status.map(|status| status.as_key().to_ascii_lowercase()),
            FilterKey::Category => self.category.clone(),
            FilterKey::FileType => self.file_type.clone(),
            FilterKey::Price => self.price.map(|bucket| bucket.as_param().to_string()),
            FilterKey::Author => self.author.clone(),
            FilterKey::Tags => self.tags.clone(),
            FilterKey::DateFrom => self.date_from.map(|date| date.to_string()),
            FilterKey::DateTo => self.date_to.map(|date| date.to_string()),
            FilterKey::Size => self.size.map(|bucket| bucket.as_param().to_string()),
            FilterKey::Views => self.views.map(|bucket| bucket.as_param().to_string()),
            FilterKey::Rating => self.rating.map(|rating| rating.to_string()),
            FilterKey::Violation => self.violation.map(|flag| flag.to_string()),
        }
    }

    /// Active keys in declaration order.
    pub fn active(&self) -> Vec<(FilterKey, String)> {
        FilterKey::ALL
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
            .collect()
    }

    /// A record without a creation date never satisfies a date bound.
    pub fn matches(&self, record: &Record) -> bool {
        let created = record
            .created_at
            .map(|value| value.to_offset(UtcOffset::UTC).date());

        self.search.as_deref().is_none_or(|search| {
            let needle = search.to_lowercase();
            contains_folded(&record.title, &needle)
                || contains_folded(&record.description, &needle)
                || contains_folded(&record.author.name, &needle)
        }) && self
            .status
            .is_none_or(|status| record.status == Some(status))
            && self
                .category
                .as_deref()
                .is_none_or(|category| record.category.name == category)
            && self
                .file_type
                .as_deref()
                .is_none_or(|file_type| record.file_type.eq_ignore_ascii_case(file_type))
            && self.price.is_none_or(|bucket| bucket.contains(record.price))
            && self
                .author
                .as_deref()
                .is_none_or(|author| contains_folded(&record.author.name, &author.to_lowercase()))
            && self.tags.as_deref().is_none_or(|tags| {
                let needle = tags.to_lowercase();
                record.tags.iter().any(|tag| contains_folded(tag, &needle))
            })
            && self
                .date_from
                .is_none_or(|from| created.is_some_and(|date| date >= from))
            && self
                .date_to
                .is_none_or(|to| created.is_some_and(|date| date <= to))
            && self.size.is_none_or(|bucket| bucket.contains(record.file_size_mb))
            && self.views.is_none_or(|bucket| bucket.contains(record.views))
            && self.rating.is_none_or(|min| record.rating >= min)
            && self.violation.is_none_or(|flag| record.has_reports == flag)
    }

    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|record| self.matches(record)).collect()
    }

    /// Positions of the matching records, in source order.
    pub fn apply_indices(&self, records: &[Record]) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| self.matches(record))
            .map(|(index, _)| index)
            .collect()
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}

#[cfg(test)]
pub(crate) mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::domain::{
        entities::{Author, Category, DEFAULT_AVATAR},
        types::RecordId,
    };

    pub(crate) fn record(id: u64, title: &str) -> Record {
        Record {
            id: RecordId::from(id),
            title: title.to_string(),
            description: String::new(),
            status: Some(RecordStatus::Active),
            file_type: "PDF".to_string(),
            file_size_mb: 1.0,
            price: 0.0,
            views: 0,
            downloads: 0,
            rating: 0.0,
            has_reports: false,
            tags: Vec::new(),
            created_at: Some(datetime!(2024-03-10 08:00 UTC)),
            author: Author {
                name: "Minh".to_string(),
                avatar: DEFAULT_AVATAR.to_string(),
            },
            category: Category {
                name: "Toán học".to_string(),
            },
        }
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|record| record.id.to_string()).collect()
    }

    #[test]
    fn status_filter_matches_exactly() {
        let mut inactive = record(5, "Hóa học");
        inactive.status = Some(RecordStatus::Inactive);
        let records = vec![record(1, "Vật lý"), inactive];

        let mut filters = FilterState::new();
        assert!(filters.set(FilterKey::Status, "active"));

        assert_eq!(ids(&filters.apply(&records)), vec!["1"]);
    }

    #[test]
    fn search_covers_title_description_and_author() {
        let mut by_author = record(2, "Sinh học");
        by_author.author.name = "Nguyễn Văn An".to_string();
        let mut by_description = record(3, "Địa lý");
        by_description.description = "Tài liệu ôn thi AN toàn".to_string();
        let records = vec![record(1, "Anh văn"), by_author, by_description, record(4, "Sử")];

        let filters = FilterState::from_pairs([("keyword", "an")]);

        assert_eq!(ids(&filters.apply(&records)), vec!["1", "2", "3"]);
    }

    #[test]
    fn buckets_use_half_open_ranges() {
        let mut small = record(1, "a");
        small.file_size_mb = 9.99;
        let mut medium = record(2, "b");
        medium.file_size_mb = 10.0;
        let mut large = record(3, "c");
        large.file_size_mb = 50.0;
        let records = vec![small, medium, large];

        let filters = FilterState::from_pairs([("fileSize", "medium")]);
        assert_eq!(ids(&filters.apply(&records)), vec!["2"]);

        let filters = FilterState::from_pairs([("fileSize", "large")]);
        assert_eq!(ids(&filters.apply(&records)), vec!["3"]);
    }

    #[test]
    fn views_and_price_buckets() {
        let mut popular = record(1, "a");
        popular.views = 10_000;
        popular.price = 15.0;
        let mut mid = record(2, "b");
        mid.views = 1_000;
        let records = vec![popular, mid, record(3, "c")];

        let filters = FilterState::from_pairs([("views", "high")]);
        assert_eq!(ids(&filters.apply(&records)), vec!["1"]);

        let filters = FilterState::from_pairs([("views", "medium"), ("price", "free")]);
        assert_eq!(ids(&filters.apply(&records)), vec!["2"]);

        let filters = FilterState::from_pairs([("price", "paid")]);
        assert_eq!(ids(&filters.apply(&records)), vec!["1"]);
    }

    #[test]
    fn date_range_includes_the_whole_last_day() {
        let mut late = record(1, "a");
        late.created_at = Some(datetime!(2024-03-10 23:59:59 UTC));
        let mut next_day = record(2, "b");
        next_day.created_at = Some(datetime!(2024-03-11 00:00 UTC));
        let mut before = record(3, "c");
        before.created_at = Some(datetime!(2024-03-08 12:00 UTC));
        let records = vec![late, next_day, before];

        let filters = FilterState::from_pairs([("dateFrom", "2024-03-09"), ("dateTo", "2024-03-10")]);

        assert_eq!(ids(&filters.apply(&records)), vec!["1"]);
    }

    #[test]
    fn undated_records_drop_out_only_under_a_date_bound() {
        let mut undated = record(1, "a");
        undated.created_at = None;
        let records = vec![undated, record(2, "b")];

        assert_eq!(ids(&FilterState::new().apply(&records)), vec!["1", "2"]);

        let filters = FilterState::from_pairs([("dateTo", "2024-12-31")]);
        assert_eq!(ids(&filters.apply(&records)), vec!["2"]);
    }

    #[test]
    fn malformed_values_impose_no_constraint() {
        let records = vec![record(1, "a"), record(2, "b")];
        let mut filters = FilterState::new();

        assert!(!filters.set(FilterKey::Size, "enormous"));
        assert!(!filters.set(FilterKey::DateFrom, "tomorrow"));
        assert!(!filters.set(FilterKey::Rating, "five"));
        assert!(!filters.set(FilterKey::Status, "deleted"));

        assert!(filters.is_empty());
        assert_eq!(filters.apply(&records).len(), 2);
    }

    #[test]
    fn blank_input_clears_a_key() {
        let mut filters = FilterState::from_pairs([("author", "Minh")]);
        assert!(!filters.is_empty());

        filters.set(FilterKey::Author, "   ");
        assert!(filters.is_empty());
    }

    #[test]
    fn rating_tags_and_violation() {
        let mut rated = record(1, "a");
        rated.rating = 4.5;
        rated.tags = vec!["Giải tích".to_string()];
        rated.has_reports = true;
        let records = vec![rated, record(2, "b")];

        let filters = FilterState::from_pairs([("rating", "4"), ("tags", "giải")]);
        assert_eq!(ids(&filters.apply(&records)), vec!["1"]);

        let filters = FilterState::from_pairs([("violation", "false")]);
        assert_eq!(ids(&filters.apply(&records)), vec!["2"]);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let records: Vec<Record> = (1..=20).map(|id| record(id, "x")).collect();
        let filters = FilterState::from_pairs([("type", "pdf"), ("price", "free")]);

        let once: Vec<Record> = filters.apply(&records).into_iter().cloned().collect();
        let twice: Vec<Record> = filters.apply(&once).into_iter().cloned().collect();

        assert_eq!(once, twice);
        assert_eq!(records.len(), 20);
    }

    #[test]
    fn active_keys_round_trip_to_params() {
        let filters = FilterState::from_pairs([("status", "PENDING"), ("dateTo", "2024-01-31")]);
        assert_eq!(
            filters.active(),
            vec![
                (FilterKey::Status, "pending".to_string()),
                (FilterKey::DateTo, "2024-01-31".to_string()),
            ]
        );
    }
}
