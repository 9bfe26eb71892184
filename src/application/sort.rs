//! Column sorting for admin listings.

use std::{cmp::Ordering, fmt};

use crate::domain::entities::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Title,
    Author,
    Category,
    Status,
    Price,
    Views,
    Downloads,
    Rating,
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 9] = [
        SortField::Title,
        SortField::Author,
        SortField::Category,
        SortField::Status,
        SortField::Price,
        SortField::Views,
        SortField::Downloads,
        SortField::Rating,
        SortField::CreatedAt,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::Category => "category",
            SortField::Status => "status",
            SortField::Price => "price",
            SortField::Views => "views",
            SortField::Downloads => "downloads",
            SortField::Rating => "rating",
            SortField::CreatedAt => "createdAt",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        match trimmed {
            "created_at" | "createdDate" | "date" => Some(SortField::CreatedAt),
            "name" => Some(SortField::Title),
            other => SortField::ALL
                .into_iter()
                .find(|field| field.as_param().eq_ignore_ascii_case(other)),
        }
    }

    fn compare(self, left: &Record, right: &Record) -> Ordering {
        match self {
            SortField::Title => compare_folded(&left.title, &right.title),
            SortField::Author => compare_folded(&left.author.name, &right.author.name),
            SortField::Category => compare_folded(&left.category.name, &right.category.name),
            SortField::Status => left
                .status
                .map(|status| status.as_key())
                .cmp(&right.status.map(|status| status.as_key())),
            SortField::Price => left.price.total_cmp(&right.price),
            SortField::Views => left.views.cmp(&right.views),
            SortField::Downloads => left.downloads.cmp(&right.downloads),
            SortField::Rating => left.rating.total_cmp(&right.rating),
            // Undated rows come before dated ones in ascending order.
            SortField::CreatedAt => left.created_at.cmp(&right.created_at),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_param(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Active sort column. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Header click: the same column flips direction, another column starts ascending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Asc;
        }
    }

    pub fn compare(&self, left: &Record, right: &Record) -> Ordering {
        let ordering = self.field.compare(left, right);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    /// Stable sort: records with equal keys keep their relative order.
    pub fn sort(&self, records: &mut [&Record]) {
        records.sort_by(|left, right| self.compare(left, right));
    }

    pub fn sort_indices(&self, records: &[Record], indices: &mut [usize]) {
        indices.sort_by(|left, right| self.compare(&records[*left], &records[*right]));
    }

    /// Indicator shown next to a column header.
    pub fn indicator(&self, field: SortField) -> &'static str {
        if self.field != field {
            return "";
        }
        match self.direction {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

fn compare_folded(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::application::filter::tests::record;

    fn titles(records: &[&Record]) -> Vec<String> {
        records.iter().map(|record| record.title.clone()).collect()
    }

    #[test]
    fn toggle_flips_same_field_and_resets_new_field() {
        let mut state = SortState::default();
        assert_eq!(state.field, SortField::CreatedAt);
        assert_eq!(state.direction, SortDirection::Desc);

        state.toggle(SortField::CreatedAt);
        assert_eq!(state.direction, SortDirection::Asc);

        state.toggle(SortField::Views);
        assert_eq!(state, SortState::new(SortField::Views, SortDirection::Asc));

        state.toggle(SortField::Views);
        assert_eq!(state.direction, SortDirection::Desc);
    }

    #[test]
    fn titles_compare_case_insensitively() {
        let records = vec![record(1, "beta"), record(2, "Alpha"), record(3, "gamma")];
        let mut view: Vec<&Record> = records.iter().collect();

        SortState::new(SortField::Title, SortDirection::Asc).sort(&mut view);

        assert_eq!(titles(&view), vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let mut first = record(1, "first");
        first.views = 10;
        let mut second = record(2, "second");
        second.views = 10;
        let mut third = record(3, "third");
        third.views = 5;
        let records = vec![first, second, third];
        let mut view: Vec<&Record> = records.iter().collect();

        SortState::new(SortField::Views, SortDirection::Desc).sort(&mut view);

        assert_eq!(titles(&view), vec!["first", "second", "third"]);
    }

    #[test]
    fn undated_rows_sink_to_the_bottom_of_the_newest_first_order() {
        let mut undated = record(1, "undated");
        undated.created_at = None;
        let mut newer = record(2, "newer");
        newer.created_at = Some(datetime!(2024-06-01 0:00 UTC));
        let older = record(3, "older");
        let records = vec![undated, newer, older];
        let mut view: Vec<&Record> = records.iter().collect();

        SortState::default().sort(&mut view);

        assert_eq!(titles(&view), vec!["newer", "older", "undated"]);
    }

    #[test]
    fn resorting_a_sorted_list_is_a_no_op() {
        let mut records: Vec<Record> = (1..=6).map(|id| record(id, &format!("r{id}"))).collect();
        for (offset, record) in records.iter_mut().enumerate() {
            record.price = (offset % 3) as f64;
            record.created_at =
                Some(datetime!(2024-01-01 0:00 UTC) + time::Duration::days(offset as i64 % 2));
        }
        let state = SortState::new(SortField::Price, SortDirection::Desc);

        let mut once: Vec<&Record> = records.iter().collect();
        state.sort(&mut once);
        let mut twice = once.clone();
        state.sort(&mut twice);

        assert_eq!(titles(&once), titles(&twice));
    }

    #[test]
    fn parses_params_and_aliases() {
        assert_eq!(SortField::parse("createdAt"), Some(SortField::CreatedAt));
        assert_eq!(SortField::parse("created_at"), Some(SortField::CreatedAt));
        assert_eq!(SortField::parse("name"), Some(SortField::Title));
        assert_eq!(SortField::parse("colour"), None);
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
    }
}
