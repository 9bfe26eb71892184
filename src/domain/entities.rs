//! Domain entities reconstructed from listing responses.

use docdesk_api_types::ListingItem;
use serde::Serialize;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

use crate::domain::{
    error::DomainError,
    types::{RecordId, RecordStatus},
};

pub const DEFAULT_AVATAR: &str = "/images/default-avatar.jpg";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub name: String,
}

/// Denormalised row of an admin listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    /// `None` when the server sent a status this client does not know.
    pub status: Option<RecordStatus>,
    pub file_type: String,
    pub file_size_mb: f64,
    pub price: f64,
    pub views: u64,
    pub downloads: u64,
    pub rating: f64,
    pub has_reports: bool,
    pub tags: Vec<String>,
    /// `None` when the row carries no readable date.
    pub created_at: Option<OffsetDateTime>,
    pub author: Author,
    pub category: Category,
}

impl Record {
    pub fn status_label(&self) -> &'static str {
        self.status.map_or("Không xác định", RecordStatus::label)
    }

    pub fn is_free(&self) -> bool {
        self.price <= 0.0
    }
}

impl TryFrom<ListingItem> for Record {
    type Error = DomainError;

    fn try_from(item: ListingItem) -> Result<Self, Self::Error> {
        let id = item.id.to_string();
        let id = id.trim();
        if id.is_empty() {
            return Err(DomainError::validation("listing row has no id"));
        }

        let created_at = item
            .created_at
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(parse_timestamp);

        let avatar = item
            .author
            .avatar
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string());

        Ok(Self {
            id: RecordId::new(id),
            title: item.title,
            description: item.description,
            status: RecordStatus::try_from(item.status.as_str()).ok(),
            file_type: item.file_type,
            file_size_mb: item.file_size_kb.unwrap_or(0.0) / 1024.0,
            price: item.price.unwrap_or(0.0).max(0.0),
            views: item.views.unwrap_or(0),
            downloads: item.downloads.unwrap_or(0),
            rating: item.rating.unwrap_or(0.0),
            has_reports: item.has_reports,
            tags: item.tags,
            created_at,
            author: Author {
                name: item.author.name,
                avatar,
            },
            category: Category {
                name: item.category.name,
            },
        })
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }
    parse_date(raw).map(|date| date.midnight().assume_utc())
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}
