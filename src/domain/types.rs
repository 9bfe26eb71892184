//! Shared domain enumerations and identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a listed record, unique within one load.
///
/// The server emits both numeric and string identifiers; both are kept in
/// their textual form because that is what forms submit back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Published,
    Pending,
    Rejected,
    Draft,
    Archived,
    Suspended,
    Active,
    Inactive,
}

impl RecordStatus {
    pub const ALL: [RecordStatus; 8] = [
        RecordStatus::Published,
        RecordStatus::Pending,
        RecordStatus::Rejected,
        RecordStatus::Draft,
        RecordStatus::Archived,
        RecordStatus::Suspended,
        RecordStatus::Active,
        RecordStatus::Inactive,
    ];

    pub fn as_key(self) -> &'static str {
        match self {
            RecordStatus::Published => "PUBLISHED",
            RecordStatus::Pending => "PENDING",
            RecordStatus::Rejected => "REJECTED",
            RecordStatus::Draft => "DRAFT",
            RecordStatus::Archived => "ARCHIVED",
            RecordStatus::Suspended => "SUSPENDED",
            RecordStatus::Active => "ACTIVE",
            RecordStatus::Inactive => "INACTIVE",
        }
    }

    /// Label shown in the status badge.
    pub fn label(self) -> &'static str {
        match self {
            RecordStatus::Published => "Đã xuất bản",
            RecordStatus::Pending => "Chờ duyệt",
            RecordStatus::Rejected => "Bị từ chối",
            RecordStatus::Draft => "Bản nháp",
            RecordStatus::Archived => "Đã lưu trữ",
            RecordStatus::Suspended => "Bị đình chỉ",
            RecordStatus::Active => "Hoạt động",
            RecordStatus::Inactive => "Không hoạt động",
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            RecordStatus::Published | RecordStatus::Active => "bg-success",
            RecordStatus::Draft | RecordStatus::Inactive => "bg-secondary",
            RecordStatus::Pending => "bg-warning",
            RecordStatus::Rejected => "bg-danger",
            RecordStatus::Archived => "bg-dark",
            RecordStatus::Suspended => "bg-info",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl TryFrom<&str> for RecordStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        RecordStatus::ALL
            .into_iter()
            .find(|status| status.as_key() == normalized)
            .ok_or(())
    }
}
