//! Totals shown above a filtered listing.

use serde::Serialize;

use crate::{
    domain::{entities::Record, types::RecordStatus},
    util::format::format_compact,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub count: usize,
    pub total_views: u64,
    pub total_downloads: u64,
    pub pending: usize,
    pub reported: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryCard {
    pub label: &'static str,
    pub value: String,
}

impl ListSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .fold(Self::default(), |mut summary, record| {
                summary.count += 1;
                summary.total_views = summary.total_views.saturating_add(record.views);
                summary.total_downloads = summary.total_downloads.saturating_add(record.downloads);
                if record.status == Some(RecordStatus::Pending) {
                    summary.pending += 1;
                }
                if record.has_reports {
                    summary.reported += 1;
                }
                summary
            })
    }

    pub fn cards(&self) -> Vec<SummaryCard> {
        vec![
            SummaryCard {
                label: "Tổng số",
                value: format_compact(self.count as u64),
            },
            SummaryCard {
                label: "Lượt xem",
                value: format_compact(self.total_views),
            },
            SummaryCard {
                label: "Lượt tải",
                value: format_compact(self.total_downloads),
            },
            SummaryCard {
                label: "Chờ duyệt",
                value: format_compact(self.pending as u64),
            },
            SummaryCard {
                label: "Bị báo cáo",
                value: format_compact(self.reported as u64),
            },
        ]
    }
}
