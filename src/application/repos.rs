//! Sources that supply listing rows to a controller.

use async_trait::async_trait;
use docdesk_api_types::ListingResponse;
use tracing::{info, warn};

use crate::{
    application::{
        controller::{ListController, ListOptions},
        error::AppError,
        query::ListQuery,
    },
    domain::entities::Record,
};

/// Anything that can produce the raw rows of one admin listing.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn load(&self, query: &ListQuery) -> Result<ListingResponse, AppError>;
}

/// Convert wire rows into records. Rows that cannot be read are skipped.
pub fn records_from_response(response: ListingResponse) -> Vec<Record> {
    let mut records = Vec::with_capacity(response.items.len());
    for item in response.items {
        let id = item.id.to_string();
        match Record::try_from(item) {
            Ok(record) => records.push(record),
            Err(err) => warn!(
                target = "docdesk::application::repos",
                record_id = %id,
                error = %err,
                "skipping unreadable listing row"
            ),
        }
    }
    records
}

/// Fetch a listing and build the controller for it.
pub async fn load_controller(
    source: &dyn ListingSource,
    options: ListOptions,
    query: ListQuery,
) -> Result<ListController, AppError> {
    let response = source.load(&query).await?;
    let records = records_from_response(response);
    info!(
        target = "docdesk::application::repos",
        records = records.len(),
        "listing loaded"
    );
    Ok(ListController::new(records, options, query)?)
}

#[cfg(test)]
mod tests {
    use docdesk_api_types::{ListingItem, WireId};

    use super::*;

    struct Fixed(ListingResponse);

    #[async_trait]
    impl ListingSource for Fixed {
        async fn load(&self, _query: &ListQuery) -> Result<ListingResponse, AppError> {
            Ok(self.0.clone())
        }
    }

    fn item(id: u64, created_at: Option<&str>) -> ListingItem {
        let mut item: ListingItem =
            serde_json::from_value(serde_json::json!({ "id": id, "title": format!("Tài liệu {id}") }))
                .expect("item");
        item.created_at = created_at.map(str::to_string);
        item
    }

    #[test]
    fn undated_rows_are_kept_and_idless_rows_skipped() {
        let mut idless = item(5, Some("2024-03-03"));
        idless.id = WireId::Text(String::new());
        let response = ListingResponse {
            items: vec![
                item(1, Some("2024-03-01")),
                item(2, None),
                item(3, Some("yesterday")),
                idless,
                item(4, Some("2024-03-02T10:00:00Z")),
            ],
            total: Some(5),
        };

        let records = records_from_response(response);
        let ids: Vec<String> = records.iter().map(|record| record.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert!(records[1].created_at.is_none());
    }

    #[tokio::test]
    async fn controller_is_built_from_source() {
        let source = Fixed(ListingResponse {
            items: (1..=12).map(|id| item(id, Some("2024-03-01"))).collect(),
            total: Some(12),
        });

        let controller = load_controller(&source, ListOptions::default(), ListQuery::parse("page=1"))
            .await
            .expect("controller");

        assert_eq!(controller.paginator().current_page(), 2);
        assert_eq!(controller.visible().len(), 2);
        assert_eq!(controller.records()[0].id.to_string(), WireId::Number(1).to_string());
    }
}
