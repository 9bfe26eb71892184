use std::time::Duration;

use docdesk::{
    application::{
        bulk::{BulkError, BulkRequest, BulkTarget, CsrfToken},
        error::{AppError, HttpFailure},
        query::{HistoryMode, ListQuery},
        repos::load_controller,
        retry::RetryPolicy,
        selection::SelectionSet,
        toast::ToastKind,
    },
    config::CsrfSettings,
    domain::types::RecordId,
    infra::http::{AdminClient, HttpListingSource},
};
use httpmock::MockServer;
use url::Url;

fn client(server: &MockServer) -> AdminClient {
    let base = Url::parse(&server.base_url()).expect("mock server url");
    AdminClient::with_parts(
        base,
        "/login".to_string(),
        Duration::from_secs(5),
        RetryPolicy::default()
            .max_attempts(3)
            .base_delay(Duration::from_millis(5)),
        CsrfSettings {
            param: "_csrf".to_string(),
            meta_name: "_csrf".to_string(),
        },
    )
    .expect("client builds")
}

#[tokio::test]
async fn listing_request_carries_filters_and_zero_based_page() -> Result<(), AppError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/admin/documents/api")
            .query_param("status", "active")
            .query_param("page", "1")
            .query_param("size", "25")
            .query_param("sortBy", "title")
            .query_param("sortDir", "asc");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"items":[
                    {"id":1,"title":"Giải tích 1","status":"active","createdAt":"2024-03-01"},
                    {"id":2,"title":"Bài giảng","status":"active","createdAt":"2024-03-02"}
                ],"total":27}"#,
            );
    });

    let source = HttpListingSource::new(client(&server), "/admin/documents/api", 10);
    let query = ListQuery::parse("status=active&page=1&size=25&sort=title&dir=asc");
    let controller = load_controller(&source, Default::default(), query).await?;

    mock.assert();
    assert_eq!(controller.filtered_count(), 2);
    let titles: Vec<&str> = controller
        .visible()
        .into_iter()
        .map(|record| record.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Bài giảng", "Giải tích 1"]);
    Ok(())
}

#[tokio::test]
async fn unavailable_server_is_retried_until_attempts_run_out() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/admin/reports/api");
        then.status(503);
    });

    let err = client(&server)
        .fetch_listing("/admin/reports/api", &ListQuery::new(), 10)
        .await
        .expect_err("503 fails");

    assert_eq!(err, HttpFailure::Status(503));
    mock.assert_calls(3);
}

#[tokio::test]
async fn forbidden_is_not_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/admin/reports/api");
        then.status(403);
    });

    let err = client(&server)
        .fetch_listing("/admin/reports/api", &ListQuery::new(), 10)
        .await
        .expect_err("403 fails");

    assert_eq!(err, HttpFailure::Forbidden);
    assert_eq!(err.toast().kind, ToastKind::Error);
    assert_eq!(err.user_message(), "Không có quyền thực hiện thao tác này");
    mock.assert_calls(1);
}

#[tokio::test]
async fn redirect_to_login_counts_as_expired_session() {
    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method("GET").path("/admin/withdrawals/api");
        then.status(302).header("location", "/login");
    });
    let login = server.mock(|when, then| {
        when.method("GET").path("/login");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html><body>Đăng nhập</body></html>");
    });

    let client = client(&server);
    let err = client
        .fetch_listing("/admin/withdrawals/api", &ListQuery::new(), 10)
        .await
        .expect_err("login page is not a listing");

    listing.assert();
    login.assert();
    assert_eq!(err, HttpFailure::Unauthorized);
    let redirect = client.login_redirect(&err).expect("navigates to login");
    assert_eq!(redirect.mode, HistoryMode::Push);
    assert_eq!(redirect.href("/ignored"), "/login");
}

#[tokio::test]
async fn code_check_excludes_the_record_being_edited() -> Result<(), HttpFailure> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/admin/coin-packages/check-code")
            .query_param("code", "GOLD100")
            .query_param("excludeId", "5");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"exists":true}"#);
    });

    let exists = client(&server)
        .check_code("GOLD100", Some(&RecordId::from(5u64)))
        .await?;

    mock.assert();
    assert!(exists);
    Ok(())
}

#[tokio::test]
async fn blank_tag_search_skips_the_request() -> Result<(), HttpFailure> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/admin/documents/tags/search");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":1,"name":"rust","documentCount":4}]"#);
    });

    let client = client(&server);
    assert!(client.search_tags("   ").await?.is_empty());
    mock.assert_calls(0);

    let tags = client.search_tags("ru").await?;
    mock.assert_calls(1);
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "rust");
    Ok(())
}

#[tokio::test]
async fn per_item_deletion_tallies_every_result() {
    let server = MockServer::start();
    let accepted = server.mock(|when, then| {
        when.method("DELETE").path("/admin/reports/api/3");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"success":true}"#);
    });
    let rejected = server.mock(|when, then| {
        when.method("DELETE").path("/admin/reports/api/7");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"success":false,"message":"Báo cáo đang được xử lý"}"#);
    });
    let missing = server.mock(|when, then| {
        when.method("DELETE").path("/admin/reports/api/9");
        then.status(404);
    });

    let ids: Vec<RecordId> = ["3", "7", "9"].into_iter().map(RecordId::from).collect();
    let csrf = CsrfToken::new("_csrf", "tok");
    let outcome = client(&server)
        .delete_many(BulkTarget::Reports, &ids, Some("trùng lặp nội dung"), Some(&csrf))
        .await
        .expect("reports support per-item deletion");

    accepted.assert();
    rejected.assert();
    missing.assert();
    assert_eq!(outcome.total(), 3);
    assert_eq!(outcome.succeeded, vec![RecordId::from("3")]);
    let mut failed: Vec<(&str, &str)> = outcome
        .failed
        .iter()
        .map(|failure| (failure.id.as_str(), failure.reason.as_str()))
        .collect();
    failed.sort();
    assert_eq!(
        failed,
        vec![
            ("7", "Báo cáo đang được xử lý"),
            ("9", "Không tìm thấy dữ liệu"),
        ]
    );

    let toasts = outcome.toasts();
    assert_eq!(toasts.len(), 2);
    assert_eq!(toasts[0].text, "Đã xóa thành công 1 báo cáo!");
    assert_eq!(toasts[1].text, "Có 2 báo cáo không thể xóa!");
}

#[tokio::test]
async fn per_item_deletion_sends_nothing_it_cannot_complete() {
    let server = MockServer::start();
    let any_delete = server.mock(|when, then| {
        when.method("DELETE");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"success":true}"#);
    });
    let client = client(&server);
    let ids = vec![RecordId::from(3u64)];

    let err = client
        .delete_many(BulkTarget::Reports, &[], None, None)
        .await
        .expect_err("nothing selected");
    assert_eq!(
        err,
        BulkError::EmptySelection {
            target: BulkTarget::Reports
        }
    );
    assert_eq!(err.toast().kind, ToastKind::Warning);
    assert_eq!(err.toast().text, "Vui lòng chọn ít nhất một báo cáo!");

    let err = client
        .delete_many(BulkTarget::CategoriesDelete, &ids, None, None)
        .await
        .expect_err("categories delete through the form");
    assert_eq!(
        err,
        BulkError::PerItemUnsupported {
            target: BulkTarget::CategoriesDelete
        }
    );

    any_delete.assert_calls(0);
}

#[tokio::test]
async fn bulk_form_is_posted_urlencoded_and_flashes_are_read() -> Result<(), AppError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path("/admin/categories/delete-multiple")
            .header("content-type", "application/x-www-form-urlencoded")
            .body("_csrf=tok&categoryIds=3&categoryIds=7");
        then.status(200)
            .header("content-type", "text/html")
            .body(
                r#"<html><head>
                <meta name="_csrf" content="tok-2">
                <meta name="flash-success" content="Đã xóa 2 danh mục">
                </head><body></body></html>"#,
            );
    });

    let mut selection = SelectionSet::new();
    selection.insert(RecordId::from(3u64));
    selection.insert(RecordId::from(7u64));
    let csrf = CsrfToken::new("_csrf", "tok");
    let form = BulkRequest::new(BulkTarget::CategoriesDelete, &selection)
        .csrf(Some(&csrf))
        .build()?;

    let outcome = client(&server).submit(&form).await?;

    mock.assert();
    assert_eq!(outcome.landed_on.path(), "/admin/categories/delete-multiple");
    assert_eq!(outcome.markers.csrf, Some(CsrfToken::new("_csrf", "tok-2")));
    assert_eq!(outcome.markers.flashes.len(), 1);
    assert_eq!(outcome.markers.flashes[0].kind, ToastKind::Success);
    assert_eq!(outcome.markers.flashes[0].text, "Đã xóa 2 danh mục");
    Ok(())
}

#[tokio::test]
async fn page_markers_supply_the_token() -> Result<(), HttpFailure> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/admin/categories");
        then.status(200)
            .header("content-type", "text/html")
            .body(r#"<form><input type="hidden" name="_csrf" value="from-page"></form>"#);
    });

    let markers = client(&server).fetch_page_markers("/admin/categories").await?;

    assert_eq!(markers.csrf, Some(CsrfToken::new("_csrf", "from-page")));
    assert!(markers.flashes.is_empty());
    Ok(())
}

#[tokio::test]
async fn chart_data_is_returned_as_json() -> Result<(), HttpFailure> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/admin/statistics/revenue");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"labels":["T1","T2"],"values":[1200,3400]}"#);
    });

    let chart = client(&server).fetch_chart("revenue").await?;

    mock.assert();
    assert_eq!(chart["labels"][1], "T2");
    assert_eq!(chart["values"][0], 1200);
    Ok(())
}
