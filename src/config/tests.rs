use std::io::Write;

use clap::Parser;

use super::*;

#[test]
fn defaults_resolve_without_any_source() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.base_url.as_str(), "http://127.0.0.1:8080/");
    assert_eq!(settings.server.login_path, "/login");
    assert_eq!(settings.listing.page_size, 10);
    assert_eq!(settings.listing.allowed_page_sizes, vec![10, 25, 50, 100]);
    assert_eq!(settings.listing.select_all_scope, SelectAllScope::Page);
    assert_eq!(settings.listing.selection_policy, SelectionPolicy::Prune);
    assert_eq!(settings.listing.debounce, Duration::from_millis(300));
    assert_eq!(settings.toast, ToastTimings::default());
    assert_eq!(settings.retry, RetryPolicy::default());
    assert_eq!(settings.csrf.param, "_csrf");
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.base_url = Some("http://config.example".to_string());
    raw.logging.level = Some("info".to_string());

    let overrides = GlobalOverrides {
        base_url: Some("https://admin.example/".to_string()),
        log_level: Some("debug".to_string()),
        log_json: Some(true),
    };

    raw.apply_global_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.base_url.as_str(), "https://admin.example/");
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn page_size_flag_joins_allowed_sizes() {
    let mut raw = RawSettings::default();
    raw.apply_view_overrides(&ViewArgs {
        page_size: Some(20),
        ..ViewArgs::default()
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.listing.page_size, 20);
    assert!(settings.listing.is_allowed_page_size(20));
    assert_eq!(settings.listing.allowed_page_sizes, vec![10, 20, 25, 50, 100]);
}

#[test]
fn zero_values_are_rejected() {
    let mut raw = RawSettings::default();
    raw.listing.page_size = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero page size");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "listing.page_size",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.retry.max_attempts = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = RawSettings::default();
    raw.server.login_path = Some("login".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn loads_sections_from_a_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(
        file,
        r#"
[server]
base_url = "https://docs.example/admin/"
login_path = "/auth/login"

[listing]
page_size = 25
select_all_scope = "filtered"
selection_policy = "retain"
window_radius = 1

[toast]
success_ms = 2500
exit_animation_ms = 200

[retry]
max_attempts = 5
base_delay_ms = 250

[csrf]
param = "csrf_token"
"#
    )
    .expect("write config");

    let settings = load_file(file.path().to_path_buf()).expect("valid file");

    assert_eq!(settings.server.base_url.as_str(), "https://docs.example/admin/");
    assert_eq!(settings.server.login_path, "/auth/login");
    assert_eq!(settings.listing.select_all_scope, SelectAllScope::Filtered);
    assert_eq!(settings.listing.selection_policy, SelectionPolicy::Retain);
    assert_eq!(settings.toast.success, Duration::from_millis(2500));
    assert_eq!(settings.toast.error, Duration::from_millis(4000));
    assert_eq!(settings.retry.max_attempts, 5);
    assert_eq!(settings.csrf.param, "csrf_token");
    assert_eq!(settings.csrf.meta_name, "_csrf");

    let options = settings.listing.list_options(Some(BulkTarget::Reports));
    assert_eq!(options.page_size, 25);
    assert_eq!(options.window_radius, 1);
    assert_eq!(options.bulk_target, Some(BulkTarget::Reports));
}

#[test]
fn parse_list_arguments() {
    let args = CliArgs::parse_from([
        "docdesk",
        "list",
        "--input",
        "/tmp/documents.json",
        "--query",
        "status=active",
        "--sort",
        "title",
        "--sort",
        "title",
        "--format",
        "json",
    ]);

    match args.command {
        Command::List(list) => {
            assert_eq!(list.input, std::path::Path::new("/tmp/documents.json"));
            assert_eq!(list.view.query, "status=active");
            assert_eq!(list.view.sort, vec!["title", "title"]);
            assert_eq!(list.view.format, OutputFormat::Json);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_bulk_arguments_with_global_flags() {
    let args = CliArgs::parse_from([
        "docdesk",
        "bulk",
        "--target",
        "categories-delete",
        "--ids",
        "3,7",
        "--csrf",
        "tok",
        "--base-url",
        "https://docs.example",
    ]);

    assert_eq!(
        args.overrides.base_url.as_deref(),
        Some("https://docs.example")
    );
    match args.command {
        Command::Bulk(bulk) => {
            assert_eq!(bulk.target, "categories-delete");
            assert_eq!(bulk.ids, vec!["3", "7"]);
            assert_eq!(bulk.csrf.as_deref(), Some("tok"));
            assert!(!bulk.submit);
            assert!(!bulk.per_item);
        }
        _ => panic!("wrong command parsed"),
    }
}
