//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr, time::Duration};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::{
    bulk::BulkTarget,
    controller::{DEFAULT_PAGE_SIZE, DEFAULT_WINDOW_RADIUS, ListOptions},
    debounce::DEFAULT_DEBOUNCE,
    retry::RetryPolicy,
    selection::{SelectAllScope, SelectionPolicy},
    toast::ToastTimings,
};

mod cli;

pub use cli::{
    BulkArgs, CliArgs, Command, FetchArgs, GlobalOverrides, ListArgs, OutputFormat, ViewArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "docdesk";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];
const DEFAULT_CSRF_PARAM: &str = "_csrf";
const DEFAULT_CSRF_META: &str = "_csrf";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub listing: ListingSettings,
    pub toast: ToastTimings,
    pub retry: RetryPolicy,
    pub logging: LoggingSettings,
    pub csrf: CsrfSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub base_url: Url,
    pub login_path: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ListingSettings {
    pub page_size: usize,
    pub allowed_page_sizes: Vec<usize>,
    pub window_radius: usize,
    pub select_all_scope: SelectAllScope,
    pub selection_policy: SelectionPolicy,
    pub debounce: Duration,
}

impl ListingSettings {
    pub fn list_options(&self, bulk_target: Option<BulkTarget>) -> ListOptions {
        ListOptions {
            page_size: self.page_size,
            window_radius: self.window_radius,
            select_all_scope: self.select_all_scope,
            selection_policy: self.selection_policy,
            bulk_target,
        }
    }

    /// Whether a page size coming from a URL or flag is one the page offers.
    pub fn is_allowed_page_size(&self, page_size: usize) -> bool {
        self.allowed_page_sizes.contains(&page_size)
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Where admin pages keep their anti-forgery token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfSettings {
    /// Form field the token is submitted under.
    pub param: String,
    /// `name` of the `<meta>` element carrying the token.
    pub meta_name: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("DOCDESK").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_global_overrides(&cli.overrides);
    match &cli.command {
        Command::List(args) => raw.apply_view_overrides(&args.view),
        Command::Fetch(args) => raw.apply_view_overrides(&args.view),
        Command::Bulk(_) => {}
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    listing: RawListingSettings,
    toast: RawToastSettings,
    retry: RawRetrySettings,
    logging: RawLoggingSettings,
    csrf: RawCsrfSettings,
}

impl RawSettings {
    fn apply_global_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(url) = overrides.base_url.as_ref() {
            self.server.base_url = Some(url.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_view_overrides(&mut self, view: &ViewArgs) {
        if let Some(size) = view.page_size {
            self.listing.page_size = Some(size);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            listing,
            toast,
            retry,
            logging,
            csrf,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            listing: build_listing_settings(listing)?,
            toast: build_toast_timings(toast)?,
            retry: build_retry_policy(retry)?,
            logging: build_logging_settings(logging)?,
            csrf: build_csrf_settings(csrf)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let raw_url = server
        .base_url
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Url::parse(raw_url.trim())
        .map_err(|err| LoadError::invalid("server.base_url", format!("`{raw_url}`: {err}")))?;
    if base_url.cannot_be_a_base() {
        return Err(LoadError::invalid(
            "server.base_url",
            "must be an absolute http(s) URL",
        ));
    }

    let login_path = server
        .login_path
        .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string());
    if !login_path.starts_with('/') {
        return Err(LoadError::invalid(
            "server.login_path",
            "must start with `/`",
        ));
    }

    let timeout_secs = server
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "server.request_timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        base_url,
        login_path,
        request_timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_listing_settings(listing: RawListingSettings) -> Result<ListingSettings, LoadError> {
    let page_size = listing.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(LoadError::invalid(
            "listing.page_size",
            "must be greater than zero",
        ));
    }

    let mut allowed_page_sizes = listing
        .allowed_page_sizes
        .unwrap_or_else(|| DEFAULT_PAGE_SIZES.to_vec());
    if allowed_page_sizes.contains(&0) {
        return Err(LoadError::invalid(
            "listing.allowed_page_sizes",
            "sizes must be greater than zero",
        ));
    }
    if !allowed_page_sizes.contains(&page_size) {
        allowed_page_sizes.push(page_size);
    }
    allowed_page_sizes.sort_unstable();
    allowed_page_sizes.dedup();

    let debounce = listing
        .debounce_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_DEBOUNCE);

    Ok(ListingSettings {
        page_size,
        allowed_page_sizes,
        window_radius: listing.window_radius.unwrap_or(DEFAULT_WINDOW_RADIUS),
        select_all_scope: listing.select_all_scope.unwrap_or_default(),
        selection_policy: listing.selection_policy.unwrap_or_default(),
        debounce,
    })
}

fn build_toast_timings(toast: RawToastSettings) -> Result<ToastTimings, LoadError> {
    let defaults = ToastTimings::default();
    let exit_animation = toast
        .exit_animation_ms
        .map(Duration::from_millis)
        .unwrap_or(defaults.exit_animation);
    if exit_animation > Duration::from_secs(5) {
        return Err(LoadError::invalid(
            "toast.exit_animation_ms",
            "must not exceed 5000",
        ));
    }

    Ok(ToastTimings {
        success: toast
            .success_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.success),
        info: toast
            .info_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.info),
        warning: toast
            .warning_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.warning),
        error: toast
            .error_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.error),
        exit_animation,
    })
}

fn build_retry_policy(retry: RawRetrySettings) -> Result<RetryPolicy, LoadError> {
    let defaults = RetryPolicy::default();
    let max_attempts = retry.max_attempts.unwrap_or(defaults.max_attempts);
    if max_attempts == 0 {
        return Err(LoadError::invalid(
            "retry.max_attempts",
            "must be greater than zero",
        ));
    }

    let base_delay = retry
        .base_delay_ms
        .map(Duration::from_millis)
        .unwrap_or(defaults.base_delay);

    Ok(RetryPolicy::default()
        .max_attempts(max_attempts)
        .base_delay(base_delay))
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_csrf_settings(csrf: RawCsrfSettings) -> Result<CsrfSettings, LoadError> {
    let param = non_blank(csrf.param, DEFAULT_CSRF_PARAM, "csrf.param")?;
    let meta_name = non_blank(csrf.meta_name, DEFAULT_CSRF_META, "csrf.meta_name")?;
    Ok(CsrfSettings { param, meta_name })
}

fn non_blank(
    value: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<String, LoadError> {
    match value {
        None => Ok(default.to_string()),
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(LoadError::invalid(key, "must not be blank"));
            }
            Ok(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    base_url: Option<String>,
    login_path: Option<String>,
    request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawListingSettings {
    page_size: Option<usize>,
    allowed_page_sizes: Option<Vec<usize>>,
    window_radius: Option<usize>,
    select_all_scope: Option<SelectAllScope>,
    selection_policy: Option<SelectionPolicy>,
    debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawToastSettings {
    success_ms: Option<u64>,
    info_ms: Option<u64>,
    warning_ms: Option<u64>,
    error_ms: Option<u64>,
    exit_animation_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRetrySettings {
    max_attempts: Option<u32>,
    base_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCsrfSettings {
    param: Option<String>,
    meta_name: Option<String>,
}

/// Resolve configuration from a config file path alone, without CLI flags.
pub fn load_file(path: PathBuf) -> Result<Settings, LoadError> {
    let raw: RawSettings = Config::builder()
        .add_source(File::from(path.as_path()).required(true))
        .build()?
        .try_deserialize()?;
    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    use clap::Parser;

    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
