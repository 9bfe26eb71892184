use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "docdesk_retry_attempt_total",
            Unit::Count,
            "Total number of retried admin requests."
        );
        describe_counter!(
            "docdesk_bulk_submit_total",
            Unit::Count,
            "Total number of bulk forms submitted, by target."
        );
        describe_counter!(
            "docdesk_bulk_item_total",
            Unit::Count,
            "Total number of per-item bulk deletions, by outcome."
        );
        describe_counter!(
            "docdesk_toast_shown_total",
            Unit::Count,
            "Total number of toasts shown, by kind."
        );
        describe_counter!(
            "docdesk_toast_dismissed_total",
            Unit::Count,
            "Total number of toasts dismissed before expiry."
        );
    });
}
