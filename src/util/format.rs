//! Display helpers for listing cells and summary cards.

use time::{OffsetDateTime, macros::format_description};

/// Abbreviate large counts: `1.2K`, `3.4M`. Smaller values print as-is.
pub fn format_compact(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Format a size given in megabytes using IEC units with trimmed precision.
pub fn format_file_size(megabytes: f64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if !megabytes.is_finite() || megabytes <= 0.0 {
        return "0 KiB".to_string();
    }

    let mut value = megabytes * 1024.0;
    let mut unit_index = 0;
    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }

    let mut rendered = if value >= 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    };
    if rendered.contains('.') {
        let trimmed = rendered.trim_end_matches('0').trim_end_matches('.').len();
        rendered.truncate(trimmed);
    }

    format!("{rendered} {}", UNITS[unit_index])
}

pub fn format_price(price: f64) -> String {
    if price <= 0.0 {
        "Miễn phí".to_string()
    } else {
        format!("{} xu", price.round() as u64)
    }
}

/// `dd/mm/yyyy`, the date format of the admin tables.
pub fn format_date(value: OffsetDateTime) -> String {
    value
        .format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| value.date().to_string())
}
