use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{OwnerReference, Time};

use crate::models::views::NOT_AVAILABLE;

/// API timestamps carry whole seconds.
pub fn to_utc(time: Option<&Time>) -> Option<DateTime<Utc>> {
    time.and_then(|t| DateTime::from_timestamp(t.0.as_second(), 0))
}

/// Coarse table age: whole days when at least one day old, otherwise whole hours.
pub fn coarse_age(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let created = match created {
        Some(t) => t,
        None => return NOT_AVAILABLE.to_string(),
    };

    let secs = (now - created).num_seconds().max(0);
    let days = secs / 86400;
    if days > 0 {
        format!("{}d", days)
    } else {
        format!("{}h", (secs % 86400) / 3600)
    }
}

/// Detail-panel age, e.g. `2d 4h 13m ago`.
pub fn elapsed_age(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let created = match created {
        Some(t) => t,
        None => return NOT_AVAILABLE.to_string(),
    };

    let secs = (now - created).num_seconds().max(0);
    format!(
        "{}d {}h {}m ago",
        secs / 86400,
        (secs % 86400) / 3600,
        (secs % 3600) / 60
    )
}

pub fn format_created(created: Option<DateTime<Utc>>) -> String {
    created
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S%z").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `Kind/Name` of the first owner reference.
pub fn controlled_by(owners: &[OwnerReference]) -> String {
    owners
        .first()
        .map(|o| format!("{}/{}", o.kind, o.name))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn label_summary(labels: Option<&BTreeMap<String, String>>) -> String {
    match labels {
        Some(l) if !l.is_empty() => l
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", "),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Absent and empty strings both render as the placeholder.
pub fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn number_or_na(value: Option<i32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
