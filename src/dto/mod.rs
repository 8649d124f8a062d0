use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Healthcheck payload.
pub mod health;
/// Match control requests and snapshots.
pub mod scoring;
/// Field validators shared by request DTOs.
pub mod validation;

fn format_timestamp(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|time| time.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}
