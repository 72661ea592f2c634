//! Logging integration for sqlshift.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-changeset spans.

use crate::error::Direction;
use crate::settings::{LogFormat, Settings};

/// Installs the global tracing subscriber described by `settings`.
///
/// The filter comes from `settings.log_level`; an invalid filter falls back
/// to `info`. Installing twice is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match settings.log_format {
        LogFormat::Pretty => {
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .pretty()
                .try_init()
                .ok();
        }
        LogFormat::Compact => {
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(false)
                .compact()
                .try_init()
                .ok();
        }
        LogFormat::Json => {
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(true)
                .json()
                .try_init()
                .ok();
        }
    }
}

/// Creates a span covering one changeset run.
///
/// # Examples
///
/// ```
/// use sqlshift_core::{logging::changeset_span, Direction};
///
/// let span = changeset_span("20240101-120000-init.sql", Direction::Up);
/// let _guard = span.enter();
/// tracing::info!("applying");
/// ```
pub fn changeset_span(version: &str, direction: Direction) -> tracing::Span {
    tracing::info_span!("changeset", version = version, direction = direction.as_str())
}
