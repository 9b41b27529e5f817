//! Tracing setup for the search binary.
//!
//! Progress lines ("P=...", "Assigning work to ...") are plain `info!` events.
//! The default text format prints only the message, to stdout, so those lines
//! appear exactly as written.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives for a `PNUM_LOG` level.
fn filter_directives(level: Option<&str>) -> String {
    let base_level = match level {
        Some("debug") => "debug",
        Some("trace") => "trace",
        Some("warn") | Some("warning") => "warn",
        Some("error") => "error",
        _ => "info",
    };
    format!("pnum={base_level}")
}

/// Initialize tracing with PNUM_LOG and LOG_FORMAT support.
///
/// `RUST_LOG` takes precedence over `PNUM_LOG` when set.
pub fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = std::env::var("PNUM_LOG").ok();
        EnvFilter::new(filter_directives(level.as_deref()))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stdout));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .without_time()
                .with_level(false)
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::io::stdout),
        );
        let _ = subscriber.try_init();
    }
}
