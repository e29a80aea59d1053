//! `tracing-subscriber` setup. Library crates only emit events.
//!
//! Our own crates log at the `-v` level. Everything else, swc included,
//! follows `RUST_LOG` and defaults to `warn`.

use std::fmt::Write;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Targets whose level follows `-v`.
const OWN_TARGETS: &[&str] = &["esmgate", "esmgate_core", "esmgate_util"];

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Filter directives: the `RUST_LOG` value (or `warn`) followed by one
/// directive per own target. Later directives win for the same target.
fn filter_spec(rust_log: Option<&str>, verbosity: u8) -> String {
    let mut spec = rust_log
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("warn")
        .to_string();
    let level = level_for(verbosity);
    for target in OWN_TARGETS {
        let _ = write!(spec, ",{target}={level}");
    }
    spec
}

/// Install the global subscriber, writing to stderr so stdout stays free for
/// command output. With `json`, each event is one line:
/// ```json
/// {"timestamp":"...","level":"WARN","target":"esmgate_core::resolve","fields":{"message":"module entry is not usable, falling back to CJS","package":"pkg@1.0.0"}}
/// ```
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init(verbosity: u8, json: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::builder().parse_lossy(filter_spec(rust_log.as_deref(), verbosity));

    let subscriber = tracing_subscriber::registry().with(filter);
    let stderr = fmt::layer().with_writer(std::io::stderr);

    if json {
        subscriber
            .with(stderr.json().with_current_span(true).with_span_list(false))
            .init();
    } else {
        subscriber.with(stderr.with_target(false)).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_quiets_dependencies() {
        assert_eq!(
            filter_spec(None, 0),
            "warn,esmgate=info,esmgate_core=info,esmgate_util=info"
        );
    }

    #[test]
    fn test_verbosity_only_raises_own_targets() {
        let spec = filter_spec(Some("swc_ecma_parser=error"), 2);
        assert!(spec.starts_with("swc_ecma_parser=error,"));
        assert!(spec.ends_with("esmgate_util=trace"));
        assert!(!spec.contains("warn"));
    }

    #[test]
    fn test_blank_rust_log_falls_back_to_warn() {
        assert!(filter_spec(Some("  "), 1).starts_with("warn,esmgate=debug"));
    }
}
