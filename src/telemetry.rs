//! Opt-in tracing setup for hosts embedding `plot-rs`.
//!
//! The graph logs redraw scheduling and axis fitting at `debug`, per-event
//! dispatch at `trace`. Hosts with their own subscriber can ignore this module.

/// Filter used when `RUST_LOG` is unset: warnings everywhere, `plot_rs` at
/// `level`.
#[must_use]
pub fn default_filter(level: &str) -> String {
    let level = match level.trim().to_ascii_lowercase().as_str() {
        level @ ("error" | "warn" | "info" | "debug" | "trace" | "off") => level.to_owned(),
        _ => "info".to_owned(),
    };
    format!("warn,plot_rs={level}")
}

/// Installs a compact `fmt` subscriber when the `telemetry` feature is on.
///
/// `RUST_LOG` wins over `level`. Returns `false` when the feature is off or a
/// global subscriber already exists.
#[must_use]
pub fn init_default_tracing(level: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = level;
        false
    }
}
