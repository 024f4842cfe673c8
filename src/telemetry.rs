//! Telemetry helpers for applications embedding `live-chart-rs`.
//!
//! Tracing setup is explicit and opt-in. Hosts either call one of the init
//! helpers below or install their own `tracing` subscriber.
//!
//! Useful filter targets:
//! - `live_chart::api` for feed mutations, follow state and lifecycle,
//! - `live_chart::render::scheduler` for paint coalescing decisions,
//! - `live_chart::animation` for tail-candle and clock-sync animation.

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a compact fmt subscriber honoring `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is disabled or when the host
/// already set a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_fallback(DEFAULT_FILTER)
}

/// Same as [`init_default_tracing`] with a caller-chosen fallback directive,
/// e.g. `"warn,live_chart::render::scheduler=trace"`.
#[must_use]
pub fn init_tracing_with_fallback(fallback_directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback_directive));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback_directive;
        false
    }
}
