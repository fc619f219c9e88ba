//! Metric instruments for voxmind.
//!
//! Created from the globally-registered `MeterProvider`; without an OTLP
//! endpoint the global provider is a no-op and recording costs nothing.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("voxmind")
}

/// Counter: placeholder memos created.
/// Labels: `source` ("text" | "audio").
pub fn memo_created() -> Counter<u64> {
    meter()
        .u64_counter("voxmind.memo.created")
        .with_description("Number of memos captured")
        .build()
}

/// Counter: memos settled.
/// Labels: `outcome` ("analyzed" | "degraded").
pub fn memo_settled() -> Counter<u64> {
    meter()
        .u64_counter("voxmind.memo.settled")
        .with_description("Number of memos settled after gateway processing")
        .build()
}

/// Histogram: gateway call duration in milliseconds.
/// Labels: `provider`, `outcome` ("ok" | "error").
pub fn gateway_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("voxmind.gateway.duration_ms")
        .with_description("Analysis gateway call duration in milliseconds")
        .with_unit("ms")
        .build()
}
