#[cfg(feature = "metrics")]
use std::time::Instant;

/// Runs `f`; with the `metrics` feature enabled, also logs how long it took.
#[cfg(feature = "metrics")]
pub fn measure<T>(metric: &str, f: impl FnOnce() -> T) -> T {
    let tt = Instant::now();
    let result = f();

    log::debug!(
        "Metric `{metric}`: {}",
        humantime::format_duration(tt.elapsed())
    );

    result
}

#[cfg(not(feature = "metrics"))]
pub fn measure<T>(_metric: &str, f: impl FnOnce() -> T) -> T {
    f()
}
