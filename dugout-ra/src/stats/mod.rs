//! Derived sabermetric computation
//!
//! Pure functions over rows fetched from the snapshot store; nothing in
//! here holds state or touches I/O. Rate statistics are ratios of
//! counting stats and cannot be subtracted across periods, so every
//! derivation works over the delta window with explicit divide-by-zero
//! guards.

pub mod differential;
pub mod trend;

/// Guarded ratio: zero or negative denominators yield 0, never an error
pub(crate) fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Guarded percentage
pub(crate) fn pct(num: f64, den: f64) -> f64 {
    ratio(num, den) * 100.0
}

/// Ratio stats round to 3 decimals for presentation stability
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// ERA rounds to 2 decimals by scoreboard convention
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage stats round to 1 decimal
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
