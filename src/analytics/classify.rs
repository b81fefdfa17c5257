//! GHI color buckets.

use crate::domain::ColorClass;

/// Bucket a GHI value. Thresholds are inclusive lower bounds of the next
/// bucket: `2.0` is `MidLow`, `4.0` is `MidHigh`, `6.0` is `High`.
pub fn classify_ghi(ghi: Option<f64>) -> ColorClass {
    match ghi {
        None => ColorClass::NoData,
        Some(v) if v.is_nan() => ColorClass::NoData,
        Some(v) if v < 2.0 => ColorClass::Low,
        Some(v) if v < 4.0 => ColorClass::MidLow,
        Some(v) if v < 6.0 => ColorClass::MidHigh,
        Some(_) => ColorClass::High,
    }
}
