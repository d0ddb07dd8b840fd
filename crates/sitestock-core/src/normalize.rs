use sitestock_types::Quantity;

/// Converts a stored quantity into a finite, non-negative number.
///
/// Null, blank and unparseable values become `0.0`, as do non-finite and
/// negative ones. This never fails.
pub fn normalize_quantity(value: &Quantity) -> f64 {
    clamp_non_negative(value.coerce())
}

/// Clamps an already-numeric value the same way `normalize_quantity` does.
pub fn clamp_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}
