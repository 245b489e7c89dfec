/// Largest number of decimal places `decimal_places` will report.
const MAX_PLACES: u32 = 15;

/// Number of decimal places needed to represent `value` exactly.
pub fn decimal_places(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }

    let mut places = 0;
    let mut e = 1.0;
    while (value * e).round() / e != value && places < MAX_PLACES {
        e *= 10.0;
        places += 1;
    }
    places
}

/// Rounds half away from zero at `places` decimals.
///
/// The decimal shift goes through the shortest textual representation so
/// `1.005` rounds to `1.01` instead of falling victim to binary error.
pub fn round_to(value: f64, places: u32) -> f64 {
    let shifted: f64 = match format!("{value}e{places}").parse() {
        Ok(v) => v,
        Err(_) => return value,
    };
    format!("{}e-{places}", shifted.round())
        .parse()
        .unwrap_or(value)
}
