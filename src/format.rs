//! Display formats for table cells and ticker metrics.

/// Insert `,` every three digits of an integer string.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Round to a whole number and group thousands: `1234567.8` → `1,234,568`.
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    if rounded < 0.0 {
        format!("-{}", group_digits(&digits))
    } else {
        group_digits(&digits)
    }
}

/// Currency with separators and no decimals: `$ 2,500,000,000,000`.
pub fn market_cap(value: f64) -> String {
    format!("$ {}", thousands(value))
}

/// Two decimals: `28.50`.
pub fn ratio(value: f64) -> String {
    format!("{value:.2}")
}

/// Percentage already on a 0–100 scale: `0.55%`.
pub fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Two decimals, or `N/A` when the provider has no figure.
pub fn optional_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), ratio)
}

/// Fraction on a 0–1 scale shown as a percentage; absent counts as zero.
pub fn fraction_as_percent(value: Option<f64>) -> String {
    percent(value.unwrap_or(0.0) * 100.0)
}

/// Text, or `N/A` when absent.
pub fn optional_text(value: Option<&str>) -> String {
    value.unwrap_or("N/A").to_string()
}
