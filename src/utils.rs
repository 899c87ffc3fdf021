// Utility functions: descriptor parsing and display formatting
use regex::Regex;
use std::sync::OnceLock;

/// Distance assigned when a descriptor carries no number, so the offer sorts last.
pub const DISTANCE_SENTINEL_KM: f64 = 999.0;

fn number_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("number token pattern is valid"))
}

/// Extracts the first integer or decimal number from a descriptor such as
/// `"2.5 km"` or `"1,2 km"`.
pub fn parse_distance_km(descriptor: &str) -> Option<f64> {
    number_token()
        .find(descriptor)
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
}

/// `parse_distance_km` with the sentinel fallback.
pub fn distance_or_sentinel(descriptor: &str) -> f64 {
    parse_distance_km(descriptor).unwrap_or(DISTANCE_SENTINEL_KM)
}

/// True when the delivery fee descriptor mentions "grátis" (accent optional).
pub fn is_free_delivery(descriptor: &str) -> bool {
    let lowered = descriptor.to_lowercase();
    lowered.contains("grátis") || lowered.contains("gratis")
}

/// Rounds a currency amount to whole cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats an amount as Brazilian reais: `R$ 1.234,50`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

/// Whole-number percentage: `15%`. Halves round away from zero, like
/// `format_currency`.
pub fn format_percent(value: f64) -> String {
    format!("{:.0}%", value.round())
}

/// One decimal with a decimal comma: `4,5`.
pub fn format_rating(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0).replace('.', ",")
}
