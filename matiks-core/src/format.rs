//! Formatting helpers shared across front ends.

/// Format a dollar amount with thousands separators (e.g., "$12,345.67").
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// Format an integer count with thousands separators (e.g., "1,204").
pub fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

/// Format a percentage with one decimal (e.g., "12.5%").
pub fn format_percent(pct: f64) -> String {
    if pct.is_finite() {
        format!("{:.1}%", pct)
    } else {
        "0.0%".to_string()
    }
}

/// Format minutes with two decimals (e.g., "31.25 min").
pub fn format_minutes(minutes: f64) -> String {
    format!("{:.2} min", minutes)
}

/// Ordinal label for a quantile (0.9 -> "90th", 0.95 -> "95th").
pub fn format_percentile(p: f64) -> String {
    let n = (p * 100.0).round() as i64;
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
