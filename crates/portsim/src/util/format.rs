/// Insert thousands separators into a non-negative integer string
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format an integer amount with thousands separators (e.g. `-1,234,567`)
pub fn format_amount(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a money value truncated to an integer amount
pub fn format_money(value: f64) -> String {
    format_amount(value as i64)
}

/// Format a ratio as a percentage value (0.1234 -> "12.34%")
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
