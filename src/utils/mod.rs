//! Utility functions for formatting and common operations
//!
//! This module provides centralized formatting utilities for consistent
//! display of prices, percentage changes and headline text in the report.

use rust_decimal::{Decimal, RoundingStrategy};

/// Text used wherever a value could not be determined.
pub const UNKNOWN: &str = "N/A";

/// Marker appended to truncated titles.
pub const ELLIPSIS: &str = "...";

/// Direction of a change relative to zero.
///
/// Zero counts as up. Up is drawn red and down blue, following the
/// convention of Korean market boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn of(change: Decimal) -> Self {
        if change >= Decimal::ZERO {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Direction::Up => "🔺",
            Direction::Down => "🔻",
        }
    }
}

/// Core number formatting with thousands separators.
///
/// Formats a Decimal value using US conventions:
/// - Thousands separator: `,` (comma)
/// - Decimal separator: `.` (period)
///
/// # Examples
/// ```
/// use briefing::utils::format_grouped;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_grouped(dec!(42123.456), 2), "42,123.46");
/// assert_eq!(format_grouped(dec!(-0.5), 3), "-0.500");
/// ```
pub fn format_grouped(value: Decimal, decimal_places: u32) -> String {
    let rounded =
        value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = rounded < Decimal::ZERO;
    let abs_value = rounded.abs();

    let formatted = format!("{:.*}", decimal_places as usize, abs_value);
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (formatted.as_str(), None),
    };

    // Add thousands separators (,) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    match decimal_part {
        Some(dec) => format!("{}{}.{}", sign, with_separators, dec),
        None => format!("{}{}", sign, with_separators),
    }
}

/// Format an optional value, falling back to `N/A`.
pub fn format_optional(value: Option<Decimal>, decimal_places: u32) -> String {
    value
        .map(|v| format_grouped(v, decimal_places))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Format a percentage change with its direction marker: "🔺 +0.53%"
///
/// # Examples
/// ```
/// use briefing::utils::format_change_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_change_percent(Some(dec!(0.531))), "🔺 +0.53%");
/// assert_eq!(format_change_percent(Some(dec!(-1.2))), "🔻 -1.20%");
/// assert_eq!(format_change_percent(None), "N/A");
/// ```
pub fn format_change_percent(change: Option<Decimal>) -> String {
    match change {
        Some(change) => {
            let direction = Direction::of(change);
            let sign = match direction {
                Direction::Up => "+",
                Direction::Down => "-",
            };
            format!(
                "{} {}{}%",
                direction.marker(),
                sign,
                format_grouped(change.abs(), 2)
            )
        }
        None => UNKNOWN.to_string(),
    }
}

/// Truncate text to `max_chars` characters, appending `...` when cut.
///
/// Counts characters, not bytes, so Hangul titles are cut cleanly.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_grouped_basic() {
        assert_eq!(format_grouped(dec!(1234.56), 2), "1,234.56");
        assert_eq!(format_grouped(dec!(0.99), 2), "0.99");
        assert_eq!(format_grouped(dec!(1000000), 2), "1,000,000.00");
    }

    #[test]
    fn test_format_grouped_small_values() {
        assert_eq!(format_grouped(dec!(0), 2), "0.00");
        assert_eq!(format_grouped(dec!(12), 2), "12.00");
        assert_eq!(format_grouped(dec!(999.99), 2), "999.99");
    }

    #[test]
    fn test_format_grouped_negative() {
        assert_eq!(format_grouped(dec!(-1234.56), 2), "-1,234.56");
        assert_eq!(format_grouped(dec!(-0.01), 2), "-0.01");
    }

    #[test]
    fn test_format_grouped_yield_precision() {
        assert_eq!(format_grouped(dec!(4.1234), 3), "4.123");
        assert_eq!(format_grouped(dec!(4.1236), 3), "4.124");
        assert_eq!(format_grouped(dec!(4.2), 3), "4.200");
    }

    #[test]
    fn test_format_grouped_rounds_half_away_from_zero() {
        assert_eq!(format_grouped(dec!(1.005), 2), "1.01");
        assert_eq!(format_grouped(dec!(-1.005), 2), "-1.01");
    }

    #[test]
    fn test_direction_zero_counts_as_up() {
        assert_eq!(Direction::of(dec!(0)), Direction::Up);
        assert_eq!(Direction::of(dec!(-0.01)), Direction::Down);
        assert_eq!(Direction::of(dec!(5.2)), Direction::Up);
    }

    #[test]
    fn test_change_percent_markers() {
        assert_eq!(format_change_percent(Some(dec!(0))), "🔺 +0.00%");
        assert_eq!(format_change_percent(Some(dec!(-0.01))), "🔻 -0.01%");
        assert_eq!(format_change_percent(Some(dec!(5.2))), "🔺 +5.20%");
    }

    #[test]
    fn test_small_declines_keep_minus_sign() {
        assert_eq!(format_change_percent(Some(dec!(-0.004))), "🔻 -0.00%");
        assert_eq!(format_change_percent(Some(dec!(-0.005))), "🔻 -0.01%");
        assert_eq!(format_change_percent(Some(dec!(-1234.567))), "🔻 -1,234.57%");
    }

    #[test]
    fn test_truncate_chars_at_budget() {
        let long = "a".repeat(71);
        let cut = truncate_chars(&long, 70);
        assert_eq!(cut, format!("{}...", "a".repeat(70)));

        let exact = "b".repeat(50);
        assert_eq!(truncate_chars(&exact, 50), exact);
    }

    #[test]
    fn test_truncate_chars_counts_hangul_as_single_chars() {
        let title = "미국 증시 마감";
        assert_eq!(truncate_chars(title, 5), "미국 증시...");
        assert_eq!(truncate_chars(title, 8), title);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"S&P <500> "rally""#),
            "S&amp;P &lt;500&gt; &quot;rally&quot;"
        );
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace("  a \n\t b  c "), "a b c");
    }
}
