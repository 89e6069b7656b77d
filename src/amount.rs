//! Numeric input handling.
//!
//! Rates, quantities, prices and percentages are kept as the text the user
//! typed. [`parse_amount`] is the one place that text becomes a number, and
//! it turns anything it cannot read into zero.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)([0-9]*)(?:\.([0-9]*))?(?:[eE]([+-]?[0-9]+))?")
        .expect("number pattern is valid")
});

/// Reads the number a user-entered amount starts with, so `"2 hrs"` is 2 and
/// `"1,000"` is 1. Text with no leading number is zero; negative values are
/// returned as-is.
pub fn parse_amount(text: &str) -> Decimal {
    let Some(caps) = LEADING_NUMBER.captures(text.trim()) else {
        return Decimal::ZERO;
    };
    let part = |i| caps.get(i).map_or("", |m| m.as_str());
    let (sign, int, frac, exp) = (part(1), part(2), part(3), part(4));
    if int.is_empty() && frac.is_empty() {
        return Decimal::ZERO;
    }

    let int = if int.is_empty() { "0" } else { int };
    let frac = if frac.is_empty() { "0" } else { frac };
    let mantissa = format!("{sign}{int}.{frac}");
    let parsed = if exp.is_empty() {
        Decimal::from_str(&mantissa)
    } else {
        Decimal::from_scientific(&format!("{mantissa}e{exp}"))
    };
    parsed.map(|d| d.normalize()).unwrap_or(Decimal::ZERO)
}

/// Reads a percentage and clamps it into `0..=100`.
pub fn parse_percent(text: &str) -> Decimal {
    clamp_percent(parse_amount(text))
}

pub fn clamp_percent(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Two fraction digits with Indian digit grouping, e.g. `1,40,400.00`.
///
/// Display only. Stored and computed values are never rounded.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    let text = format!("{rounded:.2}");
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    format!("{sign}{}.{frac_part}", group_indian(int_part))
}

pub fn format_rupees(value: Decimal) -> String {
    format!("₹{}", format_amount(value))
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn unreadable_input_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("   "), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("-"), Decimal::ZERO);
        assert_eq!(parse_amount("."), Decimal::ZERO);
        assert_eq!(parse_amount("e5"), Decimal::ZERO);
    }

    #[test]
    fn reads_the_leading_number() {
        assert_eq!(parse_amount("12abc"), dec("12"));
        assert_eq!(parse_amount("2 hrs"), dec("2"));
        assert_eq!(parse_amount("1,000"), dec("1"));
        assert_eq!(parse_amount("1_000"), dec("1"));
        assert_eq!(parse_amount("-3.5kg"), dec("-3.5"));
        assert_eq!(parse_amount(".5"), dec("0.5"));
        assert_eq!(parse_amount("7."), dec("7"));
        assert_eq!(parse_amount("+4"), dec("4"));
        assert_eq!(parse_amount("2e2x"), dec("200"));
        assert_eq!(parse_amount("3e"), dec("3"));
    }

    #[test]
    fn reads_plain_and_scientific_notation() {
        assert_eq!(parse_amount(" 500 "), dec("500"));
        assert_eq!(parse_amount("12.75"), dec("12.75"));
        assert_eq!(parse_amount("1e3"), dec("1000"));
        assert_eq!(parse_amount("2.5E-2"), dec("0.025"));
    }

    #[test]
    fn negatives_pass_through() {
        assert_eq!(parse_amount("-40"), dec("-40"));
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(parse_percent("150"), Decimal::ONE_HUNDRED);
        assert_eq!(parse_percent("-5"), Decimal::ZERO);
        assert_eq!(parse_percent("18"), dec("18"));
    }

    #[test]
    fn formats_with_indian_grouping() {
        assert_eq!(format_amount(dec("0")), "0.00");
        assert_eq!(format_amount(dec("999")), "999.00");
        assert_eq!(format_amount(dec("1404")), "1,404.00");
        assert_eq!(format_amount(dec("140400")), "1,40,400.00");
        assert_eq!(format_amount(dec("12345678.905")), "1,23,45,678.91");
        assert_eq!(format_amount(dec("-2500.5")), "-2,500.50");
        assert_eq!(format_amount(dec("-0.001")), "0.00");
    }

    #[test]
    fn rupee_prefix() {
        assert_eq!(format_rupees(dec("117")), "₹117.00");
    }
}
