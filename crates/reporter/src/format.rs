use rust_decimal::{Decimal, RoundingStrategy};

/// Shown wherever a value cannot be computed for the selection.
pub const NOT_AVAILABLE: &str = "N/A";

/// Rounds half-to-even and groups the integer part in thousands,
/// e.g. `1234567.891` with 2 decimals becomes `1,234,567.89`.
pub fn format_grouped(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = format!("{:.*}", decimals as usize, rounded.abs());

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Whole dollars, grouped. The `$` is left to the caller.
pub fn format_usd(value: Decimal) -> String {
    format_grouped(value, 0)
}

/// Millions with one decimal, e.g. `2,345,678` becomes `2.3`.
pub fn format_millions(value: Decimal) -> String {
    format_grouped(value / Decimal::from(1_000_000), 1)
}

/// `$1,234`, or `N/A` when there is nothing to show.
pub fn format_optional_usd(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("${}", format_usd(v)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// A 0-1 ratio as a percentage with one decimal, e.g. `52.3%`.
pub fn format_percent(ratio: Option<f64>) -> String {
    ratio
        .map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// A leverage multiple with one decimal, e.g. `3.5x`.
pub fn format_leverage(leverage: Option<f64>) -> String {
    leverage
        .map(|l| format!("{:.1}x", l))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_usd(dec!(0)), "0");
        assert_eq!(format_usd(dec!(999)), "999");
        assert_eq!(format_usd(dec!(1000)), "1,000");
        assert_eq!(format_usd(dec!(1234567.4)), "1,234,567");
        assert_eq!(format_grouped(dec!(57000), 2), "57,000.00");
    }

    #[test]
    fn negative_amounts_keep_their_sign_outside_the_grouping() {
        assert_eq!(format_usd(dec!(-123456)), "-123,456");
        assert_eq!(format_usd(dec!(-0.4)), "0");
    }

    #[test]
    fn rounds_half_to_even() {
        assert_eq!(format_usd(dec!(2.5)), "2");
        assert_eq!(format_usd(dec!(3.5)), "4");
    }

    #[test]
    fn millions_keep_one_decimal() {
        assert_eq!(format_millions(dec!(2345678)), "2.3");
        assert_eq!(format_millions(dec!(1250000000)), "1,250.0");
        assert_eq!(format_millions(dec!(0)), "0.0");
    }

    #[test]
    fn missing_values_render_as_not_available() {
        assert_eq!(format_optional_usd(Some(dec!(-411.52))), "$-412");
        assert_eq!(format_optional_usd(None), "N/A");
        assert_eq!(format_percent(Some(0.5234)), "52.3%");
        assert_eq!(format_percent(None), "N/A");
        assert_eq!(format_leverage(Some(3.456)), "3.5x");
        assert_eq!(format_leverage(None), "N/A");
    }
}
