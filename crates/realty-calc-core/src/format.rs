use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::Money;

const EOK: Decimal = dec!(100_000_000);
const CHEONMAN: Decimal = dec!(10_000_000);
const MAN: Decimal = dec!(10_000);

/// Round to the nearest won and group thousands: 1347134.06 -> "1,347,134".
pub fn group_thousands(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Compact Korean-unit rendering used in result summaries.
///
/// 억 (1e8) amounts keep one decimal, 천만 (1e7) and 만 (1e4) amounts round to
/// whole units, anything smaller is printed in full.
pub fn format_won(amount: Money) -> String {
    let value = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    if value >= EOK {
        let eok = (value / EOK).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.1}억원", eok)
    } else if value >= CHEONMAN {
        format!("{}천만원", round_whole(value / CHEONMAN))
    } else if value >= MAN {
        format!("{}만원", round_whole(value / MAN))
    } else {
        format!("{}원", group_thousands(value))
    }
}

/// Fraction rendered as a percentage with two decimals: 0.3512 -> "35.12%".
pub fn format_percent(ratio: Decimal) -> String {
    let pct = (ratio * dec!(100)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", pct)
}

fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(dec!(1347134.06)), "1,347,134");
        assert_eq!(group_thousands(dec!(999)), "999");
        assert_eq!(group_thousands(dec!(1000)), "1,000");
        assert_eq!(group_thousands(dec!(-2500000)), "-2,500,000");
        assert_eq!(group_thousands(Decimal::ZERO), "0");
    }

    #[test]
    fn test_format_won_units() {
        assert_eq!(format_won(dec!(350_000_000)), "3.5억원");
        assert_eq!(format_won(dec!(1_200_000_000)), "12.0억원");
        assert_eq!(format_won(dec!(45_000_000)), "5천만원");
        assert_eq!(format_won(dec!(2_340_000)), "234만원");
        assert_eq!(format_won(dec!(7_000)), "7,000원");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(0.3512)), "35.12%");
        assert_eq!(format_percent(dec!(0.4)), "40.00%");
    }
}
