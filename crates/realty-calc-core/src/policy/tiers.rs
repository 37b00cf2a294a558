use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RealtyCalcError;
use crate::types::Money;
use crate::RealtyCalcResult;

/// One breakpoint of a [`TierTable`]: `value` applies from `threshold` upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier<T> {
    pub threshold: Money,
    pub value: T,
}

/// Ordered breakpoint list with "≥" semantics.
///
/// An amount equal to a threshold belongs to the tier that starts there.
/// Amounts below the first threshold get `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct TierTable<T> {
    pub base: T,
    #[serde(default)]
    pub tiers: Vec<Tier<T>>,
}

impl<T> TierTable<T> {
    pub fn new(base: T, tiers: Vec<(Money, T)>) -> Self {
        TierTable {
            base,
            tiers: tiers
                .into_iter()
                .map(|(threshold, value)| Tier { threshold, value })
                .collect(),
        }
    }

    pub fn lookup(&self, amount: Money) -> &T {
        self.tiers
            .iter()
            .rev()
            .find(|tier| amount >= tier.threshold)
            .map(|tier| &tier.value)
            .unwrap_or(&self.base)
    }

    /// Thresholds must be non-negative and strictly ascending.
    pub fn validate(&self, name: &str) -> RealtyCalcResult<()> {
        let mut previous: Option<Money> = None;
        for tier in &self.tiers {
            if tier.threshold < Decimal::ZERO {
                return Err(RealtyCalcError::InvalidPolicy(format!(
                    "{name}: threshold {} is negative",
                    tier.threshold
                )));
            }
            if let Some(prev) = previous {
                if tier.threshold <= prev {
                    return Err(RealtyCalcError::InvalidPolicy(format!(
                        "{name}: thresholds must be strictly ascending ({} after {prev})",
                        tier.threshold
                    )));
                }
            }
            previous = Some(tier.threshold);
        }
        Ok(())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.base).chain(self.tiers.iter().map(|t| &t.value))
    }
}

/// Inclusive range awarding `points`. Open ends are unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    pub points: i32,
}

impl ScoreBand {
    pub fn between(min: Decimal, max: Decimal, points: i32) -> Self {
        ScoreBand {
            min: Some(min),
            max: Some(max),
            points,
        }
    }

    pub fn up_to(max: Decimal, points: i32) -> Self {
        ScoreBand {
            min: None,
            max: Some(max),
            points,
        }
    }

    fn contains(&self, value: Decimal) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Bands checked in order; the first containing band wins, else `fallback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub bands: Vec<ScoreBand>,
    pub fallback: i32,
}

impl BandTable {
    pub fn points_for(&self, value: Decimal) -> i32 {
        self.bands
            .iter()
            .find(|band| band.contains(value))
            .map(|band| band.points)
            .unwrap_or(self.fallback)
    }

    pub fn validate(&self, name: &str) -> RealtyCalcResult<()> {
        for band in &self.bands {
            if let (Some(min), Some(max)) = (band.min, band.max) {
                if min > max {
                    return Err(RealtyCalcError::InvalidPolicy(format!(
                        "{name}: band minimum {min} exceeds maximum {max}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate_table() -> TierTable<Decimal> {
        TierTable::new(
            dec!(0.01),
            vec![(dec!(600), dec!(0.02)), (dec!(900), dec!(0.03))],
        )
    }

    #[test]
    fn test_lookup_below_first_threshold_uses_base() {
        assert_eq!(*rate_table().lookup(dec!(599.99)), dec!(0.01));
    }

    #[test]
    fn test_lookup_threshold_is_inclusive() {
        let table = rate_table();
        assert_eq!(*table.lookup(dec!(600)), dec!(0.02));
        assert_eq!(*table.lookup(dec!(900)), dec!(0.03));
        assert_eq!(*table.lookup(dec!(1_000_000)), dec!(0.03));
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        let table = TierTable::new(0, vec![(dec!(10), 1), (dec!(10), 2)]);
        assert!(matches!(
            table.validate("stamp_tax"),
            Err(RealtyCalcError::InvalidPolicy(_))
        ));
        assert!(rate_table().validate("rates").is_ok());
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Limit {
        ltv: Decimal,
    }

    #[test]
    fn test_deserialize_without_tiers_or_default_value() {
        let table: TierTable<Limit> = serde_json::from_str(r#"{"base": {"ltv": "0.5"}}"#).unwrap();
        assert!(table.tiers.is_empty());
        assert_eq!(table.lookup(dec!(9_000_000_000)).ltv, dec!(0.5));
    }

    #[test]
    fn test_band_first_match_wins() {
        let bands = BandTable {
            bands: vec![
                ScoreBand::between(dec!(30), dec!(40), 20),
                ScoreBand::between(dec!(25), dec!(45), 15),
            ],
            fallback: 10,
        };
        assert_eq!(bands.points_for(dec!(35)), 20);
        assert_eq!(bands.points_for(dec!(40)), 20);
        assert_eq!(bands.points_for(dec!(41)), 15);
        assert_eq!(bands.points_for(dec!(19)), 10);
    }

    #[test]
    fn test_open_ended_band() {
        let bands = BandTable {
            bands: vec![ScoreBand::up_to(dec!(100), 20)],
            fallback: 10,
        };
        assert_eq!(bands.points_for(Decimal::ZERO), 20);
        assert_eq!(bands.points_for(dec!(100.01)), 10);
    }
}
