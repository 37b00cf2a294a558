use pretty_assertions::assert_eq;
use realty_calc_core::form::FormData;
use realty_calc_core::policy::{PolicyConfig, TierTable};
use realty_calc_core::purchase_cost::{
    acquisition_tax_rate, calculate_purchase_cost, calculate_purchase_cost_with_policy,
    PurchaseCostInput,
};
use realty_calc_core::RealtyCalcError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Acquisition tax tiers
// ===========================================================================

fn buyer(price: Decimal) -> PurchaseCostInput {
    PurchaseCostInput {
        price,
        is_first_home: false,
        is_multiple_homes: false,
    }
}

#[test]
fn test_every_breakpoint_takes_the_upper_rate() {
    let policy = PolicyConfig::default().purchase_cost;
    let cases = [
        (dec!(599_999_999), dec!(0.01)),
        (dec!(600_000_000), dec!(0.02)),
        (dec!(899_999_999), dec!(0.02)),
        (dec!(900_000_000), dec!(0.03)),
        (dec!(1_199_999_999), dec!(0.03)),
        (dec!(1_200_000_000), dec!(0.04)),
        (dec!(5_000_000_000), dec!(0.04)),
    ];
    for (price, expected) in cases {
        assert_eq!(
            acquisition_tax_rate(price, false, false, &policy),
            expected,
            "price {price}"
        );
    }
}

#[test]
fn test_stamp_tax_breakpoints() {
    let cases = [
        (dec!(9_999_999), Decimal::ZERO),
        (dec!(10_000_000), dec!(7_000)),
        (dec!(100_000_000), dec!(35_000)),
        (dec!(1_000_000_000), dec!(70_000)),
    ];
    for (price, expected) in cases {
        let out = calculate_purchase_cost(&buyer(price)).unwrap();
        assert_eq!(out.result.breakdown.stamp_tax, expected, "price {price}");
    }
}

#[test]
fn test_total_is_sum_of_breakdown() {
    let out = calculate_purchase_cost(&buyer(dec!(950_000_000))).unwrap();
    let r = &out.result;
    assert_eq!(r.total_cost, r.breakdown.total());
    assert_eq!(r.total_cash_required, dec!(950_000_000) + r.total_cost);
    assert_eq!(r.cost_to_price_ratio, r.total_cost / dec!(950_000_000));
}

#[test]
fn test_first_home_discount_and_surcharge_stack() {
    let input = PurchaseCostInput {
        price: dec!(800_000_000),
        is_first_home: true,
        is_multiple_homes: true,
    };
    let out = calculate_purchase_cost(&input).unwrap();
    // 1% first-home rate, then × 1.2
    assert_eq!(out.result.acquisition_tax_rate, dec!(0.012));
    assert!(out.result.first_home_discount_applied);
    assert!(out.result.multiple_homes_surcharge_applied);
    assert_eq!(out.warnings.len(), 1);
}

// ===========================================================================
// Policy overrides
// ===========================================================================

#[test]
fn test_replaced_rate_table_is_used() {
    let mut policy = PolicyConfig::default();
    policy.purchase_cost.acquisition_rates =
        TierTable::new(dec!(0.011), vec![(dec!(300_000_000), dec!(0.022))]);
    let out = calculate_purchase_cost_with_policy(&buyer(dec!(500_000_000)), &policy).unwrap();
    assert_eq!(out.result.acquisition_tax_rate, dec!(0.022));
    assert_eq!(out.result.breakdown.acquisition_tax, dec!(11_000_000));
}

#[test]
fn test_policy_from_json_keeps_missing_sections() {
    let policy = PolicyConfig::from_json_str(
        r#"{ "year": 2025, "purchase_cost": { "acquisition_rates": { "base": "0.01" },
              "first_home_rate": "0.01", "first_home_price_cap": "900000000",
              "multiple_homes_multiplier": "1.2", "registration_tax_share": "0.2",
              "education_tax_share": "0.2", "stamp_tax": { "base": "0" },
              "brokerage_rate": "0.005", "misc_fees": "0" } }"#,
    )
    .unwrap();
    assert_eq!(policy.year, 2025);
    assert_eq!(policy.lending, PolicyConfig::default().lending);

    let out = calculate_purchase_cost_with_policy(&buyer(dec!(1_000_000_000)), &policy).unwrap();
    let b = &out.result.breakdown;
    assert_eq!(b.acquisition_tax, dec!(10_000_000));
    assert_eq!(b.stamp_tax, Decimal::ZERO);
    assert_eq!(b.brokerage_fee, dec!(5_000_000));
    assert_eq!(out.metadata.policy_year, Some(2025));
}

// ===========================================================================
// Form input
// ===========================================================================

#[test]
fn test_form_errors_are_tagged() {
    let blank = FormData::new().with("price", "  ");
    assert!(matches!(
        PurchaseCostInput::from_form(&blank),
        Err(RealtyCalcError::MissingField { ref field }) if field == "price"
    ));

    let text = FormData::new().with("price", "five hundred million");
    assert!(matches!(
        PurchaseCostInput::from_form(&text),
        Err(RealtyCalcError::NonNumeric { .. })
    ));

    let negative = FormData::new().with("price", "-1");
    assert!(matches!(
        PurchaseCostInput::from_form(&negative),
        Err(RealtyCalcError::OutOfRange { .. })
    ));
}

#[test]
fn test_form_with_grouped_digits_matches_typed_input() {
    let form = FormData::new().with("price", "500,000,000");
    let from_form = calculate_purchase_cost(&PurchaseCostInput::from_form(&form).unwrap()).unwrap();
    let typed = calculate_purchase_cost(&buyer(dec!(500_000_000))).unwrap();
    assert_eq!(from_form.result, typed.result);
    assert_eq!(typed.result.total_cost, dec!(10_235_000));
}

#[test]
fn test_price_beyond_supported_range_rejected() {
    let err = calculate_purchase_cost(&buyer(Decimal::MAX)).unwrap_err();
    assert_eq!(err.field(), Some("price"));

    let out = calculate_purchase_cost(&buyer(realty_calc_core::MAX_AMOUNT)).unwrap();
    assert_eq!(
        out.result.total_cash_required,
        realty_calc_core::MAX_AMOUNT + out.result.total_cost
    );
}
