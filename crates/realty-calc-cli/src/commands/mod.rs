pub mod amortization;
pub mod lending;
pub mod policy;
pub mod purchase_cost;
pub mod subscription;

use realty_calc_core::form::FormData;
use realty_calc_core::{RealtyCalcError, RealtyCalcResult};

/// Collect the flags that were actually given into a form, keyed by field name.
pub(crate) fn form_from_flags<'a>(
    flags: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> FormData {
    flags
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
}

/// Switch flags map onto checkbox values.
pub(crate) fn switch(on: bool) -> Option<&'static str> {
    on.then_some("on")
}

/// Run a form parser, naming the missing flag when a required field is absent.
pub(crate) fn parse_flags<T>(
    form: &FormData,
    parse: impl FnOnce(&FormData) -> RealtyCalcResult<T>,
) -> Result<T, Box<dyn std::error::Error>> {
    parse(form).map_err(|e| match e {
        RealtyCalcError::MissingField { field } => format!(
            "--{} is required (or provide --input)",
            field.replace('_', "-")
        )
        .into(),
        other => other.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use realty_calc_core::purchase_cost::PurchaseCostInput;

    #[test]
    fn unset_flags_are_left_out() {
        let form = form_from_flags([("price", Some("1,000")), ("first_home", switch(false))]);
        assert_eq!(form.get("price"), Some("1,000"));
        assert_eq!(form.get("first_home"), None);
    }

    #[test]
    fn missing_flag_is_named() {
        let form = form_from_flags([("first_home", switch(true))]);
        let err = parse_flags(&form, PurchaseCostInput::from_form).unwrap_err();
        assert_eq!(err.to_string(), "--price is required (or provide --input)");
    }
}
