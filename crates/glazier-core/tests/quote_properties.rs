//! Property tests for the quote pipeline.

mod common;

use common::{custom_formula_config, sample_config};
use glazier_core::{calculate_quote, ClipSize, QuoteRequest};
use proptest::prelude::*;

fn thickness() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("1/8"),
        Just("3/16"),
        Just("1/4"),
        Just("3/8"),
        Just("1/2"),
    ]
}

fn glass_type() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("clear"), Just("bronze"), Just("mirror"), Just("frosted")]
}

/// Valid rectangular requests for materials without rule conflicts.
fn priceable_request() -> impl Strategy<Value = QuoteRequest> {
    (
        1.0f64..120.0,
        1.0f64..120.0,
        prop_oneof![Just("3/16"), Just("1/4"), Just("3/8"), Just("1/2")],
        1u32..10,
        any::<bool>(),
        any::<bool>(),
        0u8..=4,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(width, height, thickness, quantity, polished, beveled, corners, tempered, shaped)| {
                let mut request = QuoteRequest::rectangle(width, height, thickness, "clear");
                request.quantity = quantity;
                request.is_polished = polished;
                request.is_beveled = beveled;
                request.num_clipped_corners = corners;
                request.clip_size = ClipSize::Under1;
                request.is_tempered = tempered;
                request.is_non_rectangular = shaped;
                request
            },
        )
}

proptest! {
    #[test]
    fn prop_quotes_are_idempotent(request in priceable_request(), contractor in any::<bool>()) {
        let config = sample_config();
        let mut request = request;
        request.is_contractor = contractor;

        let first = calculate_quote(&config, &request);
        let second = calculate_quote(&config, &request);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_small_pieces_bill_the_minimum(width in 1.0f64..20.0, height in 1.0f64..20.0) {
        prop_assume!(width * height / 144.0 < 3.0);
        let config = sample_config();

        let result = calculate_quote(&config, &QuoteRequest::rectangle(width, height, "1/4", "clear"));
        prop_assert_eq!(result.billable_sq_ft, 3.0);
        prop_assert_eq!(result.actual_sq_ft, width * height / 144.0);
        prop_assert!(result.actual_sq_ft < result.billable_sq_ft);
    }

    #[test]
    fn prop_disabling_a_component_zeroes_only_that_term(request in priceable_request(), which in 0usize..4) {
        let config = sample_config();
        let mut disabled = config.clone();
        let toggles = &mut disabled.formula.toggles;
        match which {
            0 => toggles.base_price = false,
            1 => toggles.polish = false,
            2 => toggles.beveled = false,
            _ => toggles.clipped_corners = false,
        }

        let on = calculate_quote(&config, &request);
        let off = calculate_quote(&disabled, &request);

        let terms = |r: &glazier_core::QuoteResult| {
            [
                r.base_price,
                r.polish_price.unwrap_or(0.0),
                r.beveled_price.unwrap_or(0.0),
                r.clipped_corners_price.unwrap_or(0.0),
            ]
        };
        let (on_terms, off_terms) = (terms(&on), terms(&off));
        for (i, (a, b)) in on_terms.iter().zip(off_terms.iter()).enumerate() {
            if i == which {
                prop_assert_eq!(*b, 0.0);
            } else {
                prop_assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn prop_disabling_a_markup_zeroes_only_that_markup(request in priceable_request(), tempered_off in any::<bool>()) {
        let config = sample_config();
        let mut disabled = config.clone();
        if tempered_off {
            disabled.formula.toggles.tempered_markup = false;
        } else {
            disabled.formula.toggles.shape_markup = false;
        }

        let on = calculate_quote(&config, &request);
        let off = calculate_quote(&disabled, &request);

        prop_assert_eq!(on.before_markups_subtotal, off.before_markups_subtotal);
        if tempered_off {
            prop_assert!(off.tempered_price.is_none());
            prop_assert_eq!(on.shape_price, off.shape_price);
        } else {
            prop_assert!(off.shape_price.is_none());
            prop_assert_eq!(on.tempered_price, off.tempered_price);
        }
    }

    #[test]
    fn prop_thin_tempered_is_always_rejected(
        width in 1.0f64..120.0,
        height in 1.0f64..120.0,
        glass in glass_type(),
        polished in any::<bool>(),
        beveled in any::<bool>(),
        corners in 0u8..=4,
        contractor in any::<bool>(),
    ) {
        let config = sample_config();
        let mut request = QuoteRequest::rectangle(width, height, "1/8", glass);
        request.is_tempered = true;
        request.is_polished = polished;
        request.is_beveled = beveled;
        request.num_clipped_corners = corners;
        request.is_contractor = contractor;

        let result = calculate_quote(&config, &request);
        prop_assert!(result.is_error());
        prop_assert_eq!(result.quote_price, 0.0);
    }

    #[test]
    fn prop_forbidden_formulas_fall_back_to_divisor(
        forbidden in prop_oneof![
            Just("import os"),
            Just("__import__('os')"),
            Just("exec('total')"),
            Just("eval(total)"),
            Just("open('/etc/passwd')"),
            Just("lambda x: x"),
            Just("(x) => x"),
            Just("new Object()"),
            Just("total.__class__"),
            Just("globals()"),
            Just("[total]"),
            Just("total = 1"),
        ],
        request in priceable_request(),
    ) {
        let config = custom_formula_config(forbidden);
        let result = calculate_quote(&config, &request);
        prop_assert!(result.error.is_none());
        prop_assert_eq!(result.quote_price, result.total / 0.28);
    }

    #[test]
    fn prop_contractor_always_pays_less(request in priceable_request()) {
        let config = sample_config();
        let mut contractor = request.clone();
        contractor.is_contractor = true;

        let retail = calculate_quote(&config, &request);
        let discounted = calculate_quote(&config, &contractor);
        prop_assert!(discounted.quote_price < retail.quote_price);
    }

    #[test]
    fn prop_any_thickness_and_type_never_panics(
        thickness in thickness(),
        glass in glass_type(),
        width in -10.0f64..200.0,
        height in -10.0f64..200.0,
    ) {
        let config = sample_config();
        let result = calculate_quote(&config, &QuoteRequest::rectangle(width, height, thickness, glass));
        if result.error.is_none() {
            prop_assert!(result.quote_price.is_finite());
            prop_assert!(result.quote_price >= 0.0);
        }
    }
}
