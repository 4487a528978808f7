use crate::models::{finite_or_zero, DiscountType, LineItem, OverallDiscount, Totals};

/// Row amount after the row's own discount: `qty * price * (1 - disc/100)`,
/// written out in the same order as the totals so the numbers agree.
pub fn line_net(item: &LineItem) -> f64 {
    let gross = finite_or_zero(item.quantity) * finite_or_zero(item.unit_price);
    let discount = gross * (finite_or_zero(item.discount_percent) / 100.0);
    gross - discount
}

/// Derives the invoice totals. Pure; no rounding happens here.
///
/// An amount discount is not clamped to the subtotal, so the grand total may
/// go negative.
pub fn compute_totals(items: &[LineItem], discount: &OverallDiscount, tax_percent: f64) -> Totals {
    let subtotal = items.iter().fold(0.0, |sum, item| sum + line_net(item));

    let discount_value = finite_or_zero(discount.value);
    let final_discount = match discount.kind {
        DiscountType::Percent => subtotal * (discount_value / 100.0),
        DiscountType::Amount => discount_value,
    };

    let tax = (subtotal - final_discount) * (finite_or_zero(tax_percent) / 100.0);
    let grand_total = subtotal - final_discount + tax;

    Totals {
        subtotal,
        final_discount,
        tax,
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(quantity: f64, unit_price: f64, discount_percent: f64) -> LineItem {
        LineItem {
            quantity,
            unit_price,
            discount_percent,
            ..LineItem::new("item", "piece")
        }
    }

    #[test]
    fn test_reference_scenario() {
        let items = vec![item(1.0, 42_500_000.0, 5.0), item(2.0, 1_200_000.0, 0.0)];
        let totals = compute_totals(&items, &OverallDiscount::percent(3.0), 9.0);

        assert_eq!(line_net(&items[0]), 40_375_000.0);
        assert_eq!(line_net(&items[1]), 2_400_000.0);
        assert_eq!(totals.subtotal, 42_775_000.0);
        assert_eq!(totals.final_discount, 1_283_250.0);
        assert!((totals.tax - 3_734_257.5).abs() < 1e-6);
        assert!((totals.grand_total - 45_226_007.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_items() {
        let totals = compute_totals(&[], &OverallDiscount::percent(10.0), 9.0);
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_amount_discount_is_not_clamped() {
        let items = vec![item(1.0, 1000.0, 0.0)];
        let totals = compute_totals(&items, &OverallDiscount::amount(5000.0), 10.0);

        assert_eq!(totals.final_discount, 5000.0);
        assert_eq!(totals.tax, -400.0);
        assert_eq!(totals.grand_total, -4400.0);
    }

    #[test]
    fn test_non_finite_fields_contribute_zero() {
        let items = vec![
            item(f64::NAN, 100.0, 0.0),
            item(2.0, f64::INFINITY, 0.0),
            item(1.0, 50.0, f64::NAN),
        ];
        let totals = compute_totals(&items, &OverallDiscount::amount(f64::NAN), f64::NAN);

        assert_eq!(totals.subtotal, 50.0);
        assert_eq!(totals.final_discount, 0.0);
        assert_eq!(totals.tax, 0.0);
        assert_eq!(totals.grand_total, 50.0);
    }

    #[test]
    fn test_malformed_json_row_contributes_zero() {
        let items: Vec<LineItem> = serde_json::from_str(
            r#"[{"name":"ok","quantity":2,"unitPrice":10},{"name":"bad","quantity":"x","unitPrice":{}}]"#,
        )
        .unwrap();
        let totals = compute_totals(&items, &OverallDiscount::default(), 0.0);
        assert_eq!(totals.subtotal, 20.0);
    }

    fn arb_item() -> impl Strategy<Value = LineItem> {
        (0.0f64..1_000.0, 0.0f64..10_000_000.0, 0.0f64..=100.0)
            .prop_map(|(q, p, d)| item(q, p, d))
    }

    fn arb_discount() -> impl Strategy<Value = OverallDiscount> {
        prop_oneof![
            (0.0f64..=100.0).prop_map(OverallDiscount::percent),
            (0.0f64..1e9).prop_map(OverallDiscount::amount),
        ]
    }

    proptest! {
        #[test]
        fn prop_grand_total_identity(
            items in prop::collection::vec(arb_item(), 0..20),
            discount in arb_discount(),
            tax in 0.0f64..50.0,
        ) {
            let t = compute_totals(&items, &discount, tax);
            prop_assert_eq!(t.grand_total, t.subtotal - t.final_discount + t.tax);
        }

        #[test]
        fn prop_order_independent(
            items in prop::collection::vec(arb_item(), 0..20),
            discount in arb_discount(),
            tax in 0.0f64..50.0,
        ) {
            let forward = compute_totals(&items, &discount, tax);
            let mut reversed = items.clone();
            reversed.reverse();
            let backward = compute_totals(&reversed, &discount, tax);

            let tolerance = 1e-6 * forward.subtotal.abs().max(1.0);
            prop_assert!((forward.subtotal - backward.subtotal).abs() <= tolerance);
            prop_assert!((forward.grand_total - backward.grand_total).abs() <= tolerance * 2.0);
        }

        #[test]
        fn prop_discount_kinds(
            items in prop::collection::vec(arb_item(), 0..10),
            value in 0.0f64..100.0,
        ) {
            let percent = compute_totals(&items, &OverallDiscount::percent(value), 0.0);
            prop_assert_eq!(percent.final_discount, percent.subtotal * (value / 100.0));

            let amount = compute_totals(&items, &OverallDiscount::amount(value), 0.0);
            prop_assert_eq!(amount.final_discount, value);
        }
    }
}
