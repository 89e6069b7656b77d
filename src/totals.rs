use rust_decimal::Decimal;
use serde::Serialize;

use crate::amount::{clamp_percent, parse_amount, parse_percent};
use crate::model::InvoiceDraft;

/// CGST and SGST percentages. Supplied per session, never stored with the draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaxRates {
    pub cgst_percent: Decimal,
    pub sgst_percent: Decimal,
}

impl TaxRates {
    pub fn new(cgst_percent: Decimal, sgst_percent: Decimal) -> Self {
        Self { cgst_percent, sgst_percent }
    }

    /// Builds rates from user-entered text with the usual zero coercion.
    pub fn from_inputs(cgst: &str, sgst: &str) -> Self {
        Self::new(parse_amount(cgst), parse_amount(sgst))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub cgst_percent: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_percent: Decimal,
    pub sgst_amount: Decimal,
    pub total: Decimal,
}

/// Derives the bill totals. Nothing is rounded here.
///
/// Discount and both taxes are taken from the pre-discount subtotal.
pub fn compute_totals(draft: &InvoiceDraft, rates: &TaxRates) -> Totals {
    let subtotal = draft
        .line_items
        .iter()
        .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.subtotal()));

    let discount_percent = parse_percent(&draft.discount_percent);
    let cgst_percent = clamp_percent(rates.cgst_percent);
    let sgst_percent = clamp_percent(rates.sgst_percent);

    let discount_amount = percent_of(subtotal, discount_percent);
    let cgst_amount = percent_of(subtotal, cgst_percent);
    let sgst_amount = percent_of(subtotal, sgst_percent);

    Totals {
        subtotal,
        discount_percent,
        discount_amount,
        cgst_percent,
        cgst_amount,
        sgst_percent,
        sgst_amount,
        total: subtotal
            .saturating_sub(discount_amount)
            .saturating_add(cgst_amount)
            .saturating_add(sgst_amount),
    }
}

fn percent_of(base: Decimal, percent: Decimal) -> Decimal {
    base.saturating_mul(percent) / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;

    fn row(rate: &str, quantity: &str) -> LineItem {
        LineItem {
            description: "service".into(),
            rate: rate.into(),
            quantity: quantity.into(),
            ..LineItem::default()
        }
    }

    fn draft(rows: Vec<LineItem>, discount: &str) -> InvoiceDraft {
        InvoiceDraft {
            line_items: rows,
            discount_percent: discount.into(),
            ..InvoiceDraft::default()
        }
    }

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn two_rows_with_discount_and_gst() {
        let bill = draft(vec![row("500", "2"), row("300", "1")], "10");
        let totals = compute_totals(&bill, &TaxRates::new(dec(9), dec(9)));
        assert_eq!(totals.subtotal, dec(1300));
        assert_eq!(totals.discount_amount, dec(130));
        assert_eq!(totals.cgst_amount, dec(117));
        assert_eq!(totals.sgst_amount, dec(117));
        assert_eq!(totals.total, dec(1404));
    }

    #[test]
    fn empty_rate_counts_as_zero() {
        let bill = draft(vec![row("", "5")], "");
        let totals = compute_totals(&bill, &TaxRates::default());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn zero_percentages_leave_subtotal_unchanged() {
        let bill = draft(vec![row("199.99", "3"), row("49.5", "2")], "0");
        let totals = compute_totals(&bill, &TaxRates::from_inputs("0", "0"));
        assert_eq!(totals.total, totals.subtotal);
        assert_eq!(totals.subtotal, Decimal::new(69897, 2));
    }

    #[test]
    fn total_identity_holds_across_percentages() {
        let bill = draft(vec![row("1234.56", "7"), row("0.35", "13"), row("x", "9")], "");
        for discount in [0, 5, 12, 50, 100] {
            for cgst in [0, 2, 9, 14] {
                let bill = bill.with_discount_percent(discount.to_string());
                let t = compute_totals(&bill, &TaxRates::new(dec(cgst), dec(cgst / 2)));
                assert_eq!(
                    t.total,
                    t.subtotal - t.discount_amount + t.cgst_amount + t.sgst_amount
                );
            }
        }
    }

    #[test]
    fn taxes_use_the_pre_discount_subtotal() {
        let bill = draft(vec![row("1000", "1")], "50");
        let totals = compute_totals(&bill, &TaxRates::new(dec(10), Decimal::ZERO));
        assert_eq!(totals.cgst_amount, dec(100));
        assert_eq!(totals.total, dec(600));
    }

    #[test]
    fn negative_rows_reduce_the_subtotal() {
        let bill = draft(vec![row("500", "1"), row("-200", "1")], "");
        let totals = compute_totals(&bill, &TaxRates::default());
        assert_eq!(totals.subtotal, dec(300));
    }

    #[test]
    fn out_of_range_percentages_are_clamped() {
        let bill = draft(vec![row("100", "1")], "250");
        let totals = compute_totals(&bill, &TaxRates::new(dec(-5), dec(120)));
        assert_eq!(totals.discount_percent, Decimal::ONE_HUNDRED);
        assert_eq!(totals.cgst_amount, Decimal::ZERO);
        assert_eq!(totals.sgst_amount, dec(100));
        assert_eq!(totals.total, dec(100));
    }
}
