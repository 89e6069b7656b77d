//! Figures derived from the business document for the analysis views.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{BusinessDataDocument, InvoiceDraft, StockItem};
use crate::totals::{TaxRates, compute_totals};

pub const UNASSIGNED_STAFF: &str = "Unassigned";

/// Quantities below `low` are low stock, above `high` overstocked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StockThresholds {
    pub low: u32,
    pub high: u32,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self { low: 5, high: 50 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    OutOfStock,
    Low,
    Overstocked,
    Ok,
}

impl StockStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of Stock",
            Self::Low => "Low Stock",
            Self::Overstocked => "Overstocked",
            Self::Ok => "OK",
        }
    }

    pub fn needs_attention(self) -> bool {
        matches!(self, Self::OutOfStock | Self::Low)
    }
}

pub fn stock_status(quantity: Decimal, thresholds: StockThresholds) -> StockStatus {
    if quantity <= Decimal::ZERO {
        StockStatus::OutOfStock
    } else if quantity < Decimal::from(thresholds.low) {
        StockStatus::Low
    } else if quantity > Decimal::from(thresholds.high) {
        StockStatus::Overstocked
    } else {
        StockStatus::Ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLine {
    pub name: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub value: Decimal,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReport {
    pub lines: Vec<StockLine>,
    pub total_value: Decimal,
}

pub fn stock_report(stock: &[StockItem], thresholds: StockThresholds) -> StockReport {
    let lines: Vec<StockLine> = stock
        .iter()
        .map(|item| {
            let quantity = item.quantity_value();
            let price = item.price_value();
            StockLine {
                name: item.name.clone(),
                quantity,
                price,
                value: quantity.saturating_mul(price),
                status: stock_status(quantity, thresholds),
            }
        })
        .collect();
    let total_value = lines
        .iter()
        .fold(Decimal::ZERO, |sum, line| sum.saturating_add(line.value));
    StockReport { lines, total_value }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRevenue {
    pub staff: String,
    pub services: usize,
    pub revenue: Decimal,
}

/// Revenue per staff member on the current bill, highest first. Blank rows
/// are skipped.
pub fn staff_breakdown(draft: &InvoiceDraft) -> Vec<StaffRevenue> {
    let mut by_staff: BTreeMap<&str, (usize, Decimal)> = BTreeMap::new();
    for item in &draft.line_items {
        if item.description.trim().is_empty() && item.subtotal().is_zero() {
            continue;
        }
        let staff = item
            .staff_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNASSIGNED_STAFF);
        let entry = by_staff.entry(staff).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(item.subtotal());
    }

    let mut rows: Vec<StaffRevenue> = by_staff
        .into_iter()
        .map(|(staff, (services, revenue))| StaffRevenue {
            staff: staff.to_owned(),
            services,
            revenue,
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.staff.cmp(&b.staff)));
    rows
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub stock_items: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub stock_value: Decimal,
    pub employees: usize,
    pub bill_rows: usize,
    pub bill_total: Decimal,
    pub top_service: Option<String>,
}

pub fn dashboard_summary(
    document: &BusinessDataDocument,
    rates: &TaxRates,
    thresholds: StockThresholds,
) -> DashboardSummary {
    let report = stock_report(&document.stock, thresholds);
    let count = |status: StockStatus| report.lines.iter().filter(|l| l.status == status).count();
    let top_service = document
        .invoice
        .line_items
        .iter()
        .filter(|item| !item.description.trim().is_empty())
        .max_by_key(|item| item.subtotal())
        .map(|item| item.description.clone());

    DashboardSummary {
        stock_items: report.lines.len(),
        low_stock: count(StockStatus::Low),
        out_of_stock: count(StockStatus::OutOfStock),
        stock_value: report.total_value,
        employees: document.employees.len(),
        bill_rows: document.invoice.line_items.len(),
        bill_total: compute_totals(&document.invoice, rates).total,
        top_service,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;

    fn product(name: &str, quantity: &str, price: &str) -> StockItem {
        StockItem {
            name: name.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }

    fn service(description: &str, staff: Option<&str>, rate: &str, quantity: &str) -> LineItem {
        LineItem {
            description: description.into(),
            staff_name: staff.map(Into::into),
            rate: rate.into(),
            quantity: quantity.into(),
        }
    }

    #[test]
    fn stock_statuses_follow_thresholds() {
        let t = StockThresholds::default();
        assert_eq!(stock_status(Decimal::ZERO, t), StockStatus::OutOfStock);
        assert_eq!(stock_status(Decimal::from(2), t), StockStatus::Low);
        assert_eq!(stock_status(Decimal::from(5), t), StockStatus::Ok);
        assert_eq!(stock_status(Decimal::from(50), t), StockStatus::Ok);
        assert_eq!(stock_status(Decimal::from(60), t), StockStatus::Overstocked);
        assert!(StockStatus::Low.needs_attention());
        assert!(!StockStatus::Overstocked.needs_attention());
    }

    #[test]
    fn report_values_inventory() {
        let stock = vec![
            product("Shampoo", "2", "350"),
            product("Conditioner", "0", "420"),
            product("Hair Gel", "60", "120.50"),
            product("Serum", "", "900"),
        ];
        let report = stock_report(&stock, StockThresholds::default());
        assert_eq!(report.lines[0].value, Decimal::from(700));
        assert_eq!(report.lines[2].value, Decimal::from(7230));
        assert_eq!(report.lines[3].status, StockStatus::OutOfStock);
        assert_eq!(report.total_value, Decimal::from(7930));
    }

    #[test]
    fn staff_revenue_is_grouped_and_sorted() {
        let draft = InvoiceDraft {
            line_items: vec![
                service("Haircut", Some("Amit"), "300", "2"),
                service("Facial", Some("Priya"), "800", "1"),
                service("Shave", Some("Amit"), "150", "1"),
                service("Wash", None, "100", "1"),
                service("", None, "", ""),
            ],
            ..InvoiceDraft::default()
        };
        let rows = staff_breakdown(&draft);
        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.staff.as_str(), r.services, r.revenue))
            .collect();
        assert_eq!(
            summary,
            [
                ("Priya", 1, Decimal::from(800)),
                ("Amit", 2, Decimal::from(750)),
                (UNASSIGNED_STAFF, 1, Decimal::from(100)),
            ]
        );
    }

    #[test]
    fn summary_counts() {
        let mut doc = BusinessDataDocument::default();
        doc.stock = vec![product("A", "0", "1"), product("B", "3", "1"), product("C", "10", "1")];
        doc.invoice.line_items = vec![
            service("Haircut", None, "300", "1"),
            service("Spa", None, "1500", "1"),
        ];
        let summary = dashboard_summary(&doc, &TaxRates::default(), StockThresholds::default());
        assert_eq!(summary.stock_items, 3);
        assert_eq!(summary.out_of_stock, 1);
        assert_eq!(summary.low_stock, 1);
        assert_eq!(summary.bill_rows, 2);
        assert_eq!(summary.bill_total, Decimal::from(1800));
        assert_eq!(summary.top_service.as_deref(), Some("Spa"));
    }
}
