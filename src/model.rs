use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::parse_amount;

/// Version written into every stored document.
pub const SCHEMA_VERSION: u32 = 2;

pub const DEFAULT_FOOTER: &str = "Thank you for your business!";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// Answers collected by the onboarding wizard.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Onboarding {
    pub category: String,
    pub subcategories: Vec<String>,
    pub business_info: BusinessInfo,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub plan: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Business Name".into(),
            email: "business@email.com".into(),
            phone: "9876543210".into(),
            address: "123 Main St, City, State".into(),
            plan: "Free Trial".into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientDetails {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub invoice_number: String,
    pub date: String,
    pub payment_mode: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    Cash,
    Card,
    Upi,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 3] = [Self::Cash, Self::Card, Self::Upi];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Upi => "UPI",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|m| m.label().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One billable service row. Rate and quantity keep the text as typed.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    pub rate: String,
    pub quantity: String,
}

impl LineItem {
    pub fn rate_value(&self) -> Decimal {
        parse_amount(&self.rate)
    }

    pub fn quantity_value(&self) -> Decimal {
        parse_amount(&self.quantity)
    }

    pub fn subtotal(&self) -> Decimal {
        self.rate_value().saturating_mul(self.quantity_value())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_number: String,
}

impl Default for BankDetails {
    fn default() -> Self {
        Self {
            bank_name: "Bank of India".into(),
            account_number: "1234567890".into(),
        }
    }
}

/// The bill being edited. Always holds at least one line item.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceDraft {
    pub client: ClientDetails,
    pub line_items: Vec<LineItem>,
    pub discount_percent: String,
    pub footer_note: String,
    pub business_bank: BankDetails,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self {
            client: ClientDetails::default(),
            line_items: vec![LineItem::default()],
            discount_percent: String::new(),
            footer_note: DEFAULT_FOOTER.into(),
            business_bank: BankDetails::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StockItem {
    pub name: String,
    pub quantity: String,
    pub price: String,
}

impl StockItem {
    pub fn quantity_value(&self) -> Decimal {
        parse_amount(&self.quantity)
    }

    pub fn price_value(&self) -> Decimal {
        parse_amount(&self.price)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Employee {
    pub name: String,
    pub contact: String,
    pub employee_id: String,
    pub joining_date: String,
    /// Biometric device or file reference.
    pub biometric: String,
    pub address: String,
}

/// All of a tenant's operational data, stored as one JSON document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessDataDocument {
    pub schema_version: u32,
    pub onboarding: Onboarding,
    pub profile: Profile,
    pub invoice: InvoiceDraft,
    pub stock: Vec<StockItem>,
    pub employees: Vec<Employee>,
}

impl Default for BusinessDataDocument {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            onboarding: Onboarding::default(),
            profile: Profile::default(),
            invoice: InvoiceDraft::default(),
            stock: Vec::new(),
            employees: Vec::new(),
        }
    }
}

/// The remote per-tenant record kept under `tenants/<uid>`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantRecord {
    pub company: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub owner_uid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_has_one_blank_row() {
        let doc = BusinessDataDocument::default();
        assert_eq!(doc.schema_version, SCHEMA_VERSION);
        assert_eq!(doc.invoice.line_items, vec![LineItem::default()]);
        assert_eq!(doc.invoice.footer_note, DEFAULT_FOOTER);
        assert_eq!(doc.profile.plan, "Free Trial");
        assert!(doc.stock.is_empty());
        assert!(doc.employees.is_empty());
    }

    #[test]
    fn stored_field_names_are_camel_case() {
        let item = LineItem {
            description: "Haircut".into(),
            staff_name: Some("Priya".into()),
            rate: "300".into(),
            quantity: "1".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["staffName"], "Priya");

        let doc = serde_json::to_value(BusinessDataDocument::default()).unwrap();
        assert_eq!(doc["schemaVersion"], 2);
        assert!(doc["invoice"]["lineItems"].is_array());
        assert_eq!(doc["invoice"]["businessBank"]["bankName"], "Bank of India");
    }

    #[test]
    fn unassigned_staff_is_omitted() {
        let json = serde_json::to_value(LineItem::default()).unwrap();
        assert!(json.get("staffName").is_none());
    }

    #[test]
    fn line_subtotal_treats_bad_input_as_zero() {
        let item = LineItem {
            rate: "".into(),
            quantity: "5".into(),
            ..LineItem::default()
        };
        assert_eq!(item.subtotal(), Decimal::ZERO);

        let item = LineItem {
            rate: "250.5".into(),
            quantity: "2".into(),
            ..LineItem::default()
        };
        assert_eq!(item.subtotal(), Decimal::new(501, 0));
    }

    #[test]
    fn payment_mode_labels() {
        let labels: Vec<_> = PaymentMode::ALL.iter().map(|m| m.to_string()).collect();
        assert_eq!(labels, ["Cash", "Card", "UPI"]);
        assert_eq!(PaymentMode::from_label(" upi "), Some(PaymentMode::Upi));
        assert_eq!(PaymentMode::from_label("cheque"), None);
    }
}
