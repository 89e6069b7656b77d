//! Printable invoices.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;
use slug::slugify;
use tera::{Context, Tera};

use crate::amount::format_amount;
use crate::error::Result;
use crate::model::{BankDetails, BusinessDataDocument, BusinessInfo, ClientDetails, InvoiceDraft};
use crate::store::KeyValueStore;
use crate::totals::{TaxRates, compute_totals};

// Embedded at compile time so printing never depends on the working directory.
const MODERN_TEMPLATE: &str = include_str!("../templates/modern.html.tera");
const CLASSIC_TEMPLATE: &str = include_str!("../templates/classic.html.tera");

pub const TEMPLATE_KEY: &str = "billTemplate";
const APP_TITLE: &str = "BILLUS";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InvoiceTemplate {
    #[default]
    Modern,
    Classic,
}

impl InvoiceTemplate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Classic => "classic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "modern" => Some(Self::Modern),
            "classic" => Some(Self::Classic),
            _ => None,
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            Self::Modern => "modern.html",
            Self::Classic => "classic.html",
        }
    }
}

/// The template picked last time, or the default.
pub fn remembered_template(store: &impl KeyValueStore) -> InvoiceTemplate {
    store
        .get(TEMPLATE_KEY)
        .ok()
        .flatten()
        .and_then(|name| InvoiceTemplate::from_name(&name))
        .unwrap_or_default()
}

pub fn remember_template(store: &mut impl KeyValueStore, template: InvoiceTemplate) -> Result<()> {
    store.set(TEMPLATE_KEY, template.as_str())
}

#[derive(Serialize)]
struct InvoiceView<'a> {
    app_title: &'static str,
    business: BusinessInfo,
    bill_to: &'a str,
    client: ClientView<'a>,
    bank: BankView<'a>,
    rows: Vec<RowView<'a>>,
    totals: TotalsView,
    footer: &'a str,
}

/// Template-side names for the client block. The stored structs are camelCase.
#[derive(Serialize)]
struct ClientView<'a> {
    address: &'a str,
    contact: &'a str,
    invoice_number: &'a str,
    date: &'a str,
    payment_mode: &'a str,
}

impl<'a> From<&'a ClientDetails> for ClientView<'a> {
    fn from(client: &'a ClientDetails) -> Self {
        Self {
            address: &client.address,
            contact: &client.contact,
            invoice_number: &client.invoice_number,
            date: &client.date,
            payment_mode: &client.payment_mode,
        }
    }
}

#[derive(Serialize)]
struct BankView<'a> {
    bank_name: &'a str,
    account_number: &'a str,
}

impl<'a> From<&'a BankDetails> for BankView<'a> {
    fn from(bank: &'a BankDetails) -> Self {
        Self {
            bank_name: &bank.bank_name,
            account_number: &bank.account_number,
        }
    }
}

#[derive(Serialize)]
struct RowView<'a> {
    description: &'a str,
    staff: &'a str,
    rate: &'a str,
    quantity: &'a str,
    subtotal: String,
}

#[derive(Serialize)]
struct TotalsView {
    subtotal: String,
    discount_percent: String,
    discount: String,
    cgst_percent: String,
    cgst: String,
    sgst_percent: String,
    sgst: String,
    total: String,
    has_discount: bool,
    has_tax: bool,
}

pub struct InvoiceRenderer {
    tera: Tera,
}

impl InvoiceRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (InvoiceTemplate::Modern.file_name(), MODERN_TEMPLATE),
            (InvoiceTemplate::Classic.file_name(), CLASSIC_TEMPLATE),
        ])?;
        Ok(Self { tera })
    }

    pub fn render(
        &self,
        document: &BusinessDataDocument,
        rates: &TaxRates,
        template: InvoiceTemplate,
    ) -> Result<String> {
        let draft = &document.invoice;
        let totals = compute_totals(draft, rates);
        let view = InvoiceView {
            app_title: APP_TITLE,
            business: business_header(document),
            bill_to: if draft.client.name.trim().is_empty() {
                "Client Name"
            } else {
                draft.client.name.as_str()
            },
            client: ClientView::from(&draft.client),
            bank: BankView::from(&draft.business_bank),
            rows: draft
                .line_items
                .iter()
                .map(|item| RowView {
                    description: &item.description,
                    staff: item.staff_name.as_deref().unwrap_or_default(),
                    rate: &item.rate,
                    quantity: &item.quantity,
                    subtotal: format_amount(item.subtotal()),
                })
                .collect(),
            totals: TotalsView {
                subtotal: format_amount(totals.subtotal),
                discount_percent: percent_label(totals.discount_percent),
                discount: format_amount(totals.discount_amount),
                cgst_percent: percent_label(totals.cgst_percent),
                cgst: format_amount(totals.cgst_amount),
                sgst_percent: percent_label(totals.sgst_percent),
                sgst: format_amount(totals.sgst_amount),
                total: format_amount(totals.total),
                has_discount: !totals.discount_percent.is_zero(),
                has_tax: !(totals.cgst_percent.is_zero() && totals.sgst_percent.is_zero()),
            },
            footer: &draft.footer_note,
        };
        let context = Context::from_serialize(&view)?;
        Ok(self.tera.render(template.file_name(), &context)?)
    }

    /// Renders and writes the invoice under `output_dir`, returning the file path.
    pub fn write(
        &self,
        output_dir: &Path,
        document: &BusinessDataDocument,
        rates: &TaxRates,
        template: InvoiceTemplate,
        today: NaiveDate,
    ) -> Result<PathBuf> {
        let html = self.render(document, rates, template)?;
        let path = output_path(output_dir, &document.invoice, today);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html)?;
        tracing::info!(path = %path.display(), template = template.as_str(), "invoice written");
        Ok(path)
    }
}

/// `<output>/<year>/<client-slug>/<invoice-number>.html`. The bill date picks
/// the year when it parses; otherwise `today` does.
pub fn output_path(output_dir: &Path, draft: &InvoiceDraft, today: NaiveDate) -> PathBuf {
    let date = NaiveDate::parse_from_str(draft.client.date.trim(), "%Y-%m-%d").unwrap_or(today);
    let client = match slugify(&draft.client.name) {
        s if s.is_empty() => "walk-in".to_owned(),
        s => s,
    };
    let stem = match slugify(&draft.client.invoice_number) {
        s if s.is_empty() => format!("invoice-{}", date.format("%Y%m%d")),
        s => s,
    };
    output_dir
        .join(date.year().to_string())
        .join(client)
        .join(format!("{stem}.html"))
}

/// Onboarding answers name the business; the profile fills any gaps.
fn business_header(document: &BusinessDataDocument) -> BusinessInfo {
    let info = &document.onboarding.business_info;
    let profile = &document.profile;
    let pick = |own: &str, fallback: &str| {
        if own.trim().is_empty() { fallback.to_owned() } else { own.to_owned() }
    };
    BusinessInfo {
        name: pick(&info.name, &profile.name),
        address: pick(&info.address, &profile.address),
        phone: pick(&info.phone, &profile.phone),
        email: pick(&info.email, &profile.email),
    }
}

fn percent_label(value: Decimal) -> String {
    value.normalize().to_string()
}
