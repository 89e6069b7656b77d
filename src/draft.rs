//! Edits to the invoice draft.
//!
//! Every operation takes the current draft by reference and returns a new one,
//! leaving the original untouched.

use clap::ValueEnum;

use crate::error::{Error, Result};
use crate::model::{InvoiceDraft, LineItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClientField {
    Name,
    Address,
    Contact,
    InvoiceNumber,
    Date,
    PaymentMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LineItemField {
    Description,
    Staff,
    Rate,
    Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BankField {
    BankName,
    AccountNumber,
}

impl InvoiceDraft {
    pub fn with_client_field(&self, field: ClientField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let slot = match field {
            ClientField::Name => &mut next.client.name,
            ClientField::Address => &mut next.client.address,
            ClientField::Contact => &mut next.client.contact,
            ClientField::InvoiceNumber => &mut next.client.invoice_number,
            ClientField::Date => &mut next.client.date,
            ClientField::PaymentMode => &mut next.client.payment_mode,
        };
        *slot = value.into();
        next
    }

    /// Fails with [`Error::IndexOutOfRange`] when `index` is not a row.
    pub fn with_line_item_field(
        &self,
        index: usize,
        field: LineItemField,
        value: impl Into<String>,
    ) -> Result<Self> {
        let mut next = self.clone();
        let len = next.line_items.len();
        let item = next
            .line_items
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        let value = value.into();
        match field {
            LineItemField::Description => item.description = value,
            LineItemField::Staff => {
                item.staff_name = if value.trim().is_empty() { None } else { Some(value) };
            }
            LineItemField::Rate => item.rate = value,
            LineItemField::Quantity => item.quantity = value,
        }
        Ok(next)
    }

    pub fn with_added_line_item(&self) -> Self {
        let mut next = self.clone();
        next.line_items.push(LineItem::default());
        next
    }

    /// Refuses to remove the only remaining row.
    pub fn with_removed_line_item(&self, index: usize) -> Result<Self> {
        let len = self.line_items.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        if len == 1 {
            return Err(Error::LastLineItem);
        }
        let mut next = self.clone();
        next.line_items.remove(index);
        Ok(next)
    }

    pub fn with_discount_percent(&self, value: impl Into<String>) -> Self {
        Self {
            discount_percent: value.into(),
            ..self.clone()
        }
    }

    pub fn with_footer_note(&self, value: impl Into<String>) -> Self {
        Self {
            footer_note: value.into(),
            ..self.clone()
        }
    }

    pub fn with_bank_field(&self, field: BankField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        match field {
            BankField::BankName => next.business_bank.bank_name = value.into(),
            BankField::AccountNumber => next.business_bank.account_number = value.into(),
        }
        next
    }

    /// A fresh bill that keeps the bank details of this one.
    pub fn fresh(&self) -> Self {
        Self {
            business_bank: self.business_bank.clone(),
            ..Self::default()
        }
    }

    /// Restores the one-row minimum on drafts read from storage.
    pub fn repaired(mut self) -> Self {
        if self.line_items.is_empty() {
            self.line_items.push(LineItem::default());
        }
        self
    }
}
