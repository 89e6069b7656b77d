//! The business document and the one place it gets written.
//!
//! Every change is a [`Command`]. [`BusinessDataDocument::apply`] computes the
//! next document without side effects; [`Workspace::execute`] applies it,
//! writes the result and only then replaces the in-memory copy.

use crate::draft::{BankField, ClientField, LineItemField};
use crate::error::{Error, Result};
use crate::model::{BusinessDataDocument, Employee, Onboarding, Profile, StockItem};
use crate::persistence;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetClientField { field: ClientField, value: String },
    SetLineItemField { index: usize, field: LineItemField, value: String },
    AddLineItem,
    RemoveLineItem { index: usize },
    SetDiscountPercent(String),
    SetFooterNote(String),
    SetBankDetails { field: BankField, value: String },
    ResetDraft,
    AddStockItem(StockItem),
    UpdateStockItem { index: usize, item: StockItem },
    RemoveStockItem { index: usize },
    AddEmployee(Employee),
    UpdateEmployee { index: usize, employee: Employee },
    RemoveEmployee { index: usize },
    SetOnboarding(Onboarding),
    SetProfile(Profile),
}

impl BusinessDataDocument {
    pub fn apply(&self, command: &Command) -> Result<Self> {
        let mut next = self.clone();
        match command {
            Command::SetClientField { field, value } => {
                next.invoice = self.invoice.with_client_field(*field, value.as_str());
            }
            Command::SetLineItemField { index, field, value } => {
                next.invoice = self.invoice.with_line_item_field(*index, *field, value.as_str())?;
            }
            Command::AddLineItem => next.invoice = self.invoice.with_added_line_item(),
            Command::RemoveLineItem { index } => {
                next.invoice = self.invoice.with_removed_line_item(*index)?;
            }
            Command::SetDiscountPercent(value) => {
                next.invoice = self.invoice.with_discount_percent(value.as_str());
            }
            Command::SetFooterNote(value) => {
                next.invoice = self.invoice.with_footer_note(value.as_str());
            }
            Command::SetBankDetails { field, value } => {
                next.invoice = self.invoice.with_bank_field(*field, value.as_str());
            }
            Command::ResetDraft => next.invoice = self.invoice.fresh(),
            Command::AddStockItem(item) => {
                validate_stock_item(item)?;
                next.stock.push(item.clone());
            }
            Command::UpdateStockItem { index, item } => {
                validate_stock_item(item)?;
                *slot(&mut next.stock, *index)? = item.clone();
            }
            Command::RemoveStockItem { index } => {
                slot(&mut next.stock, *index)?;
                next.stock.remove(*index);
            }
            Command::AddEmployee(employee) => {
                validate_employee(employee, &self.employees, None)?;
                next.employees.push(employee.clone());
            }
            Command::UpdateEmployee { index, employee } => {
                validate_employee(employee, &self.employees, Some(*index))?;
                *slot(&mut next.employees, *index)? = employee.clone();
            }
            Command::RemoveEmployee { index } => {
                slot(&mut next.employees, *index)?;
                next.employees.remove(*index);
            }
            Command::SetOnboarding(answers) => {
                crate::onboarding::validate(answers)?;
                next.onboarding = answers.clone();
            }
            Command::SetProfile(profile) => next.profile = profile.clone(),
        }
        Ok(next)
    }
}

fn slot<T>(items: &mut [T], index: usize) -> Result<&mut T> {
    let len = items.len();
    items.get_mut(index).ok_or(Error::IndexOutOfRange { index, len })
}

fn validate_stock_item(item: &StockItem) -> Result<()> {
    if item.name.trim().is_empty() {
        return Err(Error::validation("Product name is required."));
    }
    if item.price.trim().is_empty() {
        return Err(Error::validation("Price is required."));
    }
    Ok(())
}

fn validate_employee(employee: &Employee, existing: &[Employee], editing: Option<usize>) -> Result<()> {
    let required = [
        (&employee.name, "Name"),
        (&employee.contact, "Contact number"),
        (&employee.employee_id, "Employee ID"),
        (&employee.joining_date, "Joining date"),
        (&employee.biometric, "Biometric ID"),
        (&employee.address, "Address"),
    ];
    if let Some((_, label)) = required.iter().find(|(value, _)| value.trim().is_empty()) {
        return Err(Error::validation(format!("{label} is required.")));
    }
    let taken = existing
        .iter()
        .enumerate()
        .any(|(i, other)| Some(i) != editing && other.employee_id == employee.employee_id);
    if taken {
        return Err(Error::validation(format!(
            "Employee ID {} is already in use.",
            employee.employee_id
        )));
    }
    Ok(())
}

/// The active session's document, backed by a key-value store.
#[derive(Debug)]
pub struct Workspace<S> {
    store: S,
    document: BusinessDataDocument,
}

impl<S: KeyValueStore> Workspace<S> {
    pub fn open(store: S) -> Self {
        let document = persistence::load(&store);
        Self { store, document }
    }

    pub fn document(&self) -> &BusinessDataDocument {
        &self.document
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Applies `command` and writes the whole document.
    ///
    /// On any error the in-memory document is left as it was.
    pub fn execute(&mut self, command: Command) -> Result<&BusinessDataDocument> {
        let next = self.document.apply(&command)?;
        persistence::save(&mut self.store, &next)?;
        tracing::info!(?command, "business data updated");
        self.document = next;
        Ok(&self.document)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
