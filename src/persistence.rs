//! Loading and saving the business document.
//!
//! The whole document lives under [`STORAGE_KEY`] as one JSON string. Reads
//! never fail: missing, unreadable or unparseable content all load as the
//! default document.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::model::{BusinessDataDocument, SCHEMA_VERSION};
use crate::store::KeyValueStore;

pub const STORAGE_KEY: &str = "business-app-data-v1";

pub fn load(store: &impl KeyValueStore) -> BusinessDataDocument {
    let raw = match store.get(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!("no stored business data, starting from defaults");
            return BusinessDataDocument::default();
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not read business data, starting from defaults");
            return BusinessDataDocument::default();
        }
    };
    decode(&raw).unwrap_or_else(|| {
        tracing::warn!("stored business data is unreadable, starting from defaults");
        BusinessDataDocument::default()
    })
}

pub fn save(store: &mut impl KeyValueStore, document: &BusinessDataDocument) -> Result<()> {
    let json = serde_json::to_string(document)?;
    store.set(STORAGE_KEY, &json)
}

fn decode(raw: &str) -> Option<BusinessDataDocument> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let value = migrate(value)?;
    let mut document: BusinessDataDocument = serde_json::from_value(value).ok()?;
    document.invoice = document.invoice.repaired();
    Some(document)
}

/// Brings a stored document up to [`SCHEMA_VERSION`].
///
/// Returns `None` for anything that is not an object or comes from a newer
/// version than this build understands.
pub fn migrate(value: Value) -> Option<Value> {
    let Value::Object(mut root) = value else {
        return None;
    };
    let version = match root.get("schemaVersion") {
        None => 1,
        Some(v) => u32::try_from(v.as_u64()?).ok()?,
    };
    if version > SCHEMA_VERSION {
        tracing::warn!(version, "stored business data comes from a newer version");
        return None;
    }
    if version < 2 {
        root = upgrade_v1(root);
    }
    Some(Value::Object(root))
}

/// Version 1 is the layout the dashboard wrote: a `bill` object with
/// `services`, loosely typed numbers and the bank inside `business`.
fn upgrade_v1(mut root: Map<String, Value>) -> Map<String, Value> {
    tracing::info!("upgrading stored business data from schema 1");
    if let Some(Value::Object(bill)) = root.remove("bill") {
        root.insert("invoice".into(), Value::Object(upgrade_bill(bill)));
    }
    if let Some(Value::Array(stock)) = root.remove("stock") {
        let stock = stock
            .into_iter()
            .map(|item| upgrade_object(item, &["name", "quantity", "price"]))
            .collect();
        root.insert("stock".into(), Value::Array(stock));
    }
    if let Some(Value::Array(employees)) = root.remove("employees") {
        let fields = ["name", "contact", "employeeId", "joiningDate", "biometric", "address"];
        let employees = employees
            .into_iter()
            .map(|item| upgrade_object(item, &fields))
            .collect();
        root.insert("employees".into(), Value::Array(employees));
    }
    root.insert("schemaVersion".into(), Value::from(2));
    root
}

fn upgrade_bill(mut bill: Map<String, Value>) -> Map<String, Value> {
    let mut invoice = Map::new();

    if let Some(Value::Object(mut client)) = bill.remove("client") {
        if let Some(number) = client.remove("invoice") {
            client.insert("invoiceNumber".into(), text(Some(number)));
        }
        let fields = ["name", "address", "contact", "invoiceNumber", "date", "paymentMode"];
        invoice.insert("client".into(), upgrade_object(Value::Object(client), &fields));
    }

    if let Some(Value::Array(services)) = bill.remove("services") {
        let items = services.into_iter().map(upgrade_service).collect();
        invoice.insert("lineItems".into(), Value::Array(items));
    }

    if let Some(discount) = bill.remove("discount") {
        invoice.insert("discountPercent".into(), text(Some(discount)));
    }
    if let Some(footer) = bill.remove("footer") {
        invoice.insert("footerNote".into(), text(Some(footer)));
    }
    if let Some(Value::Object(mut business)) = bill.remove("business") {
        let mut bank = Map::new();
        bank.insert("bankName".into(), text(business.remove("bank")));
        bank.insert("accountNumber".into(), text(business.remove("account")));
        invoice.insert("businessBank".into(), Value::Object(bank));
    }
    invoice
}

fn upgrade_service(service: Value) -> Value {
    let Value::Object(mut service) = service else {
        return Value::Object(Map::new());
    };
    let mut item = Map::new();
    item.insert("description".into(), text(service.remove("description")));
    item.insert("rate".into(), text(service.remove("rate")));
    item.insert("quantity".into(), text(service.remove("quantity")));
    if let Value::String(staff) = text(service.remove("staff")) {
        if !staff.trim().is_empty() {
            item.insert("staffName".into(), Value::String(staff));
        }
    }
    Value::Object(item)
}

/// Keeps only `fields`, each converted to text.
fn upgrade_object(value: Value, fields: &[&str]) -> Value {
    let Value::Object(mut object) = value else {
        return Value::Object(Map::new());
    };
    let upgraded = fields
        .iter()
        .map(|field| ((*field).to_owned(), text(object.remove(*field))))
        .collect();
    Value::Object(upgraded)
}

fn text(value: Option<Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(Value::String(s)) => Value::String(s),
        Some(Value::Number(n)) => Value::String(n.to_string()),
        Some(Value::Bool(b)) => Value::String(b.to_string()),
        Some(other) => Value::String(other.to_string()),
    }
}
