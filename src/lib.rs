//! Billing and invoicing for small businesses.
//!
//! The current bill, stock list, staff list and business profile live in one
//! [`model::BusinessDataDocument`], edited through [`workspace::Command`]s and
//! written to a [`store::KeyValueStore`] after every change. Accounts and the
//! per-tenant record are kept in Firebase.

pub mod amount;
pub mod analytics;
pub mod auth;
pub mod config;
pub mod draft;
pub mod error;
pub mod firebase;
pub mod identity;
pub mod model;
pub mod onboarding;
pub mod persistence;
pub mod render;
pub mod store;
pub mod totals;
pub mod workspace;

pub use error::{Error, Result};
