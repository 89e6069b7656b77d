//! Sign-up, login and logout, with the signed-in account cached locally.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::error::{Error, Result};
use crate::identity::{IdentityProvider, Principal, RecordStore};
use crate::model::TenantRecord;
use crate::store::KeyValueStore;

pub const USER_KEY: &str = "user";
pub const TENANT_KEY: &str = "tenant";
pub const TENANTS: &str = "tenants";

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub company: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub country: String,
    pub accepted_terms: bool,
}

impl SignupForm {
    pub fn validate(&self) -> Result<()> {
        let required = [
            (&self.company, "Company name"),
            (&self.email, "Email"),
            (&self.phone, "Phone"),
            (&self.password, "Password"),
            (&self.country, "State"),
        ];
        for (value, label) in required {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("{label} is required.")));
            }
        }
        if !is_valid_email(&self.email) {
            return Err(Error::validation("Enter a valid email address."));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::validation(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            )));
        }
        if !self.accepted_terms {
            return Err(Error::validation("Accept the terms to create an account."));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub principal: Principal,
    pub tenant: Option<TenantRecord>,
}

pub struct AuthService<I, R, S> {
    identity: I,
    records: R,
    store: S,
}

impl<I, R, S> AuthService<I, R, S>
where
    I: IdentityProvider,
    R: RecordStore,
    S: KeyValueStore,
{
    pub fn new(identity: I, records: R, store: S) -> Self {
        Self {
            identity,
            records,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates the account and its tenant record, then caches both.
    pub fn signup(&mut self, form: &SignupForm) -> Result<Session> {
        form.validate()?;
        let email = form.email.trim();
        let principal = self.identity.create_account(email, &form.password)?;
        let tenant = TenantRecord {
            company: form.company.trim().to_owned(),
            email: email.to_owned(),
            phone: form.phone.trim().to_owned(),
            country: form.country.clone(),
            created_at: Some(Utc::now()),
            owner_uid: principal.uid.clone(),
        };
        self.records.put_record(
            &principal,
            TENANTS,
            &principal.uid,
            &serde_json::to_value(&tenant)?,
            false,
        )?;
        tracing::info!(uid = %principal.uid, company = %tenant.company, "account created");
        self.remember(&principal, Some(&tenant))?;
        Ok(Session {
            principal,
            tenant: Some(tenant),
        })
    }

    /// The session is cached only when the tenant record exists.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::validation("Email and password are required."));
        }
        let principal = self.identity.authenticate(email.trim(), password)?;
        let tenant = self.fetch_tenant(&principal)?;
        match &tenant {
            Some(record) => {
                self.remember(&principal, Some(record))?;
                tracing::info!(uid = %principal.uid, "logged in");
            }
            None => {
                // An older session for another account must not outlive this login.
                self.store.remove(USER_KEY)?;
                self.store.remove(TENANT_KEY)?;
                tracing::warn!(uid = %principal.uid, "logged in without a tenant record");
            }
        }
        Ok(Session { principal, tenant })
    }

    /// Ends the session and wipes everything stored locally, business data
    /// included.
    pub fn logout(&mut self) -> Result<()> {
        sign_out(Some(&self.identity), &mut self.store)
    }

    pub fn current_session(&self) -> Option<Session> {
        cached_session(&self.store)
    }

    pub fn fetch_profile(&self) -> Result<Option<TenantRecord>> {
        let session = self.require_session()?;
        self.fetch_tenant(&session.principal)
    }

    /// Merge-writes the tenant record. A stored `createdAt` is never replaced.
    pub fn update_profile(&mut self, record: &TenantRecord) -> Result<TenantRecord> {
        let session = self.require_session()?;
        let required = [
            (&record.company, "Company"),
            (&record.country, "Country"),
            (&record.email, "Email"),
            (&record.phone, "Phone"),
            (&record.owner_uid, "Owner"),
        ];
        if let Some((_, label)) = required.iter().find(|(value, _)| value.trim().is_empty()) {
            return Err(Error::validation(format!("{label} is required.")));
        }

        let mut fields = serde_json::to_value(record)?;
        if let Some(existing) = session.tenant.as_ref().and_then(|t| t.created_at) {
            if let Some(object) = fields.as_object_mut() {
                object.insert("createdAt".into(), serde_json::to_value(existing)?);
            }
        }
        self.records
            .put_record(&session.principal, TENANTS, &session.principal.uid, &fields, true)?;

        let updated: TenantRecord = serde_json::from_value(fields)?;
        self.store.set(TENANT_KEY, &serde_json::to_string(&updated)?)?;
        tracing::info!(uid = %session.principal.uid, "profile updated");
        Ok(updated)
    }

    fn require_session(&self) -> Result<Session> {
        self.current_session()
            .ok_or_else(|| Error::validation("You are not logged in."))
    }

    fn fetch_tenant(&self, principal: &Principal) -> Result<Option<TenantRecord>> {
        let Some(value) = self.records.get_record(principal, TENANTS, &principal.uid)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(value)?))
    }

    fn remember(&mut self, principal: &Principal, tenant: Option<&TenantRecord>) -> Result<()> {
        self.store.set(USER_KEY, &serde_json::to_string(principal)?)?;
        match tenant {
            Some(tenant) => self.store.set(TENANT_KEY, &serde_json::to_string(tenant)?),
            None => self.store.remove(TENANT_KEY),
        }
    }
}

/// Ends the cached session with `identity` when there is one, then clears
/// `store`. Without an identity provider only the local data goes.
pub fn sign_out<I: IdentityProvider>(identity: Option<&I>, store: &mut impl KeyValueStore) -> Result<()> {
    if let Some(session) = cached_session(&*store) {
        if let Some(identity) = identity {
            identity.end_session(&session.principal)?;
        }
        tracing::info!(uid = %session.principal.uid, "logged out");
    }
    store.clear()
}

/// Reads the cached session. Anything unreadable counts as signed out.
pub fn cached_session(store: &impl KeyValueStore) -> Option<Session> {
    let principal: Principal = read_cached(store, USER_KEY)?;
    let tenant = read_cached(store, TENANT_KEY);
    Some(Session { principal, tenant })
}

fn read_cached<T: serde::de::DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key).ok()??;
    serde_json::from_str(&raw).ok()
}
