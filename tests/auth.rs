use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use billus::auth::{self, AuthService, SignupForm, TENANTS};
use billus::identity::{IdentityProvider, Principal, RecordStore};
use billus::model::TenantRecord;
use billus::persistence::{self, STORAGE_KEY};
use billus::store::{KeyValueStore, MemoryStore};
use billus::{Error, Result};
use serde_json::Value;

#[derive(Default)]
struct Backend {
    accounts: HashMap<String, (String, String)>,
    records: HashMap<String, Value>,
    ended: Vec<String>,
}

/// In-memory stand-in for both Firebase services.
#[derive(Clone, Default)]
struct FakeFirebase(Rc<RefCell<Backend>>);

impl FakeFirebase {
    fn register(&self, email: &str, password: &str) -> String {
        let mut backend = self.0.borrow_mut();
        let uid = format!("uid-{}", backend.accounts.len() + 1);
        backend
            .accounts
            .insert(email.to_owned(), (password.to_owned(), uid.clone()));
        uid
    }

    fn record(&self, uid: &str) -> Option<Value> {
        self.0.borrow().records.get(&format!("{TENANTS}/{uid}")).cloned()
    }

    fn principal(uid: &str, email: &str) -> Principal {
        Principal {
            uid: uid.to_owned(),
            email: email.to_owned(),
            id_token: format!("token-{uid}"),
            refresh_token: String::new(),
        }
    }
}

impl IdentityProvider for FakeFirebase {
    fn create_account(&self, email: &str, password: &str) -> Result<Principal> {
        if self.0.borrow().accounts.contains_key(email) {
            return Err(Error::validation("An account with this email already exists."));
        }
        let uid = self.register(email, password);
        Ok(Self::principal(&uid, email))
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Principal> {
        match self.0.borrow().accounts.get(email) {
            Some((stored, uid)) if stored == password => Ok(Self::principal(uid, email)),
            _ => Err(Error::remote("Incorrect email or password.")),
        }
    }

    fn end_session(&self, principal: &Principal) -> Result<()> {
        self.0.borrow_mut().ended.push(principal.uid.clone());
        Ok(())
    }
}

impl RecordStore for FakeFirebase {
    fn get_record(&self, _: &Principal, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(self.0.borrow().records.get(&format!("{collection}/{id}")).cloned())
    }

    fn put_record(
        &self,
        _: &Principal,
        collection: &str,
        id: &str,
        record: &Value,
        merge: bool,
    ) -> Result<()> {
        let mut backend = self.0.borrow_mut();
        let key = format!("{collection}/{id}");
        let next = match (merge, backend.records.get(&key), record) {
            (true, Some(Value::Object(existing)), Value::Object(fields)) => {
                let mut existing = existing.clone();
                existing.extend(fields.clone());
                Value::Object(existing)
            }
            _ => record.clone(),
        };
        backend.records.insert(key, next);
        Ok(())
    }
}

fn form() -> SignupForm {
    SignupForm {
        company: "Glow Studio".into(),
        email: "owner@glow.in".into(),
        phone: "9830012345".into(),
        password: "s3cret!".into(),
        country: "West Bengal".into(),
        accepted_terms: true,
    }
}

fn service(firebase: &FakeFirebase) -> AuthService<FakeFirebase, FakeFirebase, MemoryStore> {
    AuthService::new(firebase.clone(), firebase.clone(), MemoryStore::new())
}

#[test]
fn signup_writes_tenant_and_caches_session() {
    let firebase = FakeFirebase::default();
    let mut auth = service(&firebase);

    let session = auth.signup(&form()).unwrap();
    let tenant = session.tenant.clone().unwrap();
    assert_eq!(tenant.company, "Glow Studio");
    assert_eq!(tenant.owner_uid, session.principal.uid);
    assert!(tenant.created_at.is_some());

    let stored: TenantRecord =
        serde_json::from_value(firebase.record(&session.principal.uid).unwrap()).unwrap();
    assert_eq!(stored, tenant);
    assert_eq!(auth::cached_session(auth.store()), Some(session));
}

#[test]
fn duplicate_email_is_a_validation_error() {
    let firebase = FakeFirebase::default();
    firebase.register("owner@glow.in", "other-pass");
    let mut auth = service(&firebase);

    let err = auth.signup(&form()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(auth.current_session(), None);
}

#[test]
fn invalid_form_never_reaches_the_backend() {
    let firebase = FakeFirebase::default();
    let mut auth = service(&firebase);

    let err = auth
        .signup(&SignupForm {
            accepted_terms: false,
            ..form()
        })
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(firebase.0.borrow().accounts.is_empty());
}

#[test]
fn login_restores_the_tenant() {
    let firebase = FakeFirebase::default();
    service(&firebase).signup(&form()).unwrap();

    let mut auth = service(&firebase);
    let session = auth.login(" owner@glow.in ", "s3cret!").unwrap();
    assert_eq!(session.tenant.unwrap().company, "Glow Studio");
    assert!(auth.current_session().is_some());
}

#[test]
fn login_without_tenant_record_is_not_cached() {
    let firebase = FakeFirebase::default();
    firebase.register("stray@glow.in", "s3cret!");
    let mut auth = service(&firebase);

    let session = auth.login("stray@glow.in", "s3cret!").unwrap();
    assert_eq!(session.tenant, None);
    assert_eq!(auth.current_session(), None);
}

#[test]
fn login_without_tenant_drops_an_older_session() {
    let firebase = FakeFirebase::default();
    firebase.register("stray@glow.in", "s3cret!");
    let mut auth = service(&firebase);
    auth.signup(&form()).unwrap();
    assert!(auth.current_session().is_some());

    let session = auth.login("stray@glow.in", "s3cret!").unwrap();
    assert_eq!(session.tenant, None);
    assert_eq!(auth.current_session(), None);
    assert_eq!(auth.store().get(auth::USER_KEY).unwrap(), None);
    assert_eq!(auth.store().get(auth::TENANT_KEY).unwrap(), None);
}

#[test]
fn sign_out_without_identity_still_clears_local_data() {
    let firebase = FakeFirebase::default();
    let mut signed_in = service(&firebase);
    signed_in.signup(&form()).unwrap();

    let mut store = MemoryStore::new();
    for key in [auth::USER_KEY, auth::TENANT_KEY] {
        store
            .set(key, &signed_in.store().get(key).unwrap().unwrap())
            .unwrap();
    }
    persistence::save(&mut store, &Default::default()).unwrap();

    auth::sign_out(None::<&FakeFirebase>, &mut store).unwrap();
    assert!(store.is_empty());
    assert!(firebase.0.borrow().ended.is_empty());
}

#[test]
fn wrong_password_is_a_remote_error() {
    let firebase = FakeFirebase::default();
    service(&firebase).signup(&form()).unwrap();

    let err = service(&firebase).login("owner@glow.in", "nope-nope").unwrap_err();
    assert!(matches!(err, Error::Remote(_)));
}

#[test]
fn logout_wipes_everything_local() {
    let firebase = FakeFirebase::default();
    let mut store = MemoryStore::new();
    persistence::save(&mut store, &Default::default()).unwrap();
    let mut auth = AuthService::new(firebase.clone(), firebase.clone(), store);
    let session = auth.signup(&form()).unwrap();
    assert!(auth.store().get(STORAGE_KEY).unwrap().is_some());

    auth.logout().unwrap();
    assert!(auth.store().is_empty());
    assert_eq!(firebase.0.borrow().ended, vec![session.principal.uid]);
}

#[test]
fn profile_update_keeps_created_at() {
    let firebase = FakeFirebase::default();
    let mut auth = service(&firebase);
    let session = auth.signup(&form()).unwrap();
    let created = session.tenant.as_ref().and_then(|t| t.created_at);

    let saved = auth
        .update_profile(&TenantRecord {
            company: "Glow Studio & Spa".into(),
            created_at: None,
            ..session.tenant.clone().unwrap()
        })
        .unwrap();
    assert_eq!(saved.company, "Glow Studio & Spa");
    assert_eq!(saved.created_at, created);

    let fetched = auth.fetch_profile().unwrap().unwrap();
    assert_eq!(fetched, saved);
    assert_eq!(
        auth::cached_session(auth.store()).and_then(|s| s.tenant),
        Some(saved)
    );
}

#[test]
fn profile_update_needs_every_field() {
    let firebase = FakeFirebase::default();
    let mut auth = service(&firebase);
    let session = auth.signup(&form()).unwrap();

    let err = auth
        .update_profile(&TenantRecord {
            phone: "  ".into(),
            ..session.tenant.unwrap()
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "Phone is required.");
}

#[test]
fn profile_calls_need_a_session() {
    let firebase = FakeFirebase::default();
    let auth = service(&firebase);
    assert!(matches!(auth.fetch_profile(), Err(Error::Validation(_))));
}
