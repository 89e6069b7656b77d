//! Seams to the hosted identity and document services.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A signed-in account as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

pub trait IdentityProvider {
    fn create_account(&self, email: &str, password: &str) -> Result<Principal>;
    fn authenticate(&self, email: &str, password: &str) -> Result<Principal>;
    fn end_session(&self, principal: &Principal) -> Result<()>;
}

/// JSON records addressed by collection and id.
pub trait RecordStore {
    fn get_record(&self, principal: &Principal, collection: &str, id: &str) -> Result<Option<Value>>;

    /// With `merge`, only the top-level fields present in `record` are written
    /// and the rest of the stored record is kept.
    fn put_record(
        &self,
        principal: &Principal,
        collection: &str,
        id: &str,
        record: &Value,
        merge: bool,
    ) -> Result<()>;
}
