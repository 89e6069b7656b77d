//! Firebase over its REST API: Identity Toolkit for accounts and Firestore for
//! records.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::config::FirebaseConfig;
use crate::error::{Error, Result};
use crate::identity::{IdentityProvider, Principal, RecordStore};

const IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com/v1";
const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";

#[derive(Clone)]
pub struct FirebaseClient {
    http: Client,
    api_key: String,
    project_id: String,
    identity_base: String,
    firestore_base: String,
}

impl FirebaseClient {
    pub fn new(config: &FirebaseConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() || config.project_id.trim().is_empty() {
            return Err(Error::Config(
                "Firebase api_key and project_id must both be set".into(),
            ));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(concat!("billus/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            project_id: config.project_id.clone(),
            identity_base: IDENTITY_BASE.into(),
            firestore_base: FIRESTORE_BASE.into(),
        })
    }

    /// Points the client at other hosts, e.g. the local emulator suite.
    pub fn with_base_urls(mut self, identity: impl Into<String>, firestore: impl Into<String>) -> Self {
        self.identity_base = identity.into();
        self.firestore_base = firestore.into();
        self
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{collection}/{id}",
            self.firestore_base, self.project_id
        )
    }

    fn sign(&self, action: &str, email: &str, password: &str) -> Result<Principal> {
        let url = format!("{}/accounts:{action}", self.identity_base);
        tracing::debug!(action, email, "calling identity service");
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()?;

        if !response.status().is_success() {
            let envelope: ErrorEnvelope = response.json().unwrap_or_default();
            return Err(identity_error(&envelope.error.message));
        }

        let body: AuthResponse = response.json()?;
        Ok(Principal {
            uid: body.local_id,
            email: body.email,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
        })
    }
}

impl IdentityProvider for FirebaseClient {
    fn create_account(&self, email: &str, password: &str) -> Result<Principal> {
        self.sign("signUp", email, password)
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Principal> {
        self.sign("signInWithPassword", email, password)
    }

    fn end_session(&self, principal: &Principal) -> Result<()> {
        // ID tokens are stateless; signing out means forgetting them locally.
        tracing::debug!(uid = %principal.uid, "ending session");
        Ok(())
    }
}

impl RecordStore for FirebaseClient {
    fn get_record(&self, principal: &Principal, collection: &str, id: &str) -> Result<Option<Value>> {
        let response = self
            .http
            .get(self.document_url(collection, id))
            .bearer_auth(&principal.id_token)
            .send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response));
        }
        let document: FirestoreDocument = response.json()?;
        Ok(Some(fields_to_json(&document.fields)))
    }

    fn put_record(
        &self,
        principal: &Principal,
        collection: &str,
        id: &str,
        record: &Value,
        merge: bool,
    ) -> Result<()> {
        let Value::Object(fields) = record else {
            return Err(Error::validation("records must be JSON objects"));
        };
        let mask: Vec<(&str, &str)> = if merge {
            fields
                .keys()
                .map(|k| ("updateMask.fieldPaths", k.as_str()))
                .collect()
        } else {
            Vec::new()
        };

        let response = self
            .http
            .patch(self.document_url(collection, id))
            .bearer_auth(&principal.id_token)
            .query(&mask)
            .json(&json!({ "fields": json_to_fields(fields) }))
            .send()?;

        if !response.status().is_success() {
            return Err(status_error(response));
        }
        tracing::debug!(collection, id, merge, "record written");
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
}

#[derive(Deserialize, Default)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct FirestoreDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Identity Toolkit codes look like `WEAK_PASSWORD : Password should be ...`.
fn identity_error(message: &str) -> Error {
    let code = message.split([' ', ':']).next().unwrap_or_default();
    match code {
        "EMAIL_EXISTS" => Error::validation("An account with this email already exists."),
        "INVALID_EMAIL" => Error::validation("Enter a valid email address."),
        "WEAK_PASSWORD" => Error::validation("Password should be at least 6 characters."),
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
            Error::remote("Incorrect email or password.")
        }
        "USER_DISABLED" => Error::remote("This account has been disabled."),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => Error::remote("Too many attempts. Try again later."),
        "" => Error::remote("Authentication failed."),
        other => Error::remote(format!("Authentication failed ({other}).")),
    }
}

fn status_error(response: Response) -> Error {
    let status = response.status();
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Error::remote("Your session has expired. Log in again.");
    }
    let envelope: ErrorEnvelope = response.json().unwrap_or_default();
    tracing::warn!(%status, message = %envelope.error.message, "document store request failed");
    if envelope.error.status.is_empty() {
        Error::remote(format!("The server rejected the request ({status})."))
    } else {
        Error::remote(format!("The server rejected the request ({}).", envelope.error.status))
    }
}

fn json_to_fields(object: &Map<String, Value>) -> Value {
    Value::Object(
        object
            .iter()
            .map(|(k, v)| (k.clone(), to_firestore_value(v)))
            .collect(),
    )
}

fn fields_to_json(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), from_firestore_value(v)))
            .collect(),
    )
}

/// Wraps plain JSON in Firestore's typed value envelope.
fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": json_to_fields(map) } }),
    }
}

fn from_firestore_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or_default()),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "doubleValue" => inner.as_f64().map(Value::from).unwrap_or(Value::Null),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(from_firestore_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => inner
            .get("fields")
            .and_then(Value::as_object)
            .map(fields_to_json)
            .unwrap_or_else(|| Value::Object(Map::new())),
        "geoPointValue" => inner.clone(),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_values_round_trip() {
        let record = json!({
            "company": "Glow Studio",
            "country": "West Bengal",
            "seats": 4,
            "rating": 4.5,
            "active": true,
            "notes": null,
            "tags": ["salon", "spa"],
            "address": { "city": "Kolkata", "pin": 700091 }
        });
        let Value::Object(object) = &record else { unreachable!() };
        let fields = json_to_fields(object);
        assert_eq!(fields["seats"], json!({ "integerValue": "4" }));
        assert_eq!(fields["company"], json!({ "stringValue": "Glow Studio" }));
        assert_eq!(
            fields["tags"]["arrayValue"]["values"][1],
            json!({ "stringValue": "spa" })
        );

        let Value::Object(fields) = fields else { unreachable!() };
        assert_eq!(fields_to_json(&fields), record);
    }

    #[test]
    fn timestamps_and_empty_containers_decode() {
        assert_eq!(
            from_firestore_value(&json!({ "timestampValue": "2024-06-01T10:00:00Z" })),
            json!("2024-06-01T10:00:00Z")
        );
        assert_eq!(from_firestore_value(&json!({ "arrayValue": {} })), json!([]));
        assert_eq!(from_firestore_value(&json!({ "mapValue": {} })), json!({}));
        assert_eq!(from_firestore_value(&json!({})), Value::Null);
    }

    #[test]
    fn identity_codes_become_short_messages() {
        let err = identity_error("EMAIL_EXISTS");
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.to_string(), "An account with this email already exists.");

        let err = identity_error("WEAK_PASSWORD : Password should be at least 6 characters");
        assert!(matches!(err, Error::Validation(_)));

        let err = identity_error("INVALID_LOGIN_CREDENTIALS");
        assert_eq!(err.to_string(), "Incorrect email or password.");

        let err = identity_error("QUOTA_EXCEEDED");
        assert!(matches!(err, Error::Remote(_)));
    }

    #[test]
    fn client_needs_credentials() {
        let config = FirebaseConfig {
            api_key: String::new(),
            project_id: "demo".into(),
        };
        assert!(matches!(FirebaseClient::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn document_urls() {
        let config = FirebaseConfig {
            api_key: "key".into(),
            project_id: "demo-billus".into(),
        };
        let client = FirebaseClient::new(&config)
            .unwrap()
            .with_base_urls("http://localhost:9099/identitytoolkit.googleapis.com/v1", "http://localhost:8080/v1");
        assert_eq!(
            client.document_url("tenants", "u1"),
            "http://localhost:8080/v1/projects/demo-billus/databases/(default)/documents/tenants/u1"
        );
    }
}
