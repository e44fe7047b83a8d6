//! Wire envelope and typed payloads for catalog requests.
//!
//! The envelope ([`Request`]/[`Response`]) is what crosses the messaging
//! channel; the typed payloads are what the codec adapter encodes into
//! `Request::payload` and decodes out of `Response::Payload`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Message-type tag for the catalog listing request.
pub const GET_DATABASES: &str = "GET_DATABASES";

/// Message-type tag suffix for per-database details requests.
pub const GET_DATABASE_DETAILS: &str = "GET_DATABASE_DETAILS";

/// Error code reported when no backend handles the requested message type.
pub const UNKNOWN_MESSAGE_TYPE: u32 = 1;

/// Message type for a details request. Prefixed with the database id so
/// routing can be sharded per database on the backend side.
pub fn details_message_type(database_id: &str) -> String {
    format!("{database_id}_{GET_DATABASE_DETAILS}")
}

/// A single request sent over the messaging channel. Immutable once sent.
#[derive(Debug, Clone)]
pub struct Request {
    pub message_type: String,
    /// Encoded request payload; empty for no-argument requests.
    pub payload: Vec<u8>,
    pub timeout: Duration,
}

/// The channel resolves every request to exactly one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Payload {
        data: Vec<u8>,
    },

    Error {
        code: u32,
        message: String,
    },

    /// The response did not match any recognized message shape.
    Malformed,
}

/// One id/name pair in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
}

/// The list of databases known to the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseCatalog {
    #[serde(default)]
    pub databases: Vec<CatalogEntry>,
}

/// Request payload for a per-database details query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsRequest {
    pub database_id: String,
}

/// Per-database details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseDetails {
    pub base_classification_id: i64,
    pub base_classification_mnemonics: String,
    pub population: f64,
    pub sample: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub languages: Vec<CatalogEntry>,
}

fn default_currency() -> String {
    "€".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn details_message_type_is_prefixed_with_database_id() {
        assert_eq!(details_message_type("db42"), "db42_GET_DATABASE_DETAILS");
    }

    #[test]
    fn response_payload_serializes_tagged() {
        let resp = Response::Payload {
            data: vec![1, 2, 3],
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value, json!({"type": "payload", "data": [1, 2, 3]}));
    }

    #[test]
    fn response_error_roundtrips() {
        let json = json!({"type": "error", "code": 7, "message": "boom"});
        let resp: Response = serde_json::from_value(json).unwrap();
        match resp {
            Response::Error { code, message } => {
                assert_eq!(code, 7);
                assert_eq!(message, "boom");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn response_malformed_roundtrips() {
        let json = json!({"type": "malformed"});
        let resp: Response = serde_json::from_value(json).unwrap();
        assert!(matches!(resp, Response::Malformed));
    }

    #[test]
    fn catalog_deserializes_from_backend_shape() {
        let json = json!({
            "databases": [
                {"id": "db1", "name": "Nordics"},
                {"id": "db2", "name": "Benelux"}
            ]
        });
        let catalog: DatabaseCatalog = serde_json::from_value(json).unwrap();
        assert_eq!(catalog.databases.len(), 2);
        assert_eq!(catalog.databases[0].id, "db1");
    }

    #[test]
    fn details_currency_defaults_when_absent() {
        let json = json!({
            "base_classification_id": 3,
            "base_classification_mnemonics": "ABC",
            "population": 5_400_000.0,
            "sample": 1200.0
        });
        let details: DatabaseDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.currency, "€");
        assert!(details.languages.is_empty());
    }
}
