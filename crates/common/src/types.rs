//! Wire types for the eSIM store API
//!
//! Typed DTOs cover the stable success shapes (orders, listings, token
//! grant). Negative-case envelopes stay as raw JSON and are viewed through
//! [`ValidationErrors`], since 422 bodies only carry a field → message map.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order submission payload for `POST /v2/orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Number of eSIMs to provision (server caps this at 50)
    pub quantity: u32,

    /// Package identifier, e.g. `merhaba-7days-1gb`
    pub package_id: String,

    /// Order type; the only valid value today is `sim`
    #[serde(rename = "type")]
    pub order_type: String,

    /// Free-form description echoed back by the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OrderRequest {
    /// A well-formed order for the given package.
    pub fn sim(quantity: u32, package_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            quantity,
            package_id: package_id.into(),
            order_type: "sim".to_string(),
            description: Some(description.into()),
        }
    }
}

/// Successful order envelope
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub data: OrderData,
}

/// Order fields echoed by the server
#[derive(Debug, Clone, Deserialize)]
pub struct OrderData {
    pub quantity: u32,
    pub package_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sims: Vec<SimRecord>,
}

/// One provisioned eSIM as returned by orders and listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub iccid: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl SimRecord {
    /// Parse `created_at` into UTC.
    ///
    /// The API emits `YYYY-MM-DD HH:MM:SS`; RFC 3339 is accepted as well so
    /// fixtures and future API revisions both parse.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?;
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(dt.and_utc());
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Paginated listing envelope for `GET /v2/sims`
#[derive(Debug, Clone, Deserialize)]
pub struct SimsPage {
    pub data: Vec<SimRecord>,
    pub links: PageLinks,
    pub meta: PageMeta,
}

/// Laravel-style pagination links
#[derive(Debug, Clone, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Pagination metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    #[serde(default)]
    pub per_page: Option<serde_json::Value>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Token grant envelope for `POST /v2/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub data: TokenGrant,
}

/// The client-credentials grant itself
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Field → message view over a 422 validation envelope.
///
/// The server answers invalid input with `{"data": {"<field>": "<message>"}}`;
/// ordering is irrelevant for comparisons, so the map is kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub BTreeMap<String, String>);

impl ValidationErrors {
    /// Extract the `data` map from a raw 422 body.
    ///
    /// Non-string message values (the server has emitted single-element
    /// arrays for some fields) are flattened to their first string.
    pub fn from_body(body: &serde_json::Value) -> Self {
        let mut map = BTreeMap::new();
        if let Some(data) = body.get("data").and_then(|d| d.as_object()) {
            for (field, message) in data {
                let text = match message {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Array(items) => items
                        .first()
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                    _ => None,
                };
                if let Some(text) = text {
                    map.insert(field.clone(), text);
                }
            }
        }
        Self(map)
    }

    pub fn message(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_request_serializes_type_field() {
        let req = OrderRequest::sim(6, "merhaba-7days-1gb", "regression order");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["type"], "sim");
        assert_eq!(value["quantity"], 6);
        assert_eq!(value["package_id"], "merhaba-7days-1gb");
        assert_eq!(value["description"], "regression order");
    }

    #[test]
    fn order_response_parses_sims_collection() {
        let body = json!({
            "data": {
                "id": 10101,
                "quantity": 2,
                "package_id": "merhaba-7days-1gb",
                "description": "regression order",
                "type": "sim",
                "sims": [
                    {"id": 1, "iccid": "894000000000010490", "created_at": "2024-03-01 09:12:44"},
                    {"id": 2, "iccid": "894000000000010491", "created_at": "2024-03-01 09:12:45"}
                ]
            },
            "meta": {"message": "success"}
        });
        let resp: OrderResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.data.quantity, 2);
        assert_eq!(resp.data.sims.len(), 2);
        assert_eq!(resp.data.sims[0].iccid, "894000000000010490");
    }

    #[test]
    fn sims_page_parses_links_and_meta() {
        let body = json!({
            "data": [{"iccid": "894000000000010490", "created_at": "2023-02-27 10:25:57"}],
            "links": {
                "first": "https://api.example.com/v2/sims?include=order&page=1",
                "last": null,
                "prev": null,
                "next": null
            },
            "meta": {"current_page": 1, "per_page": 25, "total": 1}
        });
        let page: SimsPage = serde_json::from_value(body).unwrap();
        assert_eq!(page.meta.current_page, 1);
        assert_eq!(
            page.links.first.as_deref(),
            Some("https://api.example.com/v2/sims?include=order&page=1")
        );
    }

    #[test]
    fn created_at_parses_space_separated_and_rfc3339() {
        let sim = SimRecord {
            id: None,
            iccid: "894000000000010490".into(),
            created_at: Some("2023-02-27 10:25:57".into()),
        };
        let parsed = sim.created_at_utc().unwrap();
        assert_eq!(parsed.timestamp(), 1677493557);

        let sim = SimRecord {
            created_at: Some("2023-02-27T10:25:57Z".into()),
            ..sim
        };
        assert_eq!(sim.created_at_utc().unwrap().timestamp(), 1677493557);
    }

    #[test]
    fn validation_errors_flatten_string_and_array_messages() {
        let body = json!({
            "data": {
                "quantity": "The quantity may not be greater than 50.",
                "package_id": ["The selected package is invalid."]
            },
            "meta": {"message": "the parameter is invalid"}
        });
        let errors = ValidationErrors::from_body(&body);
        assert_eq!(
            errors.message("quantity"),
            Some("The quantity may not be greater than 50.")
        );
        assert_eq!(
            errors.message("package_id"),
            Some("The selected package is invalid.")
        );
    }

    #[test]
    fn validation_errors_empty_when_data_missing() {
        let errors = ValidationErrors::from_body(&json!({"meta": {}}));
        assert!(errors.0.is_empty());
    }
}
