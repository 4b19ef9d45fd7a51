//! Wire types for the storekeep backend.
//!
//! All fields are camelCase on the wire. Records come in two shapes: the
//! full entity with its server-assigned `id`, and an id-less draft used as
//! the POST/PUT request body. Optional draft fields are omitted entirely
//! rather than sent as `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Products ─────────────────────────────────────────────────────────

/// A product record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub is_available: bool,
}

/// Request body for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub is_available: bool,
}

// ── Users ────────────────────────────────────────────────────────────

/// A user record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub is_active: bool,
}

/// Request body for creating or updating a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub is_active: bool,
}

// ── Service probes ───────────────────────────────────────────────────

/// Response from `GET /info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub application: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Response from `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Status text, e.g. `"UP"`.
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    /// Whether the backend reports itself healthy.
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("up")
    }
}
