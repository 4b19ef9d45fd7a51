// Hand-crafted async HTTP client for the storekeep backend.
//
// Base path: /api/
// No auth; plain JSON REST.

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::types;

// ── Error response shape from the backend ────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the storekeep REST API.
///
/// Every operation is a single attempt: no retries, no backoff, and no
/// explicit timeout beyond the transport default.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client against the given base URL (e.g.
    /// `http://localhost:8082/api`).
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::from_reqwest(base_url, reqwest::Client::new())
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Parse the base URL and enforce a trailing slash so relative joins
    /// extend the path instead of replacing its last segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"products"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining relative paths works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    /// PATCH with an empty body — used for the user activate/deactivate
    /// toggle, which carries all its meaning in the path.
    async fn patch_no_body(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path);
        debug!("PATCH {url}");

        let resp = self.http.patch(url).send().await?;
        Self::handle_empty(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path);
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    /// Extract a human-readable message from an error response body.
    ///
    /// The backend sends `{"message": ...}` for structured errors and
    /// `{"error": ...}` for framework-level ones; fall back to the raw
    /// body, and finally to the status line itself.
    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    format!("Server returned {}", status.as_u16())
                } else {
                    raw
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Products ─────────────────────────────────────────────────────

    pub async fn list_products(&self) -> Result<Vec<types::Product>, Error> {
        self.get("products").await
    }

    /// Distinct category names currently known to the backend.
    pub async fn list_categories(&self) -> Result<Vec<String>, Error> {
        self.get("products/categories").await
    }

    pub async fn create_product(
        &self,
        body: &types::ProductDraft,
    ) -> Result<types::Product, Error> {
        self.post("products", body).await
    }

    pub async fn update_product(
        &self,
        id: i64,
        body: &types::ProductDraft,
    ) -> Result<types::Product, Error> {
        self.put(&format!("products/{id}"), body).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), Error> {
        self.delete(&format!("products/{id}")).await
    }

    // ── Users ────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<types::User>, Error> {
        self.get("users").await
    }

    pub async fn create_user(&self, body: &types::UserDraft) -> Result<types::User, Error> {
        self.post("users", body).await
    }

    pub async fn update_user(
        &self,
        id: i64,
        body: &types::UserDraft,
    ) -> Result<types::User, Error> {
        self.put(&format!("users/{id}"), body).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), Error> {
        self.delete(&format!("users/{id}")).await
    }

    /// Flip a user's active flag via the dedicated PATCH endpoints.
    pub async fn set_user_active(&self, id: i64, active: bool) -> Result<(), Error> {
        let action = if active { "activate" } else { "deactivate" };
        self.patch_no_body(&format!("users/{id}/{action}")).await
    }

    // ── Service probes ───────────────────────────────────────────────

    pub async fn get_info(&self) -> Result<types::AppInfo, Error> {
        self.get("info").await
    }

    pub async fn get_health(&self) -> Result<types::HealthStatus, Error> {
        self.get("health").await
    }
}
