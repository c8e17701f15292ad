// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The session-aware RDS client.
//!
//! The dispatcher authenticates with a login endpoint that returns a
//! session cookie; every later call carries that cookie. The client hides
//! the session lifecycle: [`call`](RdsClient::call) logs in on first use
//! and, when the server answers 401 or 403, renews the session and resends
//! the failed request exactly once. A second rejection propagates. Status
//! 400 is a plain request error and never triggers a re-login.
//!
//! The session token lives behind a mutex that is held for the whole of
//! `call`, so the login-and-retry pair is atomic with respect to other
//! requests on the same session.

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::time::Duration;
use tracing::{debug, warn};

use sitebridge_core::{LogicalState, PublishError, StatePublisher};

use crate::cookie::extract_cookie;
use crate::error::{RdsError, RdsResult};

// =============================================================================
// Constants
// =============================================================================

/// Name of the session cookie issued by the dispatcher.
pub const SESSION_COOKIE: &str = "JSESSIONID";

const LOGIN_PATH: &str = "/admin/login";
const LOGOUT_PATH: &str = "/admin/logout";
const SITE_FILLED_PATH: &str = "/api/work-sites/worksiteFiled";
const SITE_EMPTY_PATH: &str = "/api/work-sites/worksiteUnFiled";

// =============================================================================
// RdsClient
// =============================================================================

/// Authenticated HTTP/JSON client for the dispatch server.
pub struct RdsClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password_digest: String,
    language: String,
    /// Session token; `None` means "not logged in". The lock scope covers
    /// every request so a renewed token is never raced by a stale one.
    session: Mutex<Option<String>>,
}

impl RdsClient {
    /// Creates a client for the given dispatcher.
    ///
    /// The password is digested immediately and the plain text is not
    /// retained. `request_timeout` bounds every HTTP call so a hung
    /// dispatcher cannot stall the poll loop.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: &str,
        language: impl Into<String>,
        request_timeout: Duration,
    ) -> RdsResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password_digest: password_digest(password),
            language: language.into(),
            session: Mutex::new(None),
        })
    }

    /// Whether a session token is currently held.
    pub async fn has_session(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Logs in and stores the session token.
    pub async fn login(&self) -> RdsResult<()> {
        let mut session = self.session.lock().await;
        self.login_locked(&mut session).await.map(|_| ())
    }

    /// Logs out and drops the session token, if any.
    pub async fn logout(&self) -> RdsResult<()> {
        let mut session = self.session.lock().await;
        if let Some(token) = session.take() {
            let response = self.execute(LOGOUT_PATH, None, &token).await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RdsError::status(status.as_u16(), body));
            }
            debug!("RDS logout complete");
        }
        Ok(())
    }

    /// Marks the work-site as holding a load.
    pub async fn set_work_site_filled(&self, site_id: &str) -> RdsResult<Value> {
        self.call(SITE_FILLED_PATH, Some(&json!({ "workSiteIds": [site_id] })))
            .await
    }

    /// Marks the work-site as free.
    pub async fn set_work_site_empty(&self, site_id: &str) -> RdsResult<Value> {
        self.call(SITE_EMPTY_PATH, Some(&json!({ "workSiteIds": [site_id] })))
            .await
    }

    /// Sends an authenticated request, renewing the session once on
    /// 401/403.
    pub async fn call(&self, path: &str, body: Option<&Value>) -> RdsResult<Value> {
        let mut session = self.session.lock().await;

        let token = match session.as_ref() {
            Some(token) => token.clone(),
            None => self.login_locked(&mut session).await?,
        };

        let response = self.execute(path, body, &token).await?;

        if matches!(response.status().as_u16(), 401 | 403) {
            debug!(path, "session rejected by RDS, renewing and retrying once");
            *session = None;
            let token = self.login_locked(&mut session).await?;
            let response = self.execute(path, body, &token).await?;
            return decode_response(response).await;
        }

        decode_response(response).await
    }

    /// Performs the login and returns the fresh token. Caller holds the
    /// session lock.
    async fn login_locked(&self, session: &mut Option<String>) -> RdsResult<String> {
        let body = json!({
            "username": self.username,
            "password": self.password_digest,
        });

        let response = self
            .http
            .post(format!("{}{}", self.base_url, LOGIN_PATH))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RdsError::status(status.as_u16(), body));
        }

        match extract_cookie(response.headers(), SESSION_COOKIE) {
            Some(token) => {
                debug!(user = %self.username, "RDS login succeeded");
                *session = Some(token.clone());
                Ok(token)
            }
            None => Err(RdsError::login_failed(format!(
                "2xx login response without a {} cookie",
                SESSION_COOKIE
            ))),
        }
    }

    /// Sends one authenticated request without any retry handling.
    async fn execute(
        &self,
        path: &str,
        body: Option<&Value>,
        token: &str,
    ) -> RdsResult<reqwest::Response> {
        let mut request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(reqwest::header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
            .header("Language", &self.language);

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

/// Decodes a terminal response: non-2xx becomes a status error, an empty
/// body a JSON null, and a body that is not valid JSON its raw text.
async fn decode_response(response: reqwest::Response) -> RdsResult<Value> {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(RdsError::status(status.as_u16(), text));
    }

    if text.is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// Lowercase hex MD5 digest as expected by the login endpoint.
fn password_digest(password: &str) -> String {
    format!("{:x}", md5::compute(password))
}

// =============================================================================
// StatePublisher
// =============================================================================

#[async_trait]
impl StatePublisher for RdsClient {
    async fn ensure_session(&self) -> Result<(), PublishError> {
        let mut session = self.session.lock().await;
        if session.is_none() {
            self.login_locked(&mut session)
                .await
                .map_err(|e| PublishError::new(e.to_string()))?;
        }
        Ok(())
    }

    async fn publish(&self, site_id: &str, state: LogicalState) -> Result<(), PublishError> {
        let result = match state {
            LogicalState::Filled => self.set_work_site_filled(site_id).await,
            LogicalState::Empty => self.set_work_site_empty(site_id).await,
        };
        result
            .map(|_| ())
            .map_err(|e| PublishError::new(e.to_string()))
    }

    async fn close(&self) {
        if let Err(e) = self.logout().await {
            warn!(error = %e, "RDS logout failed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
