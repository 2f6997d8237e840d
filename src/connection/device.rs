//! Digest-authenticated request strategy for the hub (device-telemetry)
//! service, including director-based endpoint discovery.
//!
//! The public director only ever answers with a redirect-style header naming
//! the server instance that actually hosts the account's devices. That
//! instance can move without notice, so the header is honored on every
//! response, and any failure schedules a fresh director lookup before the
//! next request.

use diqwest::WithDigestAuth;
use reqwest::header::USER_AGENT;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use super::response::classify;
use super::{Connection, HubCredentials};
use crate::error::{MyenergiError, Result};

/// Director probe that resolves the account's server instance.
const DIRECTOR_STATUS_PATH: &str = "/cgi-jstatus-E";

/// The hub API rejects requests with an unfamiliar User-Agent.
const HUB_USER_AGENT: &str = "Wget/1.14 (linux-gnu)";

/// Request strategy for the hub service.
///
/// Obtained from [`Connection::device`]; borrows the connection mutably for
/// the duration of the call, so only one request can be in flight per
/// connection.
pub struct DeviceApi<'a> {
    pub(crate) conn: &'a mut Connection,
}

impl DeviceApi<'_> {
    pub async fn get(&mut self, path: &str) -> Result<Value> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str, body: Option<&Value>) -> Result<Value> {
        self.send(Method::POST, path, body).await
    }

    pub async fn put(&mut self, path: &str, body: Option<&Value>) -> Result<Value> {
        self.send(Method::PUT, path, body).await
    }

    pub async fn delete(&mut self, path: &str) -> Result<Value> {
        self.send(Method::DELETE, path, None).await
    }

    async fn send(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let credentials = self.conn.hub_credentials.clone().ok_or_else(|| {
            MyenergiError::Configuration("hub credentials are required for device requests".into())
        })?;

        if self.conn.needs_endpoint_refresh || self.conn.base_url.is_none() {
            self.bootstrap(&credentials).await?;
        }
        let base = match self.conn.base_url.as_deref() {
            Some(base) => base.to_string(),
            None => {
                return Err(MyenergiError::Configuration(
                    "no hub endpoint discovered".into(),
                ))
            }
        };

        let url = format!("{base}{path}");
        debug!(method = %method, path, url = %url, "hub request");
        let mut request = self
            .conn
            .client
            .request(method, &url)
            .header(USER_AGENT, HUB_USER_AGENT);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send_with_digest_auth(&credentials.username, &credentials.password)
            .await
            .map_err(|err| {
                // Staleness is a plausible cause; re-discover on the next call.
                self.conn.needs_endpoint_refresh = true;
                MyenergiError::from_digest(err)
            })?;
        debug!(status = %response.status(), "hub response");

        if let Err(err) = self.conn.adopt_authoritative_host(response.headers()) {
            self.conn.needs_endpoint_refresh = true;
            return Err(err);
        }
        match classify(response).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.conn.needs_endpoint_refresh = true;
                Err(err)
            }
        }
    }

    /// Ask the director which server instance hosts this account's devices.
    async fn bootstrap(&mut self, credentials: &HubCredentials) -> Result<()> {
        let url = format!("{}{DIRECTOR_STATUS_PATH}", self.conn.director_url);
        debug!(url = %url, "resolving hub endpoint via director");
        let response = self
            .conn
            .client
            .get(&url)
            .header(USER_AGENT, HUB_USER_AGENT)
            .send_with_digest_auth(&credentials.username, &credentials.password)
            .await
            .map_err(MyenergiError::from_digest)?;
        self.conn.adopt_authoritative_host(response.headers())?;
        self.conn.needs_endpoint_refresh = false;
        Ok(())
    }
}
