//! Connection state and request strategies for the myenergi cloud.

mod account;
mod device;
mod response;

pub use account::AccountApi;
pub use device::DeviceApi;

use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::{debug, info};

use crate::error::{MyenergiError, Result};
use crate::identity::IdentityProvider;
use response::authoritative_host;

const DEFAULT_DIRECTOR_URL: &str = "https://director.myenergi.net";
const DEFAULT_OAUTH_BASE_URL: &str = "https://myaccount.myenergi.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Digest credentials for the hub (device-telemetry) service: the hub
/// serial number and its API key.
#[derive(Clone)]
pub struct HubCredentials {
    pub username: String,
    pub password: String,
}

/// Long-lived connection to the myenergi cloud.
///
/// Owns the credential sets, the discovered hub endpoint and the invitation
/// id, and hands out one request strategy per service family via
/// [`device`](Connection::device) and [`account`](Connection::account).
///
/// A `Connection` is **not** safe to share between concurrent callers: the
/// discovered endpoint, the refresh flag and the invitation id mutate as
/// side effects of requests. The strategy handles borrow the connection
/// mutably, so the compiler enforces one request at a time per instance;
/// concurrent callers need one `Connection` each, or external
/// serialization.
pub struct Connection {
    pub(crate) client: reqwest::Client,
    timeout: Duration,
    pub(crate) hub_credentials: Option<HubCredentials>,
    pub(crate) account_email: Option<String>,
    pub(crate) identity: Option<Box<dyn IdentityProvider>>,
    pub(crate) authenticated: bool,
    pub(crate) director_url: String,
    pub(crate) oauth_base_url: String,
    pub(crate) asn_scheme: String,
    pub(crate) base_url: Option<String>,
    pub(crate) needs_endpoint_refresh: bool,
    pub(crate) invitation_id: String,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    /// Create a connection with no credentials and the production endpoints.
    pub fn new() -> Self {
        debug!("new myenergi connection created");
        Self {
            client: build_client(DEFAULT_TIMEOUT),
            timeout: DEFAULT_TIMEOUT,
            hub_credentials: None,
            account_email: None,
            identity: None,
            authenticated: false,
            director_url: DEFAULT_DIRECTOR_URL.to_string(),
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
            asn_scheme: "https".to_string(),
            base_url: None,
            needs_endpoint_refresh: true,
            invitation_id: String::new(),
        }
    }

    /// Digest credentials for the hub service.
    pub fn with_hub_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.hub_credentials = Some(HubCredentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Account email plus the identity provider that turns the app password
    /// into bearer tokens.
    pub fn with_account_auth(
        mut self,
        email: impl Into<String>,
        identity: Box<dyn IdentityProvider>,
    ) -> Self {
        self.account_email = Some(email.into());
        self.identity = Some(identity);
        self
    }

    /// Per-request timeout (default 20 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = build_client(timeout);
        self
    }

    /// Override the director bootstrap endpoint.
    pub fn with_director_url(mut self, url: impl Into<String>) -> Self {
        self.director_url = url.into();
        self
    }

    /// Override the account-service endpoint.
    pub fn with_oauth_base_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_base_url = url.into();
        self
    }

    /// Scheme used when building the discovered hub base URL from the
    /// authoritative-host header. Production is always `https`; tests point
    /// this at plain `http`.
    pub fn with_asn_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.asn_scheme = scheme.into();
        self
    }

    /// Request strategy for the hub service (Digest auth + endpoint
    /// discovery).
    pub fn device(&mut self) -> DeviceApi<'_> {
        DeviceApi { conn: self }
    }

    /// Request strategy for the account service (bearer token).
    pub fn account(&mut self) -> AccountApi<'_> {
        AccountApi { conn: self }
    }

    /// The currently discovered hub endpoint, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// The configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invitation id captured from a guest location listing, empty when the
    /// account owns its installation.
    pub fn invitation_id(&self) -> &str {
        &self.invitation_id
    }

    /// Adopt the authoritative host named by a hub-path response.
    ///
    /// Every hub-path response must pass through here: the active server can
    /// move at any time and the next response is the only notification. A
    /// missing header is the server's way of rejecting Digest credentials.
    pub(crate) fn adopt_authoritative_host(&mut self, headers: &HeaderMap) -> Result<()> {
        let Some(host) = authoritative_host(headers) else {
            debug!("authoritative-host header missing, assuming rejected hub credentials");
            return Err(MyenergiError::WrongCredentials);
        };
        let new_base = format!("{}://{}", self.asn_scheme, host);
        if self.base_url.as_deref() != Some(new_base.as_str()) {
            info!(base = %new_base, "active myenergi server changed");
        }
        self.base_url = Some(new_base);
        Ok(())
    }

    /// Authenticate lazily, validate the token (the provider may refresh it)
    /// and read it back. Runs before every account request so a token that
    /// expired between two calls is renewed for the second.
    pub(crate) async fn fresh_token(&mut self) -> Result<String> {
        let identity = self.identity.as_mut().ok_or_else(|| {
            MyenergiError::Configuration("no identity provider configured".into())
        })?;
        if !self.authenticated {
            identity.authenticate().await?;
            self.authenticated = true;
        }
        identity.check_token().await?;
        identity
            .access_token()
            .map(str::to_owned)
            .ok_or_else(|| MyenergiError::Identity("no access token after validation".into()))
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client")
}
