//! Identity-provider boundary for the account service.
//!
//! The account path authenticates with a bearer token issued by an external
//! identity provider (AWS Cognito in production). The provider's internal
//! refresh protocol is not this crate's business; [`Connection`] only needs
//! the three capabilities below and calls them before every account request.
//!
//! [`Connection`]: crate::connection::Connection

use async_trait::async_trait;

use crate::error::Result;

/// Cognito user pool backing the production myenergi account service.
pub const COGNITO_USER_POOL_ID: &str = "eu-west-2_E57cCJB20";

/// Cognito app client id used by the myenergi account portal.
pub const COGNITO_CLIENT_ID: &str = "2fup0dhufn5vurmprjkj599041";

/// Capability for obtaining and maintaining an account-service bearer token.
///
/// Implementations hold the app password and the provider session; the
/// connection never sees either, only the current access token.
#[async_trait]
pub trait IdentityProvider: Send {
    /// Establish a session with the identity provider.
    ///
    /// Called once per connection, before the first account request.
    async fn authenticate(&mut self) -> Result<()>;

    /// Validate the current token, silently refreshing it when it is near
    /// or past expiry. Called before every account request.
    async fn check_token(&mut self) -> Result<()>;

    /// The current access token, if a session exists.
    fn access_token(&self) -> Option<&str>;
}
