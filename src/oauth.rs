use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use oauth2::{
    AccessToken, AuthUrl, AuthorizationCode, CsrfToken, EndpointNotSet, EndpointSet, RedirectUrl,
    RefreshToken, TokenResponse, TokenUrl,
    basic::{BasicClient, BasicTokenResponse},
};
use time::OffsetDateTime;
use url::Url;

use crate::client::Client;
use crate::error::{Result, UsageError};

/// Stores the OAuth 2 client ID and client secret.
#[derive(Debug, Clone)]
pub struct KeyPair(
    pub(crate) oauth2::ClientId,
    pub(crate) Option<oauth2::ClientSecret>,
);

impl KeyPair {
    /// Creates a new `KeyPair` from the provided `client_id` and `client_secret` strings.
    #[must_use]
    pub fn new(client_id: String, client_secret: Option<String>) -> Self {
        Self(
            oauth2::ClientId::new(client_id),
            client_secret.map(oauth2::ClientSecret::new),
        )
    }

    /// Creates a new `KeyPair` from `FIKEN_CLIENT_ID` and `FIKEN_CLIENT_SECRET` environment variables.
    ///
    /// # Panics
    /// Panics if `FIKEN_CLIENT_ID` environment variable is not set.
    #[must_use]
    pub fn from_env() -> Self {
        Self(
            oauth2::ClientId::new(
                std::env::var("FIKEN_CLIENT_ID").expect("FIKEN_CLIENT_ID not set"),
            ),
            std::env::var("FIKEN_CLIENT_SECRET")
                .ok()
                .map(oauth2::ClientSecret::new),
        )
    }

    fn oauth_client(&self, token_url: &Url, auth_url: &Url) -> OAuthClient {
        let client = BasicClient::new(self.0.clone())
            .set_auth_uri(AuthUrl::from_url(auth_url.clone()))
            .set_token_uri(TokenUrl::from_url(token_url.clone()));

        match &self.1 {
            Some(secret) => client.set_client_secret(secret.clone()),
            None => client,
        }
    }
}

pub type OAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[derive(Debug)]
struct TokenState {
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
    issued_at: OffsetDateTime,
    lifetime: Option<Duration>,
    key_pair: Option<KeyPair>,
}

/// An access token, shared by every clone.
///
/// Either a personal API token, which never expires and cannot be refreshed, or an OAuth
/// token set. Refreshing replaces the tokens in place, so every object and client holding a
/// clone sees the new token.
#[derive(Clone)]
pub struct Credential(Arc<RwLock<TokenState>>);

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Credential")
            .field("issued_at", &state.issued_at)
            .field("lifetime", &state.lifetime)
            .field("refreshable", &state.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}

impl Credential {
    /// A personal API token created in the Fiken web app.
    #[must_use]
    pub fn personal(token: impl Into<String>) -> Self {
        Self::from_state(TokenState {
            access_token: AccessToken::new(token.into()),
            refresh_token: None,
            issued_at: OffsetDateTime::now_utc(),
            lifetime: None,
            key_pair: None,
        })
    }

    /// An OAuth token set issued now.
    #[must_use]
    pub fn oauth(
        key_pair: KeyPair,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: Option<Duration>,
    ) -> Self {
        Self::from_state(TokenState {
            access_token: AccessToken::new(access_token.into()),
            refresh_token: refresh_token.map(RefreshToken::new),
            issued_at: OffsetDateTime::now_utc(),
            lifetime: expires_in,
            key_pair: Some(key_pair),
        })
    }

    #[must_use]
    pub fn from_token_response(key_pair: KeyPair, token: &BasicTokenResponse) -> Self {
        Self::from_state(TokenState {
            access_token: token.access_token().clone(),
            refresh_token: token.refresh_token().cloned(),
            issued_at: OffsetDateTime::now_utc(),
            lifetime: token.expires_in(),
            key_pair: Some(key_pair),
        })
    }

    /// Overrides when the token was issued.
    #[must_use]
    pub fn issued_at(self, issued_at: OffsetDateTime) -> Self {
        self.write().issued_at = issued_at;
        self
    }

    fn from_state(state: TokenState) -> Self {
        Self(Arc::new(RwLock::new(state)))
    }

    fn read(&self) -> RwLockReadGuard<'_, TokenState> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TokenState> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn access_token(&self) -> String {
        self.read().access_token.secret().clone()
    }

    /// When the token expires, if it has a lifetime at all.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        let state = self.read();
        state.lifetime.map(|lifetime| state.issued_at + lifetime)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at()
            .is_some_and(|at| OffsetDateTime::now_utc() >= at)
    }

    #[must_use]
    pub fn can_refresh(&self) -> bool {
        let state = self.read();
        state.refresh_token.is_some() && state.key_pair.is_some()
    }

    /// `true` if both handles share the same token state.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Exchanges the refresh token for a new token set and stores it in place.
    ///
    /// Uses HTTP Basic auth with the credential's key pair against the client's configured
    /// token endpoint. If the server does not rotate the refresh token, the old one is kept.
    #[instrument(skip_all)]
    pub async fn refresh(&self, client: &Client) -> Result<()> {
        let (key_pair, refresh_token) = {
            let state = self.read();
            let key_pair = state.key_pair.clone().ok_or(UsageError::CannotRefresh {
                reason: "no client id and secret",
            })?;
            let refresh_token = state
                .refresh_token
                .clone()
                .ok_or(UsageError::CannotRefresh {
                    reason: "no refresh token",
                })?;
            (key_pair, refresh_token)
        };

        let config = client.config();
        debug!(token_url = %config.token_url, "refreshing access token");
        let token = key_pair
            .oauth_client(&config.token_url, &config.authorize_url)
            .exchange_refresh_token(&refresh_token)
            .request_async(client.oauth_http())
            .await?;

        let mut state = self.write();
        state.access_token = token.access_token().clone();
        if let Some(rotated) = token.refresh_token() {
            state.refresh_token = Some(rotated.clone());
        }
        state.issued_at = OffsetDateTime::now_utc();
        if let Some(lifetime) = token.expires_in() {
            state.lifetime = Some(lifetime);
        }
        info!("access token refreshed");
        Ok(())
    }
}

impl Client {
    /// Generates an authorization URL to use for the code flow authorization method.
    ///
    /// Returns the URL to send the user to, and the CSRF `state` to compare against the one
    /// Fiken sends back.
    #[instrument(skip(self, key_pair))]
    pub fn authorize_url(&self, key_pair: &KeyPair, redirect_url: Url) -> (Url, CsrfToken) {
        let config = self.config();
        key_pair
            .oauth_client(&config.token_url, &config.authorize_url)
            .authorize_url(CsrfToken::new_random)
            .set_redirect_uri(Cow::Owned(RedirectUrl::from_url(redirect_url)))
            .url()
    }

    /// Exchanges a code from the code flow authorization method for a [`Credential`].
    #[instrument(skip(self, key_pair, code))]
    pub async fn exchange_code(
        &self,
        key_pair: KeyPair,
        redirect_url: Url,
        code: String,
    ) -> Result<Credential> {
        let config = self.config();
        let token = key_pair
            .oauth_client(&config.token_url, &config.authorize_url)
            .exchange_code(AuthorizationCode::new(code))
            .set_redirect_uri(Cow::Owned(RedirectUrl::from_url(redirect_url)))
            .request_async(self.oauth_http())
            .await?;

        Ok(Credential::from_token_response(key_pair, &token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_pair() -> KeyPair {
        KeyPair::new("client".into(), Some("secret".into()))
    }

    #[test]
    fn personal_tokens_never_expire() {
        let credential = Credential::personal("abc");
        assert_eq!(credential.expires_at(), None);
        assert!(!credential.is_expired());
        assert!(!credential.can_refresh());
        assert_eq!(credential.access_token(), "abc");
    }

    #[test]
    fn expiry_is_issue_time_plus_lifetime() {
        let issued = OffsetDateTime::now_utc() - time::Duration::hours(2);
        let credential = Credential::oauth(
            key_pair(),
            "abc",
            Some("refresh".into()),
            Some(Duration::from_secs(3600)),
        )
        .issued_at(issued);

        assert_eq!(
            credential.expires_at(),
            Some(issued + Duration::from_secs(3600))
        );
        assert!(credential.is_expired());
        assert!(credential.can_refresh());
    }

    #[test]
    fn fresh_token_is_not_expired() {
        let credential = Credential::oauth(key_pair(), "abc", None, Some(Duration::from_secs(60)));
        assert!(!credential.is_expired());
        assert!(!credential.can_refresh());
    }

    #[test]
    fn clones_share_state() {
        let credential = Credential::personal("abc");
        let clone = credential.clone();
        assert!(credential.ptr_eq(&clone));
        assert!(!credential.ptr_eq(&Credential::personal("abc")));
    }

    #[test]
    fn debug_does_not_leak_the_token() {
        let credential = Credential::personal("very-secret");
        assert!(!format!("{credential:?}").contains("very-secret"));
    }
}
