use std::sync::Arc;

use reqwest::{Method, redirect};

use crate::config::Config;
use crate::context::{self, ClientContext};
use crate::descriptor::{Descriptor, Operation};
use crate::entities::{
    bank_account::BankAccount,
    company::Company,
    contact::{Contact, ContactPerson},
    inbox::InboxDocument,
    invoice::{Invoice, InvoiceDraft},
    offer::{Offer, OfferDraft},
    product::Product,
    project::Project,
    purchase::{Purchase, PurchaseDraft},
    sale::{Sale, SaleDraft},
    user::UserInfo,
};
use crate::error::{Error, Result};
use crate::oauth::Credential;
use crate::rate_limit::{DEFAULT_MAX_PER_SECOND, RateLimiter};
use crate::resource::{Entity, ResourceApi};
use crate::transport::{Call, Target};

#[derive(Clone, Debug)]
/// This is the client that is used for interacting with the Fiken API. It holds the HTTP
/// transport, the rate limiter and a [`ClientContext`] (credential and current company) that
/// calls fall back to when the object or the call itself doesn't carry one.
pub struct Client {
    http: reqwest::Client,
    oauth_http: reqwest::Client,
    config: Arc<Config>,
    context: ClientContext,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl Client {
    /// Builds a client from `config`.
    ///
    /// With the default rate limit the client shares the process-wide limiter with every
    /// other client; any other limit gets a limiter of its own.
    #[instrument(skip(config))]
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|source| Error::Connection {
                url: config.base_url.clone(),
                source,
            })?;

        // Token endpoints must not be followed through redirects.
        let oauth_http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|source| Error::Connection {
                url: config.token_url.to_string(),
                source,
            })?;

        let rate_limiter = match config.rate_limit {
            None => None,
            Some(DEFAULT_MAX_PER_SECOND) => Some(RateLimiter::shared()),
            Some(max) => Some(Arc::new(RateLimiter::new(max))),
        };

        Ok(Self {
            http,
            oauth_http,
            config: Arc::new(config),
            context: ClientContext::default(),
            rate_limiter,
        })
    }

    /// A client configured from the environment, see [`Config::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    /// A client for the public Fiken API authenticating with `credential`.
    pub fn with_token(credential: Credential) -> Result<Self> {
        Ok(Self::new(Config::default())?.with_credential(credential))
    }

    #[must_use]
    pub fn with_context(mut self, context: ClientContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.context = self.context.with_credential(credential);
        self
    }

    /// Sets the company all company-scoped calls target unless told otherwise.
    #[must_use]
    pub fn with_company(mut self, company_slug: impl Into<String>) -> Self {
        trace!("updating company slug");
        self.context = self.context.with_company(company_slug);
        self
    }

    /// Replaces the rate limiter; `None` disables limiting for this client.
    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Option<Arc<RateLimiter>>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn oauth_http(&self) -> &reqwest::Client {
        &self.oauth_http
    }

    pub(crate) fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.rate_limiter.as_deref()
    }

    /// Fills whatever `narrower` leaves unset from this client's context, then from the
    /// process-wide default.
    pub(crate) fn resolve_context(&self, narrower: &ClientContext) -> ClientContext {
        narrower
            .or(&self.context)
            .or(&context::default_context())
    }

    /// Lifecycle operations for any resource type.
    #[must_use]
    pub fn resource<E: Entity>(&self) -> ResourceApi<'_, E> {
        ResourceApi::new(self)
    }

    /// Information about the user the credential belongs to.
    #[instrument(skip(self))]
    pub async fn user(&self) -> Result<UserInfo> {
        let template = UserInfo::template(Operation::GetOne)
            .ok_or_else(|| Error::unsupported(UserInfo::NAME, Operation::GetOne))?;
        let call = Call::new(
            Method::GET,
            Operation::GetOne,
            Target::Template(template),
            self.resolve_context(&ClientContext::default()),
        );
        self.execute(call).await?.json()
    }

    #[must_use]
    pub fn companies(&self) -> ResourceApi<'_, Company> {
        self.resource()
    }

    #[must_use]
    pub fn contacts(&self) -> ResourceApi<'_, Contact> {
        self.resource()
    }

    #[must_use]
    pub fn contact_persons(&self) -> ResourceApi<'_, ContactPerson> {
        self.resource()
    }

    #[must_use]
    pub fn products(&self) -> ResourceApi<'_, Product> {
        self.resource()
    }

    #[must_use]
    pub fn projects(&self) -> ResourceApi<'_, Project> {
        self.resource()
    }

    #[must_use]
    pub fn bank_accounts(&self) -> ResourceApi<'_, BankAccount> {
        self.resource()
    }

    #[must_use]
    pub fn sales(&self) -> ResourceApi<'_, Sale> {
        self.resource()
    }

    #[must_use]
    pub fn sale_drafts(&self) -> ResourceApi<'_, SaleDraft> {
        self.resource()
    }

    #[must_use]
    pub fn purchases(&self) -> ResourceApi<'_, Purchase> {
        self.resource()
    }

    #[must_use]
    pub fn purchase_drafts(&self) -> ResourceApi<'_, PurchaseDraft> {
        self.resource()
    }

    #[must_use]
    pub fn invoices(&self) -> ResourceApi<'_, Invoice> {
        self.resource()
    }

    #[must_use]
    pub fn invoice_drafts(&self) -> ResourceApi<'_, InvoiceDraft> {
        self.resource()
    }

    #[must_use]
    pub fn offers(&self) -> ResourceApi<'_, Offer> {
        self.resource()
    }

    #[must_use]
    pub fn offer_drafts(&self) -> ResourceApi<'_, OfferDraft> {
        self.resource()
    }

    #[must_use]
    pub fn inbox(&self) -> ResourceApi<'_, InboxDocument> {
        self.resource()
    }
}
