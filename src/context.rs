use std::sync::{PoisonError, RwLock};

use crate::error::UsageError;
use crate::oauth::Credential;

/// The session scope of a call: which credential authenticates it and which company it
/// targets.
///
/// A context is an immutable value. Narrower scopes override wider ones field by field:
/// call arguments, then the object's own context, then the client's, then the process-wide
/// default (see [`set_default_context`]).
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    credential: Option<Credential>,
    company_slug: Option<String>,
}

impl ClientContext {
    #[must_use]
    pub fn new(credential: Credential, company_slug: impl Into<String>) -> Self {
        Self {
            credential: Some(credential),
            company_slug: Some(company_slug.into()),
        }
    }

    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    #[must_use]
    pub fn with_company(mut self, company_slug: impl Into<String>) -> Self {
        self.company_slug = Some(company_slug.into());
        self
    }

    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    #[must_use]
    pub fn company_slug(&self) -> Option<&str> {
        self.company_slug.as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credential.is_none() && self.company_slug.is_none()
    }

    /// Fills the fields this context leaves unset from `fallback`.
    #[must_use]
    pub fn or(&self, fallback: &Self) -> Self {
        Self {
            credential: self
                .credential
                .clone()
                .or_else(|| fallback.credential.clone()),
            company_slug: self
                .company_slug
                .clone()
                .or_else(|| fallback.company_slug.clone()),
        }
    }
}

impl PartialEq for ClientContext {
    fn eq(&self, other: &Self) -> bool {
        let same_credential = match (&self.credential, &other.credential) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };
        same_credential && self.company_slug == other.company_slug
    }
}

/// Types that remember the context they were fetched or saved with, so later calls on the
/// same object don't need it passed again.
pub trait Contextual {
    fn context(&self) -> &ClientContext;
    fn set_context(&mut self, context: ClientContext);
}

/// Implements [`Contextual`] for a type with a `context: ClientContext` field.
#[macro_export]
macro_rules! contextual {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::context::Contextual for $ty {
                fn context(&self) -> &$crate::context::ClientContext {
                    &self.context
                }

                fn set_context(&mut self, context: $crate::context::ClientContext) {
                    self.context = context;
                }
            }
        )+
    };
}

static DEFAULT_CONTEXT: RwLock<Option<ClientContext>> = RwLock::new(None);

/// Sets the process-wide fallback context.
///
/// Setting over an existing default fails; call [`clear_default_context`] first.
pub fn set_default_context(context: ClientContext) -> Result<(), UsageError> {
    let mut slot = DEFAULT_CONTEXT
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return Err(UsageError::DefaultContextAlreadySet);
    }
    debug!(company = ?context.company_slug(), "setting default client context");
    *slot = Some(context);
    Ok(())
}

/// Removes the process-wide fallback context, returning it.
pub fn clear_default_context() -> Option<ClientContext> {
    DEFAULT_CONTEXT
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}

/// The process-wide fallback context, or an empty one.
#[must_use]
pub fn default_context() -> ClientContext {
    DEFAULT_CONTEXT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_default()
}
