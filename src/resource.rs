use std::marker::PhantomData;

use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::client::Client;
use crate::context::{ClientContext, Contextual};
use crate::descriptor::{Descriptor, Operation};
use crate::error::{Error, Result, UsageError};
use crate::pagination::Paging;
use crate::path::{Args, COMPANY_SLUG, PathFields};
use crate::transport::{Body, Call, RawResponse, Target, Upload};

/// How a resource goes away when deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// `DELETE` the resource and clear the local object.
    Remove,
    /// The server keeps the resource and marks it deleted; a reason is required and the
    /// object is re-fetched afterwards. See [`DeleteFlagable`](crate::capabilities::DeleteFlagable).
    Flag,
}

/// A resource with a server-assigned identity, fetchable and listable.
pub trait Entity:
    Descriptor
    + PathFields
    + Contextual
    + Serialize
    + DeserializeOwned
    + Default
    + Send
    + Sync
    + 'static
{
    /// Wire and placeholder name of the identity field, e.g. `contactId`.
    const ID_FIELD: &'static str;

    const DELETE_POLICY: DeletePolicy = DeletePolicy::Remove;

    fn id(&self) -> Option<String> {
        self.path_field(Self::ID_FIELD)
    }

    /// `true` until the server has assigned an identity.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// The body sent on create and full update.
    fn write_body(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// The body sent when the only update operation is `PATCH`.
    fn patch_body(&self) -> Result<Value> {
        self.write_body()
    }
}

/// A write-only payload that produces an entity when created.
pub trait EntityRequest: Descriptor + PathFields + Serialize + Sync {
    type Target: Entity;
}

/// A create payload sent as a file upload rather than JSON.
pub trait UploadRequest: Descriptor + PathFields + Sync {
    type Target: Entity;

    fn upload(&self) -> Result<Upload>;
}

/// Template lookup that fails when the type doesn't declare `operation`.
///
/// Standard kinds fail as unsupported methods; custom kinds mean the type lacks the
/// capability altogether and fail as a wrong media type.
pub(crate) fn template_for<D: Descriptor>(operation: Operation) -> Result<&'static str> {
    D::template(operation).ok_or_else(|| match operation {
        Operation::Custom(name) => Error::wrong_media_type(D::NAME, name),
        _ => Error::unsupported(D::NAME, operation),
    })
}

/// Lifecycle operations for one resource type, bound to a client.
///
/// Returned by [`Client::resource`] and the typed shortcuts such as [`Client::sales`].
pub struct ResourceApi<'a, E> {
    client: &'a Client,
    context: ClientContext,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for ResourceApi<'_, E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            context: self.context.clone(),
            _entity: PhantomData,
        }
    }
}

impl<'a, E: Entity> ResourceApi<'a, E> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            context: ClientContext::default(),
            _entity: PhantomData,
        }
    }

    /// Overrides the client's and the object's context for calls made through this handle.
    #[must_use]
    pub fn with_context(mut self, context: ClientContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_company(mut self, company_slug: impl Into<String>) -> Self {
        self.context = self.context.with_company(company_slug);
        self
    }

    pub(crate) fn client(&self) -> &'a Client {
        self.client
    }

    /// The context a call runs with. A `companySlug` argument beats everything, then this
    /// handle's context, the object's, the client's and the process-wide default.
    pub(crate) fn call_context(&self, object: Option<&ClientContext>, args: &Args) -> ClientContext {
        let narrow = match object {
            Some(object) => self.context.or(object),
            None => self.context.clone(),
        };
        let context = self.client.resolve_context(&narrow);
        match args.get(COMPANY_SLUG) {
            Some(slug) => context.with_company(slug),
            None => context,
        }
    }

    fn tagged<T: Contextual>(mut object: T, context: &ClientContext) -> T {
        object.set_context(context.clone());
        object
    }

    /// Fetches one resource. A 404 is `Ok(None)`; every other failure is an error.
    #[instrument(skip(self), fields(resource = E::NAME))]
    pub async fn get(&self, args: Args) -> Result<Option<E>> {
        let template = template_for::<E>(Operation::GetOne)?;
        let context = self.call_context(None, &args);
        let call = Call::new(
            Method::GET,
            Operation::GetOne,
            Target::Template(template),
            context.clone(),
        )
        .args(args);

        match self.client.execute(call).await {
            Ok(response) => Ok(Some(Self::tagged(response.json()?, &context))),
            Err(e) if e.is_not_found() => {
                debug!("resource not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetches one resource by its identity.
    pub async fn get_by_id(&self, id: impl ToString) -> Result<Option<E>> {
        self.get(Args::new().with(E::ID_FIELD, id.to_string())).await
    }

    /// Fetches the whole collection, following every page.
    pub async fn get_all(&self, args: Args) -> Result<Vec<E>> {
        self.get_all_with(args, Paging::default()).await
    }

    #[instrument(skip(self), fields(resource = E::NAME))]
    pub async fn get_all_with(&self, args: Args, paging: Paging) -> Result<Vec<E>> {
        let template = template_for::<E>(Operation::GetMany)?;
        let context = self.call_context(None, &args);
        let items = self
            .client
            .fetch_pages(template, args, context.clone(), paging)
            .await?;

        items
            .into_iter()
            .map(|item| Ok(Self::tagged(serde_json::from_value::<E>(item)?, &context)))
            .collect()
    }

    /// Creates or updates `object`, then replaces it with the server's copy.
    ///
    /// A new object is `POST`ed. An existing one is `PUT` when the type supports it and
    /// otherwise `PATCH`ed with its patch body. The response must carry a `Location`, which
    /// is fetched and written back into `object`.
    #[instrument(skip(self, object), fields(resource = E::NAME, id = ?object.id()))]
    pub async fn save(&self, object: &mut E, args: Args) -> Result<()> {
        let context = self.call_context(Some(object.context()), &args);

        let (method, operation, body) = if object.is_new() {
            (Method::POST, Operation::Create, object.write_body()?)
        } else if E::supports(Operation::Update) {
            (Method::PUT, Operation::Update, object.write_body()?)
        } else if E::supports(Operation::Patch) {
            (Method::PATCH, Operation::Patch, object.patch_body()?)
        } else {
            return Err(Error::unsupported(E::NAME, Operation::Update));
        };
        let template = template_for::<E>(operation)?;

        let call = Call::new(method, operation, Target::Template(template), context.clone())
            .fields(&*object)
            .args(args)
            .body(Body::Json(body));
        let response = self.client.execute(call).await?;

        let location = Self::require_location(&response)?;
        *object = self.fetch_url(location, &context).await?;
        Ok(())
    }

    /// Deletes `object` on the server and resets it to its empty state.
    ///
    /// Resources that are deleted by flagging must go through
    /// [`DeleteFlagable::delete_with_reason`](crate::capabilities::DeleteFlagable::delete_with_reason).
    #[instrument(skip(self, object), fields(resource = E::NAME, id = ?object.id()))]
    pub async fn delete(&self, object: &mut E, args: Args) -> Result<()> {
        if E::DELETE_POLICY == DeletePolicy::Flag {
            return Err(UsageError::MissingDeletionReason {
                resource: E::NAME.to_string(),
            }
            .into());
        }
        let template = template_for::<E>(Operation::Delete)?;
        Self::require_identity(object)?;

        let context = self.call_context(Some(object.context()), &args);
        let call = Call::new(
            Method::DELETE,
            Operation::Delete,
            Target::Template(template),
            context,
        )
        .fields(&*object)
        .args(args);
        self.client.execute(call).await?;

        let context = object.context().clone();
        *object = E::default();
        object.set_context(context);
        info!("resource deleted");
        Ok(())
    }

    /// Re-fetches `object` in place.
    #[instrument(skip(self, object), fields(resource = E::NAME, id = ?object.id()))]
    pub async fn refresh(&self, object: &mut E, args: Args) -> Result<()> {
        let template = template_for::<E>(Operation::GetOne)?;
        Self::require_identity(object)?;

        let context = self.call_context(Some(object.context()), &args);
        let call = Call::new(
            Method::GET,
            Operation::GetOne,
            Target::Template(template),
            context.clone(),
        )
        .fields(&*object)
        .args(args);
        let response = self.client.execute(call).await?;
        *object = Self::tagged(response.json()?, &context);
        Ok(())
    }

    /// Creates a resource from a request payload and returns the created resource.
    #[instrument(skip(self, request), fields(resource = R::NAME))]
    pub async fn create<R>(&self, request: &R, args: Args) -> Result<E>
    where
        R: EntityRequest<Target = E>,
    {
        let template = template_for::<R>(Operation::Create)?;
        let context = self.call_context(None, &args);
        let call = Call::new(
            Method::POST,
            Operation::Create,
            Target::Template(template),
            context.clone(),
        )
        .fields(request)
        .args(args)
        .body(Body::Json(serde_json::to_value(request)?));
        let response = self.client.execute(call).await?;

        let location = Self::require_location(&response)?;
        self.fetch_url(location, &context).await
    }

    /// Creates a resource by uploading a file and returns the created resource.
    #[instrument(skip(self, request), fields(resource = R::NAME))]
    pub async fn upload<R>(&self, request: &R, args: Args) -> Result<E>
    where
        R: UploadRequest<Target = E>,
    {
        let template = template_for::<R>(Operation::Create)?;
        let context = self.call_context(None, &args);
        let call = Call::new(
            Method::POST,
            Operation::Create,
            Target::Template(template),
            context.clone(),
        )
        .fields(request)
        .args(args)
        .body(Body::Upload(request.upload()?));
        let response = self.client.execute(call).await?;

        let location = Self::require_location(&response)?;
        self.fetch_url(location, &context).await
    }

    /// Fetches a resource from an absolute URL, such as a `Location` header.
    pub async fn fetch_url(&self, url: Url, context: &ClientContext) -> Result<E> {
        trace!(%url, "following location");
        let call = Call::new(
            Method::GET,
            Operation::GetOne,
            Target::Url(url),
            context.clone(),
        );
        let response = self.client.execute(call).await?;
        Ok(Self::tagged(response.json()?, context))
    }

    pub(crate) fn require_location(response: &RawResponse) -> Result<Url> {
        response.location().ok_or_else(|| {
            error!(url = %response.url, "no location header in write response");
            UsageError::MissingLocation {
                resource: E::NAME.to_string(),
            }
            .into()
        })
    }

    pub(crate) fn require_identity(object: &E) -> Result<String> {
        object.id().ok_or_else(|| {
            UsageError::MissingIdentity {
                resource: E::NAME.to_string(),
            }
            .into()
        })
    }
}
