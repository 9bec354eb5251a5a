use reqwest::Method;

use crate::descriptor::Operation;
use crate::error::{Result, UsageError};
use crate::path::{Args, COMPANY_SLUG};
use crate::resource::{Entity, ResourceApi, template_for};
use crate::transport::{Call, Target};

/// Query parameter carrying the reason for a soft delete.
const DESCRIPTION: &str = "description";

/// Resources that are never removed. Deleting one books a counter-entry and marks it
/// deleted, so the object stays retrievable.
///
/// Implementors should set [`Entity::DELETE_POLICY`] to
/// [`DeletePolicy::Flag`](crate::resource::DeletePolicy::Flag) so the plain `delete` refuses
/// to run without a reason.
pub trait DeleteFlagable: Entity {}

impl<E: DeleteFlagable> ResourceApi<'_, E> {
    /// Marks `object` as deleted with `reason`, then re-fetches it so it reflects the
    /// server's deleted state.
    #[instrument(skip(self, object), fields(resource = E::NAME, id = ?object.id()))]
    pub async fn delete_with_reason(&self, object: &mut E, reason: &str, args: Args) -> Result<()> {
        if reason.trim().is_empty() {
            return Err(UsageError::MissingDeletionReason {
                resource: E::NAME.to_string(),
            }
            .into());
        }
        let template = template_for::<E>(Operation::Delete)?;
        Self::require_identity(object)?;

        let context = self.call_context(Some(object.context()), &args);
        let refresh_args = match args.get(COMPANY_SLUG) {
            Some(slug) => Args::new().with(COMPANY_SLUG, slug),
            None => Args::new(),
        };

        let call = Call::new(
            Method::PATCH,
            Operation::Delete,
            Target::Template(template),
            context,
        )
        .fields(&*object)
        .args(args.with(DESCRIPTION, reason));
        self.client().execute(call).await?;
        info!("resource flagged as deleted");

        self.refresh(object, refresh_args).await
    }
}
