use reqwest::Method;

use crate::descriptor::Operation;
use crate::error::{Result, UsageError};
use crate::path::Args;
use crate::resource::{Entity, ResourceApi, template_for};
use crate::transport::{Call, Target};

/// Where a draft is in its life.
///
/// A draft starts out `New`, becomes `Persisted` on its first save and stays there through
/// further saves. Submitting consumes it and yields the target resource; deleting it resets
/// it. In both cases the server no longer knows the draft id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    New,
    Persisted,
}

/// A persisted-but-uncommitted resource that can be submitted to create another resource.
pub trait Draft: Entity {
    /// The resource created when the draft is submitted.
    type Target: Entity;

    fn state(&self) -> DraftState {
        if self.is_new() {
            DraftState::New
        } else {
            DraftState::Persisted
        }
    }
}

impl<D: Draft> ResourceApi<'_, D> {
    /// Turns a saved draft into the resource it describes and returns that resource.
    ///
    /// Fails before any request if the draft type can't be submitted or the draft has never
    /// been saved.
    #[instrument(skip(self, draft), fields(resource = D::NAME, id = ?draft.id()))]
    pub async fn submit(&self, draft: D, args: Args) -> Result<D::Target> {
        let template = template_for::<D>(Operation::CREATE_OBJECT)?;
        if draft.state() != DraftState::Persisted {
            return Err(UsageError::UnsavedDraft {
                resource: D::NAME.to_string(),
            }
            .into());
        }

        let context = self.call_context(Some(draft.context()), &args);
        let call = Call::new(
            Method::POST,
            Operation::CREATE_OBJECT,
            Target::Template(template),
            context.clone(),
        )
        .fields(&draft)
        .args(args);
        let response = self.client().execute(call).await?;

        let location = Self::require_location(&response)?;
        info!(%location, "draft submitted");
        self.client()
            .resource::<D::Target>()
            .fetch_url(location, &context)
            .await
    }
}
