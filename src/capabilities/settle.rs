use reqwest::Method;
use time::Date;

use crate::descriptor::Operation;
use crate::error::{Error, Result};
use crate::path::{Args, COMPANY_SLUG};
use crate::resource::{Entity, ResourceApi, template_for};
use crate::transport::{Call, Target};
use crate::utils::date_format::format_date;

/// Resources that can be marked as settled without registering a payment.
pub trait Settleable: Entity {}

impl<E: Settleable> ResourceApi<'_, E> {
    /// Marks `object` as settled on `settled_date` and re-fetches it.
    #[instrument(skip(self, object), fields(resource = E::NAME, id = ?object.id()))]
    pub async fn set_settled(&self, object: &mut E, settled_date: Date, args: Args) -> Result<()> {
        let template = template_for::<E>(Operation::SET_SETTLED)?;
        Self::require_identity(object)?;

        let settled_date = format_date(settled_date)
            .map_err(|e| Error::InvalidEndpoint(format!("settledDate: {e}")))?;
        let context = self.call_context(Some(object.context()), &args);
        let refresh_args = match args.get(COMPANY_SLUG) {
            Some(slug) => Args::new().with(COMPANY_SLUG, slug),
            None => Args::new(),
        };

        let call = Call::new(
            Method::PATCH,
            Operation::SET_SETTLED,
            Target::Template(template),
            context,
        )
        .fields(&*object)
        .args(args.with("settledDate", settled_date));
        self.client().execute(call).await?;

        self.refresh(object, refresh_args).await
    }
}
