use crate::error::Result;
use crate::path::Args;
use crate::resource::{Entity, ResourceApi};

/// Resources that payments can be registered against.
pub trait Paymentable: Entity {
    /// The payment resource, addressed under the parent's identity.
    type Payment: Entity;
}

impl<E: Paymentable> ResourceApi<'_, E> {
    /// Registers `payment` against `parent` and refreshes `payment` from the server.
    #[instrument(skip(self, parent, payment), fields(resource = E::NAME, id = ?parent.id()))]
    pub async fn add_payment(&self, parent: &E, payment: &mut E::Payment) -> Result<()> {
        let id = Self::require_identity(parent)?;
        self.payment_api(parent)
            .save(payment, Args::new().with(E::ID_FIELD, id))
            .await
    }

    /// Every payment registered against `parent`.
    #[instrument(skip(self, parent), fields(resource = E::NAME, id = ?parent.id()))]
    pub async fn payments(&self, parent: &E) -> Result<Vec<E::Payment>> {
        let id = Self::require_identity(parent)?;
        self.payment_api(parent)
            .get_all(Args::new().with(E::ID_FIELD, id))
            .await
    }

    fn payment_api(&self, parent: &E) -> ResourceApi<'_, E::Payment> {
        let context = self.call_context(Some(parent.context()), &Args::new());
        self.client().resource::<E::Payment>().with_context(context)
    }
}
