use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::descriptor::Operation;
use crate::error::Result;
use crate::path::Args;
use crate::resource::{Entity, ResourceApi, template_for};
use crate::transport::{Body, Call, Target};

/// Resources numbered by a per-company counter (invoices, offers, credit notes).
pub trait Countable: Entity {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub value: i64,
}

impl<E: Countable> ResourceApi<'_, E> {
    /// The current value of the counter.
    #[instrument(skip(self), fields(resource = E::NAME))]
    pub async fn counter(&self, args: Args) -> Result<i64> {
        let template = template_for::<E>(Operation::COUNTER)?;
        let context = self.call_context(None, &args);
        let call = Call::new(
            Method::GET,
            Operation::COUNTER,
            Target::Template(template),
            context,
        )
        .args(args);
        let counter: Counter = self.client().execute(call).await?.json()?;
        Ok(counter.value)
    }

    /// Creates the counter with a starting value. Returns `true` if the server reports it as
    /// created; a counter can only be initialized once per company.
    #[instrument(skip(self), fields(resource = E::NAME))]
    pub async fn set_initial_counter(&self, value: i64, args: Args) -> Result<bool> {
        let template = template_for::<E>(Operation::COUNTER)?;
        let context = self.call_context(None, &args);
        let call = Call::new(
            Method::POST,
            Operation::COUNTER,
            Target::Template(template),
            context,
        )
        .args(args)
        .body(Body::Json(serde_json::to_value(Counter { value })?));
        let response = self.client().execute(call).await?;
        Ok(response.status == StatusCode::CREATED)
    }
}
