use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::resource::Entity;

/// Entities whose write payload has a different shape from what the server returns, e.g.
/// nested objects that must be sent as ids.
pub trait RequiringRequest: Entity {
    type Request: Serialize;

    fn to_request(&self) -> Result<Self::Request>;
}

/// The write body of a [`RequiringRequest`] entity. Implementors return this from
/// [`Entity::write_body`].
pub fn request_body<E: RequiringRequest>(entity: &E) -> Result<Value> {
    Ok(serde_json::to_value(entity.to_request()?)?)
}
