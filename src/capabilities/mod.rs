//! Optional behaviour a resource type opts into by implementing a marker trait.
//!
//! Each trait unlocks extra methods on [`ResourceApi`](crate::resource::ResourceApi) for the
//! types implementing it, so a missing capability is a compile error rather than a runtime
//! lookup. The URL templates still come from the type's descriptor, and a type that opts in
//! without declaring the template fails locally with [`Error::WrongMediaType`](crate::Error::WrongMediaType).

mod attachment;
mod counter;
mod flag_delete;
mod payment;
mod request;
mod settle;

pub use attachment::{Attachable, Attachment, AttachmentUpload, mime_for};
pub use counter::{Countable, Counter};
pub use flag_delete::DeleteFlagable;
pub use payment::Paymentable;
pub use request::{RequiringRequest, request_body};
pub use settle::Settleable;
