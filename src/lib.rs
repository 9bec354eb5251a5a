//! # fiken-rs
//!
//! A Rust client library for the [Fiken](https://fiken.no) accounting API.
//!
//! Every resource type declares its URL templates and the fields that fill them; the
//! generic lifecycle in [`ResourceApi`] does the rest:
//!
//! ```ignore
//! use fiken_rs::{Args, Client, Contact, Credential};
//!
//! let client = Client::with_token(Credential::personal(token))?.with_company("fiken-demo-as");
//!
//! let mut contact = Contact::new("Kari Nordmann");
//! client.contacts().save(&mut contact, Args::new()).await?;
//!
//! let all = client.contacts().get_all(Args::new()).await?;
//! ```
//!
//! Writes are answered with a `Location` header. The client follows it and replaces the
//! local object with the server's copy, so server-computed fields show up after `save`.
//!
//! ## Sentry Integration
//!
//! Errors driven by a server response carry a [`SpanTrace`] captured where they were
//! classified. With the `sentry` feature, errors also convert into Sentry breadcrumbs:
//!
//! ```toml
//! [dependencies]
//! fiken-rs = { version = "0.1.0-alpha.1", features = ["sentry"] }
//! ```
//!
//! Span traces are only recorded when the subscriber has an `ErrorLayer`:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .with(sentry::integrations::tracing::layer())
//!     .init();
//!
//! if let Err(e) = client.sales().get_all(Args::new()).await {
//!     if let Some(trace) = e.span_trace() {
//!         eprintln!("Span trace:\n{trace}");
//!     }
//!     sentry::capture_error(&e);
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod capabilities;
pub mod client;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod draft;
pub mod entities;
pub mod error;
pub mod oauth;
pub mod pagination;
pub mod path;
pub mod rate_limit;
pub mod resource;
pub mod transport;
pub mod utils;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use client::Client;
pub use config::Config;
pub use context::{ClientContext, clear_default_context, default_context, set_default_context};
pub use descriptor::{Descriptor, Operation};
pub use draft::{Draft, DraftState};
pub use entities::*;
pub use error::{ApiFailure, Error, Result, UsageError};
pub use oauth::{Credential, KeyPair};
pub use pagination::Paging;
pub use path::Args;
pub use rate_limit::RateLimiter;
pub use resource::{DeletePolicy, Entity, EntityRequest, ResourceApi, UploadRequest};
pub use transport::RawResponse;

// Re-export SpanTrace for users who want to access it
pub use tracing_error::SpanTrace;
