//! Fiken resource models.
//!
//! Each model only supplies metadata to the generic lifecycle: its URL templates, the fields
//! that fill placeholders, and which capabilities it has. Amounts are in øre (1/100 NOK).

pub mod bank_account;
pub mod company;
pub mod contact;
pub mod draft;
pub mod inbox;
pub mod invoice;
pub mod offer;
pub mod payment;
pub mod product;
pub mod project;
pub mod purchase;
pub mod sale;
pub mod shared;
pub mod user;

pub use bank_account::{BankAccount, BankAccountRequest, BankAccountType};
pub use company::Company;
pub use contact::{Contact, ContactPerson};
pub use draft::{
    InvoiceishDraft, InvoiceishDraftKind, InvoiceishDraftRequest, OrderDraft, OrderDraftRequest,
};
pub use inbox::{InboxDocument, InboxDocumentRequest};
pub use invoice::{Invoice, InvoiceDraft};
pub use offer::{Offer, OfferDraft};
pub use payment::{Payment, PurchasePayment, SalePayment};
pub use product::Product;
pub use project::{Project, ProjectRequest};
pub use purchase::{Purchase, PurchaseDraft, PurchaseKind, PurchaseRequest};
pub use sale::{Sale, SaleDraft, SaleKind, SaleRequest};
pub use shared::{Address, InvoiceDraftLine, InvoiceLine, Note, OrderDraftLine, OrderLine};
pub use user::UserInfo;
