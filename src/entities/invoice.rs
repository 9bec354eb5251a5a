use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::capabilities::{Attachable, Countable, RequiringRequest, request_body};
use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::draft::Draft;
use crate::entities::contact::Contact;
use crate::entities::draft::{InvoiceishDraft, InvoiceishDraftKind, InvoiceishDraftRequest};
use crate::entities::shared::{Address, InvoiceLine};
use crate::error::Result;
use crate::resource::Entity;
use crate::utils::date_format::fiken_date_option;
use crate::{contextual, resource};

/// An issued invoice. Invoices are created by submitting an [`InvoiceDraft`] and numbered
/// by the company's invoice counter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_id: Option<i64>,
    #[serde(with = "fiken_date_option")]
    pub created_date: Option<Date>,
    #[serde(with = "fiken_date_option")]
    pub last_modified_date: Option<Date>,
    #[serde(with = "fiken_date_option")]
    pub issue_date: Option<Date>,
    #[serde(with = "fiken_date_option")]
    pub due_date: Option<Date>,
    #[serde(with = "fiken_date_option")]
    pub original_due_date: Option<Date>,
    pub invoice_number: Option<i64>,
    pub kid: Option<String>,
    pub invoice_text: Option<String>,
    pub your_reference: Option<String>,
    pub our_reference: Option<String>,
    pub order_reference: Option<String>,
    pub invoice_draft_uuid: Option<String>,
    pub net: Option<i64>,
    pub vat: Option<i64>,
    pub gross: Option<i64>,
    pub net_in_nok: Option<i64>,
    pub vat_in_nok: Option<i64>,
    pub gross_in_nok: Option<i64>,
    pub cash: Option<bool>,
    pub currency: Option<String>,
    pub settled: Option<bool>,
    pub sent_manually: Option<bool>,
    pub customer: Option<Contact>,
    pub address: Option<Address>,
    pub lines: Vec<InvoiceLine>,
    pub project_id: Option<i64>,
    #[serde(skip)]
    context: ClientContext,
}

impl Invoice {
    #[must_use]
    pub fn invoice_id(&self) -> Option<i64> {
        self.invoice_id
    }
}

resource! {
    Invoice as "Invoice",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/invoices/{invoiceId}",
        Operation::GetMany => "/companies/{companySlug}/invoices",
        Operation::COUNTER => "/companies/{companySlug}/invoices/counter",
        Operation::ATTACHMENTS => "/companies/{companySlug}/invoices/{invoiceId}/attachments",
    },
    fields: { "invoiceId" => invoice_id },
}

contextual!(Invoice);

impl Entity for Invoice {
    const ID_FIELD: &'static str = "invoiceId";
}

impl Countable for Invoice {}
impl Attachable for Invoice {}

/// An invoice being written. Submitting it issues an [`Invoice`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    draft_id: Option<i64>,
    #[serde(flatten)]
    pub draft: InvoiceishDraft,
    #[serde(skip)]
    context: ClientContext,
}

impl InvoiceDraft {
    /// A new invoice draft for `customer`, who must already exist on the server.
    #[must_use]
    pub fn new(customer: Contact, bank_account_number: impl Into<String>, days_until_due_date: i64) -> Self {
        Self {
            draft: InvoiceishDraft::new(
                InvoiceishDraftKind::Invoice,
                customer,
                bank_account_number,
                days_until_due_date,
            ),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn draft_id(&self) -> Option<i64> {
        self.draft_id
    }
}

impl Deref for InvoiceDraft {
    type Target = InvoiceishDraft;

    fn deref(&self) -> &InvoiceishDraft {
        &self.draft
    }
}

impl DerefMut for InvoiceDraft {
    fn deref_mut(&mut self) -> &mut InvoiceishDraft {
        &mut self.draft
    }
}

resource! {
    InvoiceDraft as "InvoiceDraft",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/invoices/drafts/{draftId}",
        Operation::GetMany => "/companies/{companySlug}/invoices/drafts",
        Operation::Create => "/companies/{companySlug}/invoices/drafts",
        Operation::Update => "/companies/{companySlug}/invoices/drafts/{draftId}",
        Operation::Delete => "/companies/{companySlug}/invoices/drafts/{draftId}",
        Operation::CREATE_OBJECT => "/companies/{companySlug}/invoices/drafts/{draftId}/createInvoice",
        Operation::ATTACHMENTS => "/companies/{companySlug}/invoices/drafts/{draftId}/attachments",
    },
    fields: { "draftId" => draft_id },
}

contextual!(InvoiceDraft);

impl Entity for InvoiceDraft {
    const ID_FIELD: &'static str = "draftId";

    fn write_body(&self) -> Result<Value> {
        request_body(self)
    }
}

impl RequiringRequest for InvoiceDraft {
    type Request = InvoiceishDraftRequest;

    fn to_request(&self) -> Result<InvoiceishDraftRequest> {
        self.draft.to_request("InvoiceDraft")
    }
}

impl Attachable for InvoiceDraft {}

impl Draft for InvoiceDraft {
    type Target = Invoice;
}
