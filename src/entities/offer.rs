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

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Offer {
    #[serde(skip_serializing_if = "Option::is_none")]
    offer_id: Option<i64>,
    pub offer_draft_uuid: Option<String>,
    #[serde(with = "fiken_date_option")]
    pub date: Option<Date>,
    pub offer_number: Option<i64>,
    pub net: Option<i64>,
    pub vat: Option<i64>,
    pub gross: Option<i64>,
    pub comment: Option<String>,
    pub your_reference: Option<String>,
    pub our_reference: Option<String>,
    pub discount: Option<i64>,
    pub address: Option<Address>,
    pub lines: Vec<InvoiceLine>,
    pub currency: Option<String>,
    pub contact_id: Option<i64>,
    pub contact_person_id: Option<i64>,
    pub project_id: Option<i64>,
    pub archived: Option<bool>,
    #[serde(skip)]
    context: ClientContext,
}

impl Offer {
    #[must_use]
    pub fn offer_id(&self) -> Option<i64> {
        self.offer_id
    }
}

resource! {
    Offer as "Offer",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/offers/{offerId}",
        Operation::GetMany => "/companies/{companySlug}/offers",
        Operation::COUNTER => "/companies/{companySlug}/offers/counter",
        Operation::ATTACHMENTS => "/companies/{companySlug}/offers/{offerId}/attachments",
    },
    fields: { "offerId" => offer_id },
}

contextual!(Offer);

impl Entity for Offer {
    const ID_FIELD: &'static str = "offerId";
}

impl Countable for Offer {}
impl Attachable for Offer {}

/// An offer being written. Submitting it creates an [`Offer`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    draft_id: Option<i64>,
    #[serde(flatten)]
    pub draft: InvoiceishDraft,
    #[serde(skip)]
    context: ClientContext,
}

impl OfferDraft {
    #[must_use]
    pub fn new(customer: Contact, bank_account_number: impl Into<String>, days_until_due_date: i64) -> Self {
        Self {
            draft: InvoiceishDraft::new(
                InvoiceishDraftKind::Offer,
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

impl Deref for OfferDraft {
    type Target = InvoiceishDraft;

    fn deref(&self) -> &InvoiceishDraft {
        &self.draft
    }
}

impl DerefMut for OfferDraft {
    fn deref_mut(&mut self) -> &mut InvoiceishDraft {
        &mut self.draft
    }
}

resource! {
    OfferDraft as "OfferDraft",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/offers/drafts/{draftId}",
        Operation::GetMany => "/companies/{companySlug}/offers/drafts",
        Operation::Create => "/companies/{companySlug}/offers/drafts",
        Operation::Update => "/companies/{companySlug}/offers/drafts/{draftId}",
        Operation::Delete => "/companies/{companySlug}/offers/drafts/{draftId}",
        Operation::CREATE_OBJECT => "/companies/{companySlug}/offers/drafts/{draftId}/createOffer",
        Operation::ATTACHMENTS => "/companies/{companySlug}/offers/drafts/{draftId}/attachments",
    },
    fields: { "draftId" => draft_id },
}

contextual!(OfferDraft);

impl Entity for OfferDraft {
    const ID_FIELD: &'static str = "draftId";

    fn write_body(&self) -> Result<Value> {
        request_body(self)
    }
}

impl RequiringRequest for OfferDraft {
    type Request = InvoiceishDraftRequest;

    fn to_request(&self) -> Result<InvoiceishDraftRequest> {
        self.draft.to_request("OfferDraft")
    }
}

impl Attachable for OfferDraft {}

impl Draft for OfferDraft {
    type Target = Offer;
}
