use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::capabilities::{
    Attachable, Attachment, DeleteFlagable, Paymentable, RequiringRequest, Settleable,
    request_body,
};
use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::draft::Draft;
use crate::entities::contact::Contact;
use crate::entities::draft::{OrderDraft, OrderDraftRequest};
use crate::entities::payment::SalePayment;
use crate::entities::project::Project;
use crate::entities::shared::{Note, OrderLine};
use crate::error::Result;
use crate::resource::{DeletePolicy, Entity, EntityRequest};
use crate::utils::date_format::{fiken_date, fiken_date_option};
use crate::{contextual, resource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleKind {
    CashSale,
    Invoice,
    ExternalInvoice,
}

/// A sale. Sales are created through [`SaleRequest`] or by submitting a [`SaleDraft`], and
/// are never removed: deleting one flags it, see
/// [`delete_with_reason`](crate::ResourceApi::delete_with_reason).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sale {
    #[serde(skip_serializing_if = "Option::is_none")]
    sale_id: Option<i64>,
    #[serde(with = "fiken_date_option")]
    pub last_modified_date: Option<Date>,
    pub sale_number: Option<String>,
    pub transaction_id: Option<i64>,
    #[serde(with = "fiken_date_option")]
    pub date: Option<Date>,
    pub kind: Option<SaleKind>,
    pub net_amount: Option<i64>,
    pub vat_amount: Option<i64>,
    pub settled: Option<bool>,
    #[serde(with = "fiken_date_option")]
    pub settled_date: Option<Date>,
    pub write_off: Option<bool>,
    pub total_paid: Option<i64>,
    pub total_paid_in_currency: Option<i64>,
    pub outstanding_balance: Option<i64>,
    #[serde(with = "fiken_date_option")]
    pub due_date: Option<Date>,
    pub kid: Option<String>,
    pub payment_account: Option<String>,
    #[serde(with = "fiken_date_option")]
    pub payment_date: Option<Date>,
    pub lines: Vec<OrderLine>,
    pub customer: Option<Contact>,
    pub currency: Option<String>,
    pub sale_payments: Vec<SalePayment>,
    pub sale_attachments: Vec<Attachment>,
    pub project: Option<Project>,
    pub notes: Vec<Note>,
    pub deleted: Option<bool>,
    #[serde(skip)]
    context: ClientContext,
}

impl Sale {
    #[must_use]
    pub fn sale_id(&self) -> Option<i64> {
        self.sale_id
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false)
    }
}

resource! {
    Sale as "Sale",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/sales/{saleId}",
        Operation::GetMany => "/companies/{companySlug}/sales",
        Operation::Delete => "/companies/{companySlug}/sales/{saleId}/delete",
        Operation::SET_SETTLED => "/companies/{companySlug}/sales/{saleId}/settled",
        Operation::ATTACHMENTS => "/companies/{companySlug}/sales/{saleId}/attachments",
    },
    fields: { "saleId" => sale_id },
}

contextual!(Sale);

impl Entity for Sale {
    const ID_FIELD: &'static str = "saleId";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Flag;
}

impl Attachable for Sale {}
impl DeleteFlagable for Sale {}
impl Settleable for Sale {}

impl Paymentable for Sale {
    type Payment = SalePayment;
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    #[serde(with = "fiken_date")]
    pub date: Date,
    pub kind: SaleKind,
    pub currency: String,
    pub lines: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_paid: Option<i64>,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_account: Option<String>,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_fee: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

impl SaleRequest {
    #[must_use]
    pub fn new(date: Date, kind: SaleKind, currency: impl Into<String>, lines: Vec<OrderLine>) -> Self {
        Self {
            date,
            kind,
            currency: currency.into(),
            lines,
            sale_number: None,
            customer_id: None,
            total_paid: None,
            due_date: None,
            kid: None,
            payment_account: None,
            payment_date: None,
            payment_fee: None,
            project_id: None,
        }
    }
}

resource! {
    SaleRequest as "SaleRequest",
    templates: {
        Operation::Create => "/companies/{companySlug}/sales",
    },
    fields: {},
}

impl EntityRequest for SaleRequest {
    type Target = Sale;
}

/// A sale that hasn't been booked yet. Submitting it creates a [`Sale`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    draft_id: Option<i64>,
    #[serde(flatten)]
    pub draft: OrderDraft,
    #[serde(skip)]
    context: ClientContext,
}

impl SaleDraft {
    #[must_use]
    pub fn new(draft: OrderDraft) -> Self {
        Self {
            draft,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn draft_id(&self) -> Option<i64> {
        self.draft_id
    }
}

impl Deref for SaleDraft {
    type Target = OrderDraft;

    fn deref(&self) -> &OrderDraft {
        &self.draft
    }
}

impl DerefMut for SaleDraft {
    fn deref_mut(&mut self) -> &mut OrderDraft {
        &mut self.draft
    }
}

resource! {
    SaleDraft as "SaleDraft",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/sales/drafts/{draftId}",
        Operation::GetMany => "/companies/{companySlug}/sales/drafts",
        Operation::Create => "/companies/{companySlug}/sales/drafts",
        Operation::Update => "/companies/{companySlug}/sales/drafts/{draftId}",
        Operation::Delete => "/companies/{companySlug}/sales/drafts/{draftId}",
        Operation::CREATE_OBJECT => "/companies/{companySlug}/sales/drafts/{draftId}/createSale",
        Operation::ATTACHMENTS => "/companies/{companySlug}/sales/drafts/{draftId}/attachments",
    },
    fields: { "draftId" => draft_id },
}

contextual!(SaleDraft);

impl Entity for SaleDraft {
    const ID_FIELD: &'static str = "draftId";

    fn write_body(&self) -> Result<Value> {
        request_body(self)
    }
}

impl RequiringRequest for SaleDraft {
    type Request = OrderDraftRequest;

    fn to_request(&self) -> Result<OrderDraftRequest> {
        Ok(self.draft.to_request())
    }
}

impl Attachable for SaleDraft {}

impl Draft for SaleDraft {
    type Target = Sale;
}
