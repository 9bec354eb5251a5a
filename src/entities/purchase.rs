use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::capabilities::{
    Attachable, Attachment, DeleteFlagable, Paymentable, RequiringRequest, request_body,
};
use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::draft::Draft;
use crate::entities::contact::Contact;
use crate::entities::draft::{OrderDraft, OrderDraftRequest};
use crate::entities::payment::PurchasePayment;
use crate::entities::project::Project;
use crate::entities::shared::OrderLine;
use crate::error::Result;
use crate::resource::{DeletePolicy, Entity, EntityRequest};
use crate::utils::date_format::{fiken_date, fiken_date_option};
use crate::{contextual, resource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseKind {
    CashPurchase,
    Supplier,
}

/// A purchase. Like sales, purchases are flagged rather than removed when deleted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Purchase {
    #[serde(skip_serializing_if = "Option::is_none")]
    purchase_id: Option<i64>,
    pub transaction_id: Option<i64>,
    pub identifier: Option<String>,
    #[serde(with = "fiken_date_option")]
    pub date: Option<Date>,
    #[serde(with = "fiken_date_option")]
    pub due_date: Option<Date>,
    pub kind: Option<PurchaseKind>,
    pub paid: Option<bool>,
    pub lines: Vec<OrderLine>,
    pub currency: Option<String>,
    pub kid: Option<String>,
    pub payment_account: Option<String>,
    #[serde(with = "fiken_date_option")]
    pub payment_date: Option<Date>,
    pub supplier: Option<Contact>,
    pub payments: Vec<PurchasePayment>,
    pub purchase_attachments: Vec<Attachment>,
    pub project: Vec<Project>,
    pub deleted: Option<bool>,
    #[serde(skip)]
    context: ClientContext,
}

impl Purchase {
    #[must_use]
    pub fn purchase_id(&self) -> Option<i64> {
        self.purchase_id
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false)
    }
}

resource! {
    Purchase as "Purchase",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/purchases/{purchaseId}",
        Operation::GetMany => "/companies/{companySlug}/purchases",
        Operation::Delete => "/companies/{companySlug}/purchases/{purchaseId}/delete",
        Operation::ATTACHMENTS => "/companies/{companySlug}/purchases/{purchaseId}/attachments",
    },
    fields: { "purchaseId" => purchase_id },
}

contextual!(Purchase);

impl Entity for Purchase {
    const ID_FIELD: &'static str = "purchaseId";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Flag;
}

impl Attachable for Purchase {}
impl DeleteFlagable for Purchase {}

impl Paymentable for Purchase {
    type Payment = PurchasePayment;
}

/// A cash purchase needs `payment_account` and `payment_date`; any other kind needs
/// `supplier_id`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(with = "fiken_date")]
    pub date: Date,
    pub kind: PurchaseKind,
    pub paid: bool,
    pub lines: Vec<OrderLine>,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_account: Option<String>,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<Date>,
}

impl PurchaseRequest {
    /// A purchase paid on the spot from `payment_account`.
    #[must_use]
    pub fn cash(
        date: Date,
        currency: impl Into<String>,
        lines: Vec<OrderLine>,
        payment_account: impl Into<String>,
    ) -> Self {
        Self {
            date,
            kind: PurchaseKind::CashPurchase,
            paid: true,
            lines,
            currency: currency.into(),
            supplier_id: None,
            project_id: None,
            identifier: None,
            due_date: None,
            kid: None,
            payment_account: Some(payment_account.into()),
            payment_date: Some(date),
        }
    }

    /// An unpaid purchase on credit from `supplier_id`.
    #[must_use]
    pub fn supplier(date: Date, currency: impl Into<String>, lines: Vec<OrderLine>, supplier_id: i64) -> Self {
        Self {
            date,
            kind: PurchaseKind::Supplier,
            paid: false,
            lines,
            currency: currency.into(),
            supplier_id: Some(supplier_id),
            project_id: None,
            identifier: None,
            due_date: None,
            kid: None,
            payment_account: None,
            payment_date: None,
        }
    }
}

resource! {
    PurchaseRequest as "PurchaseRequest",
    templates: {
        Operation::Create => "/companies/{companySlug}/purchases",
    },
    fields: {},
}

impl EntityRequest for PurchaseRequest {
    type Target = Purchase;
}

/// A purchase that hasn't been booked yet. Submitting it creates a [`Purchase`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    draft_id: Option<i64>,
    #[serde(flatten)]
    pub draft: OrderDraft,
    #[serde(skip)]
    context: ClientContext,
}

impl PurchaseDraft {
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

impl Deref for PurchaseDraft {
    type Target = OrderDraft;

    fn deref(&self) -> &OrderDraft {
        &self.draft
    }
}

impl DerefMut for PurchaseDraft {
    fn deref_mut(&mut self) -> &mut OrderDraft {
        &mut self.draft
    }
}

resource! {
    PurchaseDraft as "PurchaseDraft",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/purchases/drafts/{draftId}",
        Operation::GetMany => "/companies/{companySlug}/purchases/drafts",
        Operation::Create => "/companies/{companySlug}/purchases/drafts",
        Operation::Update => "/companies/{companySlug}/purchases/drafts/{draftId}",
        Operation::Delete => "/companies/{companySlug}/purchases/drafts/{draftId}",
        Operation::CREATE_OBJECT => "/companies/{companySlug}/purchases/drafts/{draftId}/createPurchase",
        Operation::ATTACHMENTS => "/companies/{companySlug}/purchases/drafts/{draftId}/attachments",
    },
    fields: { "draftId" => draft_id },
}

contextual!(PurchaseDraft);

impl Entity for PurchaseDraft {
    const ID_FIELD: &'static str = "draftId";

    fn write_body(&self) -> Result<Value> {
        request_body(self)
    }
}

impl RequiringRequest for PurchaseDraft {
    type Request = OrderDraftRequest;

    fn to_request(&self) -> Result<OrderDraftRequest> {
        Ok(self.draft.to_request())
    }
}

impl Attachable for PurchaseDraft {}

impl Draft for PurchaseDraft {
    type Target = Purchase;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn cash_purchase_carries_payment_details() {
        let request = PurchaseRequest::cash(date!(2024 - 02 - 10), "NOK", Vec::new(), "1920:10001");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["kind"], "cash_purchase");
        assert_eq!(body["paymentDate"], "2024-02-10");
        assert_eq!(body["paid"], true);
        assert!(body.get("supplierId").is_none());
    }

    #[test]
    fn purchase_lists_projects() {
        let purchase: Purchase = serde_json::from_value(json!({
            "purchaseId": 4,
            "kind": "supplier",
            "project": [{ "projectId": 1, "name": "Lager" }]
        }))
        .unwrap();
        assert_eq!(purchase.project.len(), 1);
        assert_eq!(purchase.kind, Some(PurchaseKind::Supplier));
        assert!(!purchase.is_deleted());
    }
}
