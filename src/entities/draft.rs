//! Bodies shared by the draft resources.
//!
//! Invoices, offers, credit notes and order confirmations are drafted with the same
//! "invoice-ish" body; sales and purchases share the order body. The concrete draft types
//! live next to the resource they are submitted into.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::capabilities::Attachment;
use crate::entities::contact::Contact;
use crate::entities::payment::Payment;
use crate::entities::project::Project;
use crate::entities::shared::{InvoiceDraftLine, OrderDraftLine};
use crate::error::{Result, UsageError};
use crate::utils::date_format::fiken_date_option;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceishDraftKind {
    Invoice,
    CashInvoice,
    Offer,
    CreditNote,
    OrderConfirmation,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceishDraft {
    pub uuid: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<InvoiceishDraftKind>,
    pub project_id: Option<i64>,
    #[serde(with = "fiken_date_option")]
    pub last_modified_date: Option<Date>,
    #[serde(with = "fiken_date_option")]
    pub issue_date: Option<Date>,
    pub days_until_due_date: Option<i64>,
    pub invoice_text: Option<String>,
    pub currency: Option<String>,
    pub your_reference: Option<String>,
    pub our_reference: Option<String>,
    pub order_reference: Option<String>,
    pub lines: Vec<InvoiceDraftLine>,
    pub net: Option<i64>,
    pub gross: Option<i64>,
    pub bank_account_number: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub payment_account: Option<String>,
    pub customers: Vec<Contact>,
    pub contact_person_id: Option<i64>,
    pub attachments: Vec<Attachment>,
    pub created_from_invoice_id: Option<i64>,
}

/// What the server accepts when an invoice-ish draft is created or updated: the customer
/// goes by id.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceishDraftRequest {
    #[serde(rename = "type")]
    pub kind: InvoiceishDraftKind,
    pub days_until_due_date: i64,
    pub customer_id: i64,
    pub bank_account_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub our_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    pub lines: Vec<InvoiceDraftLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_account: Option<String>,
}

impl InvoiceishDraft {
    pub(crate) fn new(
        kind: InvoiceishDraftKind,
        customer: Contact,
        bank_account_number: impl Into<String>,
        days_until_due_date: i64,
    ) -> Self {
        Self {
            kind: Some(kind),
            customers: vec![customer],
            bank_account_number: Some(bank_account_number.into()),
            days_until_due_date: Some(days_until_due_date),
            ..Self::default()
        }
    }

    pub(crate) fn to_request(&self, resource: &str) -> Result<InvoiceishDraftRequest> {
        let missing = |field: &str| UsageError::MissingField {
            resource: resource.to_string(),
            field: field.to_string(),
        };

        Ok(InvoiceishDraftRequest {
            kind: self.kind.ok_or_else(|| missing("type"))?,
            days_until_due_date: self
                .days_until_due_date
                .ok_or_else(|| missing("daysUntilDueDate"))?,
            customer_id: self
                .customers
                .first()
                .and_then(Contact::contact_id)
                .ok_or_else(|| missing("customerId"))?,
            bank_account_number: self
                .bank_account_number
                .clone()
                .ok_or_else(|| missing("bankAccountNumber"))?,
            contact_person_id: self.contact_person_id,
            uuid: self.uuid.clone(),
            project_id: self.project_id,
            issue_date: self.issue_date,
            invoice_text: self.invoice_text.clone(),
            currency: self.currency.clone(),
            your_reference: self.your_reference.clone(),
            our_reference: self.our_reference.clone(),
            order_reference: self.order_reference.clone(),
            lines: self.lines.clone(),
            iban: self.iban.clone(),
            bic: self.bic.clone(),
            payment_account: self.payment_account.clone(),
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderDraft {
    pub uuid: Option<String>,
    #[serde(with = "fiken_date_option")]
    pub invoice_issue_date: Option<Date>,
    #[serde(with = "fiken_date_option")]
    pub due_date: Option<Date>,
    pub invoice_number: Option<String>,
    pub cash: bool,
    pub currency: Option<String>,
    pub kid: Option<String>,
    pub paid: Option<bool>,
    pub lines: Vec<OrderDraftLine>,
    pub contact: Option<Contact>,
    pub project: Option<Project>,
    pub attachments: Vec<Attachment>,
    pub payments: Vec<Payment>,
}

/// The write shape of an [`OrderDraft`]: the contact and project go by id.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraftRequest {
    pub cash: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    pub invoice_issue_date: Option<Date>,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    pub lines: Vec<OrderDraftLine>,
}

impl OrderDraft {
    pub(crate) fn to_request(&self) -> OrderDraftRequest {
        OrderDraftRequest {
            cash: self.cash,
            contact_id: self.contact.as_ref().and_then(Contact::contact_id),
            project_id: self.project.as_ref().and_then(Project::project_id),
            uuid: self.uuid.clone(),
            invoice_issue_date: self.invoice_issue_date,
            due_date: self.due_date,
            invoice_number: self.invoice_number.clone(),
            currency: self.currency.clone(),
            kid: self.kid.clone(),
            paid: self.paid,
            lines: self.lines.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invoiceish_request_sends_customer_by_id() {
        let customer: Contact =
            serde_json::from_value(json!({ "contactId": 55, "name": "Kari" })).unwrap();
        let draft = InvoiceishDraft::new(InvoiceishDraftKind::Invoice, customer, "12345678903", 14);

        let body = serde_json::to_value(draft.to_request("InvoiceDraft").unwrap()).unwrap();
        assert_eq!(body["customerId"], 55);
        assert_eq!(body["type"], "invoice");
        assert_eq!(body["daysUntilDueDate"], 14);
        assert!(body.get("customers").is_none());
    }

    #[test]
    fn invoiceish_request_needs_a_saved_customer() {
        let draft = InvoiceishDraft::new(
            InvoiceishDraftKind::Offer,
            Contact::new("Not saved"),
            "12345678903",
            14,
        );
        let error = draft.to_request("OfferDraft").unwrap_err();
        assert!(matches!(
            error,
            crate::Error::Usage(UsageError::MissingField { ref field, .. }) if field == "customerId"
        ));
    }

    #[test]
    fn order_request_flattens_contact() {
        let contact: Contact =
            serde_json::from_value(json!({ "contactId": 9, "name": "Leverandør AS" })).unwrap();
        let draft = OrderDraft {
            cash: true,
            contact: Some(contact),
            ..OrderDraft::default()
        };
        let body = serde_json::to_value(draft.to_request()).unwrap();
        assert_eq!(body, json!({ "cash": true, "contactId": 9, "lines": [] }));
    }
}
