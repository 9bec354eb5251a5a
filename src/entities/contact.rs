use serde::{Deserialize, Serialize};
use time::Date;

use crate::capabilities::Attachable;
use crate::context::{ClientContext, Contextual};
use crate::descriptor::Operation;
use crate::entities::shared::{Address, Note};
use crate::error::Result;
use crate::path::Args;
use crate::resource::{Entity, ResourceApi};
use crate::utils::date_format::fiken_date_option;
use crate::{contextual, resource};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_id: Option<i64>,
    #[serde(with = "fiken_date_option", skip_serializing)]
    pub created_date: Option<Date>,
    #[serde(with = "fiken_date_option", skip_serializing)]
    pub last_modified_date: Option<Date>,
    pub name: String,
    pub email: Option<String>,
    pub organization_number: Option<String>,
    pub customer_number: Option<i64>,
    pub customer_account_code: Option<String>,
    pub phone_number: Option<String>,
    pub member_number: Option<i64>,
    pub supplier_number: Option<i64>,
    pub supplier_account_code: Option<String>,
    pub customer: bool,
    pub supplier: bool,
    pub bank_account_number: Option<String>,
    #[serde(skip_serializing)]
    pub contact_person: Vec<ContactPerson>,
    pub notes: Vec<Note>,
    pub currency: Option<String>,
    pub language: Option<String>,
    pub inactive: bool,
    pub days_until_invoicing_due_date: Option<i64>,
    pub address: Option<Address>,
    pub groups: Vec<String>,
    #[serde(skip)]
    context: ClientContext,
}

impl Contact {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn contact_id(&self) -> Option<i64> {
        self.contact_id
    }
}

resource! {
    Contact as "Contact",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/contacts/{contactId}",
        Operation::GetMany => "/companies/{companySlug}/contacts",
        Operation::Create => "/companies/{companySlug}/contacts",
        Operation::Update => "/companies/{companySlug}/contacts/{contactId}",
        Operation::Delete => "/companies/{companySlug}/contacts/{contactId}",
        Operation::ATTACHMENTS => "/companies/{companySlug}/contacts/{contactId}/attachments",
    },
    fields: { "contactId" => contact_id },
}

contextual!(Contact);

impl Entity for Contact {
    const ID_FIELD: &'static str = "contactId";
}

impl Attachable for Contact {}

/// A person at a contact. Addressed under the contact's id, which is passed as the
/// `contactId` argument.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactPerson {
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_person_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    #[serde(skip)]
    context: ClientContext,
}

impl ContactPerson {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn contact_person_id(&self) -> Option<i64> {
        self.contact_person_id
    }
}

resource! {
    ContactPerson as "ContactPerson",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/contacts/{contactId}/contactPerson/{contactPersonId}",
        Operation::GetMany => "/companies/{companySlug}/contacts/{contactId}/contactPerson",
        Operation::Create => "/companies/{companySlug}/contacts/{contactId}/contactPerson",
        Operation::Update => "/companies/{companySlug}/contacts/{contactId}/contactPerson/{contactPersonId}",
        Operation::Delete => "/companies/{companySlug}/contacts/{contactId}/contactPerson/{contactPersonId}",
    },
    fields: { "contactPersonId" => contact_person_id },
}

contextual!(ContactPerson);

impl Entity for ContactPerson {
    const ID_FIELD: &'static str = "contactPersonId";
}

impl ResourceApi<'_, Contact> {
    /// Adds `person` to `contact` and refreshes `person` from the server.
    pub async fn add_contact_person(&self, contact: &Contact, person: &mut ContactPerson) -> Result<()> {
        let id = Self::require_identity(contact)?;
        let context = self.call_context(Some(contact.context()), &Args::new());
        self.client()
            .contact_persons()
            .with_context(context)
            .save(person, Args::new().with(Contact::ID_FIELD, id))
            .await
    }

    /// The people registered at `contact`, as they are on the server now.
    pub async fn contact_persons(&self, contact: &Contact) -> Result<Vec<ContactPerson>> {
        let id = Self::require_identity(contact)?;
        let context = self.call_context(Some(contact.context()), &Args::new());
        self.client()
            .contact_persons()
            .with_context(context)
            .get_all(Args::new().with(Contact::ID_FIELD, id))
            .await
    }
}
