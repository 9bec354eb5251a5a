use serde::{Deserialize, Serialize};

use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::entities::shared::Address;
use crate::path::COMPANY_SLUG;
use crate::resource::Entity;
use crate::{contextual, resource};

/// A company the credential has access to. Its slug is what every company-scoped path is
/// keyed by.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    slug: Option<String>,
    pub name: String,
    pub organization_number: Option<String>,
    pub vat_type: Option<String>,
    pub address: Option<Address>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub creation_date: Option<String>,
    pub has_api_access: bool,
    pub test_company: bool,
    pub accounting_start_date: Option<String>,
    #[serde(skip)]
    context: ClientContext,
}

impl Company {
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }
}

resource! {
    Company as "Company",
    templates: {
        Operation::GetOne => "/companies/{companySlug}",
        Operation::GetMany => "/companies",
    },
    fields: { "companySlug" => slug },
}

contextual!(Company);

impl Entity for Company {
    const ID_FIELD: &'static str = COMPANY_SLUG;
}
