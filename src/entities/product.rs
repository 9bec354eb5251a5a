use serde::{Deserialize, Serialize};
use time::Date;

use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::resource::Entity;
use crate::utils::date_format::fiken_date_option;
use crate::{contextual, resource};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    product_id: Option<i64>,
    pub name: String,
    #[serde(with = "fiken_date_option", skip_serializing)]
    pub created_date: Option<Date>,
    #[serde(with = "fiken_date_option", skip_serializing)]
    pub last_modified_date: Option<Date>,
    pub unit_price: Option<i64>,
    pub income_account: Option<String>,
    pub vat_type: String,
    pub active: bool,
    pub product_number: Option<String>,
    pub stock: Option<f64>,
    pub note: Option<String>,
    #[serde(skip)]
    context: ClientContext,
}

impl Product {
    #[must_use]
    pub fn new(name: impl Into<String>, vat_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vat_type: vat_type.into(),
            active: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn product_id(&self) -> Option<i64> {
        self.product_id
    }
}

resource! {
    Product as "Product",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/products/{productId}",
        Operation::GetMany => "/companies/{companySlug}/products",
        Operation::Create => "/companies/{companySlug}/products",
        Operation::Update => "/companies/{companySlug}/products/{productId}",
        Operation::Delete => "/companies/{companySlug}/products/{productId}",
    },
    fields: { "productId" => product_id },
}

contextual!(Product);

impl Entity for Product {
    const ID_FIELD: &'static str = "productId";
}
