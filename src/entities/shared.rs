use serde::{Deserialize, Serialize};
use time::Date;

use crate::utils::date_format::fiken_date_option;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street_address: Option<String>,
    pub street_address_line2: Option<String>,
    pub city: Option<String>,
    pub post_code: Option<String>,
    pub country: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    pub description: Option<String>,
    pub author: Option<String>,
    pub note: Option<String>,
}

/// A line on a sale or purchase.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderLine {
    pub description: Option<String>,
    pub net_price: Option<i64>,
    pub vat: Option<i64>,
    pub account: Option<String>,
    pub vat_type: String,
    pub net_price_in_currency: Option<i64>,
    pub vat_in_currency: Option<i64>,
    pub project_id: Option<i64>,
}

/// A line on an invoice or an offer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceLine {
    pub net: Option<i64>,
    pub vat: Option<i64>,
    pub gross: Option<i64>,
    pub vat_in_percent: Option<f64>,
    pub unit_price: Option<i64>,
    pub quantity: Option<i64>,
    pub discount: Option<i64>,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub vat_type: Option<String>,
    pub income_account: Option<String>,
}

/// A line on an invoice, offer or order confirmation draft.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceDraftLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoiceish_draft_line_id: Option<i64>,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<Date>,
    pub quantity: Option<i64>,
    pub unit_price: Option<i64>,
    pub discount: Option<i64>,
    pub product_id: Option<i64>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub vat_type: Option<String>,
    pub income_account: Option<String>,
}

/// A line on a sale or purchase draft.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderDraftLine {
    pub text: Option<String>,
    pub vat_type: Option<String>,
    pub income_account: Option<String>,
    pub net: Option<i64>,
    pub gross: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}
