use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::resource::Entity;
use crate::utils::date_format::fiken_date_option;
use crate::{contextual, resource};

/// The body shared by sale and purchase payments. Amounts are in øre.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    #[serde(with = "fiken_date_option")]
    pub date: Option<Date>,
    pub account: Option<String>,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_in_nok: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Payment {
    #[must_use]
    pub fn new(date: Date, account: impl Into<String>, amount: i64) -> Self {
        Self {
            date: Some(date),
            account: Some(account.into()),
            amount,
            ..Self::default()
        }
    }
}

/// A payment registered against a sale. Addressed under the sale, whose id is passed as the
/// `saleId` argument; see [`Paymentable`](crate::capabilities::Paymentable).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalePayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_id: Option<i64>,
    #[serde(flatten)]
    pub payment: Payment,
    #[serde(skip)]
    context: ClientContext,
}

impl SalePayment {
    #[must_use]
    pub fn new(payment: Payment) -> Self {
        Self {
            payment,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn payment_id(&self) -> Option<i64> {
        self.payment_id
    }
}

impl Deref for SalePayment {
    type Target = Payment;

    fn deref(&self) -> &Payment {
        &self.payment
    }
}

impl DerefMut for SalePayment {
    fn deref_mut(&mut self) -> &mut Payment {
        &mut self.payment
    }
}

resource! {
    SalePayment as "SalePayment",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/sales/{saleId}/payments/{paymentId}",
        Operation::GetMany => "/companies/{companySlug}/sales/{saleId}/payments",
        Operation::Create => "/companies/{companySlug}/sales/{saleId}/payments",
    },
    fields: { "paymentId" => payment_id },
}

contextual!(SalePayment);

impl Entity for SalePayment {
    const ID_FIELD: &'static str = "paymentId";
}

/// A payment registered against a purchase, addressed under the `purchaseId` argument.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchasePayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_id: Option<i64>,
    #[serde(flatten)]
    pub payment: Payment,
    #[serde(skip)]
    context: ClientContext,
}

impl PurchasePayment {
    #[must_use]
    pub fn new(payment: Payment) -> Self {
        Self {
            payment,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn payment_id(&self) -> Option<i64> {
        self.payment_id
    }
}

impl Deref for PurchasePayment {
    type Target = Payment;

    fn deref(&self) -> &Payment {
        &self.payment
    }
}

impl DerefMut for PurchasePayment {
    fn deref_mut(&mut self) -> &mut Payment {
        &mut self.payment
    }
}

resource! {
    PurchasePayment as "PurchasePayment",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/purchases/{purchaseId}/payments/{paymentId}",
        Operation::GetMany => "/companies/{companySlug}/purchases/{purchaseId}/payments",
        Operation::Create => "/companies/{companySlug}/purchases/{purchaseId}/payments",
    },
    fields: { "paymentId" => payment_id },
}

contextual!(PurchasePayment);

impl Entity for PurchasePayment {
    const ID_FIELD: &'static str = "paymentId";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn payment_body_is_flat() {
        let payment = SalePayment::new(Payment::new(date!(2024 - 03 - 01), "1920:10001", 12_500));
        assert!(payment.is_new());
        assert_eq!(
            serde_json::to_value(&payment).unwrap(),
            json!({ "date": "2024-03-01", "account": "1920:10001", "amount": 12500 })
        );

        let fetched: PurchasePayment = serde_json::from_value(json!({
            "paymentId": 7,
            "date": "2024-03-02",
            "account": "1920:10001",
            "amount": 300,
            "fee": 10
        }))
        .unwrap();
        assert_eq!(fetched.id().as_deref(), Some("7"));
        assert_eq!(fetched.fee, Some(10));
    }
}
