use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::capabilities::{RequiringRequest, request_body};
use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::error::{Result, UsageError};
use crate::resource::Entity;
use crate::utils::date_format::fiken_date_option;
use crate::{contextual, resource};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankAccountType {
    #[default]
    Normal,
    TaxDeduction,
    Foreign,
    CreditCard,
}

/// A bank account. Only ever created; the server returns more than it accepts, so saves
/// go through [`BankAccountRequest`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankAccount {
    bank_account_id: Option<i64>,
    pub name: Option<String>,
    pub account_code: Option<String>,
    pub bank_account_number: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub foreign_service: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<BankAccountType>,
    pub reconciled_balance: Option<i64>,
    #[serde(with = "fiken_date_option")]
    pub reconciled_date: Option<Date>,
    pub inactive: bool,
    #[serde(skip)]
    context: ClientContext,
}

impl BankAccount {
    #[must_use]
    pub fn new(name: impl Into<String>, bank_account_number: impl Into<String>, kind: BankAccountType) -> Self {
        Self {
            name: Some(name.into()),
            bank_account_number: Some(bank_account_number.into()),
            kind: Some(kind),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bank_account_id(&self) -> Option<i64> {
        self.bank_account_id
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountRequest {
    pub name: String,
    pub bank_account_number: String,
    #[serde(rename = "type")]
    pub kind: BankAccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_service: Option<String>,
    pub inactive: bool,
}

resource! {
    BankAccount as "BankAccount",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/bankAccounts/{bankAccountId}",
        Operation::GetMany => "/companies/{companySlug}/bankAccounts",
        Operation::Create => "/companies/{companySlug}/bankAccounts",
    },
    fields: { "bankAccountId" => bank_account_id },
}

contextual!(BankAccount);

impl Entity for BankAccount {
    const ID_FIELD: &'static str = "bankAccountId";

    fn write_body(&self) -> Result<Value> {
        request_body(self)
    }
}

impl RequiringRequest for BankAccount {
    type Request = BankAccountRequest;

    fn to_request(&self) -> Result<BankAccountRequest> {
        let missing = |field: &str| UsageError::MissingField {
            resource: "BankAccount".to_string(),
            field: field.to_string(),
        };

        let kind = self.kind.ok_or_else(|| missing("type"))?;
        // Only foreign accounts have a foreign service, and they must have one.
        let foreign_service = match kind {
            BankAccountType::Foreign => Some(
                self.foreign_service
                    .clone()
                    .ok_or_else(|| missing("foreignService"))?,
            ),
            _ => None,
        };

        Ok(BankAccountRequest {
            name: self.name.clone().ok_or_else(|| missing("name"))?,
            bank_account_number: self
                .bank_account_number
                .clone()
                .ok_or_else(|| missing("bankAccountNumber"))?,
            kind,
            bic: self.bic.clone(),
            iban: self.iban.clone(),
            foreign_service,
            inactive: self.inactive,
        })
    }
}
