use fiken_rs::{Args, BankAccount, BankAccountType, Error, InboxDocumentRequest, UsageError};
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils;
use test_utils::{company, created_at};

#[tokio::test]
async fn inbox_documents_are_uploaded_as_multipart() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(company("/inbox")))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("kvittering.png"))
        .and(body_string_contains("Lunsj med kunde"))
        .respond_with(created_at(&server, &company("/inbox/42")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/inbox/42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documentId": 42,
            "name": "Kvittering",
            "description": "Lunsj med kunde",
            "filename": "kvittering.png",
            "status": false,
            "createdDate": "2024-03-01T12:30:00.123"
        })))
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let request = InboxDocumentRequest::new(
        "Kvittering",
        "kvittering.png",
        "Lunsj med kunde",
        b"not really a png".to_vec(),
    );
    let document = client
        .inbox()
        .upload(&request, Args::new())
        .await
        .into_diagnostic()?;

    assert_eq!(document.document_id(), Some(42));
    assert!(document.created_date.is_some());
    Ok(())
}

#[tokio::test]
async fn bank_accounts_are_saved_as_requests() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(company("/bankAccounts")))
        .and(body_json(json!({
            "name": "Driftskonto",
            "bankAccountNumber": "12345678903",
            "type": "normal",
            "inactive": false
        })))
        .respond_with(created_at(&server, &company("/bankAccounts/3")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/bankAccounts/3")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bankAccountId": 3,
            "name": "Driftskonto",
            "accountCode": "1920:10001",
            "bankAccountNumber": "12345678903",
            "type": "normal"
        })))
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let mut account = BankAccount::new("Driftskonto", "12345678903", BankAccountType::Normal);
    client
        .bank_accounts()
        .save(&mut account, Args::new())
        .await
        .into_diagnostic()?;
    assert_eq!(account.bank_account_id(), Some(3));
    assert_eq!(account.account_code.as_deref(), Some("1920:10001"));
    Ok(())
}

#[tokio::test]
async fn incomplete_bank_account_is_not_sent() {
    test_utils::do_setup();
    let server = MockServer::start().await;

    let client = test_utils::test_client(&server);
    let mut account = BankAccount::default();
    let error = client
        .bank_accounts()
        .save(&mut account, Args::new())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        Error::Usage(UsageError::MissingField { .. })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}
