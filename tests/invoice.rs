use fiken_rs::capabilities::AttachmentUpload;
use fiken_rs::{Args, Contact, Draft, DraftState, Error, InvoiceDraft, UsageError};
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils;
use test_utils::{company, created_at, located};

fn customer() -> Contact {
    serde_json::from_value(json!({ "contactId": 55, "name": "Kunde AS", "customer": true })).unwrap()
}

fn draft_json(id: i64, text: Option<&str>) -> serde_json::Value {
    json!({
        "draftId": id,
        "type": "invoice",
        "daysUntilDueDate": 14,
        "bankAccountNumber": "12345678903",
        "invoiceText": text,
        "customers": [{ "contactId": 55, "name": "Kunde AS" }],
        "lines": [{ "quantity": 1, "unitPrice": 100000, "vatType": "HIGH", "description": "Rådgivning" }]
    })
}

/// Create, edit and submit a draft; the draft is gone afterwards.
#[tokio::test]
async fn draft_is_created_edited_and_submitted() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(company("/invoices/drafts")))
        .and(body_partial_json(json!({ "customerId": 55, "type": "invoice" })))
        .respond_with(created_at(&server, &company("/invoices/drafts/77")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/invoices/drafts/77")))
        .respond_with(ResponseTemplate::new(200).set_body_json(draft_json(77, None)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(company("/invoices/drafts/77")))
        .and(body_partial_json(json!({ "invoiceText": "Takk for handelen" })))
        .respond_with(located(&server, 200, &company("/invoices/drafts/77")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/invoices/drafts/77")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(draft_json(77, Some("Takk for handelen"))),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(company("/invoices/drafts/77/createInvoice")))
        .respond_with(created_at(&server, &company("/invoices/900")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/invoices/900")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "invoiceId": 900,
            "invoiceNumber": 10001,
            "issueDate": "2024-03-01",
            "gross": 125000,
            "invoiceText": "Takk for handelen",
            "customer": { "contactId": 55, "name": "Kunde AS" }
        })))
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let drafts = client.invoice_drafts();

    let mut draft = InvoiceDraft::new(customer(), "12345678903", 14);
    assert_eq!(draft.state(), DraftState::New);
    drafts.save(&mut draft, Args::new()).await.into_diagnostic()?;
    assert_eq!(draft.draft_id(), Some(77));
    assert_eq!(draft.state(), DraftState::Persisted);

    draft.invoice_text = Some("Takk for handelen".into());
    drafts.save(&mut draft, Args::new()).await.into_diagnostic()?;
    assert_eq!(draft.invoice_text.as_deref(), Some("Takk for handelen"));

    let invoice = drafts.submit(draft, Args::new()).await.into_diagnostic()?;
    assert_eq!(invoice.invoice_id(), Some(900));
    assert_eq!(invoice.invoice_number, Some(10001));

    // Both GET mocks are used up, so the draft now answers 404.
    let gone = drafts.get_by_id(77).await.into_diagnostic()?;
    assert!(gone.is_none());
    Ok(())
}

#[tokio::test]
async fn unsaved_draft_cannot_be_submitted() {
    test_utils::do_setup();
    let server = MockServer::start().await;

    let client = test_utils::test_client(&server);
    let draft = InvoiceDraft::new(customer(), "12345678903", 14);
    let error = client
        .invoice_drafts()
        .submit(draft, Args::new())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        Error::Usage(UsageError::UnsavedDraft { .. })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleted_draft_is_gone() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(company("/invoices/drafts/78")))
        .respond_with(ResponseTemplate::new(200).set_body_json(draft_json(78, None)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(company("/invoices/drafts/78")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let drafts = client.invoice_drafts();
    let mut draft = drafts
        .get_by_id(78)
        .await
        .into_diagnostic()?
        .expect("draft exists");
    drafts.delete(&mut draft, Args::new()).await.into_diagnostic()?;

    assert_eq!(draft.state(), DraftState::New);
    assert!(drafts.get_by_id(78).await.into_diagnostic()?.is_none());
    Ok(())
}

#[tokio::test]
async fn invoice_counter_is_read_and_initialized() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(company("/invoices/counter")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": 10042 })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(company("/invoices/counter")))
        .and(body_json(json!({ "value": 10000 })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let invoices = client.invoices();
    assert_eq!(invoices.counter(Args::new()).await.into_diagnostic()?, 10042);
    assert!(invoices
        .set_initial_counter(10000, Args::new())
        .await
        .into_diagnostic()?);
    Ok(())
}

#[tokio::test]
async fn attachments_are_uploaded_to_drafts() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(company("/invoices/drafts/77")))
        .respond_with(ResponseTemplate::new(200).set_body_json(draft_json(77, None)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(company("/invoices/drafts/77/attachments")))
        .and(body_string_contains("timeliste.pdf"))
        .and(body_string_contains("mars"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/invoices/drafts/77/attachments")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "identifier": "abc",
            "downloadUrl": "https://fiken.no/filer/abc",
            "comment": "mars",
            "type": "invoice"
        }])))
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let drafts = client.invoice_drafts();
    let draft = drafts
        .get_by_id(77)
        .await
        .into_diagnostic()?
        .expect("draft exists");

    let upload = AttachmentUpload::new("timeliste.pdf", b"%PDF-1.4 timer".to_vec()).with_comment("mars");
    assert!(drafts.add_attachment(&draft, upload).await.into_diagnostic()?);

    let attachments = drafts.attachments(&draft).await.into_diagnostic()?;
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].comment.as_deref(), Some("mars"));
    Ok(())
}

#[tokio::test]
async fn bad_attachment_names_fail_locally() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(company("/invoices/drafts/77")))
        .respond_with(ResponseTemplate::new(200).set_body_json(draft_json(77, None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let drafts = client.invoice_drafts();
    let draft = drafts
        .get_by_id(77)
        .await
        .into_diagnostic()?
        .expect("draft exists");

    let spaced = AttachmentUpload::new("time liste.pdf", Vec::new());
    let error = drafts.add_attachment(&draft, spaced).await.unwrap_err();
    assert!(matches!(
        error,
        Error::Usage(UsageError::InvalidFilename { .. })
    ));

    let unknown = AttachmentUpload::new("timeliste.docx", Vec::new());
    let error = drafts.add_attachment(&draft, unknown).await.unwrap_err();
    assert!(matches!(
        error,
        Error::Usage(UsageError::UnsupportedExtension { .. })
    ));
    Ok(())
}
