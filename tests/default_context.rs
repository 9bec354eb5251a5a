use fiken_rs::{
    Args, ClientContext, Credential, Error, UsageError, clear_default_context, default_context,
    set_default_context,
};
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils;
use test_utils::{COMPANY, api, company};

#[tokio::test]
#[serial]
async fn calls_fall_back_to_the_default_context() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(company("/contacts/5")))
        .and(bearer_token("default-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contactId": 5, "name": "Kari" })))
        .expect(1)
        .mount(&server)
        .await;

    clear_default_context();
    set_default_context(ClientContext::new(Credential::personal("default-token"), COMPANY))
        .into_diagnostic()?;

    let client = test_utils::bare_client(&server);
    let result = client.contacts().get_by_id(5).await;
    clear_default_context();

    let contact = result.into_diagnostic()?.expect("contact exists");
    assert_eq!(contact.contact_id(), Some(5));
    Ok(())
}

#[tokio::test]
#[serial]
async fn client_context_beats_the_default() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api("/companies/client-company/contacts/5")))
        .and(bearer_token("client-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contactId": 5, "name": "Kari" })))
        .expect(1)
        .mount(&server)
        .await;

    clear_default_context();
    set_default_context(ClientContext::new(Credential::personal("default-token"), COMPANY))
        .into_diagnostic()?;

    let client = test_utils::bare_client(&server)
        .with_credential(Credential::personal("client-token"))
        .with_company("client-company");
    let result = client.contacts().get_by_id(5).await;
    clear_default_context();

    assert!(result.into_diagnostic()?.is_some());
    Ok(())
}

#[tokio::test]
#[serial]
async fn default_context_can_only_be_set_once() {
    test_utils::do_setup();
    clear_default_context();

    let first = ClientContext::default().with_company("first");
    set_default_context(first).unwrap();
    let error = set_default_context(ClientContext::default().with_company("second")).unwrap_err();
    assert_eq!(error, UsageError::DefaultContextAlreadySet);
    assert_eq!(default_context().company_slug(), Some("first"));

    assert!(clear_default_context().is_some());
    assert!(default_context().is_empty());
}

#[tokio::test]
#[serial]
async fn without_any_context_the_company_is_missing() {
    test_utils::do_setup();
    clear_default_context();
    let server = MockServer::start().await;

    let client = test_utils::bare_client(&server).with_credential(Credential::personal("t"));
    let error = client.contacts().get_all(Args::new()).await.unwrap_err();
    assert!(matches!(
        error,
        Error::Usage(UsageError::MissingPlaceholder { ref placeholder, .. }) if placeholder == "companySlug"
    ));
}
