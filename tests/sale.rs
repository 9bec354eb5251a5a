use fiken_rs::{
    Args, Error, OrderDraft, OrderLine, Payment, PurchasePayment, PurchaseRequest, Sale,
    SaleDraft, SaleKind, SalePayment, SaleRequest, UsageError,
};
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use time::macros::date;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils;
use test_utils::{company, created_at};

fn sale_json(deleted: bool, settled: bool) -> serde_json::Value {
    json!({
        "saleId": 1001,
        "date": "2024-02-01",
        "kind": "external_invoice",
        "currency": "NOK",
        "netAmount": 80000,
        "vatAmount": 20000,
        "settled": settled,
        "deleted": deleted,
        "lines": [{ "netPrice": 80000, "vat": 20000, "vatType": "HIGH", "account": "3000" }]
    })
}

async fn fetch_sale(server: &MockServer) -> Sale {
    test_utils::test_client(server)
        .sales()
        .get_by_id(1001)
        .await
        .unwrap()
        .expect("sale exists")
}

#[tokio::test]
async fn sale_is_created_from_a_request() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(company("/sales")))
        .and(body_partial_json(json!({
            "date": "2024-02-01",
            "kind": "external_invoice",
            "currency": "NOK"
        })))
        .respond_with(created_at(&server, &company("/sales/1001")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/sales/1001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale_json(false, false)))
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let line = OrderLine {
        net_price: Some(80000),
        vat: Some(20000),
        vat_type: "HIGH".into(),
        account: Some("3000".into()),
        ..OrderLine::default()
    };
    let request = SaleRequest::new(date!(2024 - 02 - 01), SaleKind::ExternalInvoice, "NOK", vec![line]);
    let sale = client
        .sales()
        .create(&request, Args::new())
        .await
        .into_diagnostic()?;

    assert_eq!(sale.sale_id(), Some(1001));
    assert_eq!(sale.net_amount, Some(80000));
    Ok(())
}

#[tokio::test]
async fn sales_are_deleted_by_flagging() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(company("/sales/1001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale_json(false, false)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(company("/sales/1001/delete")))
        .and(query_param("description", "Feilføring"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/sales/1001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale_json(true, false)))
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let mut sale = fetch_sale(&server).await;
    assert!(!sale.is_deleted());

    client
        .sales()
        .delete_with_reason(&mut sale, "Feilføring", Args::new())
        .await
        .into_diagnostic()?;

    // Still there, but flagged.
    assert_eq!(sale.sale_id(), Some(1001));
    assert!(sale.is_deleted());
    Ok(())
}

#[tokio::test]
async fn flag_delete_needs_a_reason() {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(company("/sales/1001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale_json(false, false)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let mut sale = fetch_sale(&server).await;

    let error = client
        .sales()
        .delete_with_reason(&mut sale, "   ", Args::new())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        Error::Usage(UsageError::MissingDeletionReason { .. })
    ));

    let error = client
        .sales()
        .delete(&mut sale, Args::new())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        Error::Usage(UsageError::MissingDeletionReason { .. })
    ));
    assert_eq!(sale.sale_id(), Some(1001));
}

#[tokio::test]
async fn sale_is_settled_and_refetched() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(company("/sales/1001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale_json(false, false)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(company("/sales/1001/settled")))
        .and(query_param("settledDate", "2024-03-01"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/sales/1001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale_json(false, true)))
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let mut sale = fetch_sale(&server).await;
    client
        .sales()
        .set_settled(&mut sale, date!(2024 - 03 - 01), Args::new())
        .await
        .into_diagnostic()?;
    assert_eq!(sale.settled, Some(true));
    Ok(())
}

#[tokio::test]
async fn payments_are_registered_under_the_sale() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(company("/sales/1001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale_json(false, false)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(company("/sales/1001/payments")))
        .and(body_partial_json(json!({ "amount": 100000, "account": "1920:10001" })))
        .respond_with(created_at(&server, &company("/sales/1001/payments/3")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/sales/1001/payments/3")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paymentId": 3,
            "date": "2024-03-01",
            "account": "1920:10001",
            "amount": 100000
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/sales/1001/payments")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "paymentId": 3,
            "date": "2024-03-01",
            "account": "1920:10001",
            "amount": 100000
        }])))
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let sale = fetch_sale(&server).await;
    let mut payment = SalePayment::new(Payment::new(date!(2024 - 03 - 01), "1920:10001", 100_000));
    client
        .sales()
        .add_payment(&sale, &mut payment)
        .await
        .into_diagnostic()?;
    assert_eq!(payment.payment_id(), Some(3));

    let payments = client.sales().payments(&sale).await.into_diagnostic()?;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, 100_000);
    Ok(())
}

#[tokio::test]
async fn sale_draft_submits_into_a_sale() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(company("/sales/drafts")))
        .and(body_partial_json(json!({ "cash": false, "contactId": 55 })))
        .respond_with(created_at(&server, &company("/sales/drafts/5")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/sales/drafts/5")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "draftId": 5,
            "cash": false,
            "contact": { "contactId": 55, "name": "Kunde AS" },
            "lines": [{ "text": "Varer", "vatType": "HIGH", "net": 80000, "gross": 100000 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(company("/sales/drafts/5/createSale")))
        .respond_with(created_at(&server, &company("/sales/1001")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/sales/1001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sale_json(false, false)))
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let contact = serde_json::from_value(json!({ "contactId": 55, "name": "Kunde AS" })).unwrap();
    let mut draft = SaleDraft::new(OrderDraft {
        contact: Some(contact),
        ..OrderDraft::default()
    });
    client
        .sale_drafts()
        .save(&mut draft, Args::new())
        .await
        .into_diagnostic()?;
    assert_eq!(draft.draft_id(), Some(5));
    assert_eq!(draft.lines.len(), 1);

    let sale = client
        .sale_drafts()
        .submit(draft, Args::new())
        .await
        .into_diagnostic()?;
    assert_eq!(sale.sale_id(), Some(1001));
    assert_eq!(sale.kind, Some(SaleKind::ExternalInvoice));
    Ok(())
}

#[tokio::test]
async fn purchase_payments_use_the_purchase_id() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(company("/purchases")))
        .and(body_partial_json(json!({ "kind": "supplier", "supplierId": 9 })))
        .respond_with(created_at(&server, &company("/purchases/40")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/purchases/40")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "purchaseId": 40,
            "kind": "supplier",
            "paid": false,
            "currency": "NOK"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(company("/purchases/40/payments")))
        .respond_with(created_at(&server, &company("/purchases/40/payments/2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(company("/purchases/40/payments/2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paymentId": 2,
            "date": "2024-02-20",
            "account": "1920:10001",
            "amount": 5000
        })))
        .mount(&server)
        .await;

    let client = test_utils::test_client(&server);
    let request = PurchaseRequest::supplier(date!(2024 - 02 - 10), "NOK", Vec::new(), 9);
    let purchase = client
        .purchases()
        .create(&request, Args::new())
        .await
        .into_diagnostic()?;
    assert_eq!(purchase.purchase_id(), Some(40));

    let mut payment = PurchasePayment::new(Payment::new(date!(2024 - 02 - 20), "1920:10001", 5000));
    client
        .purchases()
        .add_payment(&purchase, &mut payment)
        .await
        .into_diagnostic()?;
    assert_eq!(payment.payment_id(), Some(2));
    Ok(())
}
