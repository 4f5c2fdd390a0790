//! Contract tests for the resource sub-clients.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/clients` | `list_clients_*` |
//! | GET    | `/clients/{id}` | `get_client_*` |
//! | POST   | `/clients` | `create_client_*` |
//! | PATCH  | `/tasks/{id}` | `update_task_status_*` |
//! | GET    | `/invoices/summary` | `invoice_summary_*` |
//! | POST   | `/invoices/{id}/payments` | `record_payment_*` |
//! | GET/POST | `/employees/{id}/payouts` | `employee_payouts_*` |
//! | GET/POST | `/notifications/...` | `notifications_*` |
//! | GET    | `/users/me` | `me_*` |

use std::sync::Arc;

use chrono::Utc;
use desk_client::clients::{ClientInput, ClientKind};
use desk_client::employees::PayoutInput;
use desk_client::invoices::{PaymentInput, PaymentMethod};
use desk_client::{DeskApiConfig, DeskApiError, DeskClient, InfiniteList, ListQuery, MemoryStore};
use desk_core::{Capability, EmployeeId, InvoiceId, Money, NotificationId, TaskStatus};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeroize::Zeroizing;

fn test_client(server: &MockServer) -> DeskClient {
    let mut config =
        DeskApiConfig::local_mock(&server.uri(), std::env::temp_dir().join("desk-resource-test")).unwrap();
    config.auth_token = Some(Zeroizing::new("dGVzdDpzZWNyZXQ=".into()));
    let client = DeskClient::new(config, Arc::new(MemoryStore::new())).unwrap();
    client.session().set_nonce("n-1", Utc::now()).unwrap();
    client
}

// ── /clients ─────────────────────────────────────────────────────────

#[tokio::test]
async fn list_clients_reads_paging_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/clients"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "2"))
        .and(query_param("search", "noor"))
        .and(header("X-WP-Nonce", "n-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([
                    {"id": 3, "name": "Noor Law Partners", "type": "company"},
                    {"id": 4, "name": "Noor Al-Harbi", "type": "individual", "phone": "0551234567"}
                ]))
                .insert_header("X-WP-Total", "5")
                .insert_header("X-WP-TotalPages", "3"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let page = client
        .clients()
        .list(&ListQuery::new().page(2).per_page(2).search("noor"))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, Some(5));
    assert_eq!(page.total_pages, Some(3));
    assert!(page.has_next());
    assert_eq!(page.items[1].kind, Some(ClientKind::Individual));
}

#[tokio::test]
async fn list_clients_infinite_scroll_stops_at_last_page() {
    let server = MockServer::start().await;

    for (page, body) in [
        ("1", serde_json::json!([{"id": 1, "name": "A"}, {"id": 2, "name": "B"}])),
        ("2", serde_json::json!([{"id": 3, "name": "C"}])),
    ] {
        Mock::given(method("GET"))
            .and(path("/clients"))
            .and(query_param("page", page))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .insert_header("X-WP-Total", "3")
                    .insert_header("X-WP-TotalPages", "2"),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = test_client(&server);
    let mut list = InfiniteList::new(2);
    while list.has_more() {
        let clients = client.clients().clone();
        list.load_next(|page, per_page| async move {
            clients
                .list(&ListQuery::new().page(page).per_page(per_page))
                .await
        })
        .await
        .unwrap();
    }

    let names: Vec<_> = list.items().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
    assert_eq!(list.total(), Some(3));
}

#[tokio::test]
async fn get_client_returns_none_on_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/clients/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": "rest_not_found", "message": "Client not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.clients().get(99.into()).await.unwrap().is_none());
}

#[tokio::test]
async fn create_client_sends_only_set_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/clients"))
        .and(body_json(serde_json::json!({"name": "Dar Al Arkan", "type": "company"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 40, "name": "Dar Al Arkan", "type": "company", "created_at": "2026-02-01 10:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let created = client
        .clients()
        .create(&ClientInput {
            name: Some("Dar Al Arkan".into()),
            kind: Some(ClientKind::Company),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id.get(), 40);
    assert!(created.created_at.is_some());
}

#[tokio::test]
async fn create_client_surfaces_validation_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(422).set_body_string(r#"{"code":"invalid_phone"}"#))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.clients().create(&ClientInput::default()).await.unwrap_err();
    match err {
        DeskApiError::ApiError { status, body, .. } => {
            assert_eq!(status, 422);
            assert!(body.contains("invalid_phone"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

// ── /tasks ───────────────────────────────────────────────────────────

#[tokio::test]
async fn update_task_status_patches_status_only() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/tasks/5"))
        .and(body_json(serde_json::json!({"status": "completed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 5, "title": "File VAT return", "status": "completed", "priority": "high",
            "completed_at": "2026-02-03T09:15:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let task = client
        .tasks()
        .update_status(5.into(), TaskStatus::Completed)
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(!task.is_open());
}

// ── /invoices ────────────────────────────────────────────────────────

#[tokio::test]
async fn invoice_summary_decodes_mixed_amounts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/invoices/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_invoiced": "125,000.00",
            "total_paid": 100000,
            "outstanding": 25000.5,
            "overdue": "0",
            "overdue_count": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let summary = client.invoices().summary().await.unwrap();
    assert_eq!(summary.total_invoiced, Money::from_major(125_000));
    assert_eq!(summary.outstanding, Money::from_minor(2_500_050));
    assert!(summary.overdue.is_zero());
}

#[tokio::test]
async fn record_payment_posts_to_invoice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoices/9/payments"))
        .and(body_json(serde_json::json!({
            "amount": "500.00", "method": "cash", "reference": "RCPT-77"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 1, "invoice_id": 9, "amount": "500.00", "method": "cash"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let payment = client
        .invoices()
        .record_payment(
            InvoiceId(9),
            &PaymentInput {
                amount: Money::from_major(500),
                method: PaymentMethod::Cash,
                reference: Some("RCPT-77".into()),
                paid_on: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(payment.invoice_id, InvoiceId(9));
}

// ── /employees ───────────────────────────────────────────────────────

#[tokio::test]
async fn employee_payouts_list_and_create() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/employees/4/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "employee_id": 4, "amount": "300", "paid_on": "2026-01-31"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/employees/4/payouts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 2, "employee_id": 4, "amount": "150.00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let payouts = client.employees().payouts(EmployeeId(4)).await.unwrap();
    assert_eq!(payouts.len(), 1);

    let created = client
        .employees()
        .create_payout(
            EmployeeId(4),
            &PayoutInput {
                amount: Money::from_major(150),
                note: None,
                paid_on: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.amount, Money::from_major(150));
}

#[tokio::test]
async fn employee_payouts_reject_non_positive_amounts_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .employees()
        .create_payout(
            EmployeeId(4),
            &PayoutInput {
                amount: Money::ZERO,
                note: None,
                paid_on: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DeskApiError::Invalid(_)));
}

// ── /notifications ───────────────────────────────────────────────────

#[tokio::test]
async fn notifications_mark_read_and_count() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/notifications/7/read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/notifications/read-all"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/notifications/unread-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"count": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client.notifications().mark_read(NotificationId(7)).await.unwrap();
    client.notifications().mark_all_read().await.unwrap();
    assert_eq!(client.notifications().unread_count().await.unwrap(), 0);
}

// ── /users/me ────────────────────────────────────────────────────────

#[tokio::test]
async fn me_returns_capabilities() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3,
            "name": "Noura",
            "email": "noura@office.example",
            "roles": ["accountant"],
            "capabilities": {"view_invoices": true, "manage_invoices": true, "manage_clients": false}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let me = client.users().me().await.unwrap();
    assert!(me.can(Capability::ViewInvoices));
    assert!(!me.can(Capability::ManageClients));
}
