//! Live provider against a mock REST backend
//!
//! These tests verify that:
//! - Every request carries the API key headers
//! - Embedded center names are resolved, with a placeholder when missing
//! - Non-success statuses and malformed bodies surface as fetch errors
//! - Inserts ask for the stored row back and reject empty responses
//! - Tables are read across range windows until the counted total arrives

use serde_json::json;
use shepherd::config::{BackendCredentials, HttpConfig};
use shepherd::prelude::*;
use shepherd::storage::live::DEFAULT_SENDER;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-anon-key";

fn provider(server: &MockServer) -> LiveProvider {
    LiveProvider::new(
        BackendCredentials {
            url: server.uri(),
            key: KEY.to_string(),
        },
        &HttpConfig::default(),
    )
    .expect("Failed to create provider")
}

fn member_row(id: &str, centers: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "full_name": "John Doe",
        "phone": "+1234567890",
        "email": "john@example.com",
        "center_id": "1",
        "service_unit": "Ushering",
        "gender": "Male",
        "marital_status": "Single",
        "dob": "1990-05-15",
        "created_at": "2024-01-15T10:30:00+00:00",
        "centers": centers
    })
}

#[tokio::test]
async fn test_members_request_sends_auth_headers_and_select() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/members"))
        .and(header("apikey", KEY))
        .and(header("Authorization", format!("Bearer {}", KEY).as_str()))
        .and(query_param("select", "id,full_name,phone,email,center_id,service_unit,gender,marital_status,dob,created_at,centers(name)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            member_row("a", json!({ "name": "Ile-Ife HQ Center" })),
            member_row("b", json!([{ "name": "Lagos Center" }])),
            member_row("c", serde_json::Value::Null),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let members = provider(&server).fetch_members().await.unwrap();

    let names: Vec<&str> = members.iter().map(|m| m.center_name.as_str()).collect();
    assert_eq!(names, vec!["Ile-Ife HQ Center", "Lagos Center", "Unknown Center"]);
    assert_eq!(members[0].dob, NaiveDate::from_ymd_opt(1990, 5, 15));
}

#[tokio::test]
async fn test_attendance_rows_decode_with_join() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/attendance"))
        .and(query_param("select", "*,centers(name)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "att-1",
            "date": "2024-01-28",
            "service_type": "Sunday Service",
            "center_id": "2",
            "adult_male": 30,
            "adult_female": 35,
            "child_male": 10,
            "child_female": 12,
            "created_at": "2024-01-28T18:00:00+00:00",
            "centers": { "name": "Lagos Center" }
        }])))
        .mount(&server)
        .await;

    let records = provider(&server).fetch_attendance().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].center_name, "Lagos Center");
    assert_eq!(records[0].service_type, ServiceType::SundayService);
    assert_eq!(records[0].total(), 87);
}

#[tokio::test]
async fn test_centers_ordered_by_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/centers"))
        .and(query_param("order", "name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "1", "name": "Ile-Ife HQ Center", "address": null }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let centers = provider(&server).fetch_centers().await.unwrap();
    assert_eq!(centers, vec![Center::new("1", "Ile-Ife HQ Center")]);
}

#[tokio::test]
async fn test_error_status_becomes_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/audit_logs"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_activity().await.unwrap_err();
    match err {
        ShepherdError::Fetch(FetchError::Status {
            table,
            status,
            message,
        }) => {
            assert_eq!(table, "audit_logs");
            assert_eq!(status, 401);
            assert_eq!(message, "invalid api key");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_becomes_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "not": "a list" })))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_messages().await.unwrap_err();
    assert_eq!(err.error_code(), "FETCH_DECODE_ERROR");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_backend_becomes_http_error() {
    // Nothing listens on port 1
    let provider = LiveProvider::new(
        BackendCredentials {
            url: "http://127.0.0.1:1".to_string(),
            key: KEY.to_string(),
        },
        &HttpConfig::default(),
    )
    .unwrap();

    let err = provider.fetch_centers().await.unwrap_err();
    assert_eq!(err.error_code(), "FETCH_HTTP_ERROR");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_insert_member_returns_representation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/members"))
        .and(header("Prefer", "return=representation"))
        .and(header("apikey", KEY))
        .and(body_partial_json(json!([{ "full_name": "John Doe", "dob": "1990-05-15" }])))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([member_row("new-id", json!({ "name": "Ile-Ife HQ Center" }))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let member = provider(&server)
        .create_member(CreateMemberInput {
            full_name: "John Doe".to_string(),
            phone: "+1234567890".to_string(),
            email: "john@example.com".to_string(),
            center_id: "1".to_string(),
            service_unit: "Ushering".to_string(),
            gender: "Male".to_string(),
            marital_status: "Single".to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 5, 15).unwrap(),
        })
        .await
        .unwrap();

    assert_eq!(member.id, "new-id");
    assert_eq!(member.center_name, "Ile-Ife HQ Center");
}

#[tokio::test]
async fn test_empty_insert_response_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/attendance"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = provider(&server)
        .create_attendance(CreateAttendanceInput {
            date: NaiveDate::from_ymd_opt(2024, 2, 4).unwrap(),
            service_type: ServiceType::SundayService,
            center_id: "1".to_string(),
            adult_male: 1,
            adult_female: 1,
            child_male: 0,
            child_female: 0,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShepherdError::Fetch(FetchError::EmptyInsert { ref table }) if table == "attendance"
    ));
}

#[tokio::test]
async fn test_send_message_inserts_status_and_sender() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/messages"))
        .and(body_partial_json(json!([{
            "status": "sent",
            "sender_id": DEFAULT_SENDER,
            "recipient_group": "all",
            "channels": ["whatsapp"]
        }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "msg-1",
            "sender_id": DEFAULT_SENDER,
            "recipient_group": "all",
            "recipient_filters": null,
            "channels": ["whatsapp"],
            "content": "Welcome",
            "status": "sent",
            "created_at": "2024-02-01T08:00:00+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let message = provider(&server)
        .send_message(SendMessageInput {
            channels: vec![Channel::Whatsapp],
            ..SendMessageInput::new(RecipientGroup::All, "Welcome")
        })
        .await
        .unwrap();

    assert_eq!(message.id, "msg-1");
    assert_eq!(message.recipient_filters, AudienceFilters::default());
}

// =============================================================================
// Service over the live provider
// =============================================================================

#[tokio::test]
async fn test_message_history_falls_back_when_backend_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/messages"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let service = AdminService::builder()
        .with_provider(provider(&server))
        .build()
        .unwrap();

    for _ in 0..2 {
        let page = service.list_messages(&ListQuery::new(1, 10)).await.unwrap();
        assert_eq!(page.total_count(), 2);
    }
}

#[tokio::test]
async fn test_member_listing_propagates_backend_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/members"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let service = AdminService::builder()
        .with_provider(provider(&server))
        .build()
        .unwrap();

    let err = service
        .list_members(&ListQuery::new(1, 10))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "FETCH_STATUS_ERROR");
    assert_eq!(err.to_response().details.unwrap()["status"], 500);
}

// =============================================================================
// Range windows
// =============================================================================

fn member_rows(ids: std::ops::Range<usize>) -> serde_json::Value {
    ids.map(|i| member_row(&format!("m-{i}"), json!({ "name": "Lagos Center" })))
        .collect()
}

#[tokio::test]
async fn test_member_listing_counts_rows_beyond_first_window() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/members"))
        .and(header("Range", "0-999"))
        .and(header("Prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("Content-Range", "0-999/1500")
                .set_body_json(member_rows(0..1000)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/members"))
        .and(header("Range", "1000-1999"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("Content-Range", "1000-1499/1500")
                .set_body_json(member_rows(1000..1500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = AdminService::builder()
        .with_provider(provider(&server))
        .build()
        .unwrap();

    let page = service.list_members(&ListQuery::new(1, 10)).await.unwrap();
    assert_eq!(page.total_count(), 1500);
    assert_eq!(page.total_pages(), 150);
}

#[tokio::test]
async fn test_capped_backend_is_read_from_where_it_stopped() {
    let server = MockServer::start().await;

    // The backend returns at most 500 rows whatever range is asked for
    Mock::given(method("GET"))
        .and(path("/rest/v1/members"))
        .and(header("Range", "0-999"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("Content-Range", "0-499/700")
                .set_body_json(member_rows(0..500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/members"))
        .and(header("Range", "500-1499"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("Content-Range", "500-699/700")
                .set_body_json(member_rows(500..700)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let members = provider(&server).fetch_members().await.unwrap();
    assert_eq!(members.len(), 700);
    assert_eq!(members[699].id, "m-699");
}
