use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prescription_cell::{ReminderInbox, ReminderScheduler};
use shared_database::DbClient;
use shared_utils::test_utils::MockDbResponses;

#[tokio::test]
async fn tick_delivers_due_reminders_to_the_owning_patient() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();
    let prescription_id = Uuid::new_v4();
    let due_id = Uuid::new_v4();
    let later_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/reminder"))
        .and(query_param("status", "eq.Active"))
        .and(query_param("reminder_date", "lte.2024-05-03"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "reminder_id": due_id,
                "prescription_id": prescription_id,
                "reminder_time": "18:00:00",
                "reminder_date": "2024-05-02",
                "status": "Active"
            },
            {
                "reminder_id": later_id,
                "prescription_id": prescription_id,
                "reminder_time": "13:00:00",
                "reminder_date": "2024-05-03",
                "status": "Active"
            }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prescription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::prescription_row(prescription_id, patient_id, Uuid::new_v4(), "Metformin", 2, 5)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/reminder"))
        .and(query_param("reminder_id", format!("in.({})", due_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"reminder_id": due_id}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let inbox = ReminderInbox::new();
    let scheduler = ReminderScheduler::with_client(
        DbClient::with_base_url(&mock_server.uri(), "key"),
        inbox.clone(),
        Duration::from_secs(60),
    );

    let now = NaiveDate::from_ymd_opt(2024, 5, 3)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let fired = scheduler.tick(now).await.unwrap();

    assert_eq!(fired, 1);
    assert_eq!(
        inbox.drain(patient_id).await,
        vec!["Time to take your medication: Metformin"]
    );
}

#[tokio::test]
async fn tick_with_nothing_due_touches_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reminder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/reminder"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let scheduler = ReminderScheduler::with_client(
        DbClient::with_base_url(&mock_server.uri(), "key"),
        ReminderInbox::new(),
        Duration::from_secs(60),
    );

    let now = NaiveDate::from_ymd_opt(2024, 5, 3)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    assert_eq!(scheduler.tick(now).await.unwrap(), 0);
}

fn nine_thirty() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 3)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn due_reminder(prescription_id: Uuid) -> serde_json::Value {
    json!({
        "reminder_id": Uuid::new_v4(),
        "prescription_id": prescription_id,
        "reminder_time": "08:00:00",
        "reminder_date": "2024-05-03",
        "status": "Active"
    })
}

#[tokio::test]
async fn failed_delete_delivers_nothing_across_ticks() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();
    let prescription_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/reminder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([due_reminder(prescription_id)])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prescription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::prescription_row(prescription_id, patient_id, Uuid::new_v4(), "Metformin", 2, 5)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/reminder"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "unavailable"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let inbox = ReminderInbox::new();
    let scheduler = ReminderScheduler::with_client(
        DbClient::with_base_url(&mock_server.uri(), "key"),
        inbox.clone(),
        Duration::from_secs(60),
    );

    assert!(scheduler.tick(nine_thirty()).await.is_err());
    assert!(scheduler.tick(nine_thirty()).await.is_err());
    assert!(inbox.drain(patient_id).await.is_empty());
}

#[tokio::test]
async fn failed_prescription_lookup_defers_the_reminder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reminder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([due_reminder(Uuid::new_v4())])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prescription"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/reminder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let scheduler = ReminderScheduler::with_client(
        DbClient::with_base_url(&mock_server.uri(), "key"),
        ReminderInbox::new(),
        Duration::from_secs(60),
    );

    assert_eq!(scheduler.tick(nine_thirty()).await.unwrap(), 0);
}

#[tokio::test]
async fn large_backlog_is_deleted_in_bounded_chunks() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();
    let prescription_id = Uuid::new_v4();
    let backlog: Vec<serde_json::Value> = (0..150).map(|_| due_reminder(prescription_id)).collect();

    Mock::given(method("GET"))
        .and(path("/reminder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(backlog)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prescription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::prescription_row(prescription_id, patient_id, Uuid::new_v4(), "Metformin", 2, 5)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/reminder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let inbox = ReminderInbox::new();
    let scheduler = ReminderScheduler::with_client(
        DbClient::with_base_url(&mock_server.uri(), "key"),
        inbox.clone(),
        Duration::from_secs(60),
    );

    assert_eq!(scheduler.tick(nine_thirty()).await.unwrap(), 150);
    assert_eq!(inbox.drain(patient_id).await.len(), 150);
}
