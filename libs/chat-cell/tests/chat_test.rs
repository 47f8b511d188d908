use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chat_cell::replies;
use chat_cell::router::chat_routes;
use chat_cell::conversation::PendingPrescription;
use chat_cell::{Conversation, ConversationStore, Stage, Triage, TriageReply, CHATBOT_FAILURE};
use notification_cell::NotificationHub;
use shared_utils::test_utils::{JwtTestUtils, MockDbResponses, TestConfig, TestUser};

/// Answers every message with the same reply.
struct StubTriage(Option<TriageReply>);

#[async_trait]
impl Triage for StubTriage {
    async fn triage(&self, _message: &str) -> anyhow::Result<TriageReply> {
        self.0.clone().ok_or_else(|| anyhow!("model unavailable"))
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn mock_account_lookup(mock_server: &MockServer, table: &str, user: &TestUser) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", table)))
        .and(query_param("select", "user_id,username"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "user_id": user.id,
            "username": user.username
        }])))
        .mount(mock_server)
        .await;
}

fn app(mock_server: &MockServer, store: ConversationStore, reply: Option<TriageReply>) -> Router {
    let config = TestConfig::with_database(&mock_server.uri()).to_arc();
    chat_routes(config, store, Arc::new(StubTriage(reply)), NotificationHub::new())
}

fn chat_request(user: &TestUser, message: &str) -> Request<Body> {
    let token = JwtTestUtils::create_test_token(user, &TestConfig::default().jwt_secret, None);
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("Authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "user_message": message }).to_string()))
        .unwrap()
}

async fn send(app: &Router, user: &TestUser, message: &str) -> (StatusCode, Value) {
    let response = app.clone().oneshot(chat_request(user, message)).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn reset_starts_a_new_conversation() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ali");
    mock_account_lookup(&mock_server, "patients", &patient).await;

    let store = ConversationStore::new();
    let app = app(&mock_server, store.clone(), None);

    let (status, body) = send(&app, &patient, "  Start Over ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], replies::NEW_CONVERSATION);
    assert_eq!(store.stage(patient.id).await, Stage::General);
}

#[tokio::test]
async fn general_question_gets_plain_answer() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ali");
    mock_account_lookup(&mock_server, "patients", &patient).await;

    let app = app(
        &mock_server,
        ConversationStore::new(),
        Some(TriageReply::plain("Drink plenty of water.")),
    );

    let (status, body) = send(&app, &patient, "I feel thirsty").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], replies::plain("Drink plenty of water."));
    assert!(body.get("doctors").is_none());
}

#[tokio::test]
async fn triage_failure_is_internal_error() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ali");
    mock_account_lookup(&mock_server, "patients", &patient).await;

    let app = app(&mock_server, ConversationStore::new(), None);

    let (status, body) = send(&app, &patient, "hello").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], CHATBOT_FAILURE);
}

#[tokio::test]
async fn doctors_cannot_use_the_chatbot() {
    let mock_server = MockServer::start().await;
    let doctor = TestUser::doctor("drsara");
    mock_account_lookup(&mock_server, "doctors", &doctor).await;

    let app = app(&mock_server, ConversationStore::new(), None);

    let (status, _) = send(&app, &doctor, "hello").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn suggestion_selection_and_booking() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ali");
    let doctor_id = Uuid::new_v4();
    let slot_id = Uuid::new_v4();
    mock_account_lookup(&mock_server, "patients", &patient).await;

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::doctor_row(doctor_id, "drsara", "Cardiology")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/time_slot"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .and(query_param("status", "eq.available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::time_slot_row(slot_id, doctor_id, "09:00:00", "09:30:00", "available")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/time_slot"))
        .and(query_param("time_slot_id", format!("eq.{}", slot_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::time_slot_row(slot_id, doctor_id, "09:00:00", "09:30:00", "available")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/appointment"))
        .and(body_partial_json(json!({"doctor_id": doctor_id, "patient_id": patient.id})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockDbResponses::appointment_row(Uuid::new_v4(), patient.id, doctor_id, "2024-05-01", true)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/time_slot"))
        .and(body_partial_json(json!({"status": "booked"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::time_slot_row(slot_id, doctor_id, "09:00:00", "09:30:00", "booked")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = ConversationStore::new();
    let suggestion = TriageReply {
        response: "Chest pain should be checked by a heart specialist.".to_string(),
        suggest_doctor: true,
        specialization: Some("Cardiology".to_string()),
        check_prescriptions: false,
    };
    let app = app(&mock_server, store.clone(), Some(suggestion));

    let (status, body) = send(&app, &patient, "I have chest pain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctors"].as_array().unwrap().len(), 1);
    assert!(body["response"]
        .as_str()
        .unwrap()
        .contains("Dr. Sara Ahmed (Cardiology) | Experience: 12 years | Fees: Rs.2500"));
    assert_eq!(store.stage(patient.id).await, Stage::AwaitingDoctorSelection);

    let (_, body) = send(&app, &patient, "Dr. Ali Raza").await;
    assert_eq!(body["response"], replies::DOCTOR_NOT_FOUND);

    let (_, body) = send(&app, &patient, "Dr. Sara Ahmed").await;
    assert_eq!(
        body["response"],
        replies::available_slots("Sara Ahmed", "1. 09:00 AM - 09:30 AM")
    );
    assert_eq!(store.stage(patient.id).await, Stage::AwaitingSlotSelection);

    let (_, body) = send(&app, &patient, "first").await;
    assert_eq!(body["response"], replies::INVALID_INPUT);

    let (_, body) = send(&app, &patient, "3").await;
    assert_eq!(body["response"], replies::INVALID_SLOT_SELECTION);

    let (status, body) = send(&app, &patient, "1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"],
        replies::appointment_booked("Sara Ahmed", "09:00 AM", "09:30 AM", "drsara@example.com")
    );
    assert_eq!(store.stage(patient.id).await, Stage::General);
}

#[tokio::test]
async fn prescription_check_and_reminder_activation() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ali");
    let doctor_id = Uuid::new_v4();
    let prescription_id = Uuid::new_v4();
    mock_account_lookup(&mock_server, "patients", &patient).await;

    Mock::given(method("GET"))
        .and(path("/appointment"))
        .and(query_param("is_active", "is.false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::appointment_row(Uuid::new_v4(), patient.id, doctor_id, "2024-05-01", false)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prescription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::prescription_row(prescription_id, patient.id, doctor_id, "Amoxicillin", 1, 1)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reminder"))
        .and(query_param("select", "reminder_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let reminder_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/reminder"))
        .and(query_param("prescription_id", format!("eq.{}", prescription_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "reminder_id": reminder_id,
            "prescription_id": prescription_id,
            "reminder_time": "08:00:00",
            "reminder_date": null,
            "status": "Inactive"
        }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/reminder"))
        .and(body_partial_json(json!({"status": "Active"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "reminder_id": reminder_id,
            "prescription_id": prescription_id,
            "reminder_time": "08:00:00",
            "reminder_date": "2024-05-02",
            "status": "Active"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/prescription"))
        .and(body_partial_json(json!({"is_active": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::prescription_row(prescription_id, patient.id, doctor_id, "Amoxicillin", 1, 1)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = ConversationStore::new();
    let reply = TriageReply {
        response: "Let me check your prescriptions.".to_string(),
        check_prescriptions: true,
        ..TriageReply::default()
    };
    let app = app(&mock_server, store.clone(), Some(reply));

    let (status, body) = send(&app, &patient, "any reminders for my medicine?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], replies::prescriptions_found("1. Amoxicillin"));
    assert_eq!(store.stage(patient.id).await, Stage::ActivateReminders);

    let (_, body) = send(&app, &patient, "maybe").await;
    assert_eq!(body["response"], replies::YES_NO_UNRECOGNIZED);

    let (_, body) = send(&app, &patient, "yes").await;
    assert_eq!(
        body["response"],
        replies::reminders_activated("Amoxicillin", "08:00 AM")
    );
    assert_eq!(store.stage(patient.id).await, Stage::UpdateReminderPrompt);

    let (_, body) = send(&app, &patient, "no").await;
    assert_eq!(body["response"], replies::ALL_PRESCRIPTIONS_DONE);
    assert_eq!(store.stage(patient.id).await, Stage::General);
}

#[tokio::test]
async fn no_closed_appointment_means_no_prescriptions() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ali");
    mock_account_lookup(&mock_server, "patients", &patient).await;

    Mock::given(method("GET"))
        .and(path("/appointment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let store = ConversationStore::new();
    let reply = TriageReply {
        response: "Checking.".to_string(),
        check_prescriptions: true,
        ..TriageReply::default()
    };
    let app = app(&mock_server, store.clone(), Some(reply));

    let (_, body) = send(&app, &patient, "do I have prescriptions?").await;
    assert_eq!(body["response"], replies::NO_PRESCRIPTIONS);
    assert_eq!(store.stage(patient.id).await, Stage::WaitingForExit);

    let (_, body) = send(&app, &patient, "thanks").await;
    assert_eq!(body["response"], replies::CONFIRM_EXIT);
    assert_eq!(store.stage(patient.id).await, Stage::General);
}

async fn seed(store: &ConversationStore, patient_id: Uuid, seeded: Conversation) {
    let mut conversation = store.checkout(patient_id).await;
    *conversation = seeded;
    store.checkin(patient_id, conversation).await;
}

fn pending(name: &str) -> PendingPrescription {
    PendingPrescription {
        prescription_id: Uuid::new_v4(),
        medication_name: name.to_string(),
    }
}

fn cardiology_suggestion() -> TriageReply {
    TriageReply {
        response: "Chest pain should be checked by a heart specialist.".to_string(),
        suggest_doctor: true,
        specialization: Some("Cardiology".to_string()),
        check_prescriptions: false,
    }
}

async fn mock_two_cardiologists(mock_server: &MockServer, booked_out: Uuid, other: Uuid) {
    let mut second = MockDbResponses::doctor_row(other, "drkhan", "Cardiology");
    second["first_name"] = json!("Omar");
    second["last_name"] = json!("Khan");

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::doctor_row(booked_out, "drsara", "Cardiology"),
            second
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/time_slot"))
        .and(query_param("doctor_id", format!("eq.{}", booked_out)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn fully_booked_doctor_points_to_others_with_slots() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ali");
    let sara = Uuid::new_v4();
    let omar = Uuid::new_v4();
    mock_account_lookup(&mock_server, "patients", &patient).await;
    mock_two_cardiologists(&mock_server, sara, omar).await;

    Mock::given(method("GET"))
        .and(path("/time_slot"))
        .and(query_param("doctor_id", format!("eq.{}", omar)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::time_slot_row(Uuid::new_v4(), omar, "10:00:00", "10:30:00", "available")
        ])))
        .mount(&mock_server)
        .await;

    let store = ConversationStore::new();
    let app = app(&mock_server, store.clone(), Some(cardiology_suggestion()));

    let (_, body) = send(&app, &patient, "I have chest pain").await;
    assert_eq!(body["doctors"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, &patient, "Dr. Sara Ahmed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"],
        format!(
            "{}\n\n{}",
            replies::no_available_slots("Sara Ahmed"),
            replies::other_doctors_available("Dr. Omar Khan")
        )
    );
    assert_eq!(store.stage(patient.id).await, Stage::AwaitingDoctorSelection);
}

#[tokio::test]
async fn fully_booked_doctor_with_no_alternatives() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ali");
    let sara = Uuid::new_v4();
    let omar = Uuid::new_v4();
    mock_account_lookup(&mock_server, "patients", &patient).await;
    mock_two_cardiologists(&mock_server, sara, omar).await;

    Mock::given(method("GET"))
        .and(path("/time_slot"))
        .and(query_param("doctor_id", format!("eq.{}", omar)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let store = ConversationStore::new();
    let app = app(&mock_server, store.clone(), Some(cardiology_suggestion()));

    send(&app, &patient, "I have chest pain").await;
    let (_, body) = send(&app, &patient, "dr sara ahmed").await;
    assert_eq!(
        body["response"],
        format!(
            "{}\n\n{}",
            replies::no_available_slots("Sara Ahmed"),
            replies::NO_OTHER_DOCTORS
        )
    );
}

#[tokio::test]
async fn declining_reminders_ends_the_flow() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ali");
    mock_account_lookup(&mock_server, "patients", &patient).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = ConversationStore::new();
    seed(
        &store,
        patient.id,
        Conversation {
            stage: Stage::ActivateReminders,
            pending: [pending("Amoxicillin"), pending("Insulin")].into_iter().collect(),
            ..Default::default()
        },
    )
    .await;
    let app = app(&mock_server, store.clone(), None);

    let (status, body) = send(&app, &patient, "No").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], replies::NO_REMINDERS_ACTIVATED);
    assert_eq!(store.stage(patient.id).await, Stage::General);
}

#[tokio::test]
async fn new_reminder_times_are_applied_then_next_prescription_offered() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ali");
    let prescription_id = Uuid::new_v4();
    mock_account_lookup(&mock_server, "patients", &patient).await;

    let reminder = |time: &str, date: &str| {
        json!({
            "reminder_id": Uuid::new_v4(),
            "prescription_id": prescription_id,
            "reminder_time": time,
            "reminder_date": date,
            "status": "Active"
        })
    };

    Mock::given(method("GET"))
        .and(path("/reminder"))
        .and(query_param("prescription_id", format!("eq.{}", prescription_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            reminder("09:00:00", "2030-01-01"),
            reminder("21:00:00", "2030-01-01")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/reminder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([reminder("08:00:00", "2030-01-01")])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let store = ConversationStore::new();
    seed(
        &store,
        patient.id,
        Conversation {
            stage: Stage::CollectReminderTimes,
            prescription_id: Some(prescription_id),
            pending: [pending("Insulin")].into_iter().collect(),
            ..Default::default()
        },
    )
    .await;
    let app = app(&mock_server, store.clone(), None);

    let (_, body) = send(&app, &patient, "25:00, 8 pm").await;
    assert_eq!(body["response"], replies::PROCESSING_ERROR);
    assert_eq!(store.stage(patient.id).await, Stage::CollectReminderTimes);

    let (status, body) = send(&app, &patient, "08:00 AM, 8 pm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], replies::times_updated("08:00, 20:00", "Insulin"));
    assert_eq!(store.stage(patient.id).await, Stage::ActivateReminders);
}
