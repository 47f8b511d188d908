use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Claims, Role};

pub struct TestConfig {
    pub jwt_secret: String,
    pub database_url: String,
    pub database_api_key: String,
    pub openai_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            database_url: "http://localhost:3000".to_string(),
            database_api_key: "test-api-key".to_string(),
            openai_base_url: "http://localhost:4010/v1".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing the database client at a mock server.
    pub fn with_database(database_url: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database_url.clone(),
            database_api_key: self.database_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_algorithm: "HS256".to_string(),
            access_token_expire_minutes: 120,
            openai_api_key: "test-openai-key".to_string(),
            openai_base_url: self.openai_base_url.clone(),
            openai_model: "gpt-4o-mini".to_string(),
            allowed_origins: Vec::new(),
            allowed_methods: Vec::new(),
            allowed_headers: Vec::new(),
            allow_credentials: false,
            reminder_interval_seconds: 60,
            port: 8000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl TestUser {
    pub fn new(username: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role,
        }
    }

    pub fn doctor(username: &str) -> Self {
        Self::new(username, Role::Doctor)
    }

    pub fn patient(username: &str) -> Self {
        Self::new(username, Role::Patient)
    }

    pub fn admin(username: &str) -> Self {
        Self::new(username, Role::Admin)
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let claims = Claims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp: (Utc::now() + Duration::hours(exp_hours.unwrap_or(24))).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("test token encodes")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned PostgREST rows.
pub struct MockDbResponses;

impl MockDbResponses {
    pub fn patient_row(user_id: Uuid, username: &str) -> serde_json::Value {
        json!({
            "user_id": user_id,
            "username": username,
            "email": format!("{}@example.com", username),
            "city": "Lahore",
            "is_active": true,
            "timestamp": "2024-01-01T00:00:00",
            "first_name": "Ali",
            "last_name": "Khan",
            "phone_number": "03001234567",
            "dob": "1990-01-01",
            "gender": "male",
            "blood_group": "O+",
            "emergency_contact": null
        })
    }

    pub fn doctor_row(user_id: Uuid, username: &str, specialization: &str) -> serde_json::Value {
        json!({
            "user_id": user_id,
            "username": username,
            "email": format!("{}@example.com", username),
            "city": "Karachi",
            "is_active": true,
            "timestamp": "2024-01-01T00:00:00",
            "first_name": "Sara",
            "last_name": "Ahmed",
            "specialization": specialization,
            "phone_number": "03111234567",
            "gender": "female",
            "years_of_experience": 12,
            "consultation_fee": 2500
        })
    }

    pub fn admin_row(user_id: Uuid, username: &str) -> serde_json::Value {
        json!({
            "user_id": user_id,
            "username": username,
            "email": format!("{}@example.com", username),
            "city": null,
            "is_active": true,
            "timestamp": "2024-01-01T00:00:00"
        })
    }

    pub fn time_slot_row(slot_id: Uuid, doctor_id: Uuid, start: &str, end: &str, status: &str) -> serde_json::Value {
        json!({
            "time_slot_id": slot_id,
            "doctor_id": doctor_id,
            "patient_id": null,
            "start_time": start,
            "end_time": end,
            "status": status
        })
    }

    pub fn appointment_row(appointment_id: Uuid, patient_id: Uuid, doctor_id: Uuid, date: &str, is_active: bool) -> serde_json::Value {
        json!({
            "appointment_id": appointment_id,
            "appointment_date": date,
            "is_active": is_active,
            "patient_id": patient_id,
            "doctor_id": doctor_id
        })
    }

    pub fn prescription_row(prescription_id: Uuid, patient_id: Uuid, doctor_id: Uuid, name: &str, frequency: i32, duration: i32) -> serde_json::Value {
        json!({
            "prescription_id": prescription_id,
            "medication_name": name,
            "dosage": "500 mg",
            "frequency": frequency,
            "duration": duration,
            "instructions": null,
            "is_active": true,
            "patient_id": patient_id,
            "doctor_id": doctor_id
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let app_config = TestConfig::default().to_app_config();

        assert_eq!(app_config.database_url, "http://localhost:3000");
        assert_eq!(app_config.database_api_key, "test-api-key");
        assert!(app_config.is_configured());
        assert!(app_config.is_chatbot_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::doctor("drsmith");
        let auth_user = user.to_auth_user();

        assert_eq!(auth_user.id, user.id);
        assert_eq!(auth_user.role, Role::Doctor);
    }

    #[test]
    fn test_jwt_token_creation() {
        let token = JwtTestUtils::create_test_token(&TestUser::patient("p1"), "test-secret", Some(1));
        assert_eq!(token.split('.').count(), 3);
    }
}
