use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use auth_cell::PasswordService;
use shared_config::AppConfig;
use shared_database::{ilike, DbClient, DbError};
use shared_models::pagination::{Page, PageParams};

use crate::models::{
    CreatePatientRequest, NewPatientRow, Patient, PatientError, PatientPatch,
    UpdatePatientRequest, PATIENT_COLUMNS, PATIENT_TABLE,
};

pub struct PatientService {
    db: DbClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DbClient::new(config),
        }
    }

    pub fn with_client(db: DbClient) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        request.validate().map_err(PatientError::Validation)?;

        let hashed_password = PasswordService::hash_password(&request.password)
            .map_err(|_| PatientError::PasswordHash)?;

        let row = NewPatientRow {
            username: &request.username,
            hashed_password,
            email: &request.email,
            city: &request.city,
            first_name: &request.first_name,
            last_name: &request.last_name,
            phone_number: &request.phone_number,
            dob: request.dob,
            gender: &request.gender,
            blood_group: request.blood_group.as_deref(),
            emergency_contact: request.emergency_contact.as_deref(),
            is_active: true,
            timestamp: Utc::now().naive_utc(),
        };

        let mut created: Vec<Patient> = self
            .db
            .insert(PATIENT_TABLE, &row)
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => PatientError::AlreadyExists,
                other => PatientError::Database(other),
            })?;

        let patient = created.pop().ok_or_else(|| {
            PatientError::Database(DbError::Decode("insert returned no rows".to_string()))
        })?;

        info!("Patient registered successfully with ID: {}", patient.user_id);
        Ok(patient)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        request.validate().map_err(PatientError::Validation)?;

        let hashed_password = match request.password.as_deref() {
            Some(password) => Some(
                PasswordService::hash_password(password).map_err(|_| PatientError::PasswordHash)?,
            ),
            None => None,
        };

        let patch = PatientPatch {
            email: request.email,
            hashed_password,
            first_name: request.first_name,
            last_name: request.last_name,
            phone_number: request.phone_number,
            city: request.city,
            dob: request.dob,
            gender: request.gender,
            blood_group: request.blood_group,
            emergency_contact: request.emergency_contact,
        };

        if patch.is_empty() {
            return self.get(patient_id).await.map_err(|e| match e {
                PatientError::NotFoundWithId(_) => PatientError::NotFound,
                other => other,
            });
        }

        let query = format!("user_id=eq.{}&select={}", patient_id, PATIENT_COLUMNS);
        let mut updated: Vec<Patient> = self
            .db
            .update(PATIENT_TABLE, &query, &patch)
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => PatientError::AlreadyExists,
                other => PatientError::Database(other),
            })?;

        match updated.pop() {
            Some(patient) => {
                info!("Patient with ID {} updated successfully", patient_id);
                Ok(patient)
            }
            None => {
                warn!("Patient with ID {} not found", patient_id);
                Err(PatientError::NotFound)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient with ID: {}", patient_id);
        let query = format!("user_id=eq.{}&select={}", patient_id, PATIENT_COLUMNS);
        self.db
            .select_one(PATIENT_TABLE, &query)
            .await?
            .ok_or(PatientError::NotFoundWithId(patient_id))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, patient_id: Uuid) -> Result<(), PatientError> {
        let removed = self
            .db
            .delete(PATIENT_TABLE, &format!("user_id=eq.{}", patient_id))
            .await?;

        if removed == 0 {
            warn!("Patient with ID {} not found for deletion", patient_id);
            return Err(PatientError::NotFound);
        }

        info!("Patient with ID {} deleted", patient_id);
        Ok(())
    }

    /// Paged listing, optionally filtered on username and names.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<&str>,
        params: &PageParams,
    ) -> Result<Page<Patient>, PatientError> {
        let mut query = format!("select={}&order=timestamp.desc", PATIENT_COLUMNS);
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = ilike(term);
            query.push_str(&format!(
                "&or=(username.ilike.{p},first_name.ilike.{p},last_name.ilike.{p})",
                p = pattern
            ));
        }

        let (items, total) = self
            .db
            .select_page(PATIENT_TABLE, &query, params.limit(), params.offset())
            .await?;
        Ok(Page::new(items, total, params))
    }

    /// Patients whose first or last name contains `term`.
    pub async fn ids_matching_name(&self, term: &str) -> Result<Vec<Uuid>, PatientError> {
        #[derive(serde::Deserialize)]
        struct IdRow {
            user_id: Uuid,
        }

        let pattern = ilike(term);
        let query = format!(
            "select=user_id&or=(first_name.ilike.{p},last_name.ilike.{p})",
            p = pattern
        );
        let rows: Vec<IdRow> = self.db.select(PATIENT_TABLE, &query).await?;
        Ok(rows.into_iter().map(|row| row.user_id).collect())
    }
}
