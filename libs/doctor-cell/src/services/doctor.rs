use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use auth_cell::PasswordService;
use shared_config::AppConfig;
use shared_database::{ilike, DbClient, DbError};
use shared_models::pagination::{Page, PageParams};

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorError, DoctorPatch, NewDoctorRow, UpdateDoctorRequest,
    DOCTOR_COLUMNS, DOCTOR_TABLE,
};
use crate::services::specialization::SpecializationMapper;

pub struct DoctorService {
    db: DbClient,
    mapper: SpecializationMapper,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(DbClient::new(config))
    }

    pub fn with_client(db: DbClient) -> Self {
        Self {
            db,
            mapper: SpecializationMapper::new(),
        }
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        request.validate().map_err(DoctorError::Validation)?;

        let hashed_password = PasswordService::hash_password(&request.password)
            .map_err(|_| DoctorError::PasswordHash)?;

        let row = NewDoctorRow {
            username: &request.username,
            hashed_password,
            email: &request.email,
            city: &request.city,
            first_name: &request.first_name,
            last_name: &request.last_name,
            specialization: request.specialization.trim(),
            phone_number: &request.phone_number,
            gender: &request.gender,
            years_of_experience: request.years_of_experience,
            consultation_fee: request.consultation_fee,
            is_active: true,
            timestamp: Utc::now().naive_utc(),
        };

        let mut created: Vec<Doctor> = self.db.insert(DOCTOR_TABLE, &row).await.map_err(|e| match e {
            DbError::Conflict(_) => DoctorError::AlreadyExists,
            other => DoctorError::Database(other),
        })?;

        let doctor = created.pop().ok_or_else(|| {
            DoctorError::Database(DbError::Decode("insert returned no rows".to_string()))
        })?;

        info!("Doctor registered successfully with ID: {}", doctor.user_id);
        Ok(doctor)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        request.validate().map_err(DoctorError::Validation)?;

        let hashed_password = match request.password.as_deref() {
            Some(password) => Some(
                PasswordService::hash_password(password).map_err(|_| DoctorError::PasswordHash)?,
            ),
            None => None,
        };

        let patch = DoctorPatch {
            hashed_password,
            first_name: request.first_name,
            last_name: request.last_name,
            specialization: request.specialization.map(|s| s.trim().to_string()),
            phone_number: request.phone_number,
            gender: request.gender,
            years_of_experience: request.years_of_experience,
            consultation_fee: request.consultation_fee,
            email: request.email,
            city: request.city,
        };

        let query = format!("user_id=eq.{}&select={}", doctor_id, DOCTOR_COLUMNS);
        let mut updated: Vec<Doctor> = self
            .db
            .update(DOCTOR_TABLE, &query, &patch)
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => DoctorError::AlreadyExists,
                other => DoctorError::Database(other),
            })?;

        updated.pop().ok_or_else(|| {
            warn!("Doctor with ID {} not found", doctor_id);
            DoctorError::NotFound
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        let query = format!("user_id=eq.{}&select={}", doctor_id, DOCTOR_COLUMNS);
        self.db
            .select_one(DOCTOR_TABLE, &query)
            .await?
            .ok_or(DoctorError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        let removed = self
            .db
            .delete(DOCTOR_TABLE, &format!("user_id=eq.{}", doctor_id))
            .await?;

        if removed == 0 {
            warn!("Doctor with ID {} not found for deletion", doctor_id);
            return Err(DoctorError::NotFound);
        }

        info!("Doctor with ID {} deleted", doctor_id);
        Ok(())
    }

    /// Doctors whose specialization contains any term the mapper expands
    /// `specialization` into. An empty result is not an error here.
    #[instrument(skip(self))]
    pub async fn by_specialization(&self, specialization: &str) -> Result<Vec<Doctor>, DoctorError> {
        let terms = self.mapper.find_matching_specializations(specialization);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Searching for doctors with specializations matching: {:?}", terms);

        let filters: Vec<String> = terms
            .iter()
            .map(|term| format!("specialization.ilike.{}", ilike(term)))
            .collect();
        let query = format!(
            "select={}&or=({})&order=years_of_experience.desc",
            DOCTOR_COLUMNS,
            filters.join(",")
        );

        let doctors: Vec<Doctor> = self.db.select(DOCTOR_TABLE, &query).await?;
        info!(
            "Found {} matching doctors for specialization '{}'",
            doctors.len(),
            specialization
        );
        Ok(doctors)
    }

    /// Paged listing, optionally filtered on username, names and specialization.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<&str>,
        params: &PageParams,
    ) -> Result<Page<Doctor>, DoctorError> {
        let mut query = format!("select={}&order=timestamp.desc", DOCTOR_COLUMNS);
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query.push_str(&format!(
                "&or=(username.ilike.{p},first_name.ilike.{p},last_name.ilike.{p},specialization.ilike.{p})",
                p = ilike(term)
            ));
        }

        let (items, total) = self
            .db
            .select_page(DOCTOR_TABLE, &query, params.limit(), params.offset())
            .await?;
        Ok(Page::new(items, total, params))
    }
}
