//! # Trainer Repository
//!
//! Database operations for trainers. Directory data with an availability
//! status on top of the usual soft-delete flag: deployment planning asks
//! "who is available", not just "who exists".

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lingua_core::validation::{validate_email, validate_name};
use lingua_core::{CoreError, NewTrainer, Trainer, TrainerStatus, TrainerUpdate};

const TRAINER_COLUMNS: &str = r#"
    id, department_id, first_name, last_name, email, phone, status,
    qualifications, hire_date, is_active, created_at, updated_at
"#;

/// Repository for trainer database operations.
#[derive(Debug, Clone)]
pub struct TrainerRepository {
    pool: SqlitePool,
}

impl TrainerRepository {
    /// Creates a new TrainerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TrainerRepository { pool }
    }

    /// Lists active trainers, sorted by last name.
    pub async fn list_active(&self) -> DbResult<Vec<Trainer>> {
        let trainers = sqlx::query_as::<_, Trainer>(&format!(
            "SELECT {TRAINER_COLUMNS} FROM trainers WHERE is_active = 1 ORDER BY last_name, first_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(trainers)
    }

    /// Lists active trainers whose status is `available`.
    ///
    /// This is the pool deployment planning draws from; deployed and absent
    /// trainers are excluded even when active.
    pub async fn list_available(&self) -> DbResult<Vec<Trainer>> {
        let trainers = sqlx::query_as::<_, Trainer>(&format!(
            "SELECT {TRAINER_COLUMNS} FROM trainers \
             WHERE is_active = 1 AND status = ?1 ORDER BY last_name, first_name"
        ))
        .bind(TrainerStatus::Available)
        .fetch_all(&self.pool)
        .await?;

        Ok(trainers)
    }

    /// Lists active trainers of a department.
    pub async fn list_by_department(&self, department_id: &str) -> DbResult<Vec<Trainer>> {
        let trainers = sqlx::query_as::<_, Trainer>(&format!(
            "SELECT {TRAINER_COLUMNS} FROM trainers \
             WHERE department_id = ?1 AND is_active = 1 ORDER BY last_name, first_name"
        ))
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(trainers)
    }

    /// Gets a trainer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Trainer>> {
        let trainer = sqlx::query_as::<_, Trainer>(&format!(
            "SELECT {TRAINER_COLUMNS} FROM trainers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(trainer)
    }

    /// Inserts a new trainer.
    pub async fn insert(&self, new: NewTrainer) -> DbResult<Trainer> {
        validate_name("first_name", &new.first_name)?;
        validate_name("last_name", &new.last_name)?;
        if let Some(email) = &new.email {
            validate_email(email)?;
        }
        self.require_department(&new.department_id).await?;

        let now = Utc::now();
        let trainer = Trainer {
            id: Uuid::new_v4().to_string(),
            department_id: new.department_id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            status: new.status.unwrap_or_default(),
            qualifications: new.qualifications,
            hire_date: new.hire_date,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %trainer.id, last_name = %trainer.last_name, "Inserting trainer");

        sqlx::query(
            r#"
            INSERT INTO trainers (id, department_id, first_name, last_name, email,
                                  phone, status, qualifications, hire_date,
                                  is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&trainer.id)
        .bind(&trainer.department_id)
        .bind(&trainer.first_name)
        .bind(&trainer.last_name)
        .bind(&trainer.email)
        .bind(&trainer.phone)
        .bind(trainer.status)
        .bind(&trainer.qualifications)
        .bind(trainer.hire_date)
        .bind(trainer.is_active)
        .bind(trainer.created_at)
        .bind(trainer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(trainer)
    }

    /// Updates a trainer (full overwrite of business fields).
    pub async fn update(&self, id: &str, update: TrainerUpdate) -> DbResult<Trainer> {
        validate_name("first_name", &update.first_name)?;
        validate_name("last_name", &update.last_name)?;
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        self.require_department(&update.department_id).await?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE trainers SET department_id = ?2, first_name = ?3, last_name = ?4,
                                email = ?5, phone = ?6, status = ?7,
                                qualifications = ?8, hire_date = ?9, updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.department_id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(update.status)
        .bind(&update.qualifications)
        .bind(update.hire_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Trainer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Trainer", id))
    }

    /// Soft-deletes a trainer.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE trainers SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Trainer", id));
        }

        info!(id = %id, "Deactivated trainer");
        Ok(())
    }

    async fn require_department(&self, department_id: &str) -> DbResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM departments WHERE id = ?1")
            .bind(department_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(CoreError::DepartmentNotFound(department_id.to_string()).into());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
