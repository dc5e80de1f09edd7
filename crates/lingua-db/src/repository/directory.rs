//! # Directory Repositories
//!
//! Reference data: departments, rooms, and course types. Simple CRUD with
//! soft deletes - a deactivated row disappears from listings but stays
//! referenceable by existing courses.
//!
//! Trainers and students are directory data too, but carry enough extra
//! queries to live in their own modules.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lingua_core::validation::{validate_course_type_code, validate_name};
use lingua_core::{
    CoreError, CourseType, Department, NewCourseType, NewDepartment, NewRoom, Room,
    DEFAULT_ROOM_CAPACITY,
};

// =============================================================================
// Department Repository
// =============================================================================

/// Repository for department database operations.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: SqlitePool,
}

impl DepartmentRepository {
    /// Creates a new DepartmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DepartmentRepository { pool }
    }

    /// Lists active departments, sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Department>> {
        let departments = sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM departments
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    /// Gets a department by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Department>> {
        let department = sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM departments
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(department)
    }

    /// Inserts a new department.
    pub async fn insert(&self, new: NewDepartment) -> DbResult<Department> {
        validate_name("name", &new.name)?;

        let now = Utc::now();
        let department = Department {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            description: new.description,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %department.id, name = %department.name, "Inserting department");

        sqlx::query(
            r#"
            INSERT INTO departments (id, name, description, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&department.id)
        .bind(&department.name)
        .bind(&department.description)
        .bind(department.is_active)
        .bind(department.created_at)
        .bind(department.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(department)
    }

    /// Updates a department's business fields.
    pub async fn update(&self, id: &str, update: NewDepartment) -> DbResult<Department> {
        validate_name("name", &update.name)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE departments SET name = ?2, description = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Department", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Department", id))
    }

    /// Soft-deletes a department.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE departments SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Department", id));
        }

        info!(id = %id, "Deactivated department");
        Ok(())
    }
}

// =============================================================================
// Room Repository
// =============================================================================

/// Repository for course-room database operations.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Creates a new RoomRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    /// Lists available rooms, sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, department_id, name, capacity, equipment, is_available,
                   created_at, updated_at
            FROM rooms
            WHERE is_available = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Lists available rooms of a department.
    pub async fn list_by_department(&self, department_id: &str) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, department_id, name, capacity, equipment, is_available,
                   created_at, updated_at
            FROM rooms
            WHERE department_id = ?1 AND is_available = 1
            ORDER BY name
            "#,
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Gets a room by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, department_id, name, capacity, equipment, is_available,
                   created_at, updated_at
            FROM rooms
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    /// Inserts a new room into its department.
    pub async fn insert(&self, new: NewRoom) -> DbResult<Room> {
        validate_name("name", &new.name)?;
        self.require_department(&new.department_id).await?;

        let now = Utc::now();
        let room = Room {
            id: Uuid::new_v4().to_string(),
            department_id: new.department_id,
            name: new.name,
            capacity: new.capacity.unwrap_or(DEFAULT_ROOM_CAPACITY),
            equipment: new.equipment,
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %room.id, name = %room.name, "Inserting room");

        sqlx::query(
            r#"
            INSERT INTO rooms (id, department_id, name, capacity, equipment,
                               is_available, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&room.id)
        .bind(&room.department_id)
        .bind(&room.name)
        .bind(room.capacity)
        .bind(&room.equipment)
        .bind(room.is_available)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(room)
    }

    /// Updates a room's business fields (full overwrite).
    pub async fn update(&self, id: &str, update: NewRoom) -> DbResult<Room> {
        validate_name("name", &update.name)?;
        self.require_department(&update.department_id).await?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE rooms SET department_id = ?2, name = ?3, capacity = ?4,
                             equipment = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.department_id)
        .bind(&update.name)
        .bind(update.capacity.unwrap_or(DEFAULT_ROOM_CAPACITY))
        .bind(&update.equipment)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Room", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Room", id))
    }

    /// Soft-deletes a room.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE rooms SET is_available = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Room", id));
        }

        info!(id = %id, "Deactivated room");
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
// Course Type Repository
// =============================================================================

/// Repository for course-type database operations.
///
/// Course types carry a unique business code ("A1", "B2-INT"); the
/// repository pre-checks it and the UNIQUE index backs the check against
/// races.
#[derive(Debug, Clone)]
pub struct CourseTypeRepository {
    pool: SqlitePool,
}

impl CourseTypeRepository {
    /// Creates a new CourseTypeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CourseTypeRepository { pool }
    }

    /// Lists active course types in level order.
    pub async fn list_active(&self) -> DbResult<Vec<CourseType>> {
        let types = sqlx::query_as::<_, CourseType>(
            r#"
            SELECT id, code, name, description, level_order, is_active,
                   created_at, updated_at
            FROM course_types
            WHERE is_active = 1
            ORDER BY level_order, code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    /// Gets a course type by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CourseType>> {
        let course_type = sqlx::query_as::<_, CourseType>(
            r#"
            SELECT id, code, name, description, level_order, is_active,
                   created_at, updated_at
            FROM course_types
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course_type)
    }

    /// Gets a course type by its business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<CourseType>> {
        let course_type = sqlx::query_as::<_, CourseType>(
            r#"
            SELECT id, code, name, description, level_order, is_active,
                   created_at, updated_at
            FROM course_types
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course_type)
    }

    /// Inserts a new course type.
    pub async fn insert(&self, new: NewCourseType) -> DbResult<CourseType> {
        validate_course_type_code(&new.code)?;
        validate_name("name", &new.name)?;
        self.require_unique_code(&new.code, None).await?;

        let now = Utc::now();
        let course_type = CourseType {
            id: Uuid::new_v4().to_string(),
            code: new.code,
            name: new.name,
            description: new.description,
            level_order: new.level_order,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %course_type.id, code = %course_type.code, "Inserting course type");

        sqlx::query(
            r#"
            INSERT INTO course_types (id, code, name, description, level_order,
                                      is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&course_type.id)
        .bind(&course_type.code)
        .bind(&course_type.name)
        .bind(&course_type.description)
        .bind(course_type.level_order)
        .bind(course_type.is_active)
        .bind(course_type.created_at)
        .bind(course_type.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(course_type)
    }

    /// Updates a course type's business fields.
    pub async fn update(&self, id: &str, update: NewCourseType) -> DbResult<CourseType> {
        validate_course_type_code(&update.code)?;
        validate_name("name", &update.name)?;
        self.require_unique_code(&update.code, Some(id)).await?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE course_types SET code = ?2, name = ?3, description = ?4,
                                    level_order = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.code)
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.level_order)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Course type", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Course type", id))
    }

    /// Soft-deletes a course type.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE course_types SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Course type", id));
        }

        info!(id = %id, "Deactivated course type");
        Ok(())
    }

    /// Pre-checks code uniqueness; `exclude_id` skips the row being updated.
    async fn require_unique_code(&self, code: &str, exclude_id: Option<&str>) -> DbResult<()> {
        let existing: Option<String> = match exclude_id {
            Some(id) => {
                sqlx::query_scalar("SELECT id FROM course_types WHERE code = ?1 AND id != ?2")
                    .bind(code)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => sqlx::query_scalar("SELECT id FROM course_types WHERE code = ?1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?,
        };

        if existing.is_some() {
            return Err(DbError::duplicate("code", code));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[tokio::test]
    async fn deactivated_rows_vanish_from_listings() {
        let ctx = testutil::context().await;
        let departments = ctx.db.departments();

        let extra = departments
            .insert(NewDepartment {
                name: "Integration Courses".to_string(),
                description: None,
            })
            .await
            .unwrap();

        assert_eq!(departments.list_active().await.unwrap().len(), 2);

        departments.deactivate(&extra.id).await.unwrap();

        let active = departments.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        // The row itself survives as a tombstone
        let gone = departments.get_by_id(&extra.id).await.unwrap().unwrap();
        assert!(!gone.is_active);
    }

    #[tokio::test]
    async fn duplicate_course_type_code_is_rejected() {
        let ctx = testutil::context().await;

        // "A1" was seeded by the fixture
        let err = ctx
            .db
            .course_types()
            .insert(NewCourseType {
                code: "A1".to_string(),
                name: "Another A1".to_string(),
                description: None,
                level_order: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn course_type_update_may_keep_its_own_code() {
        let ctx = testutil::context().await;
        let types = ctx.db.course_types();

        let updated = types
            .update(
                &ctx.course_type_id,
                NewCourseType {
                    code: "A1".to_string(),
                    name: "A1 Beginner (revised)".to_string(),
                    description: Some("New curriculum".to_string()),
                    level_order: Some(1),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "A1 Beginner (revised)");
    }

    #[tokio::test]
    async fn room_insert_requires_existing_department() {
        let ctx = testutil::context().await;

        let err = ctx
            .db
            .rooms()
            .insert(NewRoom {
                department_id: "missing".to_string(),
                name: "Room 9".to_string(),
                capacity: None,
                equipment: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::DepartmentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn room_capacity_defaults_to_twelve() {
        let ctx = testutil::context().await;
        let room = ctx.db.rooms().get_by_id(&ctx.room_id).await.unwrap().unwrap();
        assert_eq!(room.capacity, 12);
    }

    #[tokio::test]
    async fn blank_names_fail_validation() {
        let ctx = testutil::context().await;

        let err = ctx
            .db
            .departments()
            .insert(NewDepartment {
                name: "   ".to_string(),
                description: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }
}
