//! Shared test fixtures: an in-memory database with the reference rows most
//! repository tests need (one department, room, course type, trainer).

use chrono::NaiveDate;

use lingua_core::{
    Course, NewCourse, NewCourseType, NewDepartment, NewRoom, NewStudent, NewTrainer, Student,
};

use crate::pool::{Database, DbConfig};

pub(crate) struct TestContext {
    pub db: Database,
    pub department_id: String,
    pub room_id: String,
    pub course_type_id: String,
    pub trainer_id: String,
}

/// Fresh in-memory database with migrations applied and the directory seeded.
pub(crate) async fn context() -> TestContext {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let department = db
        .departments()
        .insert(NewDepartment {
            name: "German Courses".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let room = db
        .rooms()
        .insert(NewRoom {
            department_id: department.id.clone(),
            name: "Room 101".to_string(),
            capacity: None,
            equipment: None,
        })
        .await
        .unwrap();

    let course_type = db
        .course_types()
        .insert(NewCourseType {
            code: "A1".to_string(),
            name: "A1 Beginner".to_string(),
            description: None,
            level_order: Some(1),
        })
        .await
        .unwrap();

    let trainer = db
        .trainers()
        .insert(NewTrainer {
            department_id: department.id.clone(),
            first_name: "Maria".to_string(),
            last_name: "Klein".to_string(),
            email: Some("maria.klein@example.org".to_string()),
            phone: None,
            status: None,
            qualifications: None,
            hire_date: None,
        })
        .await
        .unwrap();

    TestContext {
        db,
        department_id: department.id,
        room_id: room.id,
        course_type_id: course_type.id,
        trainer_id: trainer.id,
    }
}

impl TestContext {
    /// Inserts an active student; email is derived from the name so trainer
    /// and student emails never collide across calls.
    pub(crate) async fn student(&self, first_name: &str, last_name: &str) -> Student {
        self.db
            .students()
            .insert(NewStudent {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: Some(format!(
                    "{}.{}@example.org",
                    first_name.to_lowercase(),
                    last_name.to_lowercase()
                )),
                phone: None,
                birth_date: None,
                gender: None,
                nationality: None,
                native_language: None,
                registration_date: None,
            })
            .await
            .unwrap()
    }

    /// Inserts a planned course with the given seat limit.
    pub(crate) async fn course(&self, name: &str, max_participants: i64) -> Course {
        self.db
            .courses()
            .insert(NewCourse {
                name: name.to_string(),
                course_type_id: self.course_type_id.clone(),
                room_id: self.room_id.clone(),
                trainer_id: self.trainer_id.clone(),
                start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                end_date: Some(NaiveDate::from_ymd_opt(2024, 8, 30).unwrap()),
                max_participants: Some(max_participants),
                description: None,
            })
            .await
            .unwrap()
    }
}
