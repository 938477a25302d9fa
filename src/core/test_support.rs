//! Shared fixtures for the core unit tests.

use crate::core::assign::AssignLogic;
use crate::core::catalog::{CatalogLogic, RoomInput};
use crate::core::enroll::EnrollLogic;
use crate::core::users::{UserInput, UserLogic};
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::db::users;
use crate::models::user::{Actor, User};

/// One college, two departments, course CSC201 (level 200) taught by
/// `lec@uni.edu`, with `stu@uni.edu` approved in it and room LT1.
pub(crate) struct Campus {
    pub pool: DbPool,
    pub lecturer: User,
    pub student: User,
    pub assignment_id: i64,
}

impl Campus {
    pub fn new() -> Self {
        let mut pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        let op = Actor::Operator;

        CatalogLogic::add_college(&mut pool, &op, "COS", "College of Science", "").unwrap();
        CatalogLogic::add_department(&mut pool, &op, "CSC", "Computer Science", "COS", "").unwrap();
        CatalogLogic::add_department(&mut pool, &op, "MTH", "Mathematics", "COS", "").unwrap();
        CatalogLogic::add_course(&mut pool, &op, "CSC201", "Data Structures", "CSC", "200", 3, "")
            .unwrap();
        CatalogLogic::add_room(
            &mut pool,
            &op,
            &RoomInput {
                code: "LT1".into(),
                name: Some("Lecture Theatre 1".into()),
                capacity: Some(100),
                ..Default::default()
            },
        )
        .unwrap();

        let lecturer = add_lecturer(&mut pool, "lec@uni.edu");
        let student = add_student(&mut pool, "stu@uni.edu", "CSC", "200");

        let assignment_id =
            AssignLogic::assign(&mut pool, &op, "CSC201", "lec@uni.edu", "2024/2025", "First")
                .unwrap();
        EnrollLogic::enroll_direct(&mut pool, &op, "stu@uni.edu", assignment_id).unwrap();

        Self {
            pool,
            lecturer,
            student,
            assignment_id,
        }
    }
}

pub(crate) fn add_lecturer(pool: &mut DbPool, email: &str) -> User {
    UserLogic::add(
        pool,
        &Actor::Operator,
        &UserInput {
            email: email.into(),
            full_name: format!("Dr {email}"),
            role: "lecturer".into(),
            ..Default::default()
        },
    )
    .unwrap();
    users::find_by_email(&pool.conn, email).unwrap().unwrap()
}

pub(crate) fn add_student(pool: &mut DbPool, email: &str, dept: &str, level: &str) -> User {
    UserLogic::add(
        pool,
        &Actor::Operator,
        &UserInput {
            email: email.into(),
            full_name: format!("Student {email}"),
            role: "student".into(),
            department: Some(dept.into()),
            level: Some(level.into()),
            ..Default::default()
        },
    )
    .unwrap();
    users::find_by_email(&pool.conn, email).unwrap().unwrap()
}
