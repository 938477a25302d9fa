use crate::db::catalog::find_department;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::users::{self, NewUser};
use crate::errors::{AppError, AppResult};
use crate::models::catalog::normalize_code;
use crate::models::role::{Level, Role};
use crate::models::user::{Actor, User};
use rusqlite::Connection;

/// Resolve the `--by <email>` flag. Without it the local operator acts.
pub fn resolve_actor(conn: &Connection, by: Option<&str>) -> AppResult<Actor> {
    match by {
        None => Ok(Actor::Operator),
        Some(email) => Ok(Actor::User(require_user(conn, email)?)),
    }
}

/// An active user by email.
pub fn require_user(conn: &Connection, email: &str) -> AppResult<User> {
    match users::find_by_email(conn, email)? {
        Some(u) if u.is_active => Ok(u),
        Some(_) => Err(AppError::Validation(format!("user {email} is inactive"))),
        None => Err(AppError::NotFound(format!("user {email}"))),
    }
}

pub fn require_role(user: &User, role: Role) -> AppResult<()> {
    if user.role != role {
        return Err(AppError::Validation(format!(
            "{} is a {}, expected a {}",
            user.email,
            user.role.to_db_str(),
            role.to_db_str()
        )));
    }
    Ok(())
}

pub fn require_admin(actor: &Actor, action: &str) -> AppResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(format!(
            "{} may not {action}: admin rights required",
            actor.label()
        )))
    }
}

/// A user acts for themselves; admins and the local operator for anyone.
pub fn require_self_or_admin(actor: &Actor, user: &User, action: &str) -> AppResult<()> {
    match actor {
        Actor::User(u) if !u.is_admin() && u.id != user.id => Err(AppError::PermissionDenied(
            format!("{} may not {action} for {}", u.email, user.email),
        )),
        _ => Ok(()),
    }
}

/// Fields accepted by `user add`.
#[derive(Debug, Default)]
pub struct UserInput {
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub student_id: Option<String>,
    pub lecturer_id: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
}

pub struct UserLogic;

impl UserLogic {
    pub fn add(pool: &mut DbPool, actor: &Actor, input: &UserInput) -> AppResult<i64> {
        require_admin(actor, "add users")?;
        let conn = &pool.conn;

        let email = input.email.trim().to_lowercase();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(AppError::Validation(format!("invalid email '{}'", input.email)));
        }
        if input.full_name.trim().is_empty() {
            return Err(AppError::Validation("full name must not be empty".into()));
        }

        let role =
            Role::from_code(&input.role).ok_or_else(|| AppError::InvalidRole(input.role.clone()))?;

        let level = match &input.level {
            Some(l) => Some(Level::parse(l).ok_or_else(|| {
                AppError::InvalidValue(format!("level '{l}' (use 100, 200, 300, 400 or 500)"))
            })?),
            None => None,
        };

        if role == Role::Student && level.is_none() {
            return Err(AppError::Validation("students must have a level".into()));
        }
        if role != Role::Student && level.is_some() {
            return Err(AppError::Validation("only students carry a level".into()));
        }

        if users::find_by_email(conn, &email)?.is_some() {
            return Err(AppError::Validation(format!("email {email} already registered")));
        }

        let student_id = input.student_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let lecturer_id = input.lecturer_id.as_deref().map(str::trim).filter(|s| !s.is_empty());

        if let Some(sid) = student_id
            && users::id_taken(conn, "student_id", sid)?
        {
            return Err(AppError::Validation(format!("student id {sid} already in use")));
        }
        if let Some(lid) = lecturer_id
            && users::id_taken(conn, "lecturer_id", lid)?
        {
            return Err(AppError::Validation(format!("lecturer id {lid} already in use")));
        }

        let department_id = match &input.department {
            Some(code) => Some(
                find_department(conn, &normalize_code(code))?
                    .filter(|d| d.is_active)
                    .ok_or_else(|| AppError::NotFound(format!("department {code}")))?
                    .id,
            ),
            None => None,
        };

        let id = users::insert_user(
            conn,
            &NewUser {
                email: &email,
                full_name: input.full_name.trim(),
                role,
                student_id,
                lecturer_id,
                department_id,
                level,
            },
        )?;

        audit(
            conn,
            "add",
            &format!("user:{email}"),
            &format!("Added {} {}", role.to_db_str(), input.full_name.trim()),
        )?;

        Ok(id)
    }

    pub fn list(
        pool: &DbPool,
        role: Option<&str>,
        department: Option<&str>,
        include_inactive: bool,
    ) -> AppResult<Vec<User>> {
        let role = match role {
            Some(r) => Some(Role::from_code(r).ok_or_else(|| AppError::InvalidRole(r.to_string()))?),
            None => None,
        };
        let department_id = match department {
            Some(code) => Some(
                find_department(&pool.conn, &normalize_code(code))?
                    .ok_or_else(|| AppError::NotFound(format!("department {code}")))?
                    .id,
            ),
            None => None,
        };
        users::list_users(&pool.conn, role, department_id, include_inactive)
    }

    pub fn deactivate(pool: &mut DbPool, actor: &Actor, email: &str) -> AppResult<()> {
        require_admin(actor, "deactivate users")?;
        let user = users::find_by_email(&pool.conn, email)?
            .ok_or_else(|| AppError::NotFound(format!("user {email}")))?;

        if actor.user_id() == Some(user.id) {
            return Err(AppError::Validation("you cannot deactivate yourself".into()));
        }

        users::set_active(&pool.conn, user.id, false)?;
        audit(
            &pool.conn,
            "del",
            &format!("user:{}", user.email),
            "User deactivated",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    fn pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        pool
    }

    fn student(email: &str, level: Option<&str>) -> UserInput {
        UserInput {
            email: email.into(),
            full_name: "Ada Obi".into(),
            role: "student".into(),
            level: level.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn students_need_a_level() {
        let mut pool = pool();
        let err = UserLogic::add(&mut pool, &Actor::Operator, &student("a@uni.edu", None)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        UserLogic::add(&mut pool, &Actor::Operator, &student("a@uni.edu", Some("200"))).unwrap();
    }

    #[test]
    fn emails_are_lowercased_and_unique() {
        let mut pool = pool();
        UserLogic::add(&mut pool, &Actor::Operator, &student("Ada@Uni.EDU", Some("100"))).unwrap();
        assert!(users::find_by_email(&pool.conn, "ada@uni.edu").unwrap().is_some());

        let err =
            UserLogic::add(&mut pool, &Actor::Operator, &student("ada@uni.edu", Some("100"))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn only_admins_add_users() {
        let mut pool = pool();
        UserLogic::add(&mut pool, &Actor::Operator, &student("s@uni.edu", Some("100"))).unwrap();
        let actor = resolve_actor(&pool.conn, Some("s@uni.edu")).unwrap();

        let err = UserLogic::add(&mut pool, &actor, &student("t@uni.edu", Some("100"))).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }

    #[test]
    fn unknown_actor_is_not_found() {
        let pool = pool();
        let err = resolve_actor(&pool.conn, Some("ghost@uni.edu")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
