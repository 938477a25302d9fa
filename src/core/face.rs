//! Face verification seam.
//!
//! Identity matching belongs to an external service; this crate only
//! checks the captured image and the registration before accepting it.

use crate::config::Config;
use crate::core::users::{require_role, require_self_or_admin, require_user};
use crate::db::faces;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::face::FaceAttempt;
use crate::models::role::Role;
use crate::models::user::{Actor, User};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceMatch {
    pub success: bool,
    pub message: String,
}

pub trait FaceVerifier {
    fn verify(&self, conn: &Connection, student: &User, image: &Path) -> AppResult<FaceMatch>;
}

/// Size in bytes of an acceptable capture.
pub fn check_image(cfg: &Config, image: &Path) -> AppResult<u64> {
    let meta = fs::metadata(image)
        .map_err(|_| AppError::FaceVerification(format!("image not found: {}", image.display())))?;
    if !meta.is_file() {
        return Err(AppError::FaceVerification(format!(
            "not a file: {}",
            image.display()
        )));
    }

    let size = meta.len();
    if size == 0 {
        return Err(AppError::FaceVerification("image file is empty".into()));
    }
    if size > cfg.max_image_bytes {
        return Err(AppError::FaceVerification(format!(
            "image is {size} bytes, the limit is {}",
            cfg.max_image_bytes
        )));
    }

    let ext = image
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !cfg
        .allowed_image_formats
        .iter()
        .any(|f| f.eq_ignore_ascii_case(&ext))
    {
        return Err(AppError::FaceVerification(format!(
            "unsupported image format '{ext}' (allowed: {})",
            cfg.allowed_image_formats.join(", ")
        )));
    }

    Ok(size)
}

/// Built-in verifier: accepts any well-formed capture from a student with
/// an active registration.
pub struct RegisteredFaceVerifier<'a> {
    cfg: &'a Config,
}

impl<'a> RegisteredFaceVerifier<'a> {
    pub fn new(cfg: &'a Config) -> Self {
        Self { cfg }
    }
}

impl FaceVerifier for RegisteredFaceVerifier<'_> {
    fn verify(&self, conn: &Connection, student: &User, image: &Path) -> AppResult<FaceMatch> {
        check_image(self.cfg, image)?;

        if faces::find_active(conn, student.id)?.is_none() {
            return Ok(FaceMatch {
                success: false,
                message: format!("no face registered for {}", student.email),
            });
        }

        Ok(FaceMatch {
            success: true,
            message: "Face verified".into(),
        })
    }
}

pub struct FaceLogic;

impl FaceLogic {
    /// Store or replace the reference image of a student.
    pub fn register(
        pool: &mut DbPool,
        actor: &Actor,
        cfg: &Config,
        email: &str,
        image: &Path,
    ) -> AppResult<PathBuf> {
        let user = require_user(&pool.conn, email)?;
        require_role(&user, Role::Student)?;
        require_self_or_admin(actor, &user, "manage the face registration")?;

        let size = check_image(cfg, image)?;
        let stored = fs::canonicalize(image)?;

        let tx = pool.conn.transaction()?;
        faces::upsert_registration(&tx, user.id, &stored.to_string_lossy(), size as i64)?;
        audit(&tx, "add", &format!("face:{}", user.email), &stored.to_string_lossy())?;
        tx.commit()?;

        Ok(stored)
    }

    pub fn remove(pool: &mut DbPool, actor: &Actor, email: &str) -> AppResult<()> {
        let user = require_user(&pool.conn, email)?;
        require_self_or_admin(actor, &user, "manage the face registration")?;

        let tx = pool.conn.transaction()?;
        if !faces::deactivate(&tx, user.id)? {
            return Err(AppError::NotFound(format!("face registration for {email}")));
        }
        audit(&tx, "del", &format!("face:{}", user.email), "registration deactivated")?;
        tx.commit()?;
        Ok(())
    }

    /// Verification attempts of a user, newest first.
    pub fn attempts(
        pool: &DbPool,
        actor: &Actor,
        email: &str,
        last: Option<usize>,
    ) -> AppResult<Vec<FaceAttempt>> {
        let user = require_user(&pool.conn, email)?;
        require_self_or_admin(actor, &user, "view face verification attempts")?;
        faces::list_attempts(&pool.conn, user.id, last)
    }
}
