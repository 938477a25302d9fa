use crate::db::log::audit;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::path::ensure_writable;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database file to `dest_file`, optionally zipping it.
    /// Returns the path of the file that was kept.
    pub fn backup(db_path: &str, dest_file: &str, compress: bool, force: bool) -> AppResult<PathBuf> {
        let src = Path::new(db_path);
        let dest = Path::new(dest_file);

        if !src.exists() {
            return Err(AppError::NotFound(format!("database {}", src.display())));
        }
        if !dest.is_absolute() {
            return Err(AppError::Validation(format!(
                "backup path must be absolute: {dest_file}"
            )));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        ensure_writable(dest, force)?;
        if compress {
            ensure_writable(&dest.with_extension("zip"), force)?;
        }

        fs::copy(src, dest)?;
        success(format!("Backup created: {}", dest.display()));

        let final_path = if compress {
            let compressed = compress_backup(dest)?;

            if compressed != dest {
                match fs::remove_file(dest) {
                    Ok(()) => info(format!("Removed uncompressed backup: {}", dest.display())),
                    Err(e) => warning(format!("Failed to remove uncompressed backup: {e}")),
                }
            }

            compressed
        } else {
            dest.to_path_buf()
        };

        let conn = Connection::open(src)?;
        audit(
            &conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        )?;

        Ok(final_path)
    }
}

/// Compress a backup into a .zip next to it.
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");
    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::Validation(format!("not a file path: {}", path.display())))?;

    let mut f = fs::File::open(path)?;
    zip.start_file(name, options).map_err(std::io::Error::other)?;

    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    success(format!("Compressed: {}", zip_path.display()));

    Ok(zip_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rattendance_backup_{name}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn compressed_backup_replaces_plain_copy() {
        let dir = temp_dir("zip");
        let db = dir.join("src.sqlite");
        init_db(&Connection::open(&db).unwrap()).unwrap();

        let dest = dir.join("copy.sqlite");
        let kept = BackupLogic::backup(db.to_str().unwrap(), dest.to_str().unwrap(), true, true).unwrap();

        assert_eq!(kept, dir.join("copy.zip"));
        assert!(kept.exists());
        assert!(!dest.exists());

        let logged: i64 = Connection::open(&db)
            .unwrap()
            .query_row("SELECT COUNT(*) FROM log WHERE operation = 'backup'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(logged, 1);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn relative_destination_is_rejected() {
        let dir = temp_dir("rel");
        let db = dir.join("src.sqlite");
        init_db(&Connection::open(&db).unwrap()).unwrap();

        let err = BackupLogic::backup(db.to_str().unwrap(), "copy.sqlite", false, true).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        fs::remove_dir_all(dir).ok();
    }
}
