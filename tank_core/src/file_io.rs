//! # File I/O
//!
//! JSON persistence for designs and design catalogs.
//!
//! ## Atomic Saves
//!
//! Files are written atomically to prevent corruption:
//! 1. Write to a temp file next to the target (`<name>.tmp`)
//! 2. Sync to disk
//! 3. Rename over the target (atomic on POSIX and Windows)
//!
//! ## Version Checks
//!
//! Loading compares the file's schema version with [`SCHEMA_VERSION`]. The
//! major version must match; while the schema is 0.x a newer minor version is
//! also rejected.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tank_core::catalog::DesignCatalog;
//! use tank_core::file_io::{load_catalog, save_catalog};
//! use std::path::Path;
//!
//! let catalog = DesignCatalog::reference();
//! save_catalog(&catalog, Path::new("designs.json"))?;
//! let loaded = load_catalog(Path::new("designs.json"))?;
//! assert_eq!(loaded.len(), 3);
//! # Ok::<(), tank_core::errors::CalcError>(())
//! ```

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::catalog::DesignCatalog;
use crate::design::{TankDesign, SCHEMA_VERSION};
use crate::errors::{CalcError, CalcResult};

/// Temp file used while saving `path`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Remove a half-written temp file; the original error is what gets reported.
fn discard_tmp(tmp_path: &Path, error: CalcError) -> CalcError {
    if let Err(e) = fs::remove_file(tmp_path) {
        tracing::warn!(path = %tmp_path.display(), error = %e, "could not remove temp file");
    }
    error
}

/// Serialize `value` as pretty JSON and move it into place atomically.
fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    let written = tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| ("write temp file", e))
        .and_then(|()| tmp_file.sync_all().map_err(|e| ("sync temp file", e)));
    // Close before removing so the cleanup also works where open files can't be deleted
    drop(tmp_file);
    if let Err((operation, e)) = written {
        return Err(discard_tmp(
            &tmp_path,
            CalcError::file_error(operation, tmp_path.display().to_string(), e.to_string()),
        ));
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        discard_tmp(
            &tmp_path,
            CalcError::file_error("rename to final", path.display().to_string(), e.to_string()),
        )
    })?;

    tracing::debug!(path = %path.display(), bytes = json.len(), "saved");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    let mut file =
        File::open(path).map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Save a single design.
///
/// # Returns
///
/// * `Ok(())` - File written and synced
/// * `Err(CalcError::SerializationError)` - Design could not be serialized
/// * `Err(CalcError::FileError)` - I/O error (temp file is cleaned up)
pub fn save_design(design: &TankDesign, path: &Path) -> CalcResult<()> {
    write_json_atomic(design, path)
}

/// Load a single design.
///
/// # Returns
///
/// * `Ok(TankDesign)` - Successfully loaded design
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_design(path: &Path) -> CalcResult<TankDesign> {
    let design: TankDesign = read_json(path)?;
    validate_version(&design.meta.version)?;
    Ok(design)
}

/// Save a design catalog.
pub fn save_catalog(catalog: &DesignCatalog, path: &Path) -> CalcResult<()> {
    write_json_atomic(catalog, path)
}

/// Load a design catalog.
///
/// Both the catalog header and every design must carry a compatible version.
pub fn load_catalog(path: &Path) -> CalcResult<DesignCatalog> {
    let catalog: DesignCatalog = read_json(path)?;
    validate_version(&catalog.meta.version)?;
    for design in catalog.designs.values() {
        validate_version(&design.meta.version)?;
    }
    tracing::debug!(path = %path.display(), designs = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }

    // 0.x: a newer minor version may carry breaking changes
    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::reference_designs;
    use std::env::temp_dir;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("tank_core_test_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_tmp_path_generation() {
        let tmp = tmp_path_for(Path::new("/data/designs.json"));
        assert_eq!(tmp, Path::new("/data/designs.json.tmp"));
    }

    #[test]
    fn test_design_roundtrip() {
        let path = temp_path("design_roundtrip");
        let design = reference_designs().remove(0);
        save_design(&design, &path).unwrap();

        let loaded = load_design(&path).unwrap();
        assert_eq!(loaded, design);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let path = temp_path("atomic");
        save_catalog(&DesignCatalog::reference(), &path).unwrap();

        assert!(!tmp_path_for(&path).exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_failed_save_removes_tmp_file() {
        // Renaming a file over a directory fails after the temp file was written
        let path = temp_path("failed_save");
        fs::create_dir_all(&path).unwrap();
        let err = save_catalog(&DesignCatalog::reference(), &path).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
        assert!(!tmp_path_for(&path).exists());
        assert!(path.is_dir());
        fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn test_discard_tmp_removes_file_and_keeps_error() {
        let path = temp_path("discard_tmp");
        let tmp = tmp_path_for(&path);
        fs::write(&tmp, "partial").unwrap();
        let err = discard_tmp(&tmp, CalcError::file_error("write temp file", "x", "disk full"));
        assert_eq!(err.error_code(), "FILE_ERROR");
        assert!(err.to_string().contains("disk full"));
        assert!(!tmp.exists());

        // Already gone: still returns the original error
        let err = discard_tmp(&tmp, CalcError::file_error("sync temp file", "x", "io"));
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_design(Path::new("/nonexistent/tank.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_invalid_json() {
        let path = temp_path("invalid_json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_catalog(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_newer_design_version_rejected() {
        let path = temp_path("newer_version");
        let mut catalog = DesignCatalog::reference();
        if let Some(design) = catalog.designs.get_mut("type4-350") {
            design.meta.version = "0.9.0".to_string();
        }
        save_catalog(&catalog, &path).unwrap();

        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, CalcError::VersionMismatch { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.0.5").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
