//! Append-only JSON result store.
//!
//! The store is one file holding a pretty-printed JSON array of outcome
//! objects. Each append rewrites the whole array through a temporary file
//! and a rename, so the target is never left truncated. Only one writer per
//! file is supported; concurrent appenders may lose updates.

use crate::error::{EvaluatorError, Result};
use crate::evaluation::EvaluationOutcome;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Default filename for the result store.
pub const DEFAULT_STORE_FILENAME: &str = "Evaluations.json";

/// Append an outcome to the store, logging instead of failing.
///
/// The outcome has already been produced by the time it is persisted, so a
/// storage problem is reported and otherwise ignored.
pub fn append_outcome(outcome: &EvaluationOutcome, path: &Path) {
    match try_append(outcome, path) {
        Ok(_) => info!("Data successfully exported to {}.", path.display()),
        Err(e) => error!("Failed to export data to {}: {}", path.display(), e),
    }
}

/// Append any serializable record to the store and return the new length.
///
/// A missing store is created. An existing store that is not a JSON array of
/// objects is treated as empty and overwritten.
pub fn try_append<T: Serialize>(record: &T, path: &Path) -> Result<usize> {
    let record = serde_json::to_value(record)?;

    let mut records = if path.exists() {
        read_or_empty(path)?
    } else {
        Vec::new()
    };
    records.push(record);

    write_records(&records, path)?;
    Ok(records.len())
}

/// Load every stored record in append order.
///
/// Unlike [`try_append`], a corrupt store is an error here.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read(path).map_err(|e| EvaluatorError::io(path, e))?;
    parse_records(&content).ok_or_else(|| {
        EvaluatorError::Serialization(format!(
            "'{}' is not a JSON array of objects",
            path.display()
        ))
    })
}

/// Load every stored record as a typed outcome.
pub fn load_outcomes(path: &Path) -> Result<Vec<EvaluationOutcome>> {
    load_records(path)?
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(EvaluatorError::from))
        .collect()
}

/// Check if a store file exists at the given path.
pub fn store_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}

/// Get the size of a store file in bytes.
pub fn store_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| EvaluatorError::io(path, e))?;
    Ok(metadata.len())
}

fn read_or_empty(path: &Path) -> Result<Vec<Value>> {
    // Raw bytes: content that is not UTF-8 is corrupt, not an I/O failure.
    let content = fs::read(path).map_err(|e| EvaluatorError::io(path, e))?;
    Ok(parse_records(&content).unwrap_or_else(|| {
        warn!(
            "Existing store at {} is not a JSON array of objects; starting a new one",
            path.display()
        );
        Vec::new()
    }))
}

fn parse_records(content: &[u8]) -> Option<Vec<Value>> {
    match serde_json::from_slice::<Value>(content).ok()? {
        Value::Array(items) if items.iter().all(Value::is_object) => Some(items),
        _ => None,
    }
}

fn write_records(records: &[Value], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| EvaluatorError::io(parent, e))?;
        }
    }

    let data = serde_json::to_string_pretty(records)
        .map_err(|e| EvaluatorError::Serialization(e.to_string()))?;

    let tmp = temp_path(path);
    fs::write(&tmp, data.as_bytes()).map_err(|e| EvaluatorError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        EvaluatorError::io(path, e)
    })?;

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{Evaluation, RelatedExperience};
    use tempfile::TempDir;

    fn success(score: u8) -> EvaluationOutcome {
        EvaluationOutcome::Success(Evaluation {
            score,
            related_experience: vec![RelatedExperience {
                position: "Comercial de automoviles".to_string(),
                company: "Autónomo".to_string(),
                duration: "Enero 2024 - Febrero 2024".to_string(),
            }],
            explanation: "Relevant direct sales experience.".to_string(),
            extra: Default::default(),
        })
    }

    #[test]
    fn test_append_preserves_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_STORE_FILENAME);

        let first = success(85);
        let second = EvaluationOutcome::failure("Malformed JSON received from LLM.");

        assert_eq!(try_append(&first, &path).unwrap(), 1);
        assert_eq!(try_append(&second, &path).unwrap(), 2);

        let loaded = load_outcomes(&path).unwrap();
        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn test_corrupt_store_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_STORE_FILENAME);
        fs::write(&path, "{ not json at all").unwrap();

        let outcome = success(70);
        assert_eq!(try_append(&outcome, &path).unwrap(), 1);
        assert_eq!(load_outcomes(&path).unwrap(), vec![outcome]);
    }

    #[test]
    fn test_non_utf8_store_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_STORE_FILENAME);
        fs::write(&path, [0xff, 0xfe, 0x00, 0x9f, b'[']).unwrap();

        let outcome = EvaluationOutcome::failure("x");
        assert_eq!(try_append(&outcome, &path).unwrap(), 1);
        assert_eq!(load_outcomes(&path).unwrap(), vec![outcome]);
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // Renaming a file over a non-empty directory fails after the temp write.
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert!(write_records(&[serde_json::json!({"error": "x"})], &path).is_err());
        assert!(!temp_path(&path).exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_non_array_store_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_STORE_FILENAME);
        fs::write(&path, r#"{"score": 10}"#).unwrap();

        append_outcome(&EvaluationOutcome::failure("boom"), &path);

        let records = load_records(&path).unwrap();
        assert_eq!(records, vec![serde_json::json!({"error": "boom"})]);
    }

    #[test]
    fn test_sequential_appends_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("results.json");

        for score in 0..5u8 {
            append_outcome(&success(score * 20), &path);
        }

        let scores: Vec<u8> = load_outcomes(&path)
            .unwrap()
            .iter()
            .map(|o| o.evaluation().unwrap().score)
            .collect();
        assert_eq!(scores, vec![0, 20, 40, 60, 80]);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_file_is_pretty_and_keeps_non_ascii() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_STORE_FILENAME);

        append_outcome(&success(85), &path);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n  {"));
        assert!(content.contains("Autónomo"));
        assert!(!content.contains("\\u00f3"));
        assert!(store_size(&path).unwrap() > 0);
    }

    #[test]
    fn test_unwritable_store_does_not_panic() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be replaced by a file.
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();

        append_outcome(&success(50), &path);
        assert!(try_append(&success(50), &path).is_err());
        assert!(path.is_dir());
    }

    #[test]
    fn test_load_missing_store() {
        assert!(load_records(Path::new("/nonexistent/Evaluations.json")).is_err());
        assert!(!store_exists(Path::new("/nonexistent/Evaluations.json")));
    }
}
