//! Persistent plan store
//!
//! Two logical records live under the data directory: `profile.json` and
//! `plan.json`, each exactly the domain schema. The lifecycle controller is
//! the only reader and writer. A record that is missing or fails to
//! deserialize reads as absent; each record is written atomically via a temp
//! file and rename, but there is no transaction across the two records.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::{Profile, StudyPlan};

const PROFILE_FILE: &str = "profile.json";
const PLAN_FILE: &str = "plan.json";

/// File-backed store for the authoritative profile/plan pair
pub struct PlanStore {
    dir: PathBuf,
}

impl PlanStore {
    /// Open or create a store at the given directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create store directory")?;
        debug!(dir = %dir.display(), "Opened plan store");
        Ok(Self { dir })
    }

    /// Load the stored profile, treating malformed content as absent
    pub fn load_profile(&self) -> Option<Profile> {
        self.load_record(PROFILE_FILE)
    }

    /// Load the stored plan, treating malformed content as absent
    pub fn load_plan(&self) -> Option<StudyPlan> {
        self.load_record(PLAN_FILE)
    }

    /// Persist the profile
    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.save_record(PROFILE_FILE, profile)
    }

    /// Persist the plan
    ///
    /// Callers must only pass plans that already passed validation; the store
    /// does not re-validate.
    pub fn save_plan(&self, plan: &StudyPlan) -> Result<()> {
        self.save_record(PLAN_FILE, plan)
    }

    /// Remove both records (explicit reset)
    pub fn clear(&self) -> Result<()> {
        for file in [PROFILE_FILE, PLAN_FILE] {
            let path = self.dir.join(file);
            if path.exists() {
                fs::remove_file(&path).context(format!("Failed to remove {}", path.display()))?;
            }
        }
        debug!(dir = %self.dir.display(), "Cleared plan store");
        Ok(())
    }

    fn load_record<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.dir.join(file);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Record not readable, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Record failed to deserialize, treating as absent");
                None
            }
        }
    }

    fn save_record<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let tmp = self.dir.join(format!("{}.tmp", file));

        let json = serde_json::to_string_pretty(value).context("Failed to serialize record")?;
        fs::write(&tmp, json).context(format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path).context(format!("Failed to replace {}", path.display()))?;

        debug!(path = %path.display(), "Saved record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StressLevel, Subject, sample_plan};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn profile() -> Profile {
        Profile {
            name: "Ada".to_string(),
            exam_name: "Calculus Final".to_string(),
            exam_date: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            subjects: vec![Subject {
                id: "s1".to_string(),
                name: "Limits".to_string(),
                syllabus: "sequences, continuity".to_string(),
                confidence: 2,
            }],
            daily_hours: 4,
            stress_level: StressLevel::High,
        }
    }

    #[test]
    fn test_load_absent_records() {
        let dir = TempDir::new().unwrap();
        let store = PlanStore::open(dir.path()).unwrap();

        assert!(store.load_profile().is_none());
        assert!(store.load_plan().is_none());
    }

    #[test]
    fn test_profile_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = PlanStore::open(dir.path()).unwrap();

        store.save_profile(&profile()).unwrap();
        assert_eq!(store.load_profile().unwrap(), profile());
    }

    #[test]
    fn test_plan_round_trip_deep_equal() {
        let dir = TempDir::new().unwrap();
        let store = PlanStore::open(dir.path()).unwrap();

        let plan = sample_plan();
        store.save_plan(&plan).unwrap();
        assert_eq!(store.load_plan().unwrap(), plan);
    }

    #[test]
    fn test_malformed_record_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = PlanStore::open(dir.path()).unwrap();

        fs::write(dir.path().join("plan.json"), "{not json").unwrap();
        assert!(store.load_plan().is_none());

        // Schema mismatch, not just broken JSON
        fs::write(dir.path().join("plan.json"), r#"{"schedule": 7}"#).unwrap();
        assert!(store.load_plan().is_none());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = PlanStore::open(dir.path()).unwrap();

        let mut plan = sample_plan();
        store.save_plan(&plan).unwrap();

        plan.adaptation_notes = "second version".to_string();
        store.save_plan(&plan).unwrap();

        assert_eq!(store.load_plan().unwrap().adaptation_notes, "second version");
    }

    #[test]
    fn test_clear_removes_both() {
        let dir = TempDir::new().unwrap();
        let store = PlanStore::open(dir.path()).unwrap();

        store.save_profile(&profile()).unwrap();
        store.save_plan(&sample_plan()).unwrap();
        store.clear().unwrap();

        assert!(store.load_profile().is_none());
        assert!(store.load_plan().is_none());
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = PlanStore::open(dir.path()).unwrap();
            store.save_profile(&profile()).unwrap();
        }
        let store = PlanStore::open(dir.path()).unwrap();
        assert_eq!(store.load_profile().unwrap(), profile());
    }
}
