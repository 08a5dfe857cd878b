//! Domain store: single source of truth for learners, activities, and
//! assignments, with session (login) state and file persistence.
//!
//! `TherapyData` holds the collections and performs every mutation
//! synchronously; `TherapyStore` wraps it behind an RwLock and writes a JSON
//! snapshot after each mutation. The snapshot is a convenience cache, not a
//! durable store: a failed write is logged and the in-memory state stays
//! authoritative.
//!
//! The store itself is deliberately permissive. Callers validate activity
//! content before `add_activity`, and callers consult `assignable_learners`
//! before `assign_activity`; neither check is enforced here.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    Activity, ActivityContent, Assignment, AssignmentStatus, Language, Learner, ProgressEntry,
    Role, Translations,
};
use crate::seeds;

/// Login session. Child logins carry the active learner id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub role: Option<Role>,
    pub active_learner: Option<String>,
}

/// Everything that gets persisted, in one snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TherapyData {
    #[serde(default)]
    pub session: Session,
    pub learners: Vec<Learner>,
    pub activities: Vec<Activity>,
    pub assignments: Vec<Assignment>,
}

/// Partial learner update. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LearnerPatch {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub preferred_language: Option<Language>,
}

/// Partial activity update. `updated_at` refreshes on every hit.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActivityPatch {
    pub name: Option<String>,
    pub target_language: Option<Language>,
    pub instruction: Option<String>,
    pub instruction_translations: Option<Translations>,
    pub content: Option<ActivityContent>,
}

/// Partial assignment update (therapist review fields).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AssignmentPatch {
    pub status: Option<AssignmentStatus>,
    pub last_update: Option<String>,
    pub therapist_notes: Option<String>,
    pub audio_submission: Option<String>,
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

impl TherapyData {
    pub fn seeded() -> Self {
        TherapyData {
            session: Session::default(),
            learners: seeds::seed_learners(),
            activities: seeds::seed_activities(),
            assignments: seeds::seed_assignments(),
        }
    }

    // ---- Auth ----

    pub fn login(&mut self, role: Role, learner_id: Option<String>) {
        self.session = Session {
            authenticated: true,
            role: Some(role),
            active_learner: if role == Role::Child { learner_id } else { None },
        };
    }

    pub fn logout(&mut self) {
        self.session = Session::default();
    }

    // ---- Learners ----

    pub fn add_learner(&mut self, name: String, age: u32, preferred_language: Language) -> Learner {
        let learner = Learner {
            id: fresh_id(),
            name,
            age,
            preferred_language,
            created_at: Utc::now(),
        };
        self.learners.push(learner.clone());
        learner
    }

    /// Silent no-op when the id is unknown.
    pub fn update_learner(&mut self, id: &str, patch: LearnerPatch) {
        if let Some(l) = self.learners.iter_mut().find(|l| l.id == id) {
            if let Some(name) = patch.name {
                l.name = name;
            }
            if let Some(age) = patch.age {
                l.age = age;
            }
            if let Some(lang) = patch.preferred_language {
                l.preferred_language = lang;
            }
        }
    }

    /// No cascade: assignments referencing the learner stay behind and are
    /// filtered by readers.
    pub fn delete_learner(&mut self, id: &str) {
        self.learners.retain(|l| l.id != id);
    }

    pub fn learner(&self, id: &str) -> Option<&Learner> {
        self.learners.iter().find(|l| l.id == id)
    }

    // ---- Activities ----

    pub fn add_activity(
        &mut self,
        name: String,
        target_language: Language,
        instruction: String,
        instruction_translations: Translations,
        content: ActivityContent,
    ) -> Activity {
        let now = Utc::now();
        let activity = Activity {
            id: fresh_id(),
            name,
            target_language,
            instruction,
            instruction_translations,
            created_at: now,
            updated_at: now,
            content,
        };
        self.activities.push(activity.clone());
        activity
    }

    pub fn update_activity(&mut self, id: &str, patch: ActivityPatch) {
        if let Some(a) = self.activities.iter_mut().find(|a| a.id == id) {
            if let Some(name) = patch.name {
                a.name = name;
            }
            if let Some(lang) = patch.target_language {
                a.target_language = lang;
            }
            if let Some(instruction) = patch.instruction {
                a.instruction = instruction;
            }
            if let Some(translations) = patch.instruction_translations {
                a.instruction_translations = translations;
            }
            if let Some(content) = patch.content {
                a.content = content;
            }
            a.updated_at = Utc::now();
        }
    }

    pub fn delete_activity(&mut self, id: &str) {
        self.activities.retain(|a| a.id != id);
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    // ---- Assignments ----

    /// Append a fresh assignment. Pair uniqueness is NOT checked here;
    /// callers filter via `assignable_learners` first.
    pub fn assign_activity(&mut self, activity_id: String, learner_id: String) -> Assignment {
        let now = Utc::now();
        let assignment = Assignment {
            id: fresh_id(),
            activity_id,
            learner_id,
            status: AssignmentStatus::Assigned,
            last_update: "Not started".into(),
            therapist_notes: None,
            audio_submission: None,
            assigned_at: now,
            updated_at: now,
        };
        self.assignments.push(assignment.clone());
        assignment
    }

    /// The advisory duplicate check: learners who do not yet have this
    /// activity assigned.
    pub fn assignable_learners(&self, activity_id: &str) -> Vec<&Learner> {
        self.learners
            .iter()
            .filter(|l| {
                !self
                    .assignments
                    .iter()
                    .any(|a| a.activity_id == activity_id && a.learner_id == l.id)
            })
            .collect()
    }

    pub fn update_assignment(&mut self, id: &str, patch: AssignmentPatch) {
        if let Some(a) = self.assignments.iter_mut().find(|a| a.id == id) {
            if let Some(status) = patch.status {
                a.status = status;
            }
            if let Some(note) = patch.last_update {
                a.last_update = note;
            }
            if let Some(notes) = patch.therapist_notes {
                a.therapist_notes = Some(notes);
            }
            if let Some(url) = patch.audio_submission {
                a.audio_submission = Some(url);
            }
            a.updated_at = Utc::now();
        }
    }

    /// Any status may be set from any prior status; there is no transition
    /// guard in the data model.
    pub fn update_assignment_status(&mut self, id: &str, status: AssignmentStatus, note: String) {
        if let Some(a) = self.assignments.iter_mut().find(|a| a.id == id) {
            a.status = status;
            a.last_update = note;
            a.updated_at = Utc::now();
        }
    }

    pub fn assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    /// Joined dashboard rows. Dangling references resolve to "Unknown"
    /// instead of dropping the row or panicking.
    pub fn progress_entries(&self) -> Vec<ProgressEntry> {
        self.assignments
            .iter()
            .map(|a| ProgressEntry {
                assignment_id: a.id.clone(),
                learner_id: a.learner_id.clone(),
                activity_id: a.activity_id.clone(),
                child_name: self
                    .learner(&a.learner_id)
                    .map(|l| l.name.clone())
                    .unwrap_or_else(|| "Unknown".into()),
                activity_name: self
                    .activity(&a.activity_id)
                    .map(|x| x.name.clone())
                    .unwrap_or_else(|| "Unknown".into()),
                status: a.status,
                last_update: a.last_update.clone(),
            })
            .collect()
    }
}

/// Async facade: RwLock around `TherapyData` plus the snapshot file.
#[derive(Clone)]
pub struct TherapyStore {
    data: Arc<RwLock<TherapyData>>,
    path: PathBuf,
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("saarthi")
        .join("therapy-store.json")
}

impl TherapyStore {
    /// Rehydrate from SAARTHI_STORE_PATH (or the platform data dir), seeding
    /// a fresh store when no snapshot exists or it fails to parse.
    #[instrument(level = "info", skip_all)]
    pub fn load() -> Self {
        let path = std::env::var("SAARTHI_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_store_path());
        let data = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<TherapyData>(&raw) {
                Ok(data) => {
                    info!(target: "therapy_store", path = %path.display(), "Loaded store snapshot");
                    data
                }
                Err(e) => {
                    warn!(target: "therapy_store", path = %path.display(), error = %e,
                          "Snapshot unreadable; starting from seeds");
                    TherapyData::seeded()
                }
            },
            Err(_) => {
                info!(target: "therapy_store", path = %path.display(), "No snapshot; starting from seeds");
                TherapyData::seeded()
            }
        };
        TherapyStore { data: Arc::new(RwLock::new(data)), path }
    }

    #[cfg(test)]
    pub fn with_path(data: TherapyData, path: PathBuf) -> Self {
        TherapyStore { data: Arc::new(RwLock::new(data)), path }
    }

    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, TherapyData> {
        self.data.read().await
    }

    /// Run a mutation and write the snapshot afterwards. Persist failures
    /// are logged, never surfaced.
    pub async fn mutate<T>(&self, f: impl FnOnce(&mut TherapyData) -> T) -> T {
        let out = {
            let mut data = self.data.write().await;
            f(&mut data)
        };
        self.persist().await;
        out
    }

    /// Explicit serialize boundary; also called once on shutdown.
    pub async fn persist(&self) {
        let snapshot = { self.data.read().await.clone() };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!(target: "therapy_store", error = %e, "Failed to create store directory");
                return;
            }
        }
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    error!(target: "therapy_store", path = %self.path.display(), error = %e,
                           "Failed to write store snapshot");
                }
            }
            Err(e) => error!(target: "therapy_store", error = %e, "Failed to serialize store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> TherapyData {
        TherapyData::seeded()
    }

    #[test]
    fn add_learner_assigns_id_and_timestamp() {
        let mut d = data();
        let before = d.learners.len();
        let l = d.add_learner("Meera".into(), 6, Language::Tamil);
        assert_eq!(d.learners.len(), before + 1);
        assert!(!l.id.is_empty());
        assert_eq!(d.learner(&l.id).unwrap().name, "Meera");
    }

    #[test]
    fn update_unknown_learner_is_silent_noop() {
        let mut d = data();
        let snapshot = d.learners.clone();
        d.update_learner("no-such-id", LearnerPatch { name: Some("X".into()), ..Default::default() });
        assert_eq!(d.learners.len(), snapshot.len());
        for (a, b) in d.learners.iter().zip(snapshot.iter()) {
            assert_eq!(a.name, b.name);
        }
    }

    #[test]
    fn assign_appends_with_assigned_status_and_default_note() {
        let mut d = data();
        let a = d.assign_activity("activity-2".into(), "learner-3".into());
        assert_eq!(a.status, AssignmentStatus::Assigned);
        assert_eq!(a.last_update, "Not started");
        assert!(d.assignment(&a.id).is_some());
    }

    #[test]
    fn assignable_learners_excludes_already_assigned_pair() {
        let d = data();
        // assign-1 links activity-1 to learner-1
        let ids: Vec<&str> = d
            .assignable_learners("activity-1")
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert!(!ids.contains(&"learner-1"));
        assert!(ids.contains(&"learner-2"));
        assert!(ids.contains(&"learner-3"));
    }

    #[test]
    fn duplicate_assignment_is_possible_at_data_layer() {
        // the data layer stays permissive; only the advisory filter prevents this
        let mut d = data();
        d.assign_activity("activity-1".into(), "learner-1".into());
        let count = d
            .assignments
            .iter()
            .filter(|a| a.activity_id == "activity-1" && a.learner_id == "learner-1")
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn status_update_touches_only_the_target_assignment() {
        let mut d = data();
        let other_before = d.assignment("assign-2").unwrap().clone();
        d.update_assignment_status("assign-1", AssignmentStatus::Completed, "Done".into());

        let updated = d.assignment("assign-1").unwrap();
        assert_eq!(updated.status, AssignmentStatus::Completed);
        assert_eq!(updated.last_update, "Done");

        let other_after = d.assignment("assign-2").unwrap();
        assert_eq!(other_after.status, other_before.status);
        assert_eq!(other_after.last_update, other_before.last_update);
        assert_eq!(other_after.updated_at, other_before.updated_at);
    }

    #[test]
    fn any_status_transition_is_allowed() {
        let mut d = data();
        d.update_assignment_status("assign-2", AssignmentStatus::Assigned, "Reset".into());
        assert_eq!(d.assignment("assign-2").unwrap().status, AssignmentStatus::Assigned);
    }

    #[test]
    fn deleting_learner_leaves_assignments_and_resolves_unknown() {
        let mut d = data();
        d.delete_learner("learner-1");
        assert!(d.learner("learner-1").is_none());
        // assignment survives
        assert!(d.assignment("assign-1").is_some());
        // progress resolves to "Unknown" instead of failing
        let entries = d.progress_entries();
        let row = entries.iter().find(|e| e.assignment_id == "assign-1").unwrap();
        assert_eq!(row.child_name, "Unknown");
        assert_eq!(row.activity_name, "Daily Needs AAC Board");
    }

    #[test]
    fn login_logout_round_trip() {
        let mut d = data();
        d.login(Role::Child, Some("learner-2".into()));
        assert!(d.session.authenticated);
        assert_eq!(d.session.role, Some(Role::Child));
        assert_eq!(d.session.active_learner.as_deref(), Some("learner-2"));

        d.login(Role::Therapist, Some("ignored".into()));
        assert_eq!(d.session.active_learner, None);

        d.logout();
        assert!(!d.session.authenticated);
        assert_eq!(d.session.role, None);
        assert_eq!(d.session.active_learner, None);
    }

    #[tokio::test]
    async fn store_persists_and_rehydrates_snapshot() {
        let path = std::env::temp_dir().join(format!("saarthi-test-{}.json", Uuid::new_v4()));
        let store = TherapyStore::with_path(TherapyData::seeded(), path.clone());
        store
            .mutate(|d| d.update_assignment_status("assign-1", AssignmentStatus::Completed, "Done".into()))
            .await;

        let raw = std::fs::read_to_string(&path).unwrap();
        let reloaded: TherapyData = serde_json::from_str(&raw).unwrap();
        assert_eq!(reloaded.assignment("assign-1").unwrap().status, AssignmentStatus::Completed);

        let _ = std::fs::remove_file(&path);
    }
}
