//! The course store.
//!
//! Owns the authoritative course collection for a session and keeps it
//! synchronized with a key-value substrate. Every mutation that matches a
//! record produces a new [`Snapshot`], notifies observers and rewrites the
//! whole collection under the storage key. Persistence is best-effort: a
//! failed write is logged and the in-memory snapshot stays authoritative.
//!
//! Lookups that miss (unknown course or grade id) are silent no-ops. They do
//! not bump the version, notify, or write.

use std::fmt;

use crate::config::DEFAULT_STORAGE_KEY;
use crate::core::{Course, CourseUpdate, Grade, GradeUpdate, NewCourse, NewGrade};
use crate::error::{FailOpen, GradepalError, Result};
use crate::storage::KeyValueStore;
use crate::store::Snapshot;

/// Callback invoked with every committed snapshot.
pub type Observer = Box<dyn Fn(&Snapshot) + Send + Sync>;

/// Outcome of loading persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// Stored courses replaced the default collection.
    Loaded,
    /// Nothing was stored under the key.
    Empty,
    /// The stored value could not be decoded or parsed and was discarded.
    Discarded,
    /// The substrate could not be read; the stored value was left alone.
    Unavailable,
}

/// Course collection service backed by a key-value substrate.
pub struct CourseStore<S: KeyValueStore> {
    storage: S,
    key: String,
    snapshot: Snapshot,
    observers: Vec<Observer>,
    hydrated: bool,
}

impl<S: KeyValueStore> fmt::Debug for CourseStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CourseStore")
            .field("key", &self.key)
            .field("version", &self.snapshot.version())
            .field("courses", &self.snapshot.len())
            .field("observers", &self.observers.len())
            .field("hydrated", &self.hydrated)
            .finish()
    }
}

impl<S: KeyValueStore> CourseStore<S> {
    /// Create a store on the default key, holding the empty collection.
    ///
    /// Nothing is read until [`hydrate`](Self::hydrate) is called.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Create a store on a custom key, holding the empty collection.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            snapshot: Snapshot::empty(),
            observers: Vec::new(),
            hydrated: false,
        }
    }

    /// Create a store and immediately load persisted state.
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self::with_key(storage, key);
        store.hydrate();
        store
    }

    /// Replace the collection with whatever is persisted under the key.
    ///
    /// A value that fails to decode or parse is removed from the substrate so
    /// the next run starts clean. Loading does not write back.
    pub fn hydrate(&mut self) -> Hydration {
        self.hydrated = true;

        let stored = match self.storage.get(&self.key) {
            Ok(stored) => stored,
            // Undecodable content is corrupt data, not an I/O failure
            Err(e @ GradepalError::Serde { .. }) => return self.discard(&e),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "could not read stored courses");
                return Hydration::Unavailable;
            }
        };

        let Some(text) = stored else {
            return Hydration::Empty;
        };

        match serde_json::from_str::<Vec<Course>>(&text) {
            Ok(courses) => {
                tracing::debug!(key = %self.key, courses = courses.len(), "loaded stored courses");
                self.publish(courses);
                Hydration::Loaded
            }
            Err(e) => self.discard(&e),
        }
    }

    /// Drop a stored value that cannot be loaded so the next run starts clean.
    fn discard(&self, error: &dyn std::error::Error) -> Hydration {
        tracing::warn!(
            key = %self.key,
            error = %error,
            "stored courses are corrupt, discarding"
        );
        self.storage
            .remove(&self.key)
            .fail_open_default("discarding corrupt courses");
        Hydration::Discarded
    }

    /// Whether [`hydrate`](Self::hydrate) has run.
    ///
    /// Before that, the store exposes the default empty collection.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// The storage key the collection is persisted under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The storage substrate.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    /// The current courses, in insertion order.
    pub fn courses(&self) -> &[Course] {
        self.snapshot.courses()
    }

    /// The current collection version.
    pub fn version(&self) -> u64 {
        self.snapshot.version()
    }

    /// Register a callback invoked with every new snapshot.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Look up a course by id.
    pub fn get_course_by_id(&self, id: &str) -> Option<&Course> {
        self.snapshot.get(id)
    }

    /// Append a new course with a fresh id and no grades.
    ///
    /// Returns the new course's id.
    pub fn add_course(&mut self, draft: NewCourse) -> String {
        let course = Course::from_draft(draft);
        let id = course.id.clone();

        let mut courses = self.courses().to_vec();
        courses.push(course);
        self.commit(courses);

        id
    }

    /// Merge `update` into the course with `id`.
    ///
    /// Returns false (and changes nothing) if no course matches.
    pub fn update_course(&mut self, id: &str, update: CourseUpdate) -> bool {
        self.modify_course(id, |course| {
            course.apply(&update);
            true
        })
    }

    /// Remove the course with `id` along with its grades.
    ///
    /// Returns false (and changes nothing) if no course matches.
    pub fn delete_course(&mut self, id: &str) -> bool {
        if self.get_course_by_id(id).is_none() {
            return false;
        }

        let courses = self
            .courses()
            .iter()
            .filter(|c| c.id != id)
            .cloned()
            .collect();
        self.commit(courses);

        true
    }

    /// Append a new grade with a fresh id to the course with `course_id`.
    ///
    /// Returns the new grade's id, or `None` if no course matches.
    pub fn add_grade(&mut self, course_id: &str, draft: NewGrade) -> Option<String> {
        let grade = Grade::from_draft(draft);
        let grade_id = grade.id.clone();

        self.modify_course(course_id, move |course| {
            course.grades.push(grade);
            true
        })
        .then_some(grade_id)
    }

    /// Merge `update` into grade `grade_id` of course `course_id`.
    ///
    /// Returns false (and changes nothing) if either id does not match.
    pub fn update_grade(&mut self, course_id: &str, grade_id: &str, update: GradeUpdate) -> bool {
        self.modify_course(course_id, |course| {
            match course.grades.iter_mut().find(|g| g.id == grade_id) {
                Some(grade) => {
                    grade.apply(&update);
                    true
                }
                None => false,
            }
        })
    }

    /// Remove grade `grade_id` from course `course_id`.
    ///
    /// Returns false (and changes nothing) if either id does not match.
    pub fn delete_grade(&mut self, course_id: &str, grade_id: &str) -> bool {
        self.modify_course(course_id, |course| {
            let before = course.grades.len();
            course.grades.retain(|g| g.id != grade_id);
            course.grades.len() != before
        })
    }

    /// Copy the collection, apply `change` to the course with `id`, and
    /// commit the copy if `change` reports a match.
    fn modify_course<F>(&mut self, id: &str, change: F) -> bool
    where
        F: FnOnce(&mut Course) -> bool,
    {
        let Some(index) = self.courses().iter().position(|c| c.id == id) else {
            return false;
        };

        let mut courses = self.courses().to_vec();
        if !change(&mut courses[index]) {
            return false;
        }

        self.commit(courses);
        true
    }

    /// Publish a new collection and persist it.
    fn commit(&mut self, courses: Vec<Course>) {
        self.publish(courses);
        self.persist()
            .fail_open_default("persisting courses (in-memory state kept)");
    }

    /// Replace the snapshot and notify observers.
    fn publish(&mut self, courses: Vec<Course>) {
        self.snapshot = Snapshot::new(self.snapshot.version() + 1, courses);
        for observer in &self.observers {
            observer(&self.snapshot);
        }
    }

    /// Serialize the whole collection and write it under the key.
    fn persist(&self) -> Result<()> {
        let text = serde_json::to_string(self.courses())?;
        self.storage.set(&self.key, &text)
    }
}
