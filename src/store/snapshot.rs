//! Immutable views of the course collection.

use std::sync::Arc;

use crate::core::Course;

/// The course collection at one version.
///
/// Cloning is cheap: the courses are shared, never copied. A snapshot never
/// changes after it is taken; the store replaces it wholesale on every
/// mutation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    courses: Arc<[Course]>,
}

impl Snapshot {
    pub(crate) fn new(version: u64, courses: Vec<Course>) -> Self {
        Self {
            version,
            courses: courses.into(),
        }
    }

    /// The empty collection every store starts from.
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    /// Collection version. Starts at 0 and increases by one per commit.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The courses, in insertion order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Look up a course by id.
    pub fn get(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Whether two snapshots share the same underlying allocation.
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.courses, &other.courses)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Content equality; the version is not compared.
impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.courses == other.courses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NewCourse;

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty();
        assert_eq!(snapshot.version(), 0);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
    }

    #[test]
    fn test_get_by_id() {
        let course = Course::from_draft(NewCourse::new("History", 3.0));
        let id = course.id.clone();
        let snapshot = Snapshot::new(1, vec![course]);

        assert_eq!(snapshot.get(&id).unwrap().name, "History");
        assert!(snapshot.get("missing").is_none());
    }

    #[test]
    fn test_clone_shares_courses() {
        let snapshot = Snapshot::new(3, vec![Course::from_draft(NewCourse::new("Art", 1.0))]);
        let clone = snapshot.clone();

        assert!(snapshot.ptr_eq(&clone));
        assert_eq!(clone.version(), 3);
    }

    #[test]
    fn test_equality_ignores_version() {
        let course = Course::from_draft(NewCourse::new("Music", 2.0));
        let a = Snapshot::new(1, vec![course.clone()]);
        let b = Snapshot::new(7, vec![course]);

        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
    }
}
