//! Course and grade records.
//!
//! These are the persisted entities. Drafts (`NewCourse`, `NewGrade`) carry
//! the user-supplied fields of a record that has no id yet; patches
//! (`CourseUpdate`, `GradeUpdate`) carry the fields to merge into an
//! existing record. Neither can touch an id or a course's grade list.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh opaque identifier for a course or grade.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// One scored, weighted assignment within a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Grade {
    /// Unique within the owning course; immutable once assigned.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Percentage score. Up to 120 to allow extra credit.
    pub score: f64,
    /// Percentage contribution toward the course grade.
    pub weight: f64,
}

impl Grade {
    /// Build a grade from a draft, assigning a fresh id.
    pub fn from_draft(draft: NewGrade) -> Self {
        Self {
            id: generate_id(),
            name: draft.name,
            score: draft.score,
            weight: draft.weight,
        }
    }

    /// Merge the set fields of `update` into this grade.
    pub fn apply(&mut self, update: &GradeUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(score) = update.score {
            self.score = score;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
    }
}

/// An enrolled course and its grades.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    /// Unique within the collection; immutable once assigned.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Credit hours. Zero-credit courses never count toward the GPA.
    pub credits: f64,
    /// Grades in insertion order.
    #[serde(default)]
    pub grades: Vec<Grade>,
}

impl Course {
    /// Build a course from a draft, assigning a fresh id and no grades.
    pub fn from_draft(draft: NewCourse) -> Self {
        Self {
            id: generate_id(),
            name: draft.name,
            credits: draft.credits,
            grades: Vec::new(),
        }
    }

    /// Merge the set fields of `update` into this course.
    pub fn apply(&mut self, update: &CourseUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(credits) = update.credits {
            self.credits = credits;
        }
    }

    /// Look up a grade by id.
    pub fn grade(&self, grade_id: &str) -> Option<&Grade> {
        self.grades.iter().find(|g| g.id == grade_id)
    }

    /// Sum of weights of every grade except `exclude`.
    ///
    /// Used by the weight budget check when editing an existing grade.
    pub fn weight_excluding(&self, exclude: Option<&str>) -> f64 {
        self.grades
            .iter()
            .filter(|g| Some(g.id.as_str()) != exclude)
            .map(|g| g.weight)
            .sum()
    }
}

/// Fields for a course that has not been stored yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCourse {
    pub name: String,
    pub credits: f64,
}

impl NewCourse {
    pub fn new(name: impl Into<String>, credits: f64) -> Self {
        Self {
            name: name.into(),
            credits,
        }
    }
}

/// Partial update for a course. Unset fields keep their prior values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CourseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
}

impl CourseUpdate {
    /// Whether the update sets no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.credits.is_none()
    }
}

/// Fields for a grade that has not been stored yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGrade {
    pub name: String,
    pub score: f64,
    pub weight: f64,
}

impl NewGrade {
    pub fn new(name: impl Into<String>, score: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            score,
            weight,
        }
    }
}

/// Partial update for a grade. Unset fields keep their prior values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GradeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl GradeUpdate {
    /// Whether the update sets no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.score.is_none() && self.weight.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_course_from_draft() {
        let course = Course::from_draft(NewCourse::new("Linear Algebra", 4.0));
        assert_eq!(course.name, "Linear Algebra");
        assert_eq!(course.credits, 4.0);
        assert!(course.grades.is_empty());
        assert!(!course.id.is_empty());
    }

    #[test]
    fn test_course_apply_partial_update() {
        let mut course = Course::from_draft(NewCourse::new("Physics", 3.0));
        let id = course.id.clone();

        course.apply(&CourseUpdate {
            credits: Some(4.0),
            ..Default::default()
        });

        assert_eq!(course.id, id);
        assert_eq!(course.name, "Physics");
        assert_eq!(course.credits, 4.0);
    }

    #[test]
    fn test_grade_apply_partial_update() {
        let mut grade = Grade::from_draft(NewGrade::new("Midterm", 78.0, 30.0));

        grade.apply(&GradeUpdate {
            name: Some("Midterm (regraded)".to_string()),
            score: Some(82.0),
            weight: None,
        });

        assert_eq!(grade.name, "Midterm (regraded)");
        assert_eq!(grade.score, 82.0);
        assert_eq!(grade.weight, 30.0);
    }

    #[test]
    fn test_weight_excluding() {
        let mut course = Course::from_draft(NewCourse::new("Chemistry", 3.0));
        course.grades.push(Grade::from_draft(NewGrade::new("Lab", 90.0, 20.0)));
        course.grades.push(Grade::from_draft(NewGrade::new("Quiz", 70.0, 15.0)));
        let lab_id = course.grades[0].id.clone();

        assert_eq!(course.weight_excluding(None), 35.0);
        assert_eq!(course.weight_excluding(Some(&lab_id)), 15.0);
        assert_eq!(course.weight_excluding(Some("missing")), 35.0);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(CourseUpdate::default().is_empty());
        assert!(GradeUpdate::default().is_empty());
        assert!(!GradeUpdate {
            weight: Some(5.0),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_course_deserializes_without_grades() {
        let course: Course =
            serde_json::from_str(r#"{"id":"c1","name":"Art","credits":2}"#).unwrap();
        assert!(course.grades.is_empty());
        assert_eq!(course.credits, 2.0);
    }
}
