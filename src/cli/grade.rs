//! Grade commands for GradePal.
//!
//! Add, update and delete graded assignments within a course. Scores, weights
//! and the course's total weight budget are validated before the store is
//! touched.

use serde::Serialize;

use crate::cli::{display_percent, CommandOutput};
use crate::core::{
    course_grade, validate_grade_update, validate_new_grade, Grade, GradeUpdate, NewGrade,
};
use crate::error::GradepalError;
use crate::storage::KeyValueStore;
use crate::store::CourseStore;

/// Which grade operation produced an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeAction {
    Add,
    Update,
    Delete,
}

/// Output format for the grade commands.
#[derive(Debug, Clone, Serialize)]
pub struct GradeOutput {
    pub success: bool,
    pub action: GradeAction,
    pub course_id: String,
    /// The grade as it stands after the operation (before it, for deletes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
    /// The course grade after the operation.
    pub course_grade: Option<f64>,
    /// Weight still available in the course after the operation.
    pub remaining_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GradeOutput {
    pub fn failure(action: GradeAction, course_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action,
            course_id: course_id.to_string(),
            grade: None,
            course_grade: None,
            remaining_weight: 0.0,
            error: Some(error.into()),
        }
    }
}

impl CommandOutput for GradeOutput {
    fn is_success(&self) -> bool {
        self.success
    }

    fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Grade command failed: {}\n",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        let verb = match self.action {
            GradeAction::Add => "Added",
            GradeAction::Update => "Updated",
            GradeAction::Delete => "Deleted",
        };
        let mut text = match &self.grade {
            Some(grade) => format!(
                "{} '{}' ({:.1}%, weight {:.1}%) [{}].\n",
                verb, grade.name, grade.score, grade.weight, grade.id
            ),
            None => format!("{} grade.\n", verb),
        };
        text.push_str(&format!(
            "Course grade is now {} with {:.1}% of the weight remaining.\n",
            display_percent(self.course_grade),
            self.remaining_weight
        ));
        text
    }
}

/// The grade command implementation.
pub struct GradeCommand<'a, S: KeyValueStore> {
    store: &'a mut CourseStore<S>,
}

impl<'a, S: KeyValueStore> GradeCommand<'a, S> {
    pub fn new(store: &'a mut CourseStore<S>) -> Self {
        Self { store }
    }

    /// Add a grade to a course.
    pub fn add(&mut self, course_id: &str, name: &str, score: f64, weight: f64) -> GradeOutput {
        let Some(course) = self.store.get_course_by_id(course_id) else {
            return GradeOutput::failure(
                GradeAction::Add,
                course_id,
                GradepalError::course_not_found(course_id).to_string(),
            );
        };

        let draft = NewGrade::new(name.trim(), score, weight);
        if let Err(errors) = validate_new_grade(course, &draft) {
            return GradeOutput::failure(
                GradeAction::Add,
                course_id,
                GradepalError::from(errors).to_string(),
            );
        }

        match self.store.add_grade(course_id, draft) {
            Some(grade_id) => self.report(GradeAction::Add, course_id, &grade_id, None),
            None => GradeOutput::failure(
                GradeAction::Add,
                course_id,
                GradepalError::course_not_found(course_id).to_string(),
            ),
        }
    }

    /// Change a grade's name, score and/or weight.
    pub fn update(
        &mut self,
        course_id: &str,
        grade_id: &str,
        update: GradeUpdate,
    ) -> GradeOutput {
        let Some(course) = self.store.get_course_by_id(course_id) else {
            return GradeOutput::failure(
                GradeAction::Update,
                course_id,
                GradepalError::course_not_found(course_id).to_string(),
            );
        };
        if course.grade(grade_id).is_none() {
            return GradeOutput::failure(
                GradeAction::Update,
                course_id,
                GradepalError::grade_not_found(grade_id).to_string(),
            );
        }

        if update.is_empty() {
            return GradeOutput::failure(
                GradeAction::Update,
                course_id,
                "nothing to update: pass --name, --score or --weight",
            );
        }

        let update = GradeUpdate {
            name: update.name.map(|n| n.trim().to_string()),
            ..update
        };
        if let Err(errors) = validate_grade_update(course, grade_id, &update) {
            return GradeOutput::failure(
                GradeAction::Update,
                course_id,
                GradepalError::from(errors).to_string(),
            );
        }

        self.store.update_grade(course_id, grade_id, update);
        self.report(GradeAction::Update, course_id, grade_id, None)
    }

    /// Remove a grade from a course.
    pub fn delete(&mut self, course_id: &str, grade_id: &str) -> GradeOutput {
        let removed = self
            .store
            .get_course_by_id(course_id)
            .and_then(|course| course.grade(grade_id))
            .cloned();

        let Some(removed) = removed else {
            let error = if self.store.get_course_by_id(course_id).is_none() {
                GradepalError::course_not_found(course_id)
            } else {
                GradepalError::grade_not_found(grade_id)
            };
            return GradeOutput::failure(GradeAction::Delete, course_id, error.to_string());
        };

        self.store.delete_grade(course_id, grade_id);
        self.report(GradeAction::Delete, course_id, grade_id, Some(removed))
    }

    fn report(
        &self,
        action: GradeAction,
        course_id: &str,
        grade_id: &str,
        removed: Option<Grade>,
    ) -> GradeOutput {
        let Some(course) = self.store.get_course_by_id(course_id) else {
            return GradeOutput::failure(
                action,
                course_id,
                GradepalError::course_not_found(course_id).to_string(),
            );
        };

        let derived = course_grade(&course.grades);
        GradeOutput {
            success: true,
            action,
            course_id: course_id.to_string(),
            grade: removed.or_else(|| course.grade(grade_id).cloned()),
            course_grade: derived.grade,
            remaining_weight: derived.remaining_weight(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{format_output, OutputOptions};
    use crate::core::NewCourse;
    use crate::storage::MemoryKeyValueStore;

    fn setup() -> (CourseStore<MemoryKeyValueStore>, String) {
        let mut store = CourseStore::open(MemoryKeyValueStore::new(), "test");
        let id = store.add_course(NewCourse::new("Statistics", 3.0));
        (store, id)
    }

    #[test]
    fn test_add_grade() {
        let (mut store, course_id) = setup();

        let output = GradeCommand::new(&mut store).add(&course_id, " Quiz 1 ", 90.0, 10.0);

        assert!(output.success);
        let grade = output.grade.as_ref().unwrap();
        assert_eq!(grade.name, "Quiz 1");
        assert_eq!(output.course_grade, Some(90.0));
        assert_eq!(output.remaining_weight, 90.0);
        assert_eq!(store.get_course_by_id(&course_id).unwrap().grades.len(), 1);
        assert!(output.format_text().contains("Added 'Quiz 1'"));
    }

    #[test]
    fn test_add_grade_weighted_mean() {
        let (mut store, course_id) = setup();
        let mut cmd = GradeCommand::new(&mut store);

        cmd.add(&course_id, "A", 80.0, 50.0);
        let output = cmd.add(&course_id, "B", 100.0, 50.0);

        assert_eq!(output.course_grade, Some(90.0));
        assert_eq!(output.remaining_weight, 0.0);
    }

    #[test]
    fn test_add_grade_weight_budget_exceeded() {
        let (mut store, course_id) = setup();
        store.add_grade(&course_id, NewGrade::new("Midterm", 80.0, 90.0));
        let version = store.version();

        let output = GradeCommand::new(&mut store).add(&course_id, "Final", 85.0, 15.0);

        assert!(!output.success);
        assert!(output
            .error
            .unwrap()
            .contains("Total weight cannot exceed 100%. Remaining weight available: 10%"));
        assert_eq!(store.version(), version);
    }

    #[test]
    fn test_add_grade_rejects_out_of_range() {
        let (mut store, course_id) = setup();

        let output = GradeCommand::new(&mut store).add(&course_id, "Bonus", 121.0, 5.0);

        assert!(!output.success);
        assert!(output.error.unwrap().contains("Score can't exceed 120."));
    }

    #[test]
    fn test_add_grade_allows_extra_credit() {
        let (mut store, course_id) = setup();

        let output = GradeCommand::new(&mut store).add(&course_id, "Bonus", 115.0, 20.0);

        assert!(output.success);
        assert_eq!(output.course_grade, Some(115.0));
    }

    #[test]
    fn test_add_grade_missing_course() {
        let (mut store, _course_id) = setup();

        let output = GradeCommand::new(&mut store).add("missing", "Quiz", 90.0, 10.0);

        assert!(!output.success);
        assert!(output.error.unwrap().contains("course not found"));
    }

    #[test]
    fn test_update_grade() {
        let (mut store, course_id) = setup();
        let grade_id = store
            .add_grade(&course_id, NewGrade::new("Essay", 70.0, 30.0))
            .unwrap();

        let output = GradeCommand::new(&mut store).update(
            &course_id,
            &grade_id,
            GradeUpdate {
                score: Some(85.0),
                ..Default::default()
            },
        );

        assert!(output.success);
        assert_eq!(output.grade.unwrap().score, 85.0);
        assert_eq!(output.course_grade, Some(85.0));
    }

    #[test]
    fn test_update_grade_weight_excludes_itself() {
        let (mut store, course_id) = setup();
        store.add_grade(&course_id, NewGrade::new("Midterm", 80.0, 40.0));
        let final_id = store
            .add_grade(&course_id, NewGrade::new("Final", 80.0, 50.0))
            .unwrap();

        let mut cmd = GradeCommand::new(&mut store);
        let grow = GradeUpdate {
            weight: Some(60.0),
            ..Default::default()
        };
        assert!(cmd.update(&course_id, &final_id, grow).success);

        let overflow = GradeUpdate {
            weight: Some(61.0),
            ..Default::default()
        };
        let output = cmd.update(&course_id, &final_id, overflow);
        assert!(!output.success);
        assert!(output.error.unwrap().contains("Remaining weight available: 60%"));
    }

    #[test]
    fn test_update_grade_requires_a_field() {
        let (mut store, course_id) = setup();
        let grade_id = store
            .add_grade(&course_id, NewGrade::new("Essay", 70.0, 30.0))
            .unwrap();

        let output =
            GradeCommand::new(&mut store).update(&course_id, &grade_id, GradeUpdate::default());

        assert!(!output.success);
        assert!(output.error.unwrap().contains("nothing to update"));
    }

    #[test]
    fn test_update_missing_grade() {
        let (mut store, course_id) = setup();

        let output = GradeCommand::new(&mut store).update(
            &course_id,
            "missing",
            GradeUpdate {
                score: Some(50.0),
                ..Default::default()
            },
        );

        assert!(!output.success);
        assert!(output.error.unwrap().contains("grade not found: missing"));
    }

    #[test]
    fn test_delete_grade() {
        let (mut store, course_id) = setup();
        let grade_id = store
            .add_grade(&course_id, NewGrade::new("Essay", 70.0, 30.0))
            .unwrap();

        let output = GradeCommand::new(&mut store).delete(&course_id, &grade_id);

        assert!(output.success);
        assert_eq!(output.grade.as_ref().unwrap().name, "Essay");
        assert_eq!(output.course_grade, None);
        assert_eq!(output.remaining_weight, 100.0);
        assert!(output.format_text().contains("N/A"));
        assert!(store.get_course_by_id(&course_id).unwrap().grades.is_empty());
    }

    #[test]
    fn test_delete_missing() {
        let (mut store, course_id) = setup();
        let mut cmd = GradeCommand::new(&mut store);

        let output = cmd.delete(&course_id, "missing");
        assert!(output.error.unwrap().contains("grade not found"));

        let output = cmd.delete("missing", "missing");
        assert!(output.error.unwrap().contains("course not found"));
    }

    #[test]
    fn test_quiet_output() {
        let (mut store, course_id) = setup();
        let output = GradeCommand::new(&mut store).add(&course_id, "Quiz", 90.0, 10.0);

        let options = OutputOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(format_output(&output, &options).is_empty());
    }
}
