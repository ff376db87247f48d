//! Course commands for GradePal.
//!
//! Add, list, show, update and delete courses. Input is validated before the
//! store is touched; unknown ids are reported rather than silently ignored.

use serde::Serialize;

use crate::cli::summary::CourseReport;
use crate::cli::CommandOutput;
use crate::core::{validate_course_update, validate_new_course, CourseUpdate, NewCourse};
use crate::error::GradepalError;
use crate::storage::KeyValueStore;
use crate::store::CourseStore;

/// Which course operation produced an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseAction {
    Add,
    List,
    Show,
    Update,
    Delete,
}

/// Output format for the course commands.
#[derive(Debug, Clone, Serialize)]
pub struct CourseOutput {
    pub success: bool,
    pub action: CourseAction,
    /// Courses affected or listed.
    pub courses: Vec<CourseReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CourseOutput {
    pub fn success(action: CourseAction, courses: Vec<CourseReport>) -> Self {
        Self {
            success: true,
            action,
            courses,
            error: None,
        }
    }

    pub fn failure(action: CourseAction, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action,
            courses: Vec::new(),
            error: Some(error.into()),
        }
    }
}

impl CommandOutput for CourseOutput {
    fn is_success(&self) -> bool {
        self.success
    }

    fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Course command failed: {}\n",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        match self.action {
            CourseAction::List if self.courses.is_empty() => "No courses yet.\n".to_string(),
            CourseAction::List => {
                let mut text = format!("{} course(s):\n", self.courses.len());
                for course in &self.courses {
                    text.push_str(&format!("  {}\n", course.format_line()));
                }
                text
            }
            CourseAction::Show => self
                .courses
                .iter()
                .map(CourseReport::format_detail)
                .collect(),
            CourseAction::Add => self
                .courses
                .first()
                .map(|c| format!("Added course '{}' [{}].\n", c.name, c.id))
                .unwrap_or_default(),
            CourseAction::Update => self
                .courses
                .first()
                .map(|c| format!("Updated course '{}' [{}].\n", c.name, c.id))
                .unwrap_or_default(),
            CourseAction::Delete => self
                .courses
                .first()
                .map(|c| format!("Deleted course '{}' and its grades.\n", c.name))
                .unwrap_or_default(),
        }
    }
}

/// The course command implementation.
pub struct CourseCommand<'a, S: KeyValueStore> {
    store: &'a mut CourseStore<S>,
}

impl<'a, S: KeyValueStore> CourseCommand<'a, S> {
    pub fn new(store: &'a mut CourseStore<S>) -> Self {
        Self { store }
    }

    /// Add a course.
    pub fn add(&mut self, name: &str, credits: f64) -> CourseOutput {
        let draft = NewCourse::new(name.trim(), credits);
        if let Err(errors) = validate_new_course(&draft) {
            return CourseOutput::failure(
                CourseAction::Add,
                GradepalError::from(errors).to_string(),
            );
        }

        let id = self.store.add_course(draft);
        self.report(CourseAction::Add, &id)
    }

    /// List every course.
    pub fn list(&self) -> CourseOutput {
        let courses = self.store.courses().iter().map(CourseReport::new).collect();
        CourseOutput::success(CourseAction::List, courses)
    }

    /// Show one course with its grades.
    pub fn show(&self, id: &str) -> CourseOutput {
        self.report(CourseAction::Show, id)
    }

    /// Change a course's name and/or credits.
    pub fn update(&mut self, id: &str, name: Option<&str>, credits: Option<f64>) -> CourseOutput {
        let update = CourseUpdate {
            name: name.map(|n| n.trim().to_string()),
            credits,
        };

        if update.is_empty() {
            return CourseOutput::failure(
                CourseAction::Update,
                "nothing to update: pass --name or --credits",
            );
        }
        if let Err(errors) = validate_course_update(&update) {
            return CourseOutput::failure(
                CourseAction::Update,
                GradepalError::from(errors).to_string(),
            );
        }

        if !self.store.update_course(id, update) {
            return CourseOutput::failure(
                CourseAction::Update,
                GradepalError::course_not_found(id).to_string(),
            );
        }

        self.report(CourseAction::Update, id)
    }

    /// Delete a course and all its grades.
    pub fn delete(&mut self, id: &str) -> CourseOutput {
        let Some(course) = self.store.get_course_by_id(id).map(CourseReport::new) else {
            return CourseOutput::failure(
                CourseAction::Delete,
                GradepalError::course_not_found(id).to_string(),
            );
        };

        self.store.delete_course(id);
        CourseOutput::success(CourseAction::Delete, vec![course])
    }

    fn report(&self, action: CourseAction, id: &str) -> CourseOutput {
        match self.store.get_course_by_id(id) {
            Some(course) => CourseOutput::success(action, vec![CourseReport::new(course)]),
            None => CourseOutput::failure(action, GradepalError::course_not_found(id).to_string()),
        }
    }
}
