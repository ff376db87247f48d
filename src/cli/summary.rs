//! Summary command for GradePal.
//!
//! Shows every course with its derived grade and the overall GPA.

use serde::Serialize;

use crate::cli::{display_percent, truncate, CommandOutput};
use crate::core::{course_grade, gpa, grade_point, letter_grade, Course, Grade};
use crate::storage::KeyValueStore;
use crate::store::CourseStore;

/// A course together with its derived grade.
#[derive(Debug, Clone, Serialize)]
pub struct CourseReport {
    pub id: String,
    pub name: String,
    pub credits: f64,
    /// Weighted mean score, absent until something is graded.
    pub grade: Option<f64>,
    pub letter: Option<&'static str>,
    pub grade_point: f64,
    pub weight_completed: f64,
    pub remaining_weight: f64,
    pub grades: Vec<Grade>,
}

impl CourseReport {
    pub fn new(course: &Course) -> Self {
        let derived = course_grade(&course.grades);
        Self {
            id: course.id.clone(),
            name: course.name.clone(),
            credits: course.credits,
            grade: derived.grade,
            letter: letter_grade(derived.grade),
            grade_point: grade_point(derived.grade),
            weight_completed: derived.weight_completed,
            remaining_weight: derived.remaining_weight(),
            grades: course.grades.clone(),
        }
    }

    /// One-line rendering used by list-style output.
    pub fn format_line(&self) -> String {
        format!(
            "{:<28} {:>5} cr  {:>7}  {:<2}  {:>5.1}% done  [{}]",
            truncate(&self.name, 28),
            self.credits,
            display_percent(self.grade),
            self.letter.unwrap_or("-"),
            self.weight_completed,
            self.id
        )
    }

    /// Multi-line rendering including every grade.
    pub fn format_detail(&self) -> String {
        let mut text = format!("{} [{}]\n", self.name, self.id);
        text.push_str(&format!("  Credits: {}\n", self.credits));
        text.push_str(&format!(
            "  Grade: {} ({})\n",
            display_percent(self.grade),
            self.letter.unwrap_or("no grade yet")
        ));
        text.push_str(&format!(
            "  Weight completed: {:.1}%, remaining: {:.1}%\n",
            self.weight_completed, self.remaining_weight
        ));

        if self.grades.is_empty() {
            text.push_str("  No grades recorded.\n");
        } else {
            text.push_str("  Grades:\n");
            for grade in &self.grades {
                text.push_str(&format!(
                    "    - {:<24} {:>6.1}%  weight {:>5.1}%  [{}]\n",
                    truncate(&grade.name, 24),
                    grade.score,
                    grade.weight,
                    grade.id
                ));
            }
        }

        text
    }
}

/// Output format for the summary command.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutput {
    pub success: bool,
    pub courses: Vec<CourseReport>,
    pub gpa: f64,
    /// Credits of the courses that count toward the GPA.
    pub counted_credits: f64,
}

impl CommandOutput for SummaryOutput {
    fn is_success(&self) -> bool {
        self.success
    }

    fn format_text(&self) -> String {
        if self.courses.is_empty() {
            return "No courses yet. Add one with `gradepal course add`.\n".to_string();
        }

        let mut text = String::from("Courses:\n");
        for course in &self.courses {
            text.push_str(&format!("  {}\n", course.format_line()));
        }
        text.push_str(&format!(
            "\nOverall GPA: {:.2} ({} credits counted)\n",
            self.gpa, self.counted_credits
        ));
        text
    }
}

/// The summary command implementation.
pub struct SummaryCommand<'a, S: KeyValueStore> {
    store: &'a CourseStore<S>,
}

impl<'a, S: KeyValueStore> SummaryCommand<'a, S> {
    pub fn new(store: &'a CourseStore<S>) -> Self {
        Self { store }
    }

    pub fn run(&self) -> SummaryOutput {
        let courses = self.store.courses();

        let counted_credits = courses
            .iter()
            .filter(|c| c.credits > 0.0 && course_grade(&c.grades).grade.is_some())
            .map(|c| c.credits)
            .sum();

        SummaryOutput {
            success: true,
            courses: courses.iter().map(CourseReport::new).collect(),
            gpa: gpa(courses),
            counted_credits,
        }
    }
}
