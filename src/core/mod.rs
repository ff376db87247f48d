//! Core types and logic for GradePal.
//!
//! This module contains the course and grade records, the grade engine that
//! derives course grades and GPA from them, and the input validation rules.

pub mod course;
pub mod engine;
pub mod validate;

pub use course::{generate_id, Course, CourseUpdate, Grade, GradeUpdate, NewCourse, NewGrade};
pub use engine::{
    course_grade, gpa, grade_point, letter_grade, remaining_weight, CourseGrade, ScaleStep,
    FULL_WEIGHT, GRADE_SCALE,
};
pub use validate::{
    check_weight_budget, format_percent, validate_course_update, validate_grade_update,
    validate_new_course, validate_new_grade, Field, ValidationError, MAX_CREDITS, MAX_SCORE,
    MAX_WEIGHT,
};
