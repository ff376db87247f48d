//! GradePal - personal grade tracking
//!
//! GradePal records courses and weighted assignment grades, derives running
//! course grades and an overall GPA, and can ask an AI advisor for
//! two-scenario final-grade predictions. All state lives in a local
//! key-value store.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod predict;
pub mod storage;
pub mod store;
pub mod util;

pub use config::Config;
pub use core::{
    course_grade, gpa, grade_point, letter_grade, remaining_weight, Course, CourseGrade,
    CourseUpdate, Grade, GradeUpdate, NewCourse, NewGrade, ValidationError,
};
pub use error::{GradepalError, Result};
pub use predict::{
    ConfiguredPredictor, HttpPredictor, PredictionRequest, PredictionResponse, Predictor,
};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use store::{CourseStore, Snapshot};

// CLI commands
pub use cli::{CourseCommand, GradeCommand, PredictCommand, SummaryCommand};
