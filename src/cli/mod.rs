//! CLI commands for GradePal.
//!
//! Each command owns what it needs (a [`CourseStore`](crate::store::CourseStore),
//! a [`Predictor`](crate::predict::Predictor)), returns a serializable output
//! struct, and renders it through [`format_output`]:
//! - **course**: add, list, show, update, delete
//! - **grade**: add, update, delete
//! - **summary**: every course plus the overall GPA
//! - **predict**: final-grade prediction for one course

pub mod course;
pub mod grade;
pub mod predict;
pub mod summary;

pub use course::{CourseCommand, CourseOutput};
pub use grade::{GradeCommand, GradeOutput};
pub use predict::{PredictCommand, PredictOutput};
pub use summary::{CourseReport, SummaryCommand, SummaryOutput};

use serde::Serialize;

/// Output options shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// A command result that can be shown to the user.
pub trait CommandOutput: Serialize {
    /// Whether the command did what was asked.
    fn is_success(&self) -> bool;

    /// Human-readable rendering.
    fn format_text(&self) -> String;
}

/// Render `output` according to `options`.
///
/// Quiet output is empty. JSON output falls back to `{}` if serialization
/// fails.
pub fn format_output<O: CommandOutput>(output: &O, options: &OutputOptions) -> String {
    if options.quiet {
        return String::new();
    }

    if options.json {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    } else {
        output.format_text()
    }
}

/// Render an optional percentage for display.
fn display_percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.1}%", value),
        None => "N/A".to_string(),
    }
}

/// Truncate a string with ellipsis, counting characters rather than bytes.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        success: bool,
    }

    impl CommandOutput for Sample {
        fn is_success(&self) -> bool {
            self.success
        }

        fn format_text(&self) -> String {
            "sample\n".to_string()
        }
    }

    #[test]
    fn test_format_output_modes() {
        let sample = Sample { success: true };

        assert_eq!(format_output(&sample, &OutputOptions::default()), "sample\n");
        assert!(format_output(
            &sample,
            &OutputOptions {
                json: true,
                quiet: false
            }
        )
        .contains("\"success\": true"));
        assert!(format_output(
            &sample,
            &OutputOptions {
                json: true,
                quiet: true
            }
        )
        .is_empty());
    }

    #[test]
    fn test_display_percent() {
        assert_eq!(display_percent(Some(91.26)), "91.3%");
        assert_eq!(display_percent(Some(100.0)), "100.0%");
        assert_eq!(display_percent(None), "N/A");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Introduction to Algorithms", 12), "Introduct...");
        assert_eq!(truncate("日本語テスト", 5), "日本...");
    }
}
