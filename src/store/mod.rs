//! Course collection state for GradePal.
//!
//! [`CourseStore`] owns the collection and commits immutable [`Snapshot`]s;
//! persistence goes through a [`KeyValueStore`](crate::storage::KeyValueStore).

pub mod courses;
pub mod snapshot;

pub use courses::{CourseStore, Hydration, Observer};
pub use snapshot::Snapshot;
