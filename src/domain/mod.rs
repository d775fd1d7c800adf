//! Domain module for task tracking.
//!
//! This module contains the task entity, the listing contract shared by
//! server and client, and the completion statistics.

pub mod query;
pub mod stats;
pub mod task;

pub use query::{
    DEFAULT_PAGE, DEFAULT_PER_PAGE, DateRange, PageRequest, StatusFilter, TaskFilter, TaskQuery,
    UnknownStatusFilter, listing_order,
};
pub use stats::{GlobalStats, StatusCounts, completion_percent};
pub use task::{
    DueDate, DueDateError, Task, TaskId, TaskIdGenerator, TaskStatus, UnknownStatus,
    normalize_description,
};
