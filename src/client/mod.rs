//! Client sync model.
//!
//! Holds the user's filter and pagination state, derives list requests from
//! it, and reconciles server responses into the displayed view and
//! statistics. The server is reached only through the [`TaskApi`] seam.

pub mod session;
pub mod stats;
#[cfg(test)]
mod stub;
pub mod sync;
pub mod transport;

pub use session::{
    DEFAULT_CLIENT_PER_PAGE, Filter, ListView, SessionState, local_today, query_params,
};
pub use stats::{IN_PROGRESS_KEYS, StatsView, lookup_in_progress};
pub use sync::{LoadTicket, TaskListClient};
pub use transport::{ClientError, ClientFuture, HttpTaskApi, TaskApi, TaskDraft};
