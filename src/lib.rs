//! TaskNet task tracking service and client library.
//!
//! The server resolves filtered, paginated task listings and completion
//! statistics over a document store. The client sync model keeps a user's
//! filter and page state in step with the server.

pub mod api;
pub mod client;
pub mod domain;
pub mod infrastructure;
