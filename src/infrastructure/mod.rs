//! Infrastructure module for the task document store.
//!
//! This module contains the repository trait, its `PostgreSQL` and in-memory
//! implementations, and the factory that selects one at startup.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use factory::{
    ConfigurationError, DATABASE_URL_HINT, FactoryError, Repositories, RepositoryConfig,
    RepositoryConfigBuilder, RepositoryFactory, StorageMode, validate_connection_string,
};
pub use in_memory::InMemoryTaskRepository;
pub use postgres::PostgresTaskRepository;
pub use repository::{
    PaginatedResult, RepositoryError, RepositoryFuture, TaskDocument, TaskRepository,
};
