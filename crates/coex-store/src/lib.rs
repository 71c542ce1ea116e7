//! Durable state for coex.
//!
//! A thin repository over SQLite holding component templates, executors,
//! component executions and their lifecycle events. Execution records are
//! only mutable through [`LockedExecution`], which holds the per-record
//! exclusive lock until it is committed or dropped.

pub mod error;
pub mod lock;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use lock::LockedExecution;
pub use store::ExecutionStore;
pub use types::{
    Component, ComponentFilter, ComponentSpec, EventRecord, ExecutionRecord, Executor,
    NewExecution,
};
