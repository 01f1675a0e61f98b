//! Shared test utilities for Prompt2Learn tests.
//!
//! - [`memory`]: in-memory fakes for the storage and model ports.
//! - [`pg`]: a PostgreSQL instance shared across tests, one database per test.

pub mod memory;
pub mod pg;

pub use memory::{InMemoryDb, ScriptedModel};
