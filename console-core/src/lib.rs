//! console-core: Shared infrastructure for the HR console client.
pub mod error;
pub mod observability;
pub mod storage;
