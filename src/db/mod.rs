//! Dashboard persistence.
//!
//! - **Memory**: process-local store, used by default and in tests
//! - **SQLite**: file-backed store via libsql
//!
//! Both implement [`DashboardStore`]; pick one with `[database] backend` in
//! `udx3.toml`.

pub mod memory;
pub mod records;
pub mod seed;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
pub use seed::seed_sample_data;
pub use sqlite::SqliteStore;
pub use traits::{DashboardStore, DatabaseProvider};
