pub mod sqlite;

pub use sqlite::{create_memory_pool, create_pool, run_migrations};
