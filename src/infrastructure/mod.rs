pub mod storage;

pub use storage::{MemoryLocalStore, SqliteLocalStore};
