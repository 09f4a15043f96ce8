pub mod error;
pub mod history;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use error::StorageError;
pub use history::{HistoryStore, PushOutcome, WriteMode, DEFAULT_HISTORY_MAX, HISTORY_KEY};
pub use sqlite::SqliteStore;
pub use traits::{BlobStore, MemoryStore};
