mod error;
mod file_store;
pub mod keys;
mod lock;
mod memory_store;
mod store;

pub use error::StorageError;
pub use file_store::JsonFileStore;
pub use lock::StoreLock;
pub use memory_store::InMemoryStore;
pub use store::{KeyValueStore, load_json, save_json};
