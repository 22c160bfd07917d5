//! Adapters for the [`KeyValueStorage`](streamchat_application::KeyValueStorage) port.

mod file;
mod memory;

pub use file::FileKeyValueStorage;
pub use memory::MemoryKeyValueStorage;
