//! Last-saved flow snapshot stores.

mod in_memory;
mod json_file;

pub use in_memory::InMemorySnapshotStore;
pub use json_file::JsonFileSnapshotStore;
