//! Durable key-value persistence.

mod r#trait;
pub use r#trait::KeyValueStore;

mod memory;
pub use memory::InMemoryKeyValueStore;
