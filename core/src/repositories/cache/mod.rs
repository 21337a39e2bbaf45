//! Time-boxed ephemeral storage.

mod r#trait;
pub use r#trait::EphemeralCache;

mod memory;
pub use memory::InMemoryEphemeralCache;
