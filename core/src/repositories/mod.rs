//! Ports onto the host's persistence collaborators, with in-memory implementations.

pub mod cache;
pub mod profile;
pub mod store;

pub use cache::{EphemeralCache, InMemoryEphemeralCache};
pub use profile::{InMemoryProfileRepository, ProfileRepository};
pub use store::{InMemoryKeyValueStore, KeyValueStore};
