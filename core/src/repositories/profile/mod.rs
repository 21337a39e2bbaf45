//! Host user-profile collaborator: verified flags and contact details.

mod r#trait;
pub use r#trait::ProfileRepository;

mod memory;
pub use memory::InMemoryProfileRepository;
