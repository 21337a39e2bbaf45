pub mod admin_auth;
pub mod error;
pub mod health;

pub use admin_auth::AdminAuth;
pub use error::{ApiError, ApiResult};
