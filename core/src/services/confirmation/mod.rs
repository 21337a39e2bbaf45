//! Client for the third-party veteran confirmation API

mod client;
mod memory;
mod request;
mod traits;

pub use client::{
    classify_response, ConfirmationClient, CONNECTION_TEST_SUBJECT, PRODUCTION_BASE_URL,
    SANDBOX_BASE_URL,
};
pub use memory::StubConfirmationTransport;
pub use request::{build_request_body, OPTIONAL_FIELDS, REQUIRED_FIELDS};
pub use traits::{ConfirmationTransport, TransportRequest, TransportResponse};
