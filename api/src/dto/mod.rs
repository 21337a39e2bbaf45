//! Request and response bodies

pub mod admin;
pub mod subject;

pub use admin::{
    ContactRequest, LogsQuery, PendingCancelledResponse, PendingRecordSummary, SetVerifiedRequest,
};
pub use subject::{
    OtpRequest, OtpRequestedResponse, OtpVerifyRequest, OtpVerifyResponse,
    VeteranSubmissionRequest,
};
