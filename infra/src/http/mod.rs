//! Outbound HTTP to the veteran confirmation API

pub mod confirmation_transport;


pub use confirmation_transport::ReqwestConfirmationTransport;
