//! HTTP binding for the MilVerify verification core

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod telemetry;

pub use app::{configure, AppState};
