//! `bureau-api` — typed client for the external REST backend.
//!
//! The backend owns validation, persistence, OTP issuance and matching, and
//! role authorization; this crate owns the call shapes and the normalization
//! of the backend's discriminated response envelope into
//! [`bureau_workflow::ChangeOutcome`]. It implements the transport seams of
//! the workflow and session crates (`ChangeTransport`, `PasswordVerifier`).

pub mod client;
pub mod dto;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
