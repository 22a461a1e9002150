//! HTTP surface of the Checky backend.
//!
//! The backend is reached through the [`ContractApi`] trait so the pipeline
//! and chat layers never touch `reqwest` directly. [`ApiClient`] is the real
//! implementation; [`MockApi`] is a scripted stand-in used by tests.

mod backend;
mod client;
mod error;
mod mock;
mod types;

pub use backend::ContractApi;
pub use client::{ApiClient, DEFAULT_REQUEST_TIMEOUT};
pub use error::ApiError;
pub use mock::MockApi;
pub use types::{ChatReply, HealthResponse, StatusPayload, UploadReceipt};
