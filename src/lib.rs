//! Client library for the Checky contract risk analysis service.
//!
//! Checky takes an employment or service contract, splits it into articles
//! and sentences, and grades each sentence as danger, warning, or safe. The
//! grading happens server side; this crate uploads documents, follows the
//! analysis job to completion, binds results back onto the segmented text,
//! and answers follow-up questions over the chat endpoint.

pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod segmenter;
pub mod utils;
