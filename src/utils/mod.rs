//! Small shared helpers.

pub mod upload;
