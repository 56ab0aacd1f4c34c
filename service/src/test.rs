//! Test utilities and mock infrastructure.

pub mod mock_service;

pub use mock_service::*;
