//! Proofreading service contract and transports.
//!
//! The core never talks to the network directly. It hands a [`ProofreadRequest`]
//! to something implementing [`ProofreadService`] and gets the raw XML body back.
//!
//! - [`HttpService`] posts the request as form fields to a LanguageTool-style
//!   endpoint.
//! - `MockService` (feature `test-support`) replays canned bodies and records
//!   requests.

mod request;
#[cfg(any(test, feature = "test-support"))]
pub mod test;
mod transport;

pub use request::{normalize_language, ProofreadRequest};
pub use transport::{HttpService, ProofreadService, ServiceError};
