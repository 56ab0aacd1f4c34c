//! Proofreading results for structured documents.
//!
//! A proofreading service checks flat text and reports problems as offsets into
//! it. A structured document has positions that hold no text at all: element
//! boundaries, inline objects, the annotation slot of a styled character. This
//! crate translates between the two and keeps the results navigable while the
//! user works through them.
//!
//! # Pipeline
//!
//! ```text
//! DocumentContent ─► extract ─► text ─► ProofreadService ─► XML
//!                       │                                    │
//!                   OffsetMap                        SuggestionParser
//!                       │                                    │
//!                       └──────► ResultSet ◄── OverlapResolver
//!                                    │
//!                             ViewportSelector ─► rendered subset
//! ```
//!
//! [`Session`] drives the whole pipeline and is what most hosts use. The
//! individual stages are public for hosts with their own orchestration.

pub mod config;
pub mod document;
mod error;
pub mod events;
pub mod offset_map;
pub mod overlap;
pub mod result_set;
pub mod session;
pub mod suggestion;
pub mod viewport;

pub use config::Config;
pub use document::{
    ContentUnit, DocumentContent, DocumentEditor, DocumentRange, EditError, LinearDocument,
    PositionedUnit,
};
pub use error::{ProofreadError, Result};
pub use events::SessionEvent;
pub use lector_service::{HttpService, ProofreadRequest, ProofreadService, ServiceError};
pub use offset_map::{extract, Extraction, OffsetMap};
pub use overlap::{OverlapPolicy, OverlapResolver};
pub use result_set::{ResultEntry, ResultSet};
pub use session::{CheckOutcome, CheckTicket, Session};
pub use suggestion::{ParsedResponse, Suggestion, SuggestionKind, SuggestionParser};
pub use viewport::{select_render_subset, ViewportSelector};
