use crate::document::EditError;
use lector_service::ServiceError;
use snafu::Snafu;

/// Errors raised while reconciling proofreading results with a document.
///
/// None of these are fatal. Hosts show "no results" or skip the offending
/// record; the worst case is an empty or partial [`ResultSet`](crate::ResultSet).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProofreadError {
    /// The service referenced text beyond what was sent, so the response does not
    /// belong to this extraction.
    #[snafu(display("Plain-text offset {offset} is beyond extracted text length {len}"))]
    OffsetOutOfRange { offset: usize, len: usize },

    #[snafu(display("Error record {index} has a malformed {field} attribute: {value:?}"))]
    MalformedField {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[snafu(display("No proofreading results"))]
    EmptyResultSet,

    /// Unreachable service, non-success status, or a body that is not XML.
    #[snafu(display("Proofreading service unavailable: {source}"))]
    ServiceUnavailable { source: ServiceError },

    #[snafu(display("Failed to apply replacement: {source}"))]
    Edit { source: EditError },
}

pub type Result<T, E = ProofreadError> = std::result::Result<T, E>;
