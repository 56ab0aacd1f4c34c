//! A proofreading session: one document, one result view.
//!
//! [`Session`] ties the pipeline together and owns the only mutable state: the
//! current [`ResultSet`] and the check generation.
//!
//! # Check flow
//!
//! ```text
//! begin_check ─► CheckTicket ─► (service) ─► complete_check
//!     │              │                            │
//!  generation++   text + map             stale? ─► dropped
//!                                                 │
//!                               parse ─► resolve overlaps ─► build ─► replace
//! ```
//!
//! Hosts that talk to the service themselves use [`Session::begin_check`] and
//! [`Session::complete_check`]. Everyone else calls [`Session::check`] with a
//! [`ProofreadService`].
//!
//! # Generations
//!
//! Every check is stamped with a generation. Checks are never cancelled, so
//! responses can arrive out of order. With `discard_stale_responses` only the
//! newest check's response is accepted; without it the last one to arrive
//! replaces the results. Either way, nothing issued before the last
//! [`Session::discard`] is accepted.

use crate::{
    config::Config,
    document::{DocumentContent, DocumentEditor, DocumentRange},
    error::{EditSnafu, EmptyResultSetSnafu, Result, ServiceUnavailableSnafu},
    events::{EventBus, SessionEvent},
    offset_map::{extract, Extraction, OffsetMap},
    overlap::OverlapResolver,
    result_set::{ResultEntry, ResultSet},
    suggestion::SuggestionParser,
    viewport::ViewportSelector,
};
use async_channel::Receiver;
use lector_service::{ProofreadRequest, ProofreadService};
use snafu::{OptionExt, ResultExt};
use std::ops::Range;
use tracing::{debug, warn};

/// A check in flight: the request to send and the map to read the answer with.
#[derive(Debug, Clone)]
pub struct CheckTicket {
    generation: u64,
    request: ProofreadRequest,
    map: OffsetMap,
}

impl CheckTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &ProofreadRequest {
        &self.request
    }

    pub fn map(&self) -> &OffsetMap {
        &self.map
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The response became the current result set. `skipped` counts records
    /// that were malformed or did not fit the extracted text.
    Replaced { count: usize, skipped: usize },
    /// The response belonged to a superseded or discarded check.
    Stale { generation: u64, latest: u64 },
}

pub struct Session {
    config: Config,
    parser: SuggestionParser,
    resolver: OverlapResolver,
    viewport: ViewportSelector,
    results: ResultSet,
    generation: u64,
    /// Checks at or below this generation were discarded.
    closed_through: u64,
    events: EventBus,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let parser = SuggestionParser::new()
            .with_wrap_width(config.wrap_width)
            .with_ignored_rules(config.ignored_rules.iter().cloned());
        let resolver = OverlapResolver::new(config.overlap_policy);
        let viewport = ViewportSelector::new(config.clip_threshold, config.max_rendered_results);

        Self {
            config,
            parser,
            resolver,
            viewport,
            results: ResultSet::default(),
            generation: 0,
            closed_through: 0,
            events: EventBus::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Generation of the most recently issued check.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Extract `document` and stamp a new check.
    pub fn begin_check<D: DocumentContent + ?Sized>(&mut self, document: &D) -> CheckTicket {
        self.generation += 1;
        let Extraction { text, map } = extract(document);
        let request = ProofreadRequest::new(&self.config.language, text);
        debug!(
            generation = self.generation,
            language = %request.language,
            text_len = map.len(),
            "began check"
        );

        CheckTicket {
            generation: self.generation,
            request,
            map,
        }
    }

    /// Accept the service's answer to `ticket`.
    ///
    /// Only a body that is not XML at all is an error. Malformed records and
    /// records that do not fit the extracted text are logged and skipped.
    pub fn complete_check(&mut self, ticket: CheckTicket, response: &str) -> Result<CheckOutcome> {
        let generation = ticket.generation;
        if self.is_stale(generation) {
            warn!(generation, latest = self.generation, "dropping stale response");
            return Ok(CheckOutcome::Stale {
                generation,
                latest: self.generation,
            });
        }

        let parsed = self.parser.parse_lenient(response)?;
        for error in &parsed.rejected {
            warn!(generation, %error, "skipping malformed record");
        }
        let kept = self.resolver.resolve(parsed.suggestions);
        let (results, unplaced) = ResultSet::build_partial(kept, &ticket.map);

        let count = results.len();
        let skipped = parsed.rejected.len() + unplaced.len();
        self.results = results;
        debug!(generation, count, skipped, "replaced result set");
        self.events
            .emit(SessionEvent::ResultSetReplaced { generation, count });

        Ok(CheckOutcome::Replaced { count, skipped })
    }

    /// Check `document` against `service` and accept the response.
    pub async fn check<D, S>(&mut self, document: &D, service: &S) -> Result<CheckOutcome>
    where
        D: DocumentContent + ?Sized,
        S: ProofreadService + ?Sized,
    {
        let ticket = self.begin_check(document);
        let body = service
            .check(ticket.request())
            .await
            .context(ServiceUnavailableSnafu)?;
        self.complete_check(ticket, &body)
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation <= self.closed_through
            || (self.config.discard_stale_responses && generation != self.generation)
    }

    pub fn next(&mut self) -> Option<usize> {
        let before = self.results.focused_index();
        let after = self.results.next();
        self.emit_focus_change(before, after);
        after
    }

    pub fn previous(&mut self) -> Option<usize> {
        let before = self.results.focused_index();
        let after = self.results.previous();
        self.emit_focus_change(before, after);
        after
    }

    /// Focus the result under `selection`, as when the user clicks a highlight.
    pub fn focus_at(&mut self, selection: DocumentRange) -> Option<usize> {
        let before = self.results.focused_index();
        let after = self.results.focus_at(selection);
        self.emit_focus_change(before, after);
        after
    }

    fn emit_focus_change(&mut self, before: Option<usize>, after: Option<usize>) {
        if let Some(index) = after.filter(|index| Some(*index) != before) {
            self.events.emit(SessionEvent::FocusChanged { index });
        }
    }

    /// Write `text` over the focused result and move on to the next one.
    ///
    /// Results after the edit are shifted by the change in length so they keep
    /// pointing at the same text. Focus lands on the first result past the
    /// inserted text, wrapping to the start, so the replacement itself is never
    /// offered again.
    pub fn replace_focused<E: DocumentEditor + ?Sized>(
        &mut self,
        editor: &mut E,
        text: &str,
    ) -> Result<ResultEntry> {
        let index = self.results.focused_index().context(EmptyResultSetSnafu)?;
        let range = self.results.focused().context(EmptyResultSetSnafu)?.range;

        let inserted = editor.replace_range(range, text).context(EditSnafu)?;
        let entry = self.results.consume_focused(text)?;
        self.events.emit(SessionEvent::EntryConsumed {
            index,
            entry: entry.clone(),
        });

        let delta = inserted.end as isize - range.end as isize;
        if delta != 0 {
            self.results.remap_ranges(|r| {
                if r.start >= range.end {
                    r.offset_by(delta)
                } else {
                    r
                }
            });
        }

        let after = self.results.advance_past(inserted.end);
        self.emit_focus_change(Some(index), after);
        debug!(?range, ?inserted, remaining = self.results.len(), "applied replacement");
        Ok(entry)
    }

    /// Index range of results to draw for the `visible` document range.
    pub fn render_subset(&self, visible: Option<DocumentRange>) -> Range<usize> {
        self.viewport.select(
            self.results.entries(),
            self.results.focused_index().unwrap_or(0),
            visible,
        )
    }

    /// Close the result view. Responses to checks already issued are ignored.
    pub fn discard(&mut self) {
        self.generation += 1;
        self.closed_through = self.generation;
        self.results = ResultSet::default();
        debug!(closed_through = self.closed_through, "discarded results");
        self.events.emit(SessionEvent::ResultSetDiscarded);
    }
}
