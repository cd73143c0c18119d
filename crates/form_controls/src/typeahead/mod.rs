//! Free text to committed identifier code, through a debounced,
//! cancellable lookup.
//!
//! ```text
//! Idle -> Debouncing -> Searching -> Results | Empty | Error -> Idle
//! ```
//!
//! Timers and lookups run as Tokio tasks that post [`LookupEvent`]s back to
//! the controller. Each keystroke bumps the cycle token and aborts the
//! previous task, so a superseded lookup can never be applied. The
//! controller must be driven from within a Tokio runtime.

use std::{fmt, sync::Arc, time::Duration};

use client_core::{SearchError, SuggestionQuery, SuggestionSearch};
use shared::domain::{is_carrier_scac, is_location_code, Suggestion};
use tokio::{
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, warn};

pub mod cache;
mod events;
pub mod highlight;

pub use cache::{CacheKey, RecentResults, DEFAULT_CACHE_CAPACITY};
pub use events::{FailureKind, LookupFailure, FAILURE_MESSAGE, TIMEOUT_MESSAGE};
pub use highlight::{highlight, HighlightedLabel};

use events::{LookupEvent, LookupOutcome};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(6);
pub const DEFAULT_MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_RESULT_LIMIT: usize = 15;

#[derive(Debug, Clone, Copy)]
pub struct TypeaheadConfig {
    pub debounce: Duration,
    pub timeout: Duration,
    pub cache_capacity: usize,
    pub min_query_chars: usize,
    pub result_limit: usize,
    /// Shape of a committed code. Input matching it is committed as typed
    /// and never searched.
    pub is_code: fn(&str) -> bool,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            result_limit: DEFAULT_RESULT_LIMIT,
            is_code: is_location_code,
        }
    }
}

impl TypeaheadConfig {
    pub fn for_ports() -> Self {
        Self::default()
    }

    pub fn for_carriers() -> Self {
        Self {
            is_code: is_carrier_scac,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing,
    Searching,
    Results,
    Empty,
    Error(LookupFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    Escape,
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Consumed by the list (highlight moved, list closed).
    Handled,
    /// An item was committed.
    Committed,
    /// Not ours; the host should run its default behavior.
    Default,
}

type CommitCallback = Box<dyn FnMut(Option<&str>) + Send>;

pub struct TypeaheadController {
    config: TypeaheadConfig,
    search: Arc<dyn SuggestionSearch>,
    text: String,
    committed: Option<String>,
    country: Option<String>,
    phase: Phase,
    results: Vec<Suggestion>,
    highlighted: Option<usize>,
    open: bool,
    focused: bool,
    cache: RecentResults,
    token: u64,
    pending: Option<JoinHandle<()>>,
    events_tx: UnboundedSender<LookupEvent>,
    events_rx: UnboundedReceiver<LookupEvent>,
    on_commit: Option<CommitCallback>,
}

impl fmt::Debug for TypeaheadController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeaheadController")
            .field("text", &self.text)
            .field("committed", &self.committed)
            .field("country", &self.country)
            .field("phase", &self.phase)
            .field("results", &self.results.len())
            .field("highlighted", &self.highlighted)
            .field("open", &self.open)
            .field("token", &self.token)
            .finish()
    }
}

impl TypeaheadController {
    pub fn new(search: Arc<dyn SuggestionSearch>, config: TypeaheadConfig) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            cache: RecentResults::with_capacity(config.cache_capacity),
            config,
            search,
            text: String::new(),
            committed: None,
            country: None,
            phase: Phase::Idle,
            results: Vec::new(),
            highlighted: None,
            open: false,
            focused: false,
            token: 0,
            pending: None,
            events_tx,
            events_rx,
            on_commit: None,
        }
    }

    /// Invoked whenever the user changes the committed code. Owner-driven
    /// changes through [`Self::sync_committed`] are not echoed.
    pub fn with_on_commit(
        mut self,
        callback: impl FnMut(Option<&str>) + Send + 'static,
    ) -> Self {
        self.on_commit = Some(Box::new(callback));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn committed(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn results(&self) -> &[Suggestion] {
        &self.results
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// True while a debounce timer or a lookup is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Debouncing | Phase::Searching)
    }

    pub fn failure(&self) -> Option<&LookupFailure> {
        match &self.phase {
            Phase::Error(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn cache(&self) -> &RecentResults {
        &self.cache
    }

    /// Label of result `index` split around the current query.
    pub fn highlighted_label(&self, index: usize) -> Option<HighlightedLabel<'_>> {
        self.results
            .get(index)
            .map(|item| highlight(&item.label, &self.text))
    }

    /// Keystroke in the input.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.supersede();
        self.results.clear();
        self.highlighted = None;

        let query = text.trim();
        if query.is_empty() {
            self.go_idle();
            self.update_committed(None, true);
            return;
        }
        if (self.config.is_code)(query) {
            let code = query.to_string();
            self.go_idle();
            self.update_committed(Some(code), true);
            return;
        }
        if query.chars().count() < self.config.min_query_chars {
            self.go_idle();
            return;
        }

        self.start_debounce();
    }

    /// Changes the country namespace. An active query restarts its cycle
    /// so results match the new filter.
    pub fn set_country(&mut self, country: Option<&str>) {
        let country = country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_ascii_uppercase);
        if country == self.country {
            return;
        }
        self.country = country;
        if self.phase != Phase::Idle {
            self.supersede();
            self.results.clear();
            self.highlighted = None;
            self.start_debounce();
        }
    }

    /// Re-runs the failed query through a fresh debounce cycle.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.phase, Phase::Error(_)) {
            return false;
        }
        self.supersede();
        self.start_debounce();
        true
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Leaving the field closes the list without committing.
    pub fn blur(&mut self) {
        self.focused = false;
        self.open = false;
        self.highlighted = None;
    }

    pub fn key(&mut self, key: Key) -> KeyOutcome {
        let has_results = self.phase == Phase::Results && !self.results.is_empty();
        let showing = self.open && has_results;
        let len = self.results.len();
        match key {
            Key::Down if showing => {
                self.highlighted = Some(match self.highlighted {
                    Some(i) if i + 1 < len => i + 1,
                    _ => 0,
                });
                KeyOutcome::Handled
            }
            Key::Up if showing => {
                self.highlighted = Some(match self.highlighted {
                    Some(i) if i > 0 => i - 1,
                    _ => len - 1,
                });
                KeyOutcome::Handled
            }
            Key::Enter if showing => {
                self.select(self.highlighted.unwrap_or(0));
                KeyOutcome::Committed
            }
            Key::Tab if showing => match self.highlighted {
                Some(index) => {
                    self.select(index);
                    KeyOutcome::Committed
                }
                None => KeyOutcome::Default,
            },
            Key::Down if has_results && !self.open => {
                self.open = true;
                self.highlighted = Some(0);
                KeyOutcome::Handled
            }
            Key::Escape if self.open => {
                self.open = false;
                self.highlighted = None;
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Default,
        }
    }

    /// Commits result `index` (click, Enter or Tab).
    pub fn select(&mut self, index: usize) -> bool {
        let Some(item) = self.results.get(index).cloned() else {
            return false;
        };
        let code = item.code.trim().to_ascii_uppercase();
        self.text = if item.label.is_empty() {
            code.clone()
        } else {
            format!("{} ({code})", item.label)
        };
        self.supersede();
        self.go_idle();
        self.focused = false;
        self.update_committed(Some(code), true);
        true
    }

    /// Owner-side change of the committed code. The input text follows
    /// without starting a lookup.
    pub fn sync_committed(&mut self, code: Option<&str>) {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_ascii_uppercase);
        if code == self.committed {
            return;
        }
        self.supersede();
        self.go_idle();
        self.text = code.clone().unwrap_or_default();
        self.update_committed(code, false);
    }

    /// Applies whatever timer and lookup events have already arrived.
    /// Returns how many changed state.
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next event of the current cycle and applies it.
    /// Returns `false` at once when nothing is outstanding.
    pub async fn next_event(&mut self) -> bool {
        while self.is_busy() {
            let Some(event) = self.events_rx.recv().await else {
                return false;
            };
            if self.apply(event) {
                return true;
            }
        }
        false
    }

    /// Runs the current cycle to completion (results, empty, error or
    /// idle).
    pub async fn settle(&mut self) {
        while self.next_event().await {}
    }

    fn apply(&mut self, event: LookupEvent) -> bool {
        if event.token() != self.token {
            debug!(
                token = event.token(),
                current = self.token,
                "dropping stale lookup event"
            );
            return false;
        }
        match event {
            LookupEvent::DebounceElapsed { .. } => {
                if self.phase != Phase::Debouncing {
                    return false;
                }
                self.pending = None;
                self.begin_lookup();
                true
            }
            LookupEvent::Finished { key, outcome, .. } => {
                if self.phase != Phase::Searching {
                    return false;
                }
                self.pending = None;
                self.finish_lookup(key, outcome);
                true
            }
        }
    }

    fn begin_lookup(&mut self) {
        let query = self.text.trim().to_string();
        let key = CacheKey::new(&query, self.country.as_deref());
        if let Some(items) = self.cache.get(&key) {
            debug!(key = key.as_str(), "suggestion cache hit");
            let items = items.to_vec();
            self.show(items);
            return;
        }

        self.phase = Phase::Searching;
        let request = SuggestionQuery::new(query, self.config.result_limit)
            .with_country(self.country.clone());
        let search = Arc::clone(&self.search);
        let tx = self.events_tx.clone();
        let timeout = self.config.timeout;
        let token = self.token;
        debug!(token, query = %request.text, "starting suggestion lookup");
        self.pending = Some(tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, search.search(&request)).await {
                Ok(Ok(items)) => LookupOutcome::Items(items),
                Ok(Err(SearchError::Cancelled)) => LookupOutcome::Cancelled,
                Ok(Err(err)) => LookupOutcome::Failed(err),
                Err(_) => LookupOutcome::TimedOut,
            };
            let _ = tx.send(LookupEvent::Finished {
                token,
                key,
                outcome,
            });
        }));
    }

    fn finish_lookup(&mut self, key: CacheKey, outcome: LookupOutcome) {
        match outcome {
            LookupOutcome::Items(items) => {
                if !items.is_empty() {
                    self.cache.insert(key, items.clone());
                }
                self.show(items);
            }
            LookupOutcome::TimedOut => {
                let failure = LookupFailure::timed_out(self.config.timeout.as_millis());
                warn!(
                    query = key.as_str(),
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "suggestion lookup timed out"
                );
                self.fail(failure);
            }
            LookupOutcome::Failed(err) => {
                warn!(query = key.as_str(), error = %err, "suggestion lookup failed");
                self.fail(LookupFailure::from_error(&err));
            }
            LookupOutcome::Cancelled => {
                debug!(query = key.as_str(), "suggestion lookup aborted by transport");
                self.go_idle();
            }
        }
    }

    fn show(&mut self, items: Vec<Suggestion>) {
        self.phase = if items.is_empty() {
            Phase::Empty
        } else {
            Phase::Results
        };
        self.results = items;
        self.highlighted = None;
        self.open = true;
    }

    fn fail(&mut self, failure: LookupFailure) {
        self.phase = Phase::Error(failure);
        self.results.clear();
        self.highlighted = None;
        self.open = true;
    }

    fn go_idle(&mut self) {
        self.phase = Phase::Idle;
        self.results.clear();
        self.highlighted = None;
        self.open = false;
    }

    fn start_debounce(&mut self) {
        self.phase = Phase::Debouncing;
        let tx = self.events_tx.clone();
        let delay = self.config.debounce;
        let token = self.token;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(LookupEvent::DebounceElapsed { token });
        }));
    }

    /// Invalidates the current cycle: later events carrying the old token
    /// are ignored and the running task is aborted.
    fn supersede(&mut self) {
        self.token = self.token.wrapping_add(1);
        if let Some(task) = self.pending.take() {
            if self.phase == Phase::Searching {
                debug!(token = self.token, "superseding in-flight lookup");
            }
            task.abort();
        }
    }

    fn update_committed(&mut self, code: Option<String>, notify: bool) {
        if code == self.committed {
            return;
        }
        self.committed = code;
        if notify {
            if let Some(callback) = self.on_commit.as_mut() {
                callback(self.committed.as_deref());
            }
        }
    }
}

impl Drop for TypeaheadController {
    fn drop(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "../tests/typeahead_tests.rs"]
mod tests;
