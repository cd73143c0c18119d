//! From/to date pair behind two text inputs, a two-month range picker and
//! preset shortcuts.
//!
//! The committed [`DateRange`] is the value of record. Display strings follow
//! it, except while the user is mid-way through typing something that does
//! not parse: that text is kept verbatim and never committed.

use std::{fmt, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::dates::{
    first_of_month, first_of_next_month, format_api, format_display, parse_api, parse_display,
    start_of_day, Clock, Preset, SystemClock,
};

pub const INVERTED_RANGE_MESSAGE: &str = "The end date must be on or after the start date.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Builds a range from API-format strings; anything that does not
    /// parse (including `""`) is an empty endpoint.
    pub fn from_api(from: &str, to: &str) -> Self {
        Self {
            from: parse_api(from),
            to: parse_api(to),
        }
    }

    pub fn api_from(&self) -> String {
        self.from.map(format_api).unwrap_or_default()
    }

    pub fn api_to(&self) -> String {
        self.to.map(format_api).unwrap_or_default()
    }

    /// Empty endpoints never block; only an inverted pair is invalid.
    pub fn is_valid(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}

/// Validity on raw API strings. The format is zero-padded, so the
/// lexicographic order is the calendar order.
pub fn is_valid_api_range(from: &str, to: &str) -> bool {
    from.is_empty() || to.is_empty() || from <= to
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    From,
    To,
}

/// What the calendar widget reports: zero, one or two picked moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PickedRange {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Nothing committed (disabled, empty pick, or a past day).
    Ignored,
    /// Only one endpoint committed; the picker stays open.
    InProgress,
    /// Both endpoints committed and the picker closed.
    Completed,
}

type ChangeCallback = Box<dyn FnMut(DateRange) + Send>;

pub struct DateRangeController {
    clock: Arc<dyn Clock>,
    range: DateRange,
    from_display: String,
    to_display: String,
    picker_open: bool,
    active: Endpoint,
    /// Endpoint whose focus opened the picker; Escape returns focus here.
    opened_from: Endpoint,
    focused: Option<Endpoint>,
    disabled: bool,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for DateRangeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateRangeController")
            .field("range", &self.range)
            .field("from_display", &self.from_display)
            .field("to_display", &self.to_display)
            .field("picker_open", &self.picker_open)
            .field("active", &self.active)
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl Default for DateRangeController {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl DateRangeController {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            range: DateRange::default(),
            from_display: String::new(),
            to_display: String::new(),
            picker_open: false,
            active: Endpoint::From,
            opened_from: Endpoint::From,
            focused: None,
            disabled: false,
            on_change: None,
        }
    }

    /// Invoked after every committed change made through this controller.
    /// External syncs via [`Self::set_range`] do not echo back.
    pub fn with_on_change(mut self, callback: impl FnMut(DateRange) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn from_display(&self) -> &str {
        &self.from_display
    }

    pub fn to_display(&self) -> &str {
        &self.to_display
    }

    pub fn is_picker_open(&self) -> bool {
        self.picker_open
    }

    pub fn active_endpoint(&self) -> Endpoint {
        self.active
    }

    pub fn focused(&self) -> Option<Endpoint> {
        self.focused
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_valid(&self) -> bool {
        self.range.is_valid()
    }

    /// Inline, non-blocking message for an inverted range.
    pub fn validation_message(&self) -> Option<&'static str> {
        (!self.is_valid()).then_some(INVERTED_RANGE_MESSAGE)
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.picker_open = false;
        }
    }

    pub fn set_from_text(&mut self, text: &str) {
        self.set_text(Endpoint::From, text);
    }

    pub fn set_to_text(&mut self, text: &str) {
        self.set_text(Endpoint::To, text);
    }

    /// Keystroke on one endpoint's input. The text is shown as typed; the
    /// committed value only moves for a parseable date or an empty input.
    pub fn set_text(&mut self, endpoint: Endpoint, text: &str) {
        if self.disabled {
            return;
        }
        *self.display_mut(endpoint) = text.to_string();

        let committed = if text.is_empty() {
            None
        } else {
            match parse_display(text) {
                Some(date) => Some(date),
                None => {
                    debug!(?endpoint, "holding unparsed date text");
                    return;
                }
            }
        };

        if self.commit(endpoint, committed) {
            self.notify();
        }
    }

    /// Selection reported by the calendar. Picked moments are reduced to
    /// their calendar day before committing.
    pub fn select_range(&mut self, picked: PickedRange) -> SelectionOutcome {
        if self.disabled {
            return SelectionOutcome::Ignored;
        }
        let mut from = picked.from.map(start_of_day);
        let mut to = picked.to.map(start_of_day);
        if from.is_none() && to.is_none() {
            return SelectionOutcome::Ignored;
        }
        if [from, to].into_iter().flatten().any(|d| !self.is_selectable(d)) {
            debug!("rejected range selection containing a past day");
            return SelectionOutcome::Ignored;
        }
        if let (Some(start), Some(end)) = (from, to) {
            if start > end {
                std::mem::swap(&mut from, &mut to);
            }
        }

        let mut changed = false;
        if let Some(date) = from {
            changed |= self.commit(Endpoint::From, Some(date));
            self.sync_display(Endpoint::From);
        }
        if let Some(date) = to {
            changed |= self.commit(Endpoint::To, Some(date));
            self.sync_display(Endpoint::To);
        }
        if changed {
            self.notify();
        }

        if from.is_some() && to.is_some() {
            self.picker_open = false;
            SelectionOutcome::Completed
        } else {
            self.active = if from.is_some() {
                Endpoint::To
            } else {
                Endpoint::From
            };
            SelectionOutcome::InProgress
        }
    }

    /// Commits both endpoints of `preset` at once and closes the picker.
    pub fn select_preset(&mut self, preset: Preset) {
        if self.disabled {
            return;
        }
        let (from, to) = preset.resolve(self.clock.today());
        let changed =
            self.commit(Endpoint::From, Some(from)) | self.commit(Endpoint::To, Some(to));
        self.sync_display(Endpoint::From);
        self.sync_display(Endpoint::To);
        self.picker_open = false;
        if changed {
            self.notify();
        }
    }

    /// Value pushed by the owner (restored filters, reset). Both display
    /// strings are rewritten; the change callback is not invoked.
    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
        self.sync_display(Endpoint::From);
        self.sync_display(Endpoint::To);
    }

    pub fn focus(&mut self, endpoint: Endpoint) {
        self.focused = Some(endpoint);
        if self.disabled {
            return;
        }
        if !self.picker_open {
            self.opened_from = endpoint;
        }
        self.active = endpoint;
        self.picker_open = true;
    }

    /// Escape: closes the picker without touching values and returns the
    /// endpoint that should get focus back.
    pub fn cancel(&mut self) -> Option<Endpoint> {
        if !self.picker_open {
            return None;
        }
        self.picker_open = false;
        self.focused = Some(self.opened_from);
        Some(self.opened_from)
    }

    pub fn pointer_outside(&mut self) {
        self.picker_open = false;
        self.focused = None;
    }

    /// Days before today are not offered by the calendar.
    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        date >= self.clock.today()
    }

    pub fn first_selectable_day(&self) -> NaiveDate {
        self.clock.today()
    }

    /// First day of each of the two months the picker shows, anchored on
    /// the committed start or today.
    pub fn visible_months(&self) -> [NaiveDate; 2] {
        let anchor = self.range.from.unwrap_or_else(|| self.clock.today());
        [first_of_month(anchor), first_of_next_month(anchor)]
    }

    fn display_mut(&mut self, endpoint: Endpoint) -> &mut String {
        match endpoint {
            Endpoint::From => &mut self.from_display,
            Endpoint::To => &mut self.to_display,
        }
    }

    fn sync_display(&mut self, endpoint: Endpoint) {
        let value = match endpoint {
            Endpoint::From => self.range.from,
            Endpoint::To => self.range.to,
        };
        *self.display_mut(endpoint) = value.map(format_display).unwrap_or_default();
    }

    fn commit(&mut self, endpoint: Endpoint, value: Option<NaiveDate>) -> bool {
        let slot = match endpoint {
            Endpoint::From => &mut self.range.from,
            Endpoint::To => &mut self.range.to,
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        debug!(?endpoint, value = ?value.map(format_api), "committed date");
        true
    }

    fn notify(&mut self) {
        let range = self.range;
        if let Some(callback) = self.on_change.as_mut() {
            callback(range);
        }
    }
}

#[cfg(test)]
#[path = "tests/date_range_tests.rs"]
mod tests;
