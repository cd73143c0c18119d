//! Form controls for the schedule search: a date-range picker model and a
//! type-ahead code selector, plus the form that combines them into a
//! listing filter.

pub mod date_range;
pub mod dates;
pub mod form;
pub mod typeahead;

pub use date_range::{
    is_valid_api_range, DateRange, DateRangeController, Endpoint, PickedRange, SelectionOutcome,
    INVERTED_RANGE_MESSAGE,
};
pub use dates::{Clock, FixedClock, Preset, SystemClock};
pub use form::{FormError, ScheduleForm};
pub use typeahead::{
    FailureKind, Key, KeyOutcome, LookupFailure, Phase, TypeaheadConfig, TypeaheadController,
};
