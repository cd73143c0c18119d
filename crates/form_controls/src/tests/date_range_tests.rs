use super::*;
use crate::dates::FixedClock;
use std::sync::Mutex;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 30, 0).expect("valid time")
}

fn controller_on(today: NaiveDate) -> DateRangeController {
    DateRangeController::new(Arc::new(FixedClock(today)))
}

#[test]
fn api_range_validity() {
    assert!(DateRange::from_api("", "").is_valid());
    assert!(!DateRange::from_api("2025-09-05", "2025-09-01").is_valid());
    assert!(DateRange::from_api("2025-09-01", "2025-09-05").is_valid());
    assert!(DateRange::from_api("2025-09-05", "").is_valid());

    assert!(is_valid_api_range("", ""));
    assert!(!is_valid_api_range("2025-09-05", "2025-09-01"));
    assert!(is_valid_api_range("2025-09-01", "2025-09-05"));
    assert!(is_valid_api_range("2025-09-01", "2025-09-01"));
}

#[test]
fn typing_valid_dates_commits_api_values() {
    let mut ctl = controller_on(date(2025, 8, 1));

    ctl.set_from_text("16/08/2025");
    ctl.set_to_text("30/08/2025");

    assert_eq!(ctl.range().api_from(), "2025-08-16");
    assert_eq!(ctl.range().api_to(), "2025-08-30");
    assert!(ctl.is_valid());
    assert_eq!(ctl.validation_message(), None);
}

#[test]
fn inverted_manual_range_is_flagged_without_reset() {
    let mut ctl = controller_on(date(2025, 8, 1));
    ctl.set_from_text("16/08/2025");
    ctl.set_to_text("30/08/2025");

    ctl.set_to_text("01/08/2025");

    assert_eq!(ctl.range().api_to(), "2025-08-01");
    assert_eq!(ctl.range().api_from(), "2025-08-16");
    assert!(!ctl.is_valid());
    assert_eq!(ctl.validation_message(), Some(INVERTED_RANGE_MESSAGE));
}

#[test]
fn partial_or_malformed_text_keeps_committed_value() {
    let mut ctl = controller_on(date(2025, 8, 1));
    ctl.set_from_text("16/08/2025");

    for partial in ["1", "16/0", "16/08/20", "31/02/2025", "hello"] {
        ctl.set_from_text(partial);
        assert_eq!(ctl.from_display(), partial);
        assert_eq!(ctl.range().api_from(), "2025-08-16");
    }
}

#[test]
fn clearing_text_commits_empty_endpoint() {
    let mut ctl = controller_on(date(2025, 8, 1));
    ctl.set_to_text("30/08/2025");

    ctl.set_to_text("");

    assert_eq!(ctl.range().to, None);
    assert_eq!(ctl.range().api_to(), "");
    assert!(ctl.is_valid());
}

#[test]
fn calendar_selection_keeps_picked_calendar_day() {
    let mut ctl = controller_on(date(2025, 8, 1));
    ctl.focus(Endpoint::From);

    let outcome = ctl.select_range(PickedRange {
        from: Some(at(2025, 8, 16, 23)),
        to: None,
    });

    assert_eq!(outcome, SelectionOutcome::InProgress);
    assert_eq!(ctl.range().api_from(), "2025-08-16");
    assert_eq!(ctl.range().to, None);
    assert_eq!(ctl.from_display(), "16/08/2025");
    assert!(ctl.is_picker_open());
    assert_eq!(ctl.active_endpoint(), Endpoint::To);
}

#[test]
fn completing_selection_fills_both_fields_and_closes() {
    let mut ctl = controller_on(date(2025, 8, 1));
    ctl.set_to_text("31/12/2025");
    ctl.focus(Endpoint::From);
    ctl.select_range(PickedRange {
        from: Some(at(2025, 8, 16, 0)),
        to: None,
    });
    assert_eq!(ctl.range().api_to(), "2025-12-31", "to untouched mid-selection");

    let outcome = ctl.select_range(PickedRange {
        from: Some(at(2025, 8, 16, 0)),
        to: Some(at(2025, 8, 30, 0)),
    });

    assert_eq!(outcome, SelectionOutcome::Completed);
    assert_eq!(ctl.from_display(), "16/08/2025");
    assert_eq!(ctl.to_display(), "30/08/2025");
    assert!(!ctl.is_picker_open());
}

#[test]
fn past_days_are_not_selectable() {
    let mut ctl = controller_on(date(2025, 8, 10));
    ctl.focus(Endpoint::From);

    assert!(!ctl.is_selectable(date(2025, 8, 9)));
    assert!(ctl.is_selectable(date(2025, 8, 10)));
    let outcome = ctl.select_range(PickedRange {
        from: Some(at(2025, 8, 9, 12)),
        to: Some(at(2025, 8, 20, 12)),
    });

    assert_eq!(outcome, SelectionOutcome::Ignored);
    assert_eq!(ctl.range(), DateRange::default());
    assert!(ctl.is_picker_open());
}

#[test]
fn preset_commits_both_endpoints_and_closes_immediately() {
    let today = date(2025, 8, 28);
    let mut ctl = controller_on(today);
    ctl.focus(Endpoint::To);

    ctl.select_preset(Preset::Next7Days);

    assert_eq!(ctl.range().api_from(), "2025-08-28");
    assert_eq!(ctl.range().api_to(), "2025-09-03");
    assert_eq!(ctl.to_display(), "03/09/2025");
    assert!(!ctl.is_picker_open());
}

#[test]
fn escape_restores_focus_to_opening_endpoint() {
    let mut ctl = controller_on(date(2025, 8, 1));
    ctl.set_from_text("16/08/2025");
    ctl.focus(Endpoint::To);

    assert_eq!(ctl.cancel(), Some(Endpoint::To));
    assert_eq!(ctl.focused(), Some(Endpoint::To));
    assert!(!ctl.is_picker_open());
    assert_eq!(ctl.range().api_from(), "2025-08-16");
    assert_eq!(ctl.cancel(), None);
}

#[test]
fn escape_after_partial_pick_returns_to_opening_endpoint() {
    let mut ctl = controller_on(date(2025, 8, 1));
    ctl.focus(Endpoint::From);

    let outcome = ctl.select_range(PickedRange {
        from: Some(at(2025, 8, 10, 9)),
        to: None,
    });
    assert_eq!(outcome, SelectionOutcome::InProgress);
    assert_eq!(ctl.active_endpoint(), Endpoint::To);

    assert_eq!(ctl.cancel(), Some(Endpoint::From));
    assert_eq!(ctl.focused(), Some(Endpoint::From));
    assert_eq!(ctl.range().api_from(), "2025-08-10");
}

#[test]
fn outside_pointer_closes_picker() {
    let mut ctl = controller_on(date(2025, 8, 1));
    ctl.focus(Endpoint::From);

    ctl.pointer_outside();

    assert!(!ctl.is_picker_open());
    assert_eq!(ctl.focused(), None);
}

#[test]
fn disabled_controller_ignores_input_but_reflects_external_values() {
    let mut ctl = controller_on(date(2025, 8, 1));
    ctl.set_disabled(true);

    ctl.focus(Endpoint::From);
    ctl.set_from_text("16/08/2025");
    ctl.select_preset(Preset::Next14Days);
    assert!(!ctl.is_picker_open());
    assert_eq!(ctl.range(), DateRange::default());

    ctl.set_range(DateRange::from_api("2025-08-16", "2025-08-30"));
    assert_eq!(ctl.from_display(), "16/08/2025");
    assert_eq!(ctl.to_display(), "30/08/2025");
}

#[test]
fn change_callback_fires_for_commits_only() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut ctl = controller_on(date(2025, 8, 1))
        .with_on_change(move |range| sink.lock().expect("lock").push(range));

    ctl.set_from_text("16/08");
    ctl.set_from_text("16/08/2025");
    ctl.set_from_text("16/08/2025");
    ctl.set_range(DateRange::default());

    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].api_from(), "2025-08-16");
}

#[test]
fn picker_shows_two_months_from_anchor() {
    let mut ctl = controller_on(date(2025, 12, 19));
    assert_eq!(ctl.visible_months(), [date(2025, 12, 1), date(2026, 1, 1)]);

    ctl.set_from_text("03/02/2026");
    assert_eq!(ctl.visible_months(), [date(2026, 2, 1), date(2026, 3, 1)]);
}
