// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::source::EventList;
use proptest::prelude::*;
use yare::parameterized;

const S1: Id = 1;
const S2: Id = 2;
const E1: Id = 10;
const E2: Id = 20;

/// The three events used throughout: (S1,E1,100,0,completed),
/// (S2,E1,150,50,continued), (S1,E2,200,0,completed)
fn scenario() -> EventList {
    vec![
        Event::new(S1, E1, 100),
        Event::new(S2, E1, 150)
            .with_dur(50)
            .with_state(EventState::Continued),
        Event::new(S1, E2, 200),
    ]
    .into()
}

fn times(filter: &mut dyn EventSource) -> Vec<u64> {
    filter.to_vec().iter().map(|e| e.time).collect()
}

#[test]
fn scenario_sender_filter() {
    let mut filter = EventFilter::new(scenario(), FilterCriteria::any().senders([S1]));
    filter.set_reference_time(200);
    assert_eq!(times(&mut filter), vec![100, 200]);
}

#[test]
fn scenario_nonzero_duration_filter() {
    let mut filter = EventFilter::new(
        scenario(),
        FilterCriteria::any().state(StateFilter::NonZeroDur),
    );
    filter.set_reference_time(200);
    assert_eq!(times(&mut filter), vec![150]);
}

#[parameterized(
    all = { StateFilter::All, vec![100, 150, 200] },
    completed = { StateFilter::Completed, vec![100, 200] },
    continued = { StateFilter::Continued, vec![150] },
    zero_dur = { StateFilter::ZeroDur, vec![100, 200] },
    nonzero_dur = { StateFilter::NonZeroDur, vec![150] },
)]
fn state_filters_partition(state: StateFilter, expected: Vec<u64>) {
    let mut filter = EventFilter::new(scenario(), FilterCriteria::any().state(state));
    assert_eq!(times(&mut filter), expected);
}

#[test]
fn continued_zero_duration_is_excluded_by_completed() {
    let continued = Event::new(S1, E1, 0).with_state(EventState::Continued);
    let criteria = FilterCriteria::any().state(StateFilter::Completed);
    assert!(!criteria.matches(&continued, 0, false));
    assert!(FilterCriteria::any()
        .state(StateFilter::ZeroDur)
        .matches(&continued, 0, false));
}

#[test]
fn event_and_sender_sets_combine() {
    let mut filter = EventFilter::new(
        scenario(),
        FilterCriteria::any().senders([S1, S2]).events([E1]),
    );
    assert_eq!(times(&mut filter), vec![100, 150]);
}

#[test]
fn window_keeps_recent_events() {
    let mut filter = EventFilter::new(scenario(), FilterCriteria::any().within(60));
    filter.set_reference_time(210);
    // 210 - 100 = 110 > 60 is dropped; 60 and 10 pass
    assert_eq!(times(&mut filter), vec![150, 200]);
}

#[test]
fn window_boundary_is_inclusive() {
    let criteria = FilterCriteria::any().within(50);
    assert!(criteria.matches(&Event::new(S1, E1, 100), 150, true));
    assert!(!criteria.matches(&Event::new(S1, E1, 99), 150, true));
}

#[test]
fn window_excludes_future_events() {
    let mut filter = EventFilter::new(scenario(), FilterCriteria::any().within(1_000));
    filter.set_reference_time(160);
    // 200 lies in the future of the reference time and wraps
    assert_eq!(times(&mut filter), vec![100, 150]);
}

#[test]
fn window_only_applies_when_span_is_set() {
    let criteria = FilterCriteria::any();
    assert!(!criteria.is_windowed());
    let mut filter = EventFilter::new(scenario(), criteria);
    filter.set_reference_time(0);
    assert_eq!(times(&mut filter), vec![100, 150, 200]);
}

#[test]
fn matches_ignores_window_when_not_requested() {
    let mut filter = EventFilter::unfiltered(scenario());
    filter.set(&[], &[], 10, StateFilter::All);
    filter.set_reference_time(1_000);
    let event = Event::new(S1, E1, 100);
    assert!(filter.matches(&event, false));
    assert!(!filter.matches(&event, true));
}

#[test]
fn set_replaces_all_criteria() {
    let mut filter = EventFilter::new(
        scenario(),
        FilterCriteria::any().senders([S2]).state(StateFilter::Continued),
    );
    filter.set(&[S1], &[E2], 0, StateFilter::All);
    assert_eq!(
        filter.criteria(),
        &FilterCriteria::any().senders([S1]).events([E2])
    );
    assert_eq!(times(&mut filter), vec![200]);
}

#[test]
fn setting_reference_time_does_not_move_cursor() {
    let mut filter = EventFilter::unfiltered(scenario());
    assert_eq!(filter.next().map(|e| e.time), Some(100));
    filter.set_reference_time(500);
    assert_eq!(filter.reference_time(), 500);
    assert_eq!(filter.next().map(|e| e.time), Some(150));
}

#[test]
fn get_counts_matches_not_source_entries() {
    let mut filter = EventFilter::new(scenario(), FilterCriteria::any().senders([S1]));
    assert_eq!(filter.get(1).map(|e| e.time), Some(200));
    assert!(filter.get(2).is_none());
}

#[test]
fn len_leaves_source_exhausted() {
    let mut filter = EventFilter::unfiltered(scenario());
    assert_eq!(filter.len(), 3);
    assert!(filter.next().is_none());
    filter.reset();
    assert!(filter.next().is_some());
}

#[test]
fn release_restores_defaults() {
    let mut filter = EventFilter::new(
        scenario(),
        FilterCriteria::any()
            .senders([S2])
            .events([E1])
            .within(5)
            .state(StateFilter::Continued),
    );
    filter.release();
    assert_eq!(filter.criteria(), &FilterCriteria::any());
    assert_eq!(filter.len(), 3);
}

#[test]
fn filters_compose() {
    let inner = EventFilter::new(scenario(), FilterCriteria::any().events([E1]));
    let mut outer = EventFilter::new(inner, FilterCriteria::any().state(StateFilter::ZeroDur));
    assert_eq!(times(&mut outer), vec![100]);
}

#[test]
fn bind_swaps_source_and_keeps_criteria() {
    let mut filter = EventFilter::new(EventList::new(), FilterCriteria::any().senders([S2]));
    assert_eq!(filter.len(), 0);
    filter.bind(scenario());
    assert_eq!(times(&mut filter), vec![150]);
}

#[test]
fn state_filter_names_roundtrip() {
    for state in [
        StateFilter::All,
        StateFilter::Completed,
        StateFilter::Continued,
        StateFilter::ZeroDur,
        StateFilter::NonZeroDur,
    ] {
        assert_eq!(state.name().parse::<StateFilter>().unwrap(), state);
    }
    assert_eq!("ZeroDur".parse::<StateFilter>().unwrap(), StateFilter::ZeroDur);
    assert!("sometimes".parse::<StateFilter>().is_err());
}

fn arb_event() -> impl Strategy<Value = Event> {
    (0..4u32, 0..4u32, 0..1_000u64, 0..3u64, any::<bool>()).prop_map(
        |(sender, event, time, dur, continued)| {
            let state = if continued {
                EventState::Continued
            } else {
                EventState::Completed
            };
            Event::new(sender, event, time)
                .with_dur(dur)
                .with_state(state)
        },
    )
}

fn arb_state() -> impl Strategy<Value = StateFilter> {
    prop_oneof![
        Just(StateFilter::All),
        Just(StateFilter::Completed),
        Just(StateFilter::Continued),
        Just(StateFilter::ZeroDur),
        Just(StateFilter::NonZeroDur),
    ]
}

proptest! {
    #[test]
    fn indexed_access_agrees_with_cursor(
        events in proptest::collection::vec(arb_event(), 0..40),
        senders in proptest::collection::vec(0..4u32, 0..3),
        span in 0..500u64,
        state in arb_state(),
        now in 0..1_200u64,
    ) {
        let criteria = FilterCriteria::any().senders(senders).within(span).state(state);

        let mut indexed = EventFilter::new(EventList::from(events.clone()), criteria.clone());
        indexed.set_reference_time(now);
        let n = indexed.len();
        let by_index: Vec<Arc<Event>> = (0..n).filter_map(|i| indexed.get(i)).collect();

        let mut walked = EventFilter::new(EventList::from(events), criteria);
        walked.set_reference_time(now);
        walked.reset();
        let mut by_cursor = Vec::new();
        while let Some(event) = walked.next() {
            by_cursor.push(event);
        }

        prop_assert_eq!(by_index.len(), n);
        prop_assert_eq!(by_index, by_cursor);
    }

    #[test]
    fn window_never_yields_old_or_future_events(
        events in proptest::collection::vec(arb_event(), 0..40),
        span in 1..500u64,
        now in 0..1_200u64,
    ) {
        let mut filter = EventFilter::new(EventList::from(events), FilterCriteria::any().within(span));
        filter.set_reference_time(now);
        for event in filter.to_vec() {
            prop_assert!(event.time <= now);
            prop_assert!(now - event.time <= span);
        }
    }
}
