//! Property-based tests for recurrence expansion using proptest.
//!
//! These verify invariants that should hold for *any* valid draft, not just the
//! examples in `expander_tests.rs`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use proptest::prelude::*;
use recurrence_engine::{
    final_date_list, generate_occurrence_instants, materialize, EventWindow, ExclusionSet, OccurrenceId,
    RecurrenceDraft, RecurrenceKind, RecurrenceSpec, SpecPatch, Terminator, SAFETY_CAP,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn arb_kind() -> impl Strategy<Value = RecurrenceKind> {
    prop_oneof![
        Just(RecurrenceKind::Daily),
        Just(RecurrenceKind::Weekly),
        Just(RecurrenceKind::Monthly),
    ]
}

fn arb_any_kind() -> impl Strategy<Value = RecurrenceKind> {
    prop_oneof![Just(RecurrenceKind::None), arb_kind()]
}

fn arb_interval() -> impl Strategy<Value = u32> {
    1u32..=12
}

fn arb_weekdays() -> impl Strategy<Value = Vec<Weekday>> {
    proptest::sample::subsequence(ALL_WEEKDAYS.to_vec(), 1..=7)
}

/// Base date in 2025-2027. Day is capped at 28 so monthly rules never skip.
fn arb_base_date() -> impl Strategy<Value = NaiveDate> {
    (2025i32..=2027, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_base() -> impl Strategy<Value = NaiveDateTime> {
    (arb_base_date(), 0u32..=23, 0u32..=59)
        .prop_map(|(date, h, min)| date.and_hms_opt(h, min, 0).unwrap())
}

/// A start/end pair of time-of-day strings with end >= start.
fn arb_times() -> impl Strategy<Value = (String, String)> {
    (0u32..=22, 0u32..=59, 0u32..=90).prop_map(|(h, min, dur)| {
        let start = h * 60 + min;
        let end = (start + dur).min(23 * 60 + 59);
        (
            format!("{:02}:{:02}", start / 60, start % 60),
            format!("{:02}:{:02}", end / 60, end % 60),
        )
    })
}

fn arb_spec(terminator: impl Strategy<Value = Terminator>) -> impl Strategy<Value = RecurrenceSpec> {
    (arb_kind(), arb_interval(), terminator, arb_weekdays()).prop_map(
        |(kind, interval, terminator, weekdays)| RecurrenceSpec {
            kind,
            interval,
            terminator,
            weekdays,
            month_day: None,
        },
    )
}

fn arb_id() -> impl Strategy<Value = OccurrenceId> {
    arb_base().prop_map(OccurrenceId::from_instant)
}

fn arb_exclusions() -> impl Strategy<Value = ExclusionSet> {
    proptest::collection::vec(arb_id(), 0..10).prop_map(|ids| ids.into_iter().collect())
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: A non-recurring spec materializes to exactly the base window
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn none_is_singleton(
        base_date in arb_base_date(),
        (start, end) in arb_times(),
    ) {
        let window = EventWindow::new(base_date, start, end);
        let result = materialize(&window, &RecurrenceSpec::none(), &ExclusionSet::new());

        let occurrences = result.expect("valid window must materialize");
        prop_assert_eq!(occurrences.len(), 1);
        prop_assert_eq!(occurrences[0].start, window.start_datetime().unwrap());
        prop_assert_eq!(occurrences[0].end, window.end_datetime().unwrap());
    }
}

// ---------------------------------------------------------------------------
// Property 2: ByCount(n) yields exactly n instants
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn count_terminator_is_exact(
        count in 1u32..=u32::from(SAFETY_CAP),
        base in arb_base(),
        spec in arb_spec(Just(Terminator::ByCount(1))),
    ) {
        let spec = RecurrenceSpec { terminator: Terminator::ByCount(count), ..spec };
        let instants = generate_occurrence_instants(base, &spec).expect("should expand");

        prop_assert_eq!(
            instants.len(),
            count as usize,
            "{:?} every {} with ByCount({})",
            spec.kind,
            spec.interval,
            count
        );
    }
}

// ---------------------------------------------------------------------------
// The base is always occurrence #0 and ByCount(n) saves exactly n rows
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn base_is_first_and_counted(
        base_date in arb_base_date(),
        (start, end) in arb_times(),
        count in 1u32..=40,
        month_day in proptest::option::of(1u32..=31),
        spec in arb_spec(Just(Terminator::ByCount(1))),
    ) {
        let window = EventWindow::new(base_date, start, end);
        let base = window.start_datetime().unwrap();
        let spec = RecurrenceSpec { terminator: Terminator::ByCount(count), month_day, ..spec };

        let instants = generate_occurrence_instants(base, &spec).expect("should expand");
        prop_assert_eq!(instants.first(), Some(&base));

        let dates = final_date_list(&window, &spec, &ExclusionSet::new()).expect("should finalize");
        prop_assert_eq!(dates.len(), count as usize, "{:?}", spec);
        prop_assert_eq!(dates, instants);
    }
}

// ---------------------------------------------------------------------------
// Property 3: ByDate(d) never yields an instant after d
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn date_terminator_bounds_every_instant(
        base in arb_base(),
        days_ahead in 0i64..=400,
        spec in arb_spec(Just(Terminator::ByCount(1))),
    ) {
        let end = base.date() + Duration::days(days_ahead);
        let spec = RecurrenceSpec { terminator: Terminator::ByDate(end), ..spec };
        let instants = generate_occurrence_instants(base, &spec).expect("should expand");

        for instant in &instants {
            prop_assert!(
                instant.date() <= end,
                "{:?} is after end date {:?}",
                instant,
                end
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: Instants are strictly increasing and start no earlier than base
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_is_chronological(
        base in arb_base(),
        count in 1u32..=60,
        spec in arb_spec(Just(Terminator::ByCount(1))),
    ) {
        let spec = RecurrenceSpec { terminator: Terminator::ByCount(count), ..spec };
        let instants = generate_occurrence_instants(base, &spec).expect("should expand");

        for pair in instants.windows(2) {
            prop_assert!(pair[0] < pair[1], "not increasing: {:?} >= {:?}", pair[0], pair[1]);
        }
        if let Some(first) = instants.first() {
            prop_assert!(*first >= base);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: Excluding then restoring an identity is a no-op
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn exclude_then_restore_round_trips(
        set in arb_exclusions(),
        id in arb_id(),
    ) {
        let set = set.restore(&id);
        prop_assert_eq!(set.exclude(&id).restore(&id), set.clone());
        prop_assert_eq!(set.toggle(&id).toggle(&id), set);
    }
}

// ---------------------------------------------------------------------------
// Property 6: Changing the kind clears exclusions, keeping it does not
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn kind_change_clears_exclusions(
        from in arb_any_kind(),
        to in arb_any_kind(),
        exclusions in arb_exclusions(),
        interval in arb_interval(),
    ) {
        let window = EventWindow::new(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), "09:00", "10:00");
        let spec = RecurrenceSpec { kind: from, ..RecurrenceSpec::default() };
        let mut draft = RecurrenceDraft { window, spec, exclusions: exclusions.clone() };

        let changed = draft.apply_patch(&SpecPatch::default().with_kind(to).with_interval(interval));

        prop_assert_eq!(changed, from != to);
        if from != to {
            prop_assert!(draft.exclusions.is_empty());
        } else {
            prop_assert_eq!(&draft.exclusions, &exclusions);
        }
        prop_assert_eq!(draft.spec.interval, interval);
    }
}

// ---------------------------------------------------------------------------
// Property 7: No expansion ever exceeds the safety cap
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn safety_cap_bounds_every_expansion(
        base in arb_base(),
        days_ahead in 0i64..=3000,
        spec in arb_spec(Just(Terminator::ByCount(1))),
    ) {
        let end = base.date() + Duration::days(days_ahead);
        let spec = RecurrenceSpec { terminator: Terminator::ByDate(end), ..spec };
        let instants = generate_occurrence_instants(base, &spec).expect("should expand");

        prop_assert!(instants.len() <= usize::from(SAFETY_CAP));
    }
}

// ---------------------------------------------------------------------------
// Every occurrence keeps the base duration
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn duration_applied_to_every_occurrence(
        base_date in arb_base_date(),
        (start, end) in arb_times(),
        spec in arb_spec((1u32..=30).prop_map(Terminator::ByCount)),
    ) {
        let window = EventWindow::new(base_date, start, end);
        let expected = window.end_datetime().unwrap() - window.start_datetime().unwrap();

        let occurrences = materialize(&window, &spec, &ExclusionSet::new()).expect("should materialize");

        for occurrence in &occurrences {
            prop_assert_eq!(occurrence.end - occurrence.start, expected);
        }
    }
}

// ---------------------------------------------------------------------------
// Weekly instants only land on selected weekdays
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn weekly_lands_on_selected_weekdays(
        base in arb_base(),
        weekdays in arb_weekdays(),
        interval in arb_interval(),
        count in 1u32..=30,
    ) {
        let spec = RecurrenceSpec::weekly(interval, weekdays.clone(), Terminator::ByCount(count));
        let instants = generate_occurrence_instants(base, &spec).expect("should expand");

        for instant in &instants {
            prop_assert!(
                weekdays.contains(&instant.weekday()) || instant.weekday() == base.weekday(),
                "{:?} is a {:?}, not in {:?}",
                instant,
                instant.weekday(),
                weekdays
            );
            prop_assert_eq!(instant.time(), base.time());
        }
    }
}
