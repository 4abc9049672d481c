//! Property-based tests for the record store and filter engine
//!
//! Uses proptest to check the store round-trip and the ordering guarantees
//! of filtering over arbitrary record sequences.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use tempfile::tempdir;
use tracker::{
    apply, sort_for_display, CsvRecordStore, DateField, DateRange, FilterQuery, Record,
    RecordStore, Selection,
};

const PEOPLE: [&str; 3] = ["Asha", "Raj", "Mina"];
const INSTRUMENTS: [&str; 3] = ["Lux Meter", "eGauge", "Distance Gun"];

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

// ============================================================================
// Strategy Generators
// ============================================================================

/// Free text as a person might type it: commas, quotes, newlines, padding, formulas.
fn awkward_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~\n\té]{0,24}").expect("valid regex")
}

fn date_strategy() -> impl Strategy<Value = DateField> {
    prop_oneof![
        4 => (0..730u64).prop_map(|d| DateField::Valid(base_date() + Days::new(d))),
        1 => Just(DateField::Absent),
    ]
}

fn awkward_record_strategy() -> impl Strategy<Value = Record> {
    (
        awkward_text_strategy(),
        any::<u32>(),
        date_strategy(),
        date_strategy(),
        awkward_text_strategy(),
    )
        .prop_map(|(instrument, quantity, issue, ret, issued_to)| {
            Record::new(instrument, quantity, issue, ret, issued_to)
        })
}

/// Records drawn from a small vocabulary so that filters actually match.
fn plain_record_strategy() -> impl Strategy<Value = Record> {
    (0..3usize, 0..3usize, date_strategy(), 1..5u32).prop_map(|(i, p, issue, qty)| {
        Record::new(INSTRUMENTS[i], qty, issue, issue, PEOPLE[p])
    })
}

fn query_strategy() -> impl Strategy<Value = FilterQuery> {
    let selection = |names: [&'static str; 3]| {
        prop_oneof![
            Just(Selection::All),
            (0..3usize).prop_map(move |i| Selection::parse(names[i])),
        ]
    };
    (
        selection(PEOPLE),
        selection(INSTRUMENTS),
        prop::option::of((0..730u64, 0..120u64)),
    )
        .prop_map(|(person, instrument, range)| {
            let query = FilterQuery::new()
                .with_person(person)
                .with_instrument(instrument);
            match range {
                Some((start, len)) => {
                    let start = base_date() + Days::new(start);
                    query.with_date_range(DateRange::new(start, start + Days::new(len)))
                }
                None => query,
            }
        })
}

fn is_subsequence(view: &[Record], records: &[Record]) -> bool {
    let mut rest = records.iter();
    view.iter().all(|wanted| rest.any(|r| r == wanted))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever is appended comes back unchanged, in order, under any date format list
    #[test]
    fn csv_store_round_trip(
        records in prop::collection::vec(awkward_record_strategy(), 0..8),
        iso_configured in any::<bool>(),
    ) {
        let formats = if iso_configured {
            config::default_date_formats()
        } else {
            vec!["%d/%m/%Y".to_string()]
        };
        let dir = tempdir().unwrap();
        let path = dir.path().join("instrument_data.csv");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let reloaded = runtime.block_on(async {
            let store = CsvRecordStore::new(&path, formats.clone());
            store.append_batch(records.clone()).await.unwrap();
            CsvRecordStore::new(&path, formats).load().await.unwrap()
        });
        prop_assert_eq!(reloaded, records);
    }

    /// Filtering returns an order-preserving subsequence and is idempotent
    #[test]
    fn filter_is_idempotent_subsequence(
        records in prop::collection::vec(plain_record_strategy(), 0..40),
        query in query_strategy(),
    ) {
        let once = apply(&records, &query);
        prop_assert!(is_subsequence(&once, &records));
        prop_assert!(once.iter().all(|r| query.matches(r)));
        prop_assert_eq!(apply(&once, &query), once);
    }

    /// Display sorting is a newest-first permutation with undated records last
    #[test]
    fn display_sort_is_descending_permutation(
        records in prop::collection::vec(plain_record_strategy(), 0..40),
    ) {
        let sorted = sort_for_display(&records);
        prop_assert_eq!(sorted.len(), records.len());
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].issue_date.date() >= pair[1].issue_date.date());
        }
    }
}
