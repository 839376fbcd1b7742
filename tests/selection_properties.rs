//! Property tests for the selection rules
//!
//! Tables and candidate lists are generated from a small name pool so that
//! lookups hit and miss in roughly equal measure.

use proptest::prelude::*;
use test_selector::selector::{
    CandidateTest, OptOutSuites, SKIP_DETAILS, SKIP_MARKER, select_tests,
};
use test_selector::stats::{HistoricalRecord, StatisticsTable, parse_statistics};

const SUITES: [&str; 3] = ["nightly", "weekly", "acceptance"];

fn name_strategy() -> impl Strategy<Value = String> {
    (0u8..12).prop_map(|n| format!("test-{n}"))
}

fn table_strategy() -> impl Strategy<Value = StatisticsTable> {
    prop::collection::vec((name_strategy(), any::<bool>(), any::<i64>(), any::<i64>()), 0..12)
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(name, selected, duration, runs)| {
                    (
                        name,
                        HistoricalRecord {
                            selected,
                            average_duration_millis: duration,
                            total_runs: runs,
                        },
                    )
                })
                .collect()
        })
}

fn opt_out_strategy() -> impl Strategy<Value = OptOutSuites> {
    prop_oneof![
        Just(OptOutSuites::NotConfigured),
        prop::collection::vec(prop::sample::select(SUITES.to_vec()), 0..3)
            .prop_map(OptOutSuites::configured),
    ]
}

fn candidate_strategy() -> impl Strategy<Value = CandidateTest> {
    (name_strategy(), any::<bool>(), opt_out_strategy()).prop_map(|(name, skipped, opt_out)| {
        let test = CandidateTest::new(name).with_opt_out(opt_out);
        if skipped {
            test.with_skip("manual", "skipped elsewhere")
        } else {
            test
        }
    })
}

fn suite_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SUITES.to_vec())
}

proptest! {
    #[test]
    fn header_only_table_skips_nothing(
        mut tests in prop::collection::vec(candidate_strategy(), 0..20),
        suite in suite_strategy(),
    ) {
        let table = parse_statistics(b"TEST_NAME,SELECTED,AVG_DURATION,TOTAL_RUNS\n").unwrap();
        let before = tests.clone();

        let count = select_tests(&table, &mut tests, suite);

        prop_assert_eq!(count, tests.len());
        prop_assert_eq!(tests, before);
    }

    #[test]
    fn opted_out_candidates_are_never_skipped(
        table in table_strategy(),
        mut tests in prop::collection::vec(candidate_strategy(), 0..20),
        suite in suite_strategy(),
    ) {
        let before = tests.clone();
        select_tests(&table, &mut tests, suite);

        for (after, before) in tests.iter().zip(&before) {
            if before.opt_out_suites.contains(suite) {
                prop_assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn candidates_without_history_are_never_skipped(
        table in table_strategy(),
        mut tests in prop::collection::vec(candidate_strategy(), 0..20),
        suite in suite_strategy(),
    ) {
        let before = tests.clone();
        select_tests(&table, &mut tests, suite);

        for (after, before) in tests.iter().zip(&before) {
            if table.get(&before.name).is_none() {
                prop_assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn existing_skips_are_preserved(
        table in table_strategy(),
        mut tests in prop::collection::vec(candidate_strategy(), 0..20),
        suite in suite_strategy(),
    ) {
        let before = tests.clone();
        select_tests(&table, &mut tests, suite);

        for (after, before) in tests.iter().zip(&before) {
            if before.is_skipped() {
                prop_assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn count_matches_rules(
        table in table_strategy(),
        mut tests in prop::collection::vec(candidate_strategy(), 0..20),
        suite in suite_strategy(),
    ) {
        // (counted, skipped) per candidate, rules applied in precedence order
        let expected: Vec<(bool, bool)> = tests
            .iter()
            .map(|t| {
                if t.opt_out_suites.contains(suite) {
                    return (true, false);
                }
                let Some(record) = table.get(&t.name) else {
                    return (true, false);
                };
                if !t.skip.is_empty() {
                    (false, false)
                } else if !record.selected {
                    (false, true)
                } else {
                    (true, false)
                }
            })
            .collect();
        let expected_count = expected.iter().filter(|(counted, _)| *counted).count();
        let before = tests.clone();

        let count = select_tests(&table, &mut tests, suite);

        prop_assert_eq!(count, expected_count);
        for ((after, before), (_, skipped)) in tests.iter().zip(&before).zip(expected) {
            if skipped {
                prop_assert_eq!(after.skip.as_str(), SKIP_MARKER);
                prop_assert_eq!(after.skip_details.as_str(), SKIP_DETAILS);
            } else {
                prop_assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn second_pass_is_idempotent(
        table in table_strategy(),
        mut tests in prop::collection::vec(candidate_strategy(), 0..20),
        suite in suite_strategy(),
    ) {
        let first = select_tests(&table, &mut tests, suite);
        let snapshot = tests.clone();
        let second = select_tests(&table, &mut tests, suite);

        prop_assert_eq!(first, second);
        prop_assert_eq!(tests, snapshot);
    }
}
